// models/src/medical/mod.rs
pub mod analysis;
pub mod announcement;
pub mod appointment;
pub mod checkup;
pub mod patient;
pub mod role;
pub mod room;
pub mod user;
pub mod vitals;

pub use analysis::{clamp_confidence, AiAnalysis, AnalysisMetadata, Diagnosis, ANALYSIS_VERSION, MAX_DIAGNOSES};
pub use announcement::{Announcement, NewAnnouncement, Urgency};
pub use appointment::{Appointment, AppointmentStatus, CheckupSnapshot, NewAppointment};
pub use checkup::{Checkup, CheckupKind, InitialCheckup, NewCheckup};
pub use patient::{BloodType, Gender, NewPatient, Patient, PatientRecord};
pub use role::Role;
pub use room::{NewRoom, Room, RoomStatus, RoomSummary};
pub use user::{User, UserProfile};
pub use vitals::Vitals;
