// models/src/lib.rs
//! Document types shared by the storage, security and REST layers.

pub mod document;
pub mod errors;
pub mod identifiers;
pub mod medical;

pub use document::Document;
pub use errors::{ValidationError, ValidationResult};
