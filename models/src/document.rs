// models/src/document.rs

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ValidationResult;

/// A record persisted in its own collection of the document store.
///
/// Documents travel through the store as JSON, so field names listed in
/// `UNIQUE_FIELDS` are the serialized (camelCase) names.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// Serialized field names whose values must be unique in the collection.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    /// Canonicalizes field values (trimming, case folding) before validation.
    fn normalize(&mut self) {}

    /// Checks invariants that the type system cannot express. Called before
    /// every insert and replace.
    fn validate(&self) -> ValidationResult<()> {
        Ok(())
    }

    /// Records a modification time.
    fn touch(&mut self, at: DateTime<Utc>);
}
