//! Field validation producing field-keyed error collections.
//!
//! Validators are standalone functions operating on plain data. Entities
//! compose them in their `validate` methods and return the accumulated
//! [`ValidationErrors`], keyed by field name, so callers can surface every
//! problem at once instead of failing on the first.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A collection of validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[error("Validation failed")]
pub struct ValidationErrors {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a validation message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    /// Returns true if no messages were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the messages recorded for a field, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Returns the underlying field → messages map.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Converts the collection into a result: `Ok` when empty, `Err(self)`
    /// when any message was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Records an error when a string value is empty or whitespace.
pub fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{field} is required"));
    }
}

/// Records an error when a value does not look like an email address.
///
/// Deliberately loose: the authoritative check is the mail round-trip, this
/// only rejects obvious typos.
pub fn require_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    let looks_valid = value
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && host.contains('.'));
    if !looks_valid {
        errors.add(field, format!("{field} must be a valid email address"));
    }
}

/// Records an error when a numeric value is not strictly positive.
pub fn require_positive(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value <= 0 {
        errors.add(field, format!("{field} must be greater than 0"));
    }
}
