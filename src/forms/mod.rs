//! Entity forms: candidate values, validation and the submission lifecycle

pub mod controller;
pub mod driver;
pub mod travel;
pub mod validation;

use std::collections::BTreeMap;

pub use controller::{EntityForm, FormController, FormPhase, Settled, SubmitOutcome, SubmitStart, Submission};
pub use driver::DriverForm;
pub use travel::TravelForm;
pub use validation::{Rule, RuleSet, ValidationErrors};

/// Whether a form creates a new entity or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

impl FormMode {
    pub fn is_create(&self) -> bool {
        matches!(self, FormMode::Create)
    }

    pub fn entity_id(&self) -> Option<u64> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(*id),
        }
    }

    /// Verb used in messages about this form's mutation
    pub fn operation(&self) -> &'static str {
        match self {
            FormMode::Create => "create",
            FormMode::Edit(_) => "update",
        }
    }
}

/// Current string value of every form field
///
/// Inputs stay controlled: an absent field reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// True when the field holds something other than whitespace
    pub fn is_supplied(&self, field: &str) -> bool {
        !self.get(field).trim().is_empty()
    }

    /// Trimmed value, or `None` when blank
    pub fn non_blank(&self, field: &str) -> Option<String> {
        let value = self.get(field).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_empty() {
        let values: FormValues = [("title", "Bali Trip"), ("city_from", "  ")].into_iter().collect();
        assert_eq!(values.get("title"), "Bali Trip");
        assert_eq!(values.get("description"), "");
        assert!(!values.is_supplied("city_from"));
        assert_eq!(values.non_blank("city_from"), None);
        assert_eq!(values.non_blank("title"), Some("Bali Trip".to_string()));
    }

    #[test]
    fn test_mode_operation() {
        assert_eq!(FormMode::Create.operation(), "create");
        assert_eq!(FormMode::Edit(4).operation(), "update");
        assert_eq!(FormMode::Edit(4).entity_id(), Some(4));
    }
}
