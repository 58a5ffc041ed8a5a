//! Post-mutation navigation handed to the notification layer

use crate::api::EntityKind;

/// Why the user is being sent back to a list screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessReason {
    Created,
    Updated,
    Deleted,
}

impl SuccessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessReason::Created => "created",
            SuccessReason::Updated => "updated",
            SuccessReason::Deleted => "deleted",
        }
    }
}

/// Redirect to an entity list carrying a success reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub target: EntityKind,
    pub reason: SuccessReason,
}

impl Navigation {
    pub fn to_list(target: EntityKind, reason: SuccessReason) -> Self {
        Self { target, reason }
    }

    /// Route in the form the web dashboard used, e.g. `/admin/travel?success=created`
    pub fn route(&self) -> String {
        format!("/admin/{}?success={}", self.target.as_str(), self.reason.as_str())
    }

    /// Toast text for the status bar
    pub fn toast(&self) -> String {
        format!("{} {} successfully", self.target.label(), self.reason.as_str())
    }
}
