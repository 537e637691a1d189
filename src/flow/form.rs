//! Compose form state

use crate::types::{Attachment, BugReport};

/// Fields collected by the compose view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeForm {
    /// Bug description
    pub description: String,
    /// Expected behavior
    pub expected_behavior: String,
    /// Optional attachment
    pub attachment: Option<Attachment>,
}

impl ComposeForm {
    /// Both required fields have content
    pub fn is_complete(&self) -> bool {
        !self.description.trim().is_empty() && !self.expected_behavior.trim().is_empty()
    }

    /// Snapshot the form as a report
    pub fn to_report(&self) -> BugReport {
        BugReport {
            description: self.description.clone(),
            expected_behavior: self.expected_behavior.clone(),
            attachment: self.attachment.clone(),
        }
    }

    /// Reset every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
