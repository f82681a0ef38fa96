use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gate::ConfirmationGate;
use super::step::WizardStep;

/// Mutable state of one tree-building session.
///
/// Person ids are references into the store, not owned records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier, used for log correlation.
    pub session_id: String,
    pub self_person_id: Option<String>,
    pub self_display_name: Option<String>,
    pub mother_id: Option<String>,
    pub father_id: Option<String>,
    /// Spouse committed in this session.
    ///
    /// Recorded for the session snapshot only. Co-parent lookups for children
    /// read spouses from the store, which also covers spouses recorded by
    /// earlier sessions.
    pub spouse_id: Option<String>,
    pub current_step: WizardStep,
    /// Pending confirmation slot.
    pub gate: ConfirmationGate,
}

impl SessionState {
    /// Create a fresh session at [`WizardStep::SelectSelf`]
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            self_person_id: None,
            self_display_name: None,
            mother_id: None,
            father_id: None,
            spouse_id: None,
            current_step: WizardStep::SelectSelf,
            gate: ConfirmationGate::new(),
        }
    }

    /// Whether the next input answers a pending confirmation.
    pub fn awaiting_confirmation(&self) -> bool {
        self.gate.is_awaiting()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
