use crate::api::AgreementAction;

/// An action waiting for the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub action: AgreementAction,
    pub agreement_id: String,
    /// Display number, when the agreement was found in the current view.
    pub agreement_number: Option<String>,
}

impl PendingAction {
    /// Number to show the user, falling back to the raw id.
    pub fn display_number(&self) -> &str {
        self.agreement_number.as_deref().unwrap_or(&self.agreement_id)
    }

    pub fn title(&self) -> &'static str {
        match self.action {
            AgreementAction::Approve => "Approve Agreement",
            AgreementAction::Decline => "Decline Agreement",
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Are you sure you want to {} agreement {}? This will change its status to {}.",
            self.action.verb(),
            self.display_number(),
            self.action.target_status(),
        )
    }

    pub fn confirm_text(&self) -> &'static str {
        match self.action {
            AgreementAction::Approve => "Approve",
            AgreementAction::Decline => "Decline",
        }
    }

    pub fn confirm_color(&self) -> &'static str {
        match self.action {
            AgreementAction::Approve => "success",
            AgreementAction::Decline => "error",
        }
    }

    pub fn cancel_text(&self) -> &'static str {
        "Cancel"
    }
}

/// Confirmation gate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Confirmation {
    #[default]
    Closed,
    Pending(PendingAction),
}

impl Confirmation {
    pub fn open(action: AgreementAction, agreement_id: impl Into<String>, agreement_number: Option<String>) -> Self {
        Confirmation::Pending(PendingAction {
            action,
            agreement_id: agreement_id.into(),
            agreement_number,
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Confirmation::Pending(_))
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match self {
            Confirmation::Pending(p) => Some(p),
            Confirmation::Closed => None,
        }
    }

    /// Close the gate, returning what was pending. An entry without an id
    /// never proceeds.
    pub fn take(&mut self) -> Option<PendingAction> {
        match std::mem::take(self) {
            Confirmation::Pending(p) if !p.agreement_id.is_empty() => Some(p),
            _ => None,
        }
    }
}
