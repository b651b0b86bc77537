//! Per-row action menu and the row click it must not trigger.
//!
//! The menu lives inside a clickable table row. Every event the menu handles
//! is marked as stopped so the row's own click handler ignores it.

use crate::api::AgreementAction;

use super::navigation::Navigation;

/// A pointer event travelling from the clicked element up to its ancestors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    propagation_stopped: bool,
}

impl PointerEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// One entry in the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub action: AgreementAction,
    pub label: &'static str,
    /// Icon colour hint for the template.
    pub color: &'static str,
}

pub const MENU_ITEMS: [MenuItem; 2] = [
    MenuItem { action: AgreementAction::Approve, label: "Approve", color: "success" },
    MenuItem { action: AgreementAction::Decline, label: "Decline", color: "error" },
];

/// What the caller receives when an item is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSelection {
    pub action: AgreementAction,
    pub agreement_id: String,
}

#[derive(Debug, Clone)]
pub struct ActionMenu {
    agreement_id: String,
    open: bool,
}

impl ActionMenu {
    pub fn new(agreement_id: impl Into<String>) -> Self {
        Self { agreement_id: agreement_id.into(), open: false }
    }

    pub fn agreement_id(&self) -> &str {
        &self.agreement_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn items(&self) -> &'static [MenuItem] {
        &MENU_ITEMS
    }

    /// DOM id of the popup, unique per row.
    pub fn menu_dom_id(&self) -> String {
        format!("agreement-actions-menu-{}", self.agreement_id)
    }

    /// Trigger button clicked.
    pub fn on_trigger(&mut self, event: &mut PointerEvent) {
        event.stop_propagation();
        self.open = true;
    }

    /// Click-away or escape. Backdrop clicks carry an event; keyboard closes don't.
    pub fn on_dismiss(&mut self, event: Option<&mut PointerEvent>) {
        if let Some(event) = event {
            event.stop_propagation();
        }
        self.open = false;
    }

    /// An item was picked: close and hand the choice to the caller.
    pub fn on_select(&mut self, action: AgreementAction, event: &mut PointerEvent) -> MenuSelection {
        event.stop_propagation();
        self.open = false;
        MenuSelection { action, agreement_id: self.agreement_id.clone() }
    }
}

/// The clickable row hosting a menu.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub agreement_id: String,
}

impl TableRow {
    /// Navigate to details unless a descendant already handled the event.
    pub fn on_click(&self, event: &PointerEvent) -> Option<Navigation> {
        if event.is_propagation_stopped() {
            return None;
        }
        Some(Navigation::AgreementDetails(self.agreement_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_select_never_reach_the_row() {
        let row = TableRow { agreement_id: "agr-100".into() };
        let mut menu = ActionMenu::new("agr-100");

        let mut open_click = PointerEvent::new();
        menu.on_trigger(&mut open_click);
        assert!(menu.is_open());
        assert_eq!(row.on_click(&open_click), None);

        let mut pick = PointerEvent::new();
        let selection = menu.on_select(AgreementAction::Approve, &mut pick);
        assert!(!menu.is_open());
        assert_eq!(row.on_click(&pick), None);
        assert_eq!(
            selection,
            MenuSelection { action: AgreementAction::Approve, agreement_id: "agr-100".into() }
        );
    }

    #[test]
    fn click_away_is_swallowed() {
        let row = TableRow { agreement_id: "agr-7".into() };
        let mut menu = ActionMenu::new("agr-7");
        menu.on_trigger(&mut PointerEvent::new());

        let mut backdrop = PointerEvent::new();
        menu.on_dismiss(Some(&mut backdrop));
        assert!(!menu.is_open());
        assert_eq!(row.on_click(&backdrop), None);

        menu.on_dismiss(None);
        assert!(!menu.is_open());
    }

    #[test]
    fn plain_row_click_navigates() {
        let row = TableRow { agreement_id: "agr-7".into() };
        assert_eq!(
            row.on_click(&PointerEvent::new()),
            Some(Navigation::AgreementDetails("agr-7".into()))
        );
    }
}
