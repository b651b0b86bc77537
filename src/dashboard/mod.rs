//! Server-side state of the agreement dashboard, one page per browser session.

pub mod action_menu;
pub mod actions;
pub mod confirmation;
pub mod navigation;
pub mod page;
pub mod reconcile;
pub mod registry;
pub mod tabs;
pub mod toast;
pub mod view;

pub use actions::{ActionError, AgreementActions};
pub use page::{ConfirmOutcome, DashboardHandle, DashboardPage, DashboardSettings};
pub use registry::DashboardRegistry;
pub use tabs::Tab;
