use std::time::Instant;

use super::action_menu::ActionMenu;
use super::navigation::Navigation;
use super::page::{DashboardPage, PAGE_SIZE_OPTIONS};
use super::reconcile::Reconciler;
use super::tabs::{Tab, TabCounts};
use super::toast::{ToastNotification, ToastState};
use crate::models::agreement::Agreement;

pub struct TabView {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

pub struct RowView {
    pub agreement: Agreement,
    pub menu: ActionMenu,
    pub details_path: String,
}

pub struct ConfirmationView {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub confirm_color: String,
    pub cancel_text: String,
}

pub struct PageSizeOption {
    pub value: u32,
    pub selected: bool,
}

pub struct ToastView {
    pub message: String,
    pub severity: String,
    pub remaining_ms: u128,
}

/// Everything the dashboard template needs, computed in one place.
pub struct DashboardView {
    pub tabs: Vec<TabView>,
    pub rows: Vec<RowView>,
    pub total: i64,
    /// 0-based.
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub page_size_options: Vec<PageSizeOption>,
    pub loading: bool,
    pub search: String,
    pub counterparty: String,
    pub confirmation: Option<ConfirmationView>,
    pub toast: Option<ToastView>,
    pub read_error: Option<String>,
    pub create_path: String,
}

impl DashboardView {
    pub(super) fn build(
        page: &DashboardPage,
        reconciler: &Reconciler,
        toast: &ToastNotification,
        now: Instant,
    ) -> Self {
        let counts = reconciler.stats().map(|s| TabCounts::from(&s)).unwrap_or_default();
        let tabs = Tab::ALL
            .iter()
            .map(|tab| TabView {
                index: tab.index(),
                label: format!("{} ({})", tab.label(), tab.count(&counts)),
                active: *tab == page.active_tab(),
            })
            .collect();

        let rows = reconciler
            .agreements()
            .into_iter()
            .map(|a| RowView {
                menu: ActionMenu::new(a.id.clone()),
                details_path: Navigation::AgreementDetails(a.id.clone()).path(),
                agreement: a,
            })
            .collect();

        let total = reconciler.total();
        let page_size = page.page_size().max(1);
        let page_count = ((total.max(0) as u64).div_ceil(page_size as u64)).max(1) as u32;

        let confirmation = page.confirmation().pending().map(|p| ConfirmationView {
            title: p.title().to_string(),
            message: p.message(),
            confirm_text: p.confirm_text().to_string(),
            confirm_color: p.confirm_color().to_string(),
            cancel_text: p.cancel_text().to_string(),
        });

        let toast = match toast.state() {
            ToastState::Visible { message, severity } => Some(ToastView {
                message: message.clone(),
                severity: severity.as_str().to_string(),
                remaining_ms: toast.remaining(now).unwrap_or_default().as_millis(),
            }),
            ToastState::Hidden => None,
        };

        DashboardView {
            tabs,
            rows,
            total,
            page: page.page_index(),
            page_size,
            page_count,
            page_size_options: PAGE_SIZE_OPTIONS
                .iter()
                .map(|&value| PageSizeOption { value, selected: value == page_size })
                .collect(),
            loading: page.actions().loading(),
            search: page.filters().search.clone().unwrap_or_default(),
            counterparty: page.filters().counterparty.clone().unwrap_or_default(),
            confirmation,
            toast,
            read_error: page.read_error().map(|e| e.to_string()),
            create_path: Navigation::CreateAgreement.path(),
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count
    }

    pub fn prev_page(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    pub fn next_page(&self) -> u32 {
        self.page + 1
    }

    /// 1-based page number for display.
    pub fn page_number(&self) -> u32 {
        self.page + 1
    }
}
