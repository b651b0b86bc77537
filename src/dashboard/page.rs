//! The agreement dashboard page: filters, tabs, pagination, reads, the
//! reconciliation layer and the approve/decline flow.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;

use super::action_menu::{PointerEvent, TableRow};
use super::actions::{ActionError, AgreementActions};
use super::confirmation::{Confirmation, PendingAction};
use super::navigation::Navigation;
use super::reconcile::{Reconciler, Refetched};
use super::tabs::Tab;
use super::toast::{Severity, ToastNotification, ToastState};
use super::view::DashboardView;
use crate::api::{AgreementAction, AgreementApi, ApiError, SnapshotSource};
use crate::models::agreement::{
    Agreement, AgreementFilters, AgreementQuery, DashboardStats, SortField, SortOrder,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [5, 10, 25, 50];
pub const DEFAULT_REFETCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub page_size: u32,
    pub refetch_delay: Duration,
    pub toast_auto_hide: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refetch_delay: DEFAULT_REFETCH_DELAY,
            toast_auto_hide: super::toast::DEFAULT_AUTO_HIDE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTab(pub usize);

impl fmt::Display for InvalidTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No tab with index {}", self.0)
    }
}

/// How a confirmation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    NothingPending,
    Succeeded { action: AgreementAction, agreement_id: String },
    Failed { action: AgreementAction, error: ActionError },
}

pub fn success_message(pending: &PendingAction) -> String {
    match pending.action {
        AgreementAction::Approve => format!("Agreement {} approved successfully!", pending.display_number()),
        AgreementAction::Decline => format!("Agreement {} declined successfully.", pending.display_number()),
    }
}

pub fn failure_message(action: AgreementAction) -> String {
    format!("Failed to {} agreement. Please try again.", action.verb())
}

/// Page state. Reached through a [`DashboardHandle`].
pub struct DashboardPage {
    api: Arc<dyn AgreementApi>,
    snapshot: Option<Arc<dyn SnapshotSource>>,
    actions: AgreementActions,
    settings: DashboardSettings,
    filters: AgreementFilters,
    active_tab: Tab,
    page: u32,
    page_size: u32,
    view: Reconciler,
    confirmation: Confirmation,
    toast: ToastNotification,
    read_error: Option<ApiError>,
    pending_refetch: Option<JoinHandle<()>>,
}

impl DashboardPage {
    pub fn new(
        api: Arc<dyn AgreementApi>,
        snapshot: Option<Arc<dyn SnapshotSource>>,
        settings: DashboardSettings,
    ) -> Self {
        let active_tab = Tab::default();
        Self {
            actions: AgreementActions::new(api.clone()),
            api,
            snapshot,
            filters: active_tab.apply(&AgreementFilters::default()),
            active_tab,
            page: 0,
            page_size: settings.page_size,
            view: Reconciler::new(),
            confirmation: Confirmation::Closed,
            toast: ToastNotification::new(settings.toast_auto_hide),
            read_error: None,
            pending_refetch: None,
            settings,
        }
    }

    // ---------- Accessors ----------

    pub fn filters(&self) -> &AgreementFilters {
        &self.filters
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// 0-based page index.
    pub fn page_index(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn agreements(&self) -> Vec<Agreement> {
        self.view.agreements()
    }

    pub fn stats(&self) -> Option<DashboardStats> {
        self.view.stats()
    }

    pub fn confirmation(&self) -> &Confirmation {
        &self.confirmation
    }

    pub fn toast(&self) -> &ToastState {
        self.toast.state()
    }

    pub fn actions(&self) -> &AgreementActions {
        &self.actions
    }

    pub fn read_error(&self) -> Option<&ApiError> {
        self.read_error.as_ref()
    }

    pub fn has_scheduled_refetch(&self) -> bool {
        self.pending_refetch.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Variables of the "get agreements" read. The wire page is 1-based.
    pub fn query(&self) -> AgreementQuery {
        AgreementQuery {
            filters: self.filters.clone(),
            page: self.page + 1,
            page_size: self.page_size,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }

    // ---------- Synchronous state changes ----------

    pub fn select_tab(&mut self, index: usize) -> Result<Tab, InvalidTab> {
        let tab = Tab::from_index(index).ok_or(InvalidTab(index))?;
        self.active_tab = tab;
        self.page = 0;
        self.filters = tab.apply(&self.filters);
        Ok(tab)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    /// Unknown sizes fall back to the configured default. Resets to page 0.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = if PAGE_SIZE_OPTIONS.contains(&page_size) {
            page_size
        } else {
            self.settings.page_size
        };
        self.page = 0;
    }

    /// Filter panel submit. The status subset belongs to the tabs and is kept.
    pub fn set_search_filters(&mut self, search: Option<String>, counterparty: Option<String>) {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        self.filters = AgreementFilters {
            status: self.filters.status.clone(),
            search: clean(search),
            counterparty: clean(counterparty),
        };
        self.page = 0;
    }

    /// Open the confirmation gate for a row action.
    pub fn request_action(&mut self, action: AgreementAction, agreement_id: &str) {
        let number = self.view.find(agreement_id).map(|a| a.agreement_number.clone());
        self.confirmation = Confirmation::open(action, agreement_id, number);
    }

    pub fn cancel_confirmation(&mut self) {
        self.confirmation = Confirmation::Closed;
    }

    /// User dismissed the toast.
    pub fn close_toast(&mut self) {
        if self.toast.dismiss().is_some() {
            self.toast.clear();
        }
    }

    pub fn row_click(&self, agreement_id: &str, event: &PointerEvent) -> Option<Navigation> {
        TableRow { agreement_id: agreement_id.to_string() }.on_click(event)
    }

    /// Render model at `now`. Expires the toast when its time is up.
    pub fn render(&mut self, now: Instant) -> DashboardView {
        if self.toast.poll(now).is_some() {
            self.toast.clear();
        }
        DashboardView::build(self, &self.view, &self.toast, now)
    }

    // ---------- Reads ----------

    /// Re-issue both reads and land them in the reconciliation layer.
    pub async fn refetch(&mut self) {
        let ticket = self.view.begin_refetch();
        let query = self.query();

        let page = self.api.get_agreements(&query).await;
        let stats = self.api.get_dashboard_stats().await;

        self.read_error = match (&page, &stats) {
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Dashboard read failed, keeping previous data: {e}");
                Some(e.clone())
            }
            _ => None,
        };

        let (snapshot_page, snapshot_stats) = match &self.snapshot {
            Some(source) => (source.agreements_snapshot(), source.stats_snapshot()),
            None => (None, None),
        };

        let outcome = self.view.land(ticket, Refetched {
            page: page.ok(),
            stats: stats.ok(),
            snapshot_page,
            snapshot_stats,
        });
        log::debug!("Dashboard re-fetch landed: {outcome:?}");
    }

    fn cancel_scheduled_refetch(&mut self) {
        if let Some(task) = self.pending_refetch.take() {
            task.abort();
        }
    }
}

impl Drop for DashboardPage {
    fn drop(&mut self) {
        self.cancel_scheduled_refetch();
    }
}

/// Shared, lockable handle to one session's dashboard page.
#[derive(Clone)]
pub struct DashboardHandle {
    inner: Arc<AsyncMutex<DashboardPage>>,
}

impl DashboardHandle {
    pub fn new(page: DashboardPage) -> Self {
        Self { inner: Arc::new(AsyncMutex::new(page)) }
    }

    /// Create the page and issue its first read.
    pub async fn mount(
        api: Arc<dyn AgreementApi>,
        snapshot: Option<Arc<dyn SnapshotSource>>,
        settings: DashboardSettings,
    ) -> Self {
        let handle = Self::new(DashboardPage::new(api, snapshot, settings));
        handle.refresh().await;
        handle
    }

    /// Run a closure against the locked page.
    pub async fn inspect<R>(&self, f: impl FnOnce(&DashboardPage) -> R) -> R {
        let page = self.inner.lock().await;
        f(&page)
    }

    /// Unconditional re-read, also used when the page is shown again.
    pub async fn refresh(&self) {
        self.inner.lock().await.refetch().await;
    }

    pub async fn render(&self, now: Instant) -> DashboardView {
        self.inner.lock().await.render(now)
    }

    pub async fn select_tab(&self, index: usize) -> Result<Tab, InvalidTab> {
        let mut page = self.inner.lock().await;
        let tab = page.select_tab(index)?;
        page.refetch().await;
        Ok(tab)
    }

    pub async fn set_page(&self, page_index: u32) {
        let mut page = self.inner.lock().await;
        page.set_page(page_index);
        page.refetch().await;
    }

    pub async fn set_page_size(&self, page_size: u32) {
        let mut page = self.inner.lock().await;
        page.set_page_size(page_size);
        page.refetch().await;
    }

    pub async fn set_search_filters(&self, search: Option<String>, counterparty: Option<String>) {
        let mut page = self.inner.lock().await;
        page.set_search_filters(search, counterparty);
        page.refetch().await;
    }

    pub async fn request_approve(&self, agreement_id: &str) {
        self.inner.lock().await.request_action(AgreementAction::Approve, agreement_id);
    }

    pub async fn request_decline(&self, agreement_id: &str) {
        self.inner.lock().await.request_action(AgreementAction::Decline, agreement_id);
    }

    pub async fn cancel_confirmation(&self) {
        self.inner.lock().await.cancel_confirmation();
    }

    pub async fn close_toast(&self) {
        self.inner.lock().await.close_toast();
    }

    /// Execute whatever the confirmation gate holds.
    ///
    /// The page stays unlocked while the mutation is in flight so renders can
    /// show the loading state.
    pub async fn confirm_action(&self) -> ConfirmOutcome {
        let (pending, actions, mark) = {
            let mut page = self.inner.lock().await;
            let Some(pending) = page.confirmation.take() else {
                return ConfirmOutcome::NothingPending;
            };
            (pending, page.actions.clone(), page.view.mark())
        };

        let result = actions.run(pending.action, &pending.agreement_id).await;

        let mut page = self.inner.lock().await;
        match result {
            Ok(()) => {
                page.view.apply_since(mark, pending.action, &pending.agreement_id);
                page.toast.show(success_message(&pending), Severity::Success, Instant::now());
                let delay = page.settings.refetch_delay;
                self.schedule_refetch(&mut page, delay);
                ConfirmOutcome::Succeeded {
                    action: pending.action,
                    agreement_id: pending.agreement_id,
                }
            }
            Err(error) => {
                page.toast.show(failure_message(pending.action), Severity::Error, Instant::now());
                page.cancel_scheduled_refetch();
                page.refetch().await;
                ConfirmOutcome::Failed { action: pending.action, error }
            }
        }
    }

    /// Re-fetch after `delay`, replacing any re-fetch already waiting.
    fn schedule_refetch(&self, page: &mut DashboardPage, delay: Duration) {
        let weak: Weak<AsyncMutex<DashboardPage>> = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut page = inner.lock().await;
            page.pending_refetch = None;
            page.refetch().await;
        });
        log::debug!("Re-fetch scheduled in {} ms", delay.as_millis());
        if let Some(previous) = page.pending_refetch.replace(task) {
            previous.abort();
        }
    }
}
