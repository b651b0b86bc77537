//! Merges what the server said with what we expect it to say next.
//!
//! The query result is authoritative. The auxiliary snapshot only stands in
//! when no query result has landed. Optimistic patches sit on top of both and
//! are dropped once a re-fetch issued after them lands, because that
//! re-fetch already reflects the mutation.

use crate::api::AgreementAction;
use crate::models::agreement::{Agreement, AgreementPage, DashboardStats};

pub type OperationId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimisticPatch {
    pub op: OperationId,
    pub agreement_id: String,
    pub action: AgreementAction,
    /// Highest re-fetch sequence issued when the patch was applied.
    watermark: u64,
}

impl OptimisticPatch {
    fn apply_to_stats(&self, stats: &mut DashboardStats) {
        stats.pending_approval_agreements = (stats.pending_approval_agreements - 1).max(0);
        match self.action {
            AgreementAction::Approve => stats.active_agreements += 1,
            AgreementAction::Decline => stats.expired_agreements += 1,
        }
    }
}

/// Handed out when a re-fetch starts; presented again when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RefetchTicket {
    seq: u64,
}

/// Re-fetch sequence observed when a mutation started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefetchMark {
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandOutcome {
    /// Newer than anything seen; applied.
    Applied { discarded_patches: usize },
    /// A later re-fetch already landed; ignored.
    Stale,
}

/// Result of one re-fetch round trip.
#[derive(Debug, Clone, Default)]
pub struct Refetched {
    pub page: Option<AgreementPage>,
    pub stats: Option<DashboardStats>,
    pub snapshot_page: Option<AgreementPage>,
    pub snapshot_stats: Option<DashboardStats>,
}

impl Refetched {
    fn authoritative(&self) -> bool {
        self.page.is_some() && self.stats.is_some()
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    query: Option<AgreementPage>,
    query_stats: Option<DashboardStats>,
    snapshot: Option<AgreementPage>,
    snapshot_stats: Option<DashboardStats>,
    patches: Vec<OptimisticPatch>,
    next_op: OperationId,
    issued: u64,
    landed: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refetch(&mut self) -> RefetchTicket {
        self.issued += 1;
        RefetchTicket { seq: self.issued }
    }

    pub fn land(&mut self, ticket: RefetchTicket, result: Refetched) -> LandOutcome {
        if ticket.seq <= self.landed {
            log::debug!("Dropping stale re-fetch #{} (already at #{})", ticket.seq, self.landed);
            return LandOutcome::Stale;
        }
        self.landed = ticket.seq;

        let authoritative = result.authoritative();
        if let Some(page) = result.page {
            self.query = Some(page);
        }
        if let Some(stats) = result.stats {
            self.query_stats = Some(stats);
        }
        if result.snapshot_page.is_some() {
            self.snapshot = result.snapshot_page;
        }
        if result.snapshot_stats.is_some() {
            self.snapshot_stats = result.snapshot_stats;
        }

        let mut discarded_patches = 0;
        if authoritative {
            let before = self.patches.len();
            self.patches.retain(|p| p.watermark >= ticket.seq);
            discarded_patches = before - self.patches.len();
        }
        LandOutcome::Applied { discarded_patches }
    }

    /// Taken before a mutation is sent; see [`Reconciler::apply_since`].
    pub fn mark(&self) -> RefetchMark {
        RefetchMark { seq: self.issued }
    }

    /// Record an optimistic edit for a mutation the server accepted.
    pub fn apply(&mut self, action: AgreementAction, agreement_id: impl Into<String>) -> OperationId {
        self.next_op += 1;
        self.patches.push(OptimisticPatch {
            op: self.next_op,
            agreement_id: agreement_id.into(),
            action,
            watermark: self.issued,
        });
        self.next_op
    }

    /// Like [`Reconciler::apply`], for a mutation that started at `mark`.
    ///
    /// Returns `None` without patching when a re-fetch issued after `mark`
    /// has already landed without the row: that read already shows the
    /// mutation, and patching again would count it twice.
    pub fn apply_since(
        &mut self,
        mark: RefetchMark,
        action: AgreementAction,
        agreement_id: impl Into<String>,
    ) -> Option<OperationId> {
        let agreement_id = agreement_id.into();
        if self.landed > mark.seq && self.find(&agreement_id).is_none() {
            log::debug!("Re-fetch #{} already reflects {action} of {agreement_id}", self.landed);
            return None;
        }
        Some(self.apply(action, agreement_id))
    }

    pub fn patches(&self) -> &[OptimisticPatch] {
        &self.patches
    }

    fn base_page(&self) -> Option<&AgreementPage> {
        self.query.as_ref().or(self.snapshot.as_ref())
    }

    fn is_patched(&self, id: &str) -> bool {
        self.patches.iter().any(|p| p.agreement_id == id)
    }

    /// Rows to render.
    pub fn agreements(&self) -> Vec<Agreement> {
        self.base_page()
            .map(|page| {
                page.data
                    .iter()
                    .filter(|a| !self.is_patched(&a.id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find(&self, agreement_id: &str) -> Option<&Agreement> {
        self.base_page()?.data.iter().find(|a| a.id == agreement_id)
    }

    /// Total matches, less rows patched out of the current page.
    pub fn total(&self) -> i64 {
        let Some(page) = self.base_page() else {
            return 0;
        };
        let hidden = page.data.iter().filter(|a| self.is_patched(&a.id)).count() as i64;
        (page.total - hidden).max(0)
    }

    /// Stats with every live patch applied; `None` until some stats arrived.
    pub fn stats(&self) -> Option<DashboardStats> {
        let mut stats = self.query_stats.or(self.snapshot_stats)?;
        for patch in &self.patches {
            patch.apply_to_stats(&mut stats);
        }
        Some(stats)
    }

    pub fn has_data(&self) -> bool {
        self.base_page().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agreement::AgreementStatus;

    fn agreement(id: &str, status: AgreementStatus) -> Agreement {
        Agreement {
            id: id.into(),
            agreement_number: id.to_uppercase(),
            title: "t".into(),
            counterparty: "c".into(),
            owner: "o".into(),
            status,
            value_cents: 0,
            currency: "EUR".into(),
            start_date: "2026-01-01".into(),
            end_date: "2026-12-31".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    fn landed(r: &mut Reconciler, ids: &[&str], pending: i64) {
        let ticket = r.begin_refetch();
        let data: Vec<_> = ids.iter().map(|id| agreement(id, AgreementStatus::PendingApproval)).collect();
        let total = data.len() as i64;
        r.land(ticket, Refetched {
            page: Some(AgreementPage { data, total }),
            stats: Some(DashboardStats {
                total_agreements: pending,
                pending_approval_agreements: pending,
                ..DashboardStats::default()
            }),
            ..Refetched::default()
        });
    }

    #[test]
    fn snapshot_only_fills_the_gap() {
        let mut r = Reconciler::new();
        let ticket = r.begin_refetch();
        r.land(ticket, Refetched {
            snapshot_page: Some(AgreementPage { data: vec![agreement("s", AgreementStatus::Draft)], total: 1 }),
            ..Refetched::default()
        });
        assert_eq!(r.agreements()[0].id, "s");

        landed(&mut r, &["q"], 1);
        assert_eq!(r.agreements()[0].id, "q");
    }

    #[test]
    fn patch_survives_refetch_issued_before_it() {
        let mut r = Reconciler::new();
        landed(&mut r, &["a", "b"], 2);

        let early = r.begin_refetch();
        r.apply(AgreementAction::Approve, "a");
        // The early re-fetch may have been served before the mutation landed.
        let outcome = r.land(early, Refetched {
            page: Some(AgreementPage {
                data: vec![agreement("a", AgreementStatus::PendingApproval), agreement("b", AgreementStatus::PendingApproval)],
                total: 2,
            }),
            stats: Some(DashboardStats { total_agreements: 2, pending_approval_agreements: 2, ..Default::default() }),
            ..Refetched::default()
        });
        assert_eq!(outcome, LandOutcome::Applied { discarded_patches: 0 });
        assert_eq!(r.agreements().len(), 1);

        landed(&mut r, &["b"], 1);
        assert!(r.patches().is_empty());
        assert_eq!(r.stats().map(|s| s.pending_approval_agreements), Some(1));
    }

    #[test]
    fn stale_landing_is_ignored() {
        let mut r = Reconciler::new();
        let first = r.begin_refetch();
        let second = r.begin_refetch();
        r.land(second, Refetched {
            page: Some(AgreementPage { data: vec![agreement("new", AgreementStatus::Active)], total: 1 }),
            stats: Some(DashboardStats::default()),
            ..Refetched::default()
        });
        assert_eq!(r.land(first, Refetched::default()), LandOutcome::Stale);
        assert_eq!(r.agreements()[0].id, "new");
    }

    #[test]
    fn failed_read_keeps_patches_and_stale_rows() {
        let mut r = Reconciler::new();
        landed(&mut r, &["a", "b"], 2);
        r.apply(AgreementAction::Decline, "a");

        let ticket = r.begin_refetch();
        r.land(ticket, Refetched::default());
        assert_eq!(r.patches().len(), 1);
        assert_eq!(r.total(), 1);
        assert_eq!(r.stats().map(|s| s.expired_agreements), Some(1));
    }

    #[test]
    fn stats_patch_floors_pending_at_zero() {
        let mut r = Reconciler::new();
        let ticket = r.begin_refetch();
        r.land(ticket, Refetched {
            page: Some(AgreementPage { data: vec![agreement("a", AgreementStatus::Active)], total: 1 }),
            stats: Some(DashboardStats {
                total_agreements: 2,
                active_agreements: 1,
                expired_agreements: 1,
                pending_approval_agreements: 0,
                ..DashboardStats::default()
            }),
            ..Refetched::default()
        });

        r.apply(AgreementAction::Approve, "x");
        r.apply(AgreementAction::Decline, "y");
        let stats = r.stats().expect("stats");
        assert_eq!(stats.pending_approval_agreements, 0);
        assert_eq!(stats.active_agreements, 2);
        assert_eq!(stats.expired_agreements, 2);
    }

    #[test]
    fn mutation_already_visible_in_newer_read_is_not_counted_twice() {
        let mut r = Reconciler::new();
        landed(&mut r, &["a", "b"], 2);
        let mark = r.mark();

        // Another request re-read while the approve was in flight and saw it.
        landed(&mut r, &["b"], 1);

        assert_eq!(r.apply_since(mark, AgreementAction::Approve, "a"), None);
        assert!(r.patches().is_empty());
        assert_eq!(r.stats().map(|s| s.pending_approval_agreements), Some(1));
        assert_eq!(r.total(), 1);
    }

    #[test]
    fn newer_read_served_before_the_commit_still_gets_the_patch() {
        let mut r = Reconciler::new();
        landed(&mut r, &["a", "b"], 2);
        let mark = r.mark();

        // Re-read landed during the mutation but predates the commit.
        landed(&mut r, &["a", "b"], 2);

        assert!(r.apply_since(mark, AgreementAction::Approve, "a").is_some());
        assert_eq!(r.agreements().len(), 1);
        assert_eq!(r.stats().map(|s| s.pending_approval_agreements), Some(1));

        // The read after the patch drops it.
        landed(&mut r, &["b"], 1);
        assert!(r.patches().is_empty());
    }
}
