use serde::{Deserialize, Serialize};

use crate::models::agreement::{AgreementFilters, AgreementStatus, DashboardStats};

/// Status presets shown as tabs above the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Pending,
    Active,
    Drafts,
    Deleted,
    All,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Pending, Tab::Active, Tab::Drafts, Tab::Deleted, Tab::All];

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Pending => 0,
            Tab::Active => 1,
            Tab::Drafts => 2,
            Tab::Deleted => 3,
            Tab::All => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Pending => "Pending",
            Tab::Active => "Active",
            Tab::Drafts => "Drafts",
            Tab::Deleted => "Deleted",
            Tab::All => "All",
        }
    }

    /// Status subset this tab filters on; `None` means no status filter.
    pub fn status_filter(&self) -> Option<Vec<AgreementStatus>> {
        match self {
            Tab::Pending => Some(vec![AgreementStatus::PendingApproval]),
            Tab::Active => Some(vec![AgreementStatus::Active]),
            Tab::Drafts => Some(vec![AgreementStatus::Draft]),
            Tab::Deleted => Some(vec![AgreementStatus::Expired, AgreementStatus::Terminated]),
            Tab::All => None,
        }
    }

    /// Replace the status filter, keeping every other filter field.
    pub fn apply(&self, filters: &AgreementFilters) -> AgreementFilters {
        AgreementFilters { status: self.status_filter(), ..filters.clone() }
    }

    pub fn count(&self, counts: &TabCounts) -> i64 {
        match self {
            Tab::Pending => counts.pending,
            Tab::Active => counts.active,
            Tab::Drafts => counts.draft,
            Tab::Deleted => counts.deleted,
            Tab::All => counts.all,
        }
    }
}

/// Badge counts for the tab strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabCounts {
    pub all: i64,
    pub active: i64,
    pub pending: i64,
    pub draft: i64,
    pub deleted: i64,
}

impl From<&DashboardStats> for TabCounts {
    fn from(s: &DashboardStats) -> Self {
        TabCounts {
            all: s.total_agreements,
            active: s.active_agreements,
            pending: s.pending_approval_agreements,
            draft: s.draft_agreements,
            deleted: s.expired_agreements + s.terminated_agreements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrips_and_rejects_out_of_range() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_index(tab.index()), Some(tab));
        }
        assert_eq!(Tab::from_index(5), None);
    }

    #[test]
    fn deleted_count_sums_expired_and_terminated() {
        let stats = DashboardStats {
            total_agreements: 10,
            expired_agreements: 2,
            terminated_agreements: 3,
            ..DashboardStats::default()
        };
        let counts = TabCounts::from(&stats);
        assert_eq!(Tab::Deleted.count(&counts), 5);
        assert_eq!(Tab::All.count(&counts), 10);
    }
}
