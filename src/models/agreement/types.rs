use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------- Status ----------

/// Lifecycle status of an agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementStatus {
    Draft,
    PendingApproval,
    Active,
    Expired,
    Terminated,
}

impl AgreementStatus {
    pub const ALL: [AgreementStatus; 5] = [
        AgreementStatus::Draft,
        AgreementStatus::PendingApproval,
        AgreementStatus::Active,
        AgreementStatus::Expired,
        AgreementStatus::Terminated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementStatus::Draft => "DRAFT",
            AgreementStatus::PendingApproval => "PENDING_APPROVAL",
            AgreementStatus::Active => "ACTIVE",
            AgreementStatus::Expired => "EXPIRED",
            AgreementStatus::Terminated => "TERMINATED",
        }
    }

    /// Human label used in badges.
    pub fn label(&self) -> &'static str {
        match self {
            AgreementStatus::Draft => "Draft",
            AgreementStatus::PendingApproval => "Pending approval",
            AgreementStatus::Active => "Active",
            AgreementStatus::Expired => "Expired",
            AgreementStatus::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for AgreementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgreementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgreementStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown agreement status: {s}"))
    }
}

// ---------- Records ----------

/// An agreement as returned by the agreement API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agreement {
    pub id: String,
    pub agreement_number: String,
    pub title: String,
    pub counterparty: String,
    pub owner: String,
    pub status: AgreementStatus,
    pub value_cents: i64,
    pub currency: String,
    pub start_date: String,      // YYYY-MM-DD
    pub end_date: String,        // YYYY-MM-DD
    pub created_at: String,      // RFC 3339
    pub updated_at: String,      // RFC 3339
}

impl Agreement {
    /// Value formatted for the table, e.g. "12,500.00 EUR".
    pub fn display_value(&self) -> String {
        let units = self.value_cents / 100;
        let cents = (self.value_cents % 100).abs();
        let digits = units.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let sign = if self.value_cents < 0 { "-" } else { "" };
        format!("{sign}{grouped}.{cents:02} {}", self.currency)
    }
}

/// Form input for creating a draft agreement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAgreement {
    pub title: String,
    pub counterparty: String,
    pub owner: String,
    pub value_cents: i64,
    pub currency: String,
    pub start_date: String,
    pub end_date: String,
}

impl NewAgreement {
    /// Returns a list of validation messages; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        if self.counterparty.trim().is_empty() {
            errors.push("Counterparty is required".to_string());
        }
        if self.value_cents < 0 {
            errors.push("Value cannot be negative".to_string());
        }
        let start = chrono::NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d");
        let end = chrono::NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d");
        match (start, end) {
            (Ok(s), Ok(e)) if e < s => errors.push("End date must not precede start date".to_string()),
            (Ok(_), Ok(_)) => {}
            _ => errors.push("Dates must be formatted YYYY-MM-DD".to_string()),
        }
        errors
    }
}

// ---------- Stats ----------

/// Aggregate counts per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_agreements: i64,
    pub active_agreements: i64,
    pub pending_approval_agreements: i64,
    pub draft_agreements: i64,
    pub expired_agreements: i64,
    pub terminated_agreements: i64,
}

impl DashboardStats {
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a AgreementStatus>) -> Self {
        let mut stats = DashboardStats::default();
        for status in statuses {
            stats.total_agreements += 1;
            match status {
                AgreementStatus::Draft => stats.draft_agreements += 1,
                AgreementStatus::PendingApproval => stats.pending_approval_agreements += 1,
                AgreementStatus::Active => stats.active_agreements += 1,
                AgreementStatus::Expired => stats.expired_agreements += 1,
                AgreementStatus::Terminated => stats.terminated_agreements += 1,
            }
        }
        stats
    }
}

// ---------- Query parameters ----------

/// Filters applied to the agreement list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementFilters {
    /// `None` means every status.
    pub status: Option<Vec<AgreementStatus>>,
    pub search: Option<String>,
    pub counterparty: Option<String>,
}

impl AgreementFilters {
    pub fn matches(&self, agreement: &Agreement) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&agreement.status) {
                return false;
            }
        }
        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let hit = [&agreement.agreement_number, &agreement.title, &agreement.counterparty]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(cp) = self.counterparty.as_deref().map(str::to_lowercase) {
            if !agreement.counterparty.to_lowercase().contains(&cp) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    AgreementNumber,
    Title,
    EndDate,
}

impl SortField {
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "createdAt" => Some(SortField::CreatedAt),
            "agreementNumber" => Some(SortField::AgreementNumber),
            "title" => Some(SortField::Title),
            "endDate" => Some(SortField::EndDate),
            _ => None,
        }
    }

    /// Column name; only these values are ever interpolated into SQL.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::AgreementNumber => "agreement_number",
            SortField::Title => "title",
            SortField::EndDate => "end_date",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Parameters of a "get agreements" read. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementQuery {
    pub filters: AgreementFilters,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl AgreementQuery {
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.page_size as usize
    }
}

/// One page of agreements plus the total matching count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgreementPage {
    pub data: Vec<Agreement>,
    pub total: i64,
}
