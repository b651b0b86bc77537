use sqlx::PgPool;

use super::types::*;
use crate::api::{AgreementAction, ApiError};

#[derive(sqlx::FromRow)]
struct Row {
    id: String,
    agreement_number: String,
    title: String,
    counterparty: String,
    owner: String,
    status: String,
    value_cents: i64,
    currency: String,
    start_date: String,
    end_date: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<Row> for Agreement {
    type Error = ApiError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(ApiError::Server)?;
        Ok(Agreement {
            id: row.id,
            agreement_number: row.agreement_number,
            title: row.title,
            counterparty: row.counterparty,
            owner: row.owner,
            status,
            value_cents: row.value_cents,
            currency: row.currency,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, agreement_number, title, counterparty, owner, status, \
                                     value_cents, currency, \
                                     start_date::TEXT AS start_date, end_date::TEXT AS end_date, \
                                     to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS created_at, \
                                     to_char(updated_at AT TIME ZONE 'UTC', 'YYYY-MM-DD\"T\"HH24:MI:SS\"Z\"') AS updated_at \
                              FROM agreements";

// Shared WHERE clause: $1 statuses (NULL = any), $2 search pattern, $3 counterparty pattern.
const FILTER_CLAUSE: &str = " WHERE ($1::TEXT[] IS NULL OR status = ANY($1)) \
                                AND ($2::TEXT IS NULL OR agreement_number ILIKE $2 OR title ILIKE $2 OR counterparty ILIKE $2) \
                                AND ($3::TEXT IS NULL OR counterparty ILIKE $3)";

fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

/// One page of agreements matching the query, plus the total match count.
pub async fn find_page(pool: &PgPool, query: &AgreementQuery) -> Result<AgreementPage, ApiError> {
    let statuses: Option<Vec<String>> = query
        .filters
        .status
        .as_ref()
        .map(|s| s.iter().map(|st| st.as_str().to_string()).collect());
    let search = like_pattern(query.filters.search.as_deref());
    let counterparty = like_pattern(query.filters.counterparty.as_deref());

    let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM agreements{FILTER_CLAUSE}"))
        .bind(&statuses)
        .bind(&search)
        .bind(&counterparty)
        .fetch_one(pool)
        .await?;

    let sql = format!(
        "{SELECT_COLUMNS}{FILTER_CLAUSE} ORDER BY {} {}, id LIMIT $4 OFFSET $5",
        query.sort_by.column(),
        query.sort_order.as_sql(),
    );
    let rows = sqlx::query_as::<_, Row>(&sql)
        .bind(&statuses)
        .bind(&search)
        .bind(&counterparty)
        .bind(query.page_size as i64)
        .bind(query.offset() as i64)
        .fetch_all(pool)
        .await?;

    let data = rows.into_iter().map(Agreement::try_from).collect::<Result<Vec<_>, _>>()?;
    Ok(AgreementPage { data, total })
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Agreement>, ApiError> {
    let row = sqlx::query_as::<_, Row>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Agreement::try_from).transpose()
}

/// Counts per status bucket.
pub async fn stats(pool: &PgPool) -> Result<DashboardStats, ApiError> {
    let (total, active, pending, draft, expired, terminated): (i64, i64, i64, i64, i64, i64) =
        sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'ACTIVE'), \
                    COUNT(*) FILTER (WHERE status = 'PENDING_APPROVAL'), \
                    COUNT(*) FILTER (WHERE status = 'DRAFT'), \
                    COUNT(*) FILTER (WHERE status = 'EXPIRED'), \
                    COUNT(*) FILTER (WHERE status = 'TERMINATED') \
             FROM agreements",
        )
        .fetch_one(pool)
        .await?;

    Ok(DashboardStats {
        total_agreements: total,
        active_agreements: active,
        pending_approval_agreements: pending,
        draft_agreements: draft,
        expired_agreements: expired,
        terminated_agreements: terminated,
    })
}

/// Insert a fully-formed agreement (used by seeding and creation).
pub async fn insert(pool: &PgPool, a: &Agreement) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO agreements (id, agreement_number, title, counterparty, owner, status, \
                                 value_cents, currency, start_date, end_date, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::DATE, $10::DATE, $11::TIMESTAMPTZ, $12::TIMESTAMPTZ)",
    )
    .bind(&a.id)
    .bind(&a.agreement_number)
    .bind(&a.title)
    .bind(&a.counterparty)
    .bind(&a.owner)
    .bind(a.status.as_str())
    .bind(a.value_cents)
    .bind(&a.currency)
    .bind(&a.start_date)
    .bind(&a.end_date)
    .bind(&a.created_at)
    .bind(&a.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Create a DRAFT agreement with the next sequential number.
pub async fn create(pool: &PgPool, new: &NewAgreement) -> Result<Agreement, ApiError> {
    let errors = new.validate();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let numbers: Vec<(String,)> = sqlx::query_as("SELECT agreement_number FROM agreements")
        .fetch_all(pool)
        .await?;
    let now = super::now_rfc3339();
    let agreement = Agreement {
        id: super::generate_id(),
        agreement_number: super::next_agreement_number(numbers.iter().map(|(n,)| n.as_str())),
        title: new.title.trim().to_string(),
        counterparty: new.counterparty.trim().to_string(),
        owner: new.owner.trim().to_string(),
        status: AgreementStatus::Draft,
        value_cents: new.value_cents,
        currency: new.currency.trim().to_uppercase(),
        start_date: new.start_date.clone(),
        end_date: new.end_date.clone(),
        created_at: now.clone(),
        updated_at: now,
    };
    insert(pool, &agreement).await?;
    Ok(agreement)
}

/// Apply an approve/decline transition. Only PENDING_APPROVAL rows move.
pub async fn apply_action(pool: &PgPool, id: &str, action: AgreementAction) -> Result<(), ApiError> {
    let updated = sqlx::query(
        "UPDATE agreements SET status = $2, updated_at = NOW() \
         WHERE id = $1 AND status = 'PENDING_APPROVAL'",
    )
    .bind(id)
    .bind(action.target_status().as_str())
    .execute(pool)
    .await?;

    if updated.rows_affected() == 1 {
        return Ok(());
    }

    // Nothing moved: distinguish a missing row from a wrong source status.
    match find_by_id(pool, id).await? {
        None => Err(ApiError::NotFound(id.to_string())),
        Some(existing) => Err(ApiError::InvalidTransition {
            id: id.to_string(),
            from: existing.status,
            action,
        }),
    }
}

pub async fn count(pool: &PgPool) -> Result<i64, ApiError> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agreements").fetch_one(pool).await?;
    Ok(n)
}
