pub mod queries;
pub mod types;

pub use queries::*;
pub use types::*;

pub const AGREEMENT_SEED: &str = include_str!("../../../data/seed/agreements.json");

/// Parse the bundled demo agreements.
pub fn seed_agreements() -> Result<Vec<Agreement>, serde_json::Error> {
    serde_json::from_str(AGREEMENT_SEED)
}

/// Random identifier for a newly created agreement.
pub fn generate_id() -> String {
    use rand::Rng;
    let bytes: [u8; 8] = rand::rng().random();
    format!("agr-{}", hex::encode(bytes))
}

/// Next sequential agreement number after the highest existing one.
pub fn next_agreement_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|n| n.strip_prefix("AGR-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(99);
    format!("AGR-{}", max + 1)
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
