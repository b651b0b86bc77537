use askama::Template;
use serde::Deserialize;

use super::PageContext;
use crate::models::agreement::{Agreement, NewAgreement};

#[derive(Template)]
#[template(path = "agreements/detail.html")]
pub struct AgreementDetailTemplate {
    pub ctx: PageContext,
    pub agreement: Agreement,
}

#[derive(Template)]
#[template(path = "agreements/form.html")]
pub struct AgreementFormTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub form: AgreementFormValues,
}

/// Raw form input, echoed back on validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgreementFormValues {
    pub title: String,
    pub counterparty: String,
    pub owner: String,
    /// Decimal amount as typed, e.g. "1250.50".
    pub value: String,
    pub currency: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl AgreementFormValues {
    /// Convert to a creation request; the amount must be a decimal with at most two places.
    pub fn to_new_agreement(&self) -> Result<NewAgreement, String> {
        let value_cents = parse_amount(&self.value)
            .ok_or_else(|| format!("Value '{}' is not a valid amount", self.value.trim()))?;
        Ok(NewAgreement {
            title: self.title.clone(),
            counterparty: self.counterparty.clone(),
            owner: self.owner.clone(),
            value_cents,
            currency: if self.currency.trim().is_empty() { "EUR".to_string() } else { self.currency.clone() },
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
        })
    }
}

fn parse_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim().replace(',', "");
    if raw.is_empty() {
        return Some(0);
    }
    let (units, frac) = match raw.split_once('.') {
        Some((u, f)) => (u, f),
        None => (raw.as_str(), ""),
    };
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let units: i64 = units.parse().ok()?;
    let frac_cents: i64 = format!("{frac:0<2}").parse().ok()?;
    units.checked_mul(100)?.checked_add(frac_cents)
}

#[cfg(test)]
mod tests {
    use super::parse_amount;

    #[test]
    fn amounts_parse_to_cents() {
        assert_eq!(parse_amount("1,250.5"), Some(125_050));
        assert_eq!(parse_amount("42"), Some(4_200));
        assert_eq!(parse_amount(""), Some(0));
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("ten"), None);
    }
}
