//! Builders of notification personalization fields.

use chrono::{DateTime, Utc};
use contract_models::{
    Contract, FundingClaim, Personalization, PERSONALIZATION_DATE_FORMAT,
};

/// A conditionally required field was absent from the fetched entity.
#[derive(Debug, thiserror::Error)]
#[error("{field} value is not avaialble.")]
pub struct MissingValue {
    pub field: &'static str,
}

/// Unwrap a field which the selected template requires.
pub fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MissingValue> {
    value.ok_or(MissingValue { field })
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(PERSONALIZATION_DATE_FORMAT).to_string()
}

/// Fields common to every contract notification.
pub fn contract_fields(contract: &Contract) -> Personalization {
    fields([
        ("contract_title", contract.title.clone().into()),
        ("contract_number", contract.contract_number.clone().into()),
        ("contract_version", contract.contract_version.into()),
        ("document_type", contract.document_type().into()),
        ("ukprn", contract.ukprn.into()),
    ])
}

/// Fields common to every funding claim notification.
pub fn funding_claim_fields(claim: &FundingClaim) -> Personalization {
    fields([
        ("funding_claim_title", claim.title.clone().into()),
        ("period", claim.funding_stream_period_code.clone().into()),
        ("ukprn", claim.ukprn.into()),
    ])
}

pub fn fields<const N: usize>(entries: [(&str, serde_json::Value); N]) -> Personalization {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dates_render_without_padding() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(format_date(&date), "5 March 2024");
    }

    #[test]
    fn test_required_names_the_missing_field() {
        let missing: Option<DateTime<Utc>> = None;
        assert_eq!(
            required(missing, "SignedOn").unwrap_err().to_string(),
            "SignedOn value is not avaialble."
        );
        assert_eq!(required(Some(3), "SignedOn").unwrap(), 3);
    }

    #[test]
    fn test_contract_fields() {
        let contract: Contract = serde_json::from_value(serde_json::json!({
            "id": 12,
            "contractNumber": "LEVY-0002",
            "contractVersion": 3,
            "ukprn": 10001234,
            "title": "Apprenticeship agreement",
            "status": "PublishedToProvider",
            "fundingType": "Levy",
        }))
        .unwrap();

        insta::assert_json_snapshot!(contract_fields(&contract), @r###"
        {
          "contract_number": "LEVY-0002",
          "contract_title": "Apprenticeship agreement",
          "contract_version": 3,
          "document_type": "agreement",
          "ukprn": 10001234
        }
        "###);
    }
}
