//! Normalization helpers shared by both resolvers.

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::PricingError;

/// Rate units that denote hourly prices.
const HOURLY_UNITS: [&str; 2] = ["Hrs", "Hours"];

/// A single product entry from a price list. The Pricing API returns entries
/// as JSON documents; already-decoded values are accepted as well.
#[derive(Debug, Clone)]
pub enum PriceListEntry {
    Raw(String),
    Decoded(Value),
}

impl PriceListEntry {
    /// Normalize the entry into a JSON object, decoding raw documents first.
    pub(crate) fn into_object(self) -> Result<Map<String, Value>, PricingError> {
        let value = match self {
            PriceListEntry::Raw(document) => serde_json::from_str(&document).map_err(|err| {
                PricingError::MalformedPayload(anyhow::anyhow!(
                    "price list entry is not valid JSON: {err}"
                ))
            })?,
            PriceListEntry::Decoded(value) => value,
        };

        match value {
            Value::Object(entry) => Ok(entry),
            other => Err(PricingError::MalformedPayload(anyhow::anyhow!(
                "price list entry decoded to {} instead of an object",
                json_type_name(&other)
            ))),
        }
    }
}

/// True unless `unit` is present as a string outside the hourly set. Absent
/// or non-string units pass.
pub(crate) fn unit_is_hourly(unit: Option<&Value>) -> bool {
    match unit.and_then(Value::as_str) {
        Some(unit) => HOURLY_UNITS.contains(&unit),
        None => true,
    }
}

/// Parse an exact decimal rate string. Prices stay decimal end to end, so a
/// malformed string is an error rather than a zero or a rounded float.
pub(crate) fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, PricingError> {
    raw.parse::<Decimal>()
        .map_err(|_| PricingError::InvalidDecimal {
            field,
            value: raw.to_string(),
        })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_entries_decode_into_objects() {
        let entry = PriceListEntry::Raw(r#"{"terms": {}}"#.to_string());
        let object = entry.into_object().unwrap();
        assert!(object.contains_key("terms"));
    }

    #[test]
    fn decoded_entries_pass_through() {
        let entry = PriceListEntry::Decoded(json!({"terms": {}}));
        assert!(entry.into_object().is_ok());
    }

    #[test]
    fn invalid_json_is_a_malformed_payload() {
        let entry = PriceListEntry::Raw("{not valid".to_string());
        let err = entry.into_object().unwrap_err();
        assert!(matches!(err, PricingError::MalformedPayload(_)));
    }

    #[test]
    fn non_object_documents_are_malformed_payloads() {
        let entry = PriceListEntry::Raw(r#"["terms"]"#.to_string());
        let err = entry.into_object().unwrap_err();
        assert!(matches!(err, PricingError::MalformedPayload(_)));
    }

    #[test]
    fn hourly_units_pass_the_unit_gate() {
        assert!(unit_is_hourly(Some(&json!("Hrs"))));
        assert!(unit_is_hourly(Some(&json!("Hours"))));
        assert!(!unit_is_hourly(Some(&json!("Quarter"))));
    }

    #[test]
    fn absent_or_non_string_units_pass_the_unit_gate() {
        assert!(unit_is_hourly(None));
        assert!(unit_is_hourly(Some(&json!(7))));
    }

    #[test]
    fn decimal_strings_parse_exactly() {
        let price = parse_decimal("on-demand USD price", "0.0116000000").unwrap();
        assert_eq!(price.to_string(), "0.0116000000");
    }

    #[test]
    fn malformed_decimal_strings_are_errors() {
        let err = parse_decimal("Savings Plans rate", "zero point one").unwrap_err();
        match err {
            PricingError::InvalidDecimal { field, value } => {
                assert_eq!(field, "Savings Plans rate");
                assert_eq!(value, "zero point one");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
