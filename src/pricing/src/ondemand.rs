//! On-demand rate resolution against the AWS Pricing API.

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::ProductCatalog;
use crate::decode::{parse_decimal, unit_is_hourly};
use crate::error::PricingError;
use crate::types::{InstanceQuery, OnDemandFilterBuilder};

pub(crate) const EC2_SERVICE_CODE: &str = "AmazonEC2";

/// A fully filtered lookup is answered by a single entry; more are tolerated.
const MAX_PRODUCT_RESULTS: i32 = 1;

/// Resolve the on-demand hourly USD rate for an instance configuration.
pub(crate) async fn resolve<P>(catalog: &P, query: &InstanceQuery) -> Result<Decimal, PricingError>
where
    P: ProductCatalog + ?Sized,
{
    let filters = OnDemandFilterBuilder::from_query(query).to_filters();
    debug!(
        instance_type = %query.instance_type,
        region = %query.region,
        "looking up on-demand pricing"
    );

    let entries = catalog
        .lookup_products(EC2_SERVICE_CODE, filters, MAX_PRODUCT_RESULTS)
        .await?;

    for entry in entries {
        let entry = entry.into_object()?;
        if let Some(price) = hourly_usd_price(&entry)? {
            debug!(%price, instance_type = %query.instance_type, "resolved on-demand hourly rate");
            return Ok(price);
        }
    }

    Err(PricingError::NoOnDemandPrice)
}

/// Walk `terms.OnDemand.*.priceDimensions.*` and return the first hourly USD
/// price. A structural miss means the entry holds no usable price; only an
/// unparseable USD string is an error.
fn hourly_usd_price(entry: &Map<String, Value>) -> Result<Option<Decimal>, PricingError> {
    let Some(ondemand) = entry
        .get("terms")
        .and_then(Value::as_object)
        .and_then(|terms| terms.get("OnDemand"))
        .and_then(Value::as_object)
    else {
        return Ok(None);
    };

    for term in ondemand.values() {
        let Some(dimensions) = term
            .as_object()
            .and_then(|term| term.get("priceDimensions"))
            .and_then(Value::as_object)
        else {
            continue;
        };

        for dimension in dimensions.values() {
            let Some(dimension) = dimension.as_object() else {
                continue;
            };
            if !unit_is_hourly(dimension.get("unit")) {
                continue;
            }
            let Some(usd) = dimension
                .get("pricePerUnit")
                .and_then(Value::as_object)
                .and_then(|prices| prices.get("USD"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            return parse_decimal("on-demand USD price", usd).map(Some);
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry_with_dimension(dimension: Value) -> Map<String, Value> {
        json!({
            "terms": {
                "OnDemand": {
                    "SKU.TERM": { "priceDimensions": { "SKU.TERM.DIM": dimension } }
                }
            }
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn first_hourly_dimension_wins() {
        let entry = entry_with_dimension(json!({
            "unit": "Hrs",
            "pricePerUnit": { "USD": "0.096" }
        }));
        let price = hourly_usd_price(&entry).unwrap().unwrap();
        assert_eq!(price, "0.096".parse().unwrap());
    }

    #[test]
    fn non_hourly_dimensions_are_skipped() {
        let entry = entry_with_dimension(json!({
            "unit": "Quarter",
            "pricePerUnit": { "USD": "500.00" }
        }));
        assert_eq!(hourly_usd_price(&entry).unwrap(), None);
    }

    #[test]
    fn missing_terms_mean_no_price() {
        let entry = json!({ "product": {} }).as_object().cloned().unwrap();
        assert_eq!(hourly_usd_price(&entry).unwrap(), None);
    }

    #[test]
    fn non_string_usd_values_are_skipped() {
        let entry = entry_with_dimension(json!({
            "unit": "Hrs",
            "pricePerUnit": { "USD": 0.096 }
        }));
        assert_eq!(hourly_usd_price(&entry).unwrap(), None);
    }

    #[test]
    fn unparseable_usd_strings_are_fatal() {
        let entry = entry_with_dimension(json!({
            "unit": "Hrs",
            "pricePerUnit": { "USD": "about a dime" }
        }));
        let err = hourly_usd_price(&entry).unwrap_err();
        assert!(matches!(err, PricingError::InvalidDecimal { .. }));
    }
}
