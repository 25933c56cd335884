//! Savings Plans rate resolution against the Savings Plans API.
//!
//! The offering-rate search returns heterogeneous rows: unused-reservation
//! usage, non-USD currencies, durations we do not price. Rows that do not
//! match the query are filtered out; the cheapest surviving rate per
//! commitment term is kept.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{OfferingRateCatalog, OfferingRateRequest};
use crate::decode::{parse_decimal, unit_is_hourly};
use crate::error::PricingError;
use crate::types::{
    product_description_aliases, OfferingRateFilterBuilder, SavingsPlanQuery, SavingsPlanRates,
    TermLabel,
};

/// Resolve the committed-use hourly USD rates for both supported terms.
pub(crate) async fn resolve<S>(
    catalog: &S,
    query: &SavingsPlanQuery,
) -> Result<SavingsPlanRates, PricingError>
where
    S: OfferingRateCatalog + ?Sized,
{
    let payment_options = query.payment_options.normalize()?;
    let accepted_descriptions = product_description_aliases(&query.operating_system);

    let filters = OfferingRateFilterBuilder {
        instance_type: query.instance_type.clone(),
        region: query.region.clone(),
        product_descriptions: accepted_descriptions.clone(),
    }
    .to_filters();

    debug!(
        instance_type = %query.instance_type,
        region = %query.region,
        plan_type = %query.plan_type,
        "searching Savings Plans offering rates"
    );

    let request = OfferingRateRequest {
        payment_options,
        plan_types: vec![query.plan_type.clone()],
        filters,
    };
    let rows = catalog.search_offering_rates(&request).await?;

    let mut cheapest = CheapestPerTerm::default();
    for row in &rows {
        if let Some((term, rate)) = qualifying_rate(row, &accepted_descriptions)? {
            cheapest.offer(term, rate);
        }
    }

    let rates = cheapest.into_rates()?;
    debug!(
        one_year = %rates.one_year,
        three_year = %rates.three_year,
        instance_type = %query.instance_type,
        "resolved Savings Plans hourly rates"
    );
    Ok(rates)
}

/// Apply the row filters and pull out the term and rate. Returns `None` for
/// rows that simply do not match the query; only an unparseable rate string
/// is an error.
fn qualifying_rate(
    row: &Value,
    accepted_descriptions: &[String],
) -> Result<Option<(TermLabel, Decimal)>, PricingError> {
    let Some(row) = row.as_object() else {
        return Ok(None);
    };

    // Only rows for actual running-instance compute. "UnusedBox" and
    // data-transfer rows carry rates too, and they must never win.
    let Some(usage_type) = row.get("usageType").and_then(Value::as_str) else {
        return Ok(None);
    };
    if !usage_type.contains("BoxUsage") {
        return Ok(None);
    }

    let Some(offering) = row.get("savingsPlanOffering").and_then(Value::as_object) else {
        return Ok(None);
    };
    if offering.get("currency").and_then(Value::as_str) != Some("USD") {
        return Ok(None);
    }

    // Rows without a properties sequence are skipped outright.
    let Some(properties) = row.get("properties").and_then(Value::as_array) else {
        return Ok(None);
    };
    if let Some(description) = product_description(properties) {
        if !accepted_descriptions.iter().any(|a| a == description) {
            return Ok(None);
        }
    }

    let Some(term) = offering
        .get("durationSeconds")
        .and_then(Value::as_i64)
        .and_then(TermLabel::from_duration_seconds)
    else {
        return Ok(None);
    };

    if !unit_is_hourly(row.get("unit")) {
        return Ok(None);
    }

    let Some(rate) = row.get("rate").and_then(Value::as_str) else {
        return Ok(None);
    };
    let rate = parse_decimal("Savings Plans rate", rate)?;
    Ok(Some((term, rate)))
}

/// First `productDescription` entry with a string value wins; entries with a
/// matching name but no string value do not stop the scan.
fn product_description(properties: &[Value]) -> Option<&str> {
    properties.iter().find_map(|property| {
        let property = property.as_object()?;
        if property.get("name").and_then(Value::as_str)? != "productDescription" {
            return None;
        }
        property.get("value").and_then(Value::as_str)
    })
}

/// Minimum rate seen per term. Equal rates never replace the stored value, so
/// ties go to the first row seen.
#[derive(Debug, Default)]
struct CheapestPerTerm {
    one_year: Option<Decimal>,
    three_year: Option<Decimal>,
}

impl CheapestPerTerm {
    fn offer(&mut self, term: TermLabel, rate: Decimal) {
        let slot = match term {
            TermLabel::OneYear => &mut self.one_year,
            TermLabel::ThreeYear => &mut self.three_year,
        };
        match slot {
            Some(stored) if *stored <= rate => {}
            _ => *slot = Some(rate),
        }
    }

    fn into_rates(self) -> Result<SavingsPlanRates, PricingError> {
        match (self.one_year, self.three_year) {
            (Some(one_year), Some(three_year)) => Ok(SavingsPlanRates {
                one_year,
                three_year,
            }),
            (one_year, three_year) => {
                let mut missing = Vec::new();
                if one_year.is_none() {
                    missing.push(TermLabel::OneYear);
                }
                if three_year.is_none() {
                    missing.push(TermLabel::ThreeYear);
                }
                Err(PricingError::IncompleteTermCoverage { missing })
            }
        }
    }
}
