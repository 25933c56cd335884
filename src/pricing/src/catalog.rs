//! Collaborator boundary for the two AWS pricing query interfaces.
//!
//! The resolvers consume these traits rather than the SDK clients directly,
//! so tests (and alternative transports) can stand in canned responses.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_pricing as pricing;
use aws_sdk_pricing::types::Filter as PricingFilter;
use aws_sdk_savingsplans as savingsplans;
use aws_sdk_savingsplans::types::{
    SavingsPlanOfferingRate, SavingsPlanOfferingRateFilterElement, SavingsPlanPaymentOption,
    SavingsPlanType,
};
use serde_json::{json, Map, Value};

use crate::decode::PriceListEntry;
use crate::error::PricingError;

/// One operation: look up product entries from a price list.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn lookup_products(
        &self,
        service_code: &str,
        filters: Vec<PricingFilter>,
        max_results: i32,
    ) -> Result<Vec<PriceListEntry>, PricingError>;
}

/// Parameters for an offering-rate search. Payment options and plan types
/// travel as request parameters; everything else is a filter.
#[derive(Debug, Clone)]
pub struct OfferingRateRequest {
    pub payment_options: Vec<String>,
    pub plan_types: Vec<String>,
    pub filters: Vec<SavingsPlanOfferingRateFilterElement>,
}

/// One operation: search Savings Plans offering rates. Rows come back as
/// loose JSON mappings shaped like the wire response.
#[async_trait]
pub trait OfferingRateCatalog: Send + Sync {
    async fn search_offering_rates(
        &self,
        request: &OfferingRateRequest,
    ) -> Result<Vec<Value>, PricingError>;
}

/// `ProductCatalog` backed by the AWS Pricing API.
pub struct PricingApiClient {
    client: pricing::Client,
}

impl PricingApiClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: pricing::Client::new(config),
        }
    }
}

#[async_trait]
impl ProductCatalog for PricingApiClient {
    async fn lookup_products(
        &self,
        service_code: &str,
        filters: Vec<PricingFilter>,
        max_results: i32,
    ) -> Result<Vec<PriceListEntry>, PricingError> {
        let output = self
            .client
            .get_products()
            .service_code(service_code)
            .set_filters(Some(filters))
            .max_results(max_results)
            .send()
            .await
            .map_err(|err| PricingError::Api(err.into()))?;

        Ok(output
            .price_list()
            .iter()
            .map(|entry| PriceListEntry::Raw(entry.clone()))
            .collect())
    }
}

/// `OfferingRateCatalog` backed by the Savings Plans API.
pub struct SavingsPlansApiClient {
    client: savingsplans::Client,
}

impl SavingsPlansApiClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: savingsplans::Client::new(config),
        }
    }
}

#[async_trait]
impl OfferingRateCatalog for SavingsPlansApiClient {
    async fn search_offering_rates(
        &self,
        request: &OfferingRateRequest,
    ) -> Result<Vec<Value>, PricingError> {
        let payment_options = request
            .payment_options
            .iter()
            .map(|option| SavingsPlanPaymentOption::from(option.as_str()))
            .collect();
        let plan_types = request
            .plan_types
            .iter()
            .map(|plan_type| SavingsPlanType::from(plan_type.as_str()))
            .collect();

        let output = self
            .client
            .describe_savings_plans_offering_rates()
            .set_savings_plan_payment_options(Some(payment_options))
            .set_savings_plan_types(Some(plan_types))
            .set_filters(Some(request.filters.clone()))
            .send()
            .await
            .map_err(|err| PricingError::Api(err.into()))?;

        Ok(output.search_results().iter().map(project_rate_row).collect())
    }
}

/// Project a typed SDK rate row into the loose mapping the resolvers consume.
/// Fields the SDK reports as absent stay absent, so the row filters observe
/// the same shape the wire protocol has; in particular a row with no
/// properties gets no `properties` key at all.
fn project_rate_row(rate: &SavingsPlanOfferingRate) -> Value {
    let mut row = Map::new();

    if let Some(usage_type) = rate.usage_type() {
        row.insert("usageType".to_string(), json!(usage_type));
    }
    if let Some(value) = rate.rate() {
        row.insert("rate".to_string(), json!(value));
    }
    if let Some(unit) = rate.unit() {
        row.insert("unit".to_string(), json!(unit.as_str()));
    }

    if let Some(offering) = rate.savings_plan_offering() {
        let mut parent = Map::new();
        if let Some(currency) = offering.currency() {
            parent.insert("currency".to_string(), json!(currency.as_str()));
        }
        parent.insert(
            "durationSeconds".to_string(),
            json!(offering.duration_seconds()),
        );
        row.insert("savingsPlanOffering".to_string(), Value::Object(parent));
    }

    let properties = rate.properties();
    if !properties.is_empty() {
        let properties: Vec<Value> = properties
            .iter()
            .map(|property| {
                let mut entry = Map::new();
                if let Some(name) = property.name() {
                    entry.insert("name".to_string(), json!(name));
                }
                if let Some(value) = property.value() {
                    entry.insert("value".to_string(), json!(value));
                }
                Value::Object(entry)
            })
            .collect();
        row.insert("properties".to_string(), Value::Array(properties));
    }

    Value::Object(row)
}
