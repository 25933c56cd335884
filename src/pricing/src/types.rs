use std::fmt;

use aws_sdk_pricing::types::{Filter as PricingFilter, FilterType as PricingFilterType};
use aws_sdk_savingsplans::types::{
    SavingsPlanOfferingRateFilterElement, SavingsPlanRateFilterAttribute,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;

const NO_LICENSE_REQUIRED: &str = "No License required";
const DEFAULT_PAYMENT_OPTION: &str = "No Upfront";

const ONE_YEAR_SECONDS: i64 = 31_536_000;
const THREE_YEARS_SECONDS: i64 = 94_608_000;

/// Identifies an EC2 instance configuration to price on demand.
#[derive(Debug, Clone)]
pub struct InstanceQuery {
    pub instance_type: String,
    pub region: String,
    pub operating_system: String,
}

/// Identifies a Savings Plans offering to price.
#[derive(Debug, Clone)]
pub struct SavingsPlanQuery {
    pub instance_type: String,
    pub region: String,
    pub operating_system: String,
    pub plan_type: String,
    pub payment_options: PaymentOptions,
}

/// Payment options for the Savings Plans search. Defaults to "No Upfront".
#[derive(Debug, Clone)]
pub enum PaymentOptions {
    One(String),
    Many(Vec<String>),
}

impl Default for PaymentOptions {
    fn default() -> Self {
        PaymentOptions::One(DEFAULT_PAYMENT_OPTION.to_string())
    }
}

impl From<&str> for PaymentOptions {
    fn from(option: &str) -> Self {
        PaymentOptions::One(option.to_string())
    }
}

impl From<String> for PaymentOptions {
    fn from(option: String) -> Self {
        PaymentOptions::One(option)
    }
}

impl From<Vec<String>> for PaymentOptions {
    fn from(options: Vec<String>) -> Self {
        PaymentOptions::Many(options)
    }
}

impl PaymentOptions {
    /// Flatten into the list shape the Savings Plans API expects. Rejects
    /// empty or blank shapes before any request goes out.
    pub(crate) fn normalize(&self) -> Result<Vec<String>, PricingError> {
        let options = match self {
            PaymentOptions::One(option) => vec![option.clone()],
            PaymentOptions::Many(options) => options.clone(),
        };

        if options.is_empty() {
            return Err(PricingError::InvalidPaymentOptions(
                "at least one payment option is required".to_string(),
            ));
        }
        if options.iter().any(|option| option.trim().is_empty()) {
            return Err(PricingError::InvalidPaymentOptions(
                "payment options must be non-empty strings".to_string(),
            ));
        }

        Ok(options)
    }
}

/// Commitment duration of a Savings Plans rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermLabel {
    OneYear,
    ThreeYear,
}

impl TermLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermLabel::OneYear => "1y",
            TermLabel::ThreeYear => "3y",
        }
    }

    /// Map an offering duration to its term, if it is one we price.
    pub(crate) fn from_duration_seconds(seconds: i64) -> Option<Self> {
        match seconds {
            ONE_YEAR_SECONDS => Some(TermLabel::OneYear),
            THREE_YEARS_SECONDS => Some(TermLabel::ThreeYear),
            _ => None,
        }
    }
}

impl fmt::Display for TermLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hourly USD rates for both supported commitment terms. Constructing this
/// requires both rates, so a partial result cannot escape the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsPlanRates {
    #[serde(rename = "1y")]
    pub one_year: Decimal,
    #[serde(rename = "3y")]
    pub three_year: Decimal,
}

impl SavingsPlanRates {
    pub fn rate(&self, term: TermLabel) -> Decimal {
        match term {
            TermLabel::OneYear => self.one_year,
            TermLabel::ThreeYear => self.three_year,
        }
    }
}

/// Product descriptions accepted for an operating system name. The Pricing
/// and Savings Plans APIs disagree on OS naming, so "Linux" must also match
/// "Linux/UNIX" rows. Unknown names map to themselves.
pub(crate) fn product_description_aliases(operating_system: &str) -> Vec<String> {
    match operating_system {
        "Linux" => vec!["Linux".to_string(), "Linux/UNIX".to_string()],
        "Linux/UNIX" => vec!["Linux/UNIX".to_string()],
        other => vec![other.to_string()],
    }
}

/// Builds the on-demand filter set for the Pricing API.
#[derive(Debug)]
pub struct OnDemandFilterBuilder {
    pub instance_type: String,
    pub region: String,
    pub operating_system: String,
}

impl OnDemandFilterBuilder {
    pub fn from_query(query: &InstanceQuery) -> Self {
        Self {
            instance_type: query.instance_type.clone(),
            region: query.region.clone(),
            operating_system: query.operating_system.clone(),
        }
    }

    pub fn to_filters(&self) -> Vec<PricingFilter> {
        vec![
            term_match("instanceType", &self.instance_type),
            term_match("regionCode", &self.region),
            term_match("operatingSystem", &self.operating_system),
            term_match("licenseModel", NO_LICENSE_REQUIRED),
            term_match("tenancy", "Shared"),
            term_match("capacitystatus", "Used"),
            term_match("preInstalledSw", "NA"),
        ]
    }
}

fn term_match(field: &str, value: &str) -> PricingFilter {
    PricingFilter::builder()
        .field(field)
        .value(value)
        .r#type(PricingFilterType::TermMatch)
        .build()
        .expect("term-match filter with field and value always builds")
}

/// Builds the offering-rate filter set for the Savings Plans API. Plan type
/// and payment options travel as request parameters, not filters.
#[derive(Debug)]
pub struct OfferingRateFilterBuilder {
    pub instance_type: String,
    pub region: String,
    pub product_descriptions: Vec<String>,
}

impl OfferingRateFilterBuilder {
    pub fn to_filters(&self) -> Vec<SavingsPlanOfferingRateFilterElement> {
        vec![
            rate_filter(
                SavingsPlanRateFilterAttribute::InstanceType,
                vec![self.instance_type.clone()],
            ),
            rate_filter(
                SavingsPlanRateFilterAttribute::Region,
                vec![self.region.clone()],
            ),
            rate_filter(
                SavingsPlanRateFilterAttribute::ProductDescription,
                self.product_descriptions.clone(),
            ),
            rate_filter(
                SavingsPlanRateFilterAttribute::Tenancy,
                vec!["shared".to_string()],
            ),
        ]
    }
}

fn rate_filter(
    name: SavingsPlanRateFilterAttribute,
    values: Vec<String>,
) -> SavingsPlanOfferingRateFilterElement {
    SavingsPlanOfferingRateFilterElement::builder()
        .name(name)
        .set_values(Some(values))
        .build()
}
