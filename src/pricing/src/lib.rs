//! EC2 compute rates from the AWS Pricing and Savings Plans APIs, normalized
//! into exact hourly USD decimals.

pub mod catalog;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
mod ondemand;
mod savings_plan;
pub mod types;


pub use catalog::{OfferingRateCatalog, OfferingRateRequest, ProductCatalog};
pub use client::RateClient;
pub use config::AwsConfig;
pub use decode::PriceListEntry;
pub use error::{PricingError, PricingResult};
pub use types::{
    InstanceQuery, PaymentOptions, SavingsPlanQuery, SavingsPlanRates, TermLabel,
};
