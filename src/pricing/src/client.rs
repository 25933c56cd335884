//! Entry point tying the resolvers to their catalog implementations.

use anyhow::anyhow;
use rust_decimal::Decimal;
use tracing::info;

use crate::catalog::{
    OfferingRateCatalog, PricingApiClient, ProductCatalog, SavingsPlansApiClient,
};
use crate::config::{resolve_available_aws_config, AwsConfig};
use crate::error::{PricingError, PricingResult};
use crate::types::{InstanceQuery, SavingsPlanQuery, SavingsPlanRates};
use crate::{ondemand, savings_plan};

/// Both pricing endpoints are only served out of us-east-1, regardless of the
/// region being priced.
const PRICING_REGION: &str = "us-east-1";

/// Client for EC2 compute rates. Holds one catalog per pricing interface and
/// no other state, so calls may run concurrently without coordination.
pub struct RateClient<P = PricingApiClient, S = SavingsPlansApiClient> {
    products: P,
    offerings: S,
}

impl RateClient {
    /// Build SDK-backed catalogs using the given credential source.
    pub async fn new(initialization_conf: AwsConfig) -> PricingResult<Self> {
        let config = resolve_available_aws_config(initialization_conf.clone(), PRICING_REGION)
            .await
            .ok_or_else(|| {
                PricingError::Api(anyhow!(
                    "could not resolve AWS credentials for {initialization_conf}"
                ))
            })?;
        info!(region = PRICING_REGION, "initialized EC2 rate client");

        Ok(Self {
            products: PricingApiClient::new(&config),
            offerings: SavingsPlansApiClient::new(&config),
        })
    }
}

impl<P, S> RateClient<P, S>
where
    P: ProductCatalog,
    S: OfferingRateCatalog,
{
    /// Use alternative catalog implementations.
    pub fn with_catalogs(products: P, offerings: S) -> Self {
        Self {
            products,
            offerings,
        }
    }

    /// On-demand hourly USD rate for an instance configuration.
    pub async fn ondemand_usd_per_hour(&self, query: &InstanceQuery) -> PricingResult<Decimal> {
        ondemand::resolve(&self.products, query).await
    }

    /// Savings Plans hourly USD rates for both commitment terms.
    pub async fn savings_plan_usd_per_hour(
        &self,
        query: &SavingsPlanQuery,
    ) -> PricingResult<SavingsPlanRates> {
        savings_plan::resolve(&self.offerings, query).await
    }
}
