use std::fmt;

use crate::types::TermLabel;

/// Errors surfaced while resolving EC2 rates.
///
/// Anything not covered here is filterable noise: the pricing APIs return
/// heterogeneous rows and entries that simply do not match the query are
/// skipped without comment.
#[derive(Debug)]
pub enum PricingError {
    /// A returned entry could not be normalized into a JSON object.
    MalformedPayload(anyhow::Error),

    /// A price field was present as a string but not decimal-parseable.
    InvalidDecimal { field: &'static str, value: String },

    /// The product lookup produced no entry with an hourly USD price.
    NoOnDemandPrice,

    /// The offering-rate search covered fewer than both commitment terms.
    IncompleteTermCoverage { missing: Vec<TermLabel> },

    /// Payment options were supplied in an unusable shape.
    InvalidPaymentOptions(String),

    /// The underlying AWS call failed.
    Api(anyhow::Error),
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::MalformedPayload(err) => {
                write!(f, "Invalid pricing payload returned by AWS: {}", err)
            }
            PricingError::InvalidDecimal { field, value } => {
                write!(f, "Invalid {} '{}' returned by AWS", field, value)
            }
            PricingError::NoOnDemandPrice => {
                write!(f, "No on-demand pricing data returned by the AWS Pricing API")
            }
            PricingError::IncompleteTermCoverage { missing } => {
                let missing: Vec<&str> = missing.iter().map(TermLabel::as_str).collect();
                write!(
                    f,
                    "Savings Plans rates for both 1y and 3y are required (missing: {})",
                    missing.join(", ")
                )
            }
            PricingError::InvalidPaymentOptions(reason) => {
                write!(f, "Invalid Savings Plan payment options: {}", reason)
            }
            PricingError::Api(err) => write!(f, "AWS request failed: {}", err),
        }
    }
}

impl std::error::Error for PricingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PricingError::MalformedPayload(err) | PricingError::Api(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result type for rate resolution.
pub type PricingResult<T> = Result<T, PricingError>;
