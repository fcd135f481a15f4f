pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpSubmissionClient;
pub use config::{SubmissionConfig, WizardConfig};
pub use crate::core::estimator::{EstimateBreakdown, PriceEstimator, PricingConfig};
pub use crate::core::rates::{RateEntry, RateTable};
pub use crate::core::steps::{validate, validate_all, FieldErrors, StepId};
pub use crate::core::wizard::{StepProgress, SubmissionReceipt, WizardController, WizardStatus};
pub use domain::model::{Frequency, Money, OrderDraft, OrderSummary, ServiceId};
pub use utils::error::{OrderError, Result};
