pub mod estimator;
pub mod rates;
pub mod steps;
pub mod wizard;

pub use crate::domain::model::{Money, OrderDraft, OrderSummary, SubmissionResponse};
pub use crate::domain::ports::{SubmissionClient, SubmissionSettings};
pub use crate::utils::error::Result;
