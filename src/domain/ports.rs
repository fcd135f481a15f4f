use crate::domain::model::{OrderSummary, SubmissionResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

/// External service that receives finished orders.
///
/// Implementations make a single attempt; retrying is left to the user.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, summary: &OrderSummary) -> Result<SubmissionResponse>;
}

pub trait SubmissionSettings: Send + Sync {
    fn endpoint(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}
