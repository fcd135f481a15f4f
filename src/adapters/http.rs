use crate::core::{OrderSummary, SubmissionClient, SubmissionResponse, SubmissionSettings};
use crate::utils::error::{OrderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts order summaries as JSON to the order service. One attempt per call.
pub struct HttpSubmissionClient {
    client: Client,
    endpoint: String,
}

impl HttpSubmissionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_settings<C: SubmissionSettings>(settings: &C) -> Result<Self> {
        Self::new(
            settings.endpoint(),
            Duration::from_secs(settings.timeout_seconds()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(&self, summary: &OrderSummary) -> Result<SubmissionResponse> {
        tracing::debug!("POST order summary to: {}", self.endpoint);
        let response = self.client.post(&self.endpoint).json(summary).send().await?;

        let status = response.status();
        tracing::debug!("Order service response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::Submission {
                message: format!("order service returned {}: {}", status, body.trim()),
            });
        }

        let parsed: SubmissionResponse = response.json().await?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn summary() -> OrderSummary {
        OrderSummary {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            service: "Lawn Mowing".to_string(),
            message: "Frequency: Weekly".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_summary_as_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/orders").json_body(serde_json::json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "service": "Lawn Mowing",
                "message": "Frequency: Weekly"
            }));
            then.status(200).json_body(serde_json::json!({ "success": true }));
        });

        let client = HttpSubmissionClient::new(server.url("/orders"), Duration::from_secs(5)).unwrap();
        let response = client.submit(&summary()).await.unwrap();

        mock.assert();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_success_false_is_passed_through() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/orders");
            then.status(200).json_body(serde_json::json!({ "success": false }));
        });

        let client = HttpSubmissionClient::new(server.url("/orders"), Duration::from_secs(5)).unwrap();
        let response = client.submit(&summary()).await.unwrap();
        assert!(!response.success);
    }

    #[tokio::test]
    async fn test_server_error_is_submission_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/orders");
            then.status(503).body("maintenance");
        });

        let client = HttpSubmissionClient::new(server.url("/orders"), Duration::from_secs(5)).unwrap();
        let err = client.submit(&summary()).await.unwrap_err();

        mock.assert_hits(1);
        match err {
            OrderError::Submission { message } => {
                assert!(message.contains("503"));
                assert!(message.contains("maintenance"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
