use crate::core::steps::{FieldErrors, StepId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Step '{step}' has invalid fields: {errors}")]
    Validation { step: StepId, errors: FieldErrors },

    #[error("Submission failed: {message}")]
    Submission { message: String },

    #[error("Submission was not accepted by the order service")]
    SubmissionRejected,

    #[error("Cannot submit from step '{step}'")]
    NotAtFinalStep { step: StepId },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl OrderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// 使用者可自行修正後重試的錯誤 (欄位錯誤、送出失敗)
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Submission { .. }
                | Self::SubmissionRejected
                | Self::Http(_)
                | Self::NotAtFinalStep { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Validation { step, errors } => format!(
                "Please fix {} field(s) on the '{}' step",
                errors.len(),
                step.title()
            ),
            Self::Submission { .. } | Self::SubmissionRejected | Self::Http(_) => {
                "We could not send your order. Your details are saved, please try again."
                    .to_string()
            }
            Self::NotAtFinalStep { .. } => {
                "Please complete every step before submitting.".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            Self::Io(_) | Self::Serialization(_) => format!("Could not read input: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;
