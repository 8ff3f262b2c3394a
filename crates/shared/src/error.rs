use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Upstream,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to fetch {dataset} feed from {url}: {message}")]
    FetchFailure {
        dataset: Dataset,
        url: String,
        message: String,
    },
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl MapError {
    pub fn fetch(dataset: Dataset, url: impl Into<String>, message: impl ToString) -> Self {
        Self::FetchFailure {
            dataset,
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FetchFailure { .. } | Self::MalformedRecord { .. } => ErrorCode::Upstream,
            Self::ConfigurationMissing(_) | Self::ConfigurationInvalid(_) => ErrorCode::Internal,
        }
    }
}

impl From<MapError> for ApiError {
    fn from(value: MapError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
