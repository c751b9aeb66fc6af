// Error handling framework

use thiserror::Error;

/// Civil-date and classification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid expected date '{value}' for order {order_id}: {reason}")]
    InvalidExpectedDate {
        order_id: String,
        value: String,
        reason: String,
    },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Order store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Order store request failed: {0}")]
    RequestFailed(String),

    #[error("Order store query failed with status {status}: {body}")]
    QueryFailed { status: u16, body: String },

    #[error("Failed to decode order store response: {0}")]
    DecodeFailed(String),

    #[error("Order store client configuration error: {0}")]
    Configuration(String),
}

/// SMS gateway errors
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS request failed: {0}")]
    RequestFailed(String),

    #[error("SMS rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to sign SMS request: {0}")]
    SigningFailed(String),

    #[error("SMS gateway configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::DecodeFailed(err.to_string())
        } else {
            StoreError::RequestFailed(err.to_string())
        }
    }
}

impl From<reqwest::Error> for SmsError {
    fn from(err: reqwest::Error) -> Self {
        SmsError::RequestFailed(err.to_string())
    }
}
