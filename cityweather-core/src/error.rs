//! Lookup error taxonomy.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("place name must not be empty")]
    EmptyPlace,

    /// Transport-level failure: connection error, timeout or non-2xx status.
    #[error("request failed: {cause}")]
    RequestFailed { status: Option<u16>, timed_out: bool, cause: String },

    /// The provider answered but the payload was unusable.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl LookupError {
    /// Wrap a reqwest error. The URL is stripped since it carries the API key.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            status: err.status().map(|s| s.as_u16()),
            timed_out: err.is_timeout(),
            cause: err.without_url().to_string(),
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// HTTP status carried by a `RequestFailed`, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Short label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyPlace => "empty_place",
            Self::RequestFailed { .. } => "request_failed",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// User-friendly message for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyPlace => "Please enter a city name.".to_string(),
            Self::RequestFailed { status: Some(404), .. } => {
                "City not found. Check the spelling and try again.".to_string()
            }
            Self::RequestFailed { status: Some(401), .. } => {
                "The weather service rejected the API key.".to_string()
            }
            Self::RequestFailed { status: Some(code), .. } => {
                format!("The weather service answered with HTTP {code}.")
            }
            Self::RequestFailed { timed_out: true, .. } => {
                "The weather service did not answer in time.".to_string()
            }
            Self::RequestFailed { .. } => {
                "Could not reach the weather service. Check your connection.".to_string()
            }
            Self::MalformedResponse(_) => {
                "The weather service returned an unexpected response.".to_string()
            }
        }
    }
}
