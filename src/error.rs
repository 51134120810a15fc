// Error handling for the bus feed
// The subway adapter has no error channel: its failures degrade to an empty list.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::models::ErrorBody;

/// Longest upstream body snippet carried back to the caller.
pub const MAX_DETAILS_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("MTA_BUS_TIME_KEY not configured")]
    MissingKey,

    #[error("{}", invalid_key_message(.status))]
    InvalidKey { status: u16, details: String },

    #[error("Bus API error: {status}")]
    Upstream { status: u16, details: String },

    #[error("Bus fetch failed")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    MissingConfig,
    Upstream4xx,
    UpstreamOther,
    TransportException,
}

fn invalid_key_message(status: &u16) -> &'static str {
    if *status == 401 {
        "Bus API key invalid or expired"
    } else {
        "Bus API key missing or invalid. Check MTA_BUS_TIME_KEY"
    }
}

impl BusError {
    /// Classifies a non-2xx upstream response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let details = truncate_details(body);
        match status {
            401 | 403 => BusError::InvalidKey { status, details },
            _ => BusError::Upstream { status, details },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            BusError::MissingKey => FailureKind::MissingConfig,
            BusError::InvalidKey { .. } => FailureKind::Upstream4xx,
            BusError::Upstream { status, .. } if (400..500).contains(status) => {
                FailureKind::Upstream4xx
            }
            BusError::Upstream { .. } => FailureKind::UpstreamOther,
            BusError::Transport(_) => FailureKind::TransportException,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            BusError::MissingKey => None,
            BusError::InvalidKey { details, .. } | BusError::Upstream { details, .. } => {
                Some(details.as_str())
            }
            BusError::Transport(details) => Some(details.as_str()),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            details: self.details().map(String::from),
        }
    }
}

impl From<reqwest::Error> for BusError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key
        BusError::Transport(truncate_details(&e.without_url().to_string()))
    }
}

impl ResponseError for BusError {
    fn status_code(&self) -> StatusCode {
        match self {
            BusError::MissingKey => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(("Cache-Control", "no-store"))
            .json(self.to_body())
    }
}

/// Cuts `body` to at most `MAX_DETAILS_CHARS` characters.
pub fn truncate_details(body: &str) -> String {
    body.chars().take(MAX_DETAILS_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_maps_to_key_message() {
        let err = BusError::from_status(403, "<html>Forbidden</html>");
        assert!(matches!(err, BusError::InvalidKey { status: 403, .. }));
        assert_eq!(
            err.to_string(),
            "Bus API key missing or invalid. Check MTA_BUS_TIME_KEY"
        );
        assert_eq!(err.kind(), FailureKind::Upstream4xx);
        assert_eq!(err.details(), Some("<html>Forbidden</html>"));
    }

    #[test]
    fn test_unauthorized_maps_to_expired_message() {
        let err = BusError::from_status(401, "");
        assert_eq!(err.to_string(), "Bus API key invalid or expired");
    }

    #[test]
    fn test_other_status_is_generic_upstream() {
        let err = BusError::from_status(500, "boom");
        assert_eq!(err.to_string(), "Bus API error: 500");
        assert_eq!(err.kind(), FailureKind::UpstreamOther);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        assert_eq!(BusError::from_status(429, "").kind(), FailureKind::Upstream4xx);
    }

    #[test]
    fn test_details_are_truncated_on_char_boundary() {
        let body = "é".repeat(500);
        let err = BusError::from_status(502, &body);
        let details = err.details().unwrap();
        assert_eq!(details.chars().count(), MAX_DETAILS_CHARS);
    }

    #[test]
    fn test_missing_key_is_service_unavailable() {
        let err = BusError::MissingKey;
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), FailureKind::MissingConfig);
        assert_eq!(
            err.to_body(),
            ErrorBody {
                error: "MTA_BUS_TIME_KEY not configured".to_string(),
                kind: FailureKind::MissingConfig,
                details: None,
            }
        );
    }
}
