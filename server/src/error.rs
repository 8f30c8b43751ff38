use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors surfaced by the console's HTTP API
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Registry is not available")]
    RegistryUnavailable,

    #[error("unable to get consul acl token")]
    AclToken { status: u16 },
}

impl ConsoleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConsoleError::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ConsoleError::Http(_) => StatusCode::BAD_GATEWAY,
            ConsoleError::Upstream { status, .. } | ConsoleError::AclToken { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ConsoleError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConsoleError::RegistryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }

        (status, Json(serde_json::json!({
            "error": self.to_string()
        }))).into_response()
    }
}

impl From<ConsoleError> for device_wizard::WizardError {
    fn from(error: ConsoleError) -> Self {
        device_wizard::WizardError::Creation(error.to_string())
    }
}

/// Type alias for Results using ConsoleError
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let upstream = ConsoleError::Upstream {
            status: 409,
            body: "duplicate".to_string(),
        };
        assert_eq!(upstream.status_code(), StatusCode::CONFLICT);
        assert_eq!(ConsoleError::AclToken { status: 401 }.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ConsoleError::RegistryUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ConsoleError::Upstream { status: 42, body: String::new() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_acl_message_matches_registry_contract() {
        assert_eq!(
            ConsoleError::AclToken { status: 403 }.to_string(),
            "unable to get consul acl token"
        );
    }
}
