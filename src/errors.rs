use axum::http::{header, StatusCode};
use axum::response::Redirect;
use thiserror::Error;

/// Message shown when the backend reports an entry that already exists.
pub const ALREADY_COMPLETED_MESSAGE: &str = "Great! You already marked this complete for this day.";

/// Failures surfaced by the dashboard core.
///
/// Only `AuthExpired` is guaranteed to reach the caller untouched; the others
/// are downgraded to an error-display state where the core can do so.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Detected client-side; nothing was sent to the backend.
    #[error("{0}")]
    Validation(String),

    /// The mutation is redundant (the entry already exists).
    #[error("already completed: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("session expired")]
    AuthExpired,

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ClientError::AuthExpired)
    }

    /// Text suitable for an inline message next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Conflict(_) => ALREADY_COMPLETED_MESSAGE.to_string(),
            ClientError::Validation(message) => message.clone(),
            ClientError::NotFound(_) => "Nothing to undo for this day.".to_string(),
            ClientError::Network(message) => format!("Network error: {message}"),
            ClientError::AuthExpired => "Your session has expired. Please sign in again.".to_string(),
            ClientError::Server { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Server { status, .. } => format!("Request failed ({status})"),
        }
    }

    /// Classifies a non-success backend response.
    ///
    /// `message` is the `message` field of the backend's JSON error body, when
    /// it had one.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        if message.contains("Already completed") {
            return ClientError::Conflict(message);
        }
        match status {
            401 | 403 => ClientError::AuthExpired,
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            400..=499 => ClientError::Validation(message),
            _ => ClientError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::Server {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("unexpected response body: {err}"),
            };
        }
        ClientError::Network(err.to_string())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub redirect: Option<String>,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn from_client(err: ClientError, login_url: &str) -> Self {
        let status = match &err {
            ClientError::AuthExpired => {
                return Self {
                    status: StatusCode::SEE_OTHER,
                    message: err.user_message(),
                    redirect: Some(login_url.to_string()),
                };
            }
            ClientError::Validation(_) => StatusCode::BAD_REQUEST,
            ClientError::Conflict(_) => StatusCode::CONFLICT,
            ClientError::NotFound(_) => StatusCode::NOT_FOUND,
            ClientError::Network(_) | ClientError::Server { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.user_message(),
            redirect: None,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self.redirect {
            Some(location) => {
                let mut response = Redirect::to(&location).into_response();
                response.headers_mut().insert(
                    header::CACHE_CONTROL,
                    header::HeaderValue::from_static("no-store"),
                );
                response
            }
            None => (self.status, self.message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_auth_expired() {
        assert_eq!(ClientError::from_status(401, None), ClientError::AuthExpired);
        assert_eq!(ClientError::from_status(403, Some("Forbidden".into())), ClientError::AuthExpired);
    }

    #[test]
    fn already_completed_message_is_a_conflict_whatever_the_status() {
        let err = ClientError::from_status(500, Some("Already completed on 2024-03-01".into()));
        assert!(matches!(err, ClientError::Conflict(_)));
        assert_eq!(err.user_message(), ALREADY_COMPLETED_MESSAGE);
        assert!(matches!(ClientError::from_status(409, None), ClientError::Conflict(_)));
    }

    #[test]
    fn remaining_statuses() {
        assert!(matches!(ClientError::from_status(404, None), ClientError::NotFound(_)));
        assert!(matches!(ClientError::from_status(422, Some("bad value".into())), ClientError::Validation(m) if m == "bad value"));
        assert!(matches!(ClientError::from_status(503, None), ClientError::Server { status: 503, .. }));
    }

    #[test]
    fn auth_expired_becomes_login_redirect() {
        let err = AppError::from_client(ClientError::AuthExpired, "/login");
        assert_eq!(err.redirect.as_deref(), Some("/login"));
        let err = AppError::from_client(ClientError::Network("refused".into()), "/login");
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.redirect.is_none());
    }
}
