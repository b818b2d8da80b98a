use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("invalid roaster")]
    InvalidRoaster,

    #[error("Document store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Failed to iterate: {message}")]
    IterationFailure { message: String },

    #[error("Document store returned {status}: {message}")]
    Store { status: u16, message: String },

    #[error("Document encoding error: {message}")]
    Codec { message: String },

    #[error("Authentication failed: {0}")]
    Auth(#[from] gcp_auth::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Folds a store-level failure into `StoreUnavailable`; domain errors pass through.
    pub fn into_unavailable(self) -> Self {
        match self {
            e @ (Self::Store { .. }
            | Self::Codec { .. }
            | Self::Auth(_)
            | Self::Http(_)
            | Self::Serialization(_)
            | Self::Io(_)) => {
                Self::StoreUnavailable {
                    message: e.to_string(),
                }
            }
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedRequest { .. } | Self::InvalidRoaster => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "Send a JSON body with flavors, name, roaster and shade",
            Self::InvalidRoaster => "Reference a roaster that exists in the roasters collection",
            Self::StoreUnavailable { .. } | Self::IterationFailure { .. } | Self::Store { .. } => {
                "Check the document store project, credentials and network reachability"
            }
            Self::Http(_) => "Check network connectivity to the document store endpoint",
            Self::Codec { .. } | Self::Serialization(_) => {
                "Inspect the documents for field types Firestore cannot represent"
            }
            Self::Auth(_) => {
                "Set GOOGLE_APPLICATION_CREDENTIALS or run on a host with a metadata server"
            }
            Self::Io(_) => "Check that the configuration file exists and is readable",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file and restart the service"
            }
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_client_error() {
            tracing::warn!("Rejected request: {}", self);
        } else {
            tracing::error!("Request failed: {}", self);
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
