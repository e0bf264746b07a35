use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::calculator::ResolveError;
use crate::delivery::DeliveryError;
use crate::settings::SettingsError;
use crate::tables::{ExportError, StoreError, ValidationError};

/// Failures surfaced to HTTP clients, each with a stable machine-readable code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Validation {
        message: String,
        line: Option<u64>,
        column: Option<&'static str>,
    },
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    ConfigurationMissing(String),
    #[error("admin token required")]
    Unauthorized,
    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation { .. } => "validation_failed",
            ApiError::Upstream(_) => "upstream_failure",
            ApiError::ConfigurationMissing(_) => "configuration_missing",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Storage(_) => "storage_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::ConfigurationMissing(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        if status.is_server_error() {
            error!(code, error = %self, "request failed");
        } else {
            warn!(code, error = %self, "request rejected");
        }

        let mut body = json!({
            "success": false,
            "code": code,
            "error": self.to_string(),
        });
        if let ApiError::Validation { line, column, .. } = &self {
            if let Some(line) = line {
                body["line"] = json!(line);
            }
            if let Some(column) = column {
                body["column"] = json!(column);
            }
        }

        (status, Json(body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::InvalidAmount { .. } => Self::InvalidInput(value.to_string()),
            ResolveError::NotFound { .. } => Self::NotFound(value.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation {
            line: value.line(),
            column: value.column(),
            message: value.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(value: ExportError) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<SettingsError> for ApiError {
    fn from(value: SettingsError) -> Self {
        match value {
            SettingsError::EmptyTemplate
            | SettingsError::EmptySubject
            | SettingsError::InvalidSenderEmail(_) => Self::InvalidInput(value.to_string()),
            SettingsError::Unavailable(_) | SettingsError::Snapshot(_) => {
                Self::Storage(value.to_string())
            }
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(value: DeliveryError) -> Self {
        Self::Upstream(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidInput(value.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        Self::InvalidInput(format!("unreadable upload: {}", value.body_text()))
    }
}
