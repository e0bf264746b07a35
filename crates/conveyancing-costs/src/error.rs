use crate::config::ConfigError;
use crate::delivery::DeliveryError;
use crate::settings::SettingsError;
use crate::tables::{StoreError, ValidationError};
use crate::telemetry::TelemetryError;
use std::fmt;

/// Process-level failures: start-up, serving and the command-line tools.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(StoreError),
    Settings(SettingsError),
    Delivery(DeliveryError),
    Import(ValidationError),
    Quote(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Settings(err) => write!(f, "settings error: {}", err),
            AppError::Delivery(err) => write!(f, "delivery error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Quote(message) => write!(f, "quote error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Settings(err) => Some(err),
            AppError::Delivery(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Quote(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<SettingsError> for AppError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

impl From<DeliveryError> for AppError {
    fn from(value: DeliveryError) -> Self {
        Self::Delivery(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Import(value)
    }
}

impl From<crate::calculator::ResolveError> for AppError {
    fn from(value: crate::calculator::ResolveError) -> Self {
        Self::Quote(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TableKind;
    use std::error::Error as _;

    #[test]
    fn import_errors_keep_their_source() {
        let error = AppError::from(ValidationError::Empty {
            kind: TableKind::Bond,
        });
        assert_eq!(
            error.to_string(),
            "import error: the bond cost table has no data rows"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn resolve_errors_become_quote_errors() {
        let error = AppError::from(crate::calculator::ResolveError::InvalidAmount {
            kind: TableKind::Transfer,
        });
        assert!(matches!(error, AppError::Quote(_)));
        assert!(error.to_string().contains("greater than zero"));
    }
}
