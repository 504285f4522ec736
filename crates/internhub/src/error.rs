use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::jobs::ApplyError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Backend(BackendError),
    Apply(ApplyError),
    Export(csv::Error),
    Usage(String),
}

impl AppError {
    /// Short text for the person at the terminal; backend and apply failures keep the
    /// backend's own wording.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Backend(err) => err.user_message(),
            AppError::Apply(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Backend(err) => write!(f, "backend error: {}", err),
            AppError::Apply(err) => write!(f, "application error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Usage(message) => write!(f, "usage error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Backend(err) => Some(err),
            AppError::Apply(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Usage(_) => None,
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

impl From<BackendError> for AppError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<ApplyError> for AppError {
    fn from(value: ApplyError) -> Self {
        Self::Apply(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}
