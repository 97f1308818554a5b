use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShimError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load artifact '{path}': {message}")]
    ArtifactError { path: String, message: String },

    #[error("{message}")]
    MalformedPayload { message: String },

    #[error("{message}")]
    TypeMismatch { feature: String, message: String },

    #[error("{message}")]
    ModelError { message: String },
}

/// Where in the process lifetime an error can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Fatal before the listener is bound.
    Startup,
    /// Scoped to a single prediction request.
    Request,
}

impl ShimError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ShimError::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        ShimError::ModelError {
            message: message.into(),
        }
    }

    pub fn artifact(path: impl Into<String>, message: impl Into<String>) -> Self {
        ShimError::ArtifactError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ShimError::MalformedPayload { .. }
            | ShimError::TypeMismatch { .. }
            | ShimError::ModelError { .. } => ErrorCategory::Request,
            _ => ErrorCategory::Startup,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShimError::IoError(_) => "Check that the bind address is free and the artifact files are readable",
            ShimError::ConfigError { .. } | ShimError::ConfigValidationError { .. } => {
                "Review the configuration file and referenced environment variables"
            }
            ShimError::InvalidConfigValueError { .. } => {
                "Fix the reported configuration field and restart"
            }
            ShimError::ArtifactError { .. } => {
                "Re-export the model and column artifacts and verify the configured paths"
            }
            ShimError::MalformedPayload { .. } => "Send a JSON object mapping feature names to numbers",
            ShimError::TypeMismatch { .. } => "Send numeric values for every feature",
            ShimError::ModelError { .. } => "Verify the model was trained on the configured feature columns",
        }
    }
}

pub type Result<T> = std::result::Result<T, ShimError>;
