//! Unified error type for zwogen
//!
//! The notation parser and segment compiler never fail: malformed text only
//! degrades the output. Everything here belongs to the I/O side of the crate
//! (rendering, storage, configuration, preset lookup).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all zwogen operations
#[derive(Debug, Error)]
pub enum ZwoError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML or JSON rendering failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The workout store could not persist a document
    #[error("Storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },

    /// No preset registered under the requested key
    #[error("Unknown preset: {key}")]
    UnknownPreset { key: String },

    /// Invalid caller input (empty name, zero repeats, out-of-range FTP)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for zwogen operations
pub type Result<T> = std::result::Result<T, ZwoError>;

impl From<quick_xml::Error> for ZwoError {
    fn from(err: quick_xml::Error) -> Self {
        ZwoError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ZwoError {
    fn from(err: serde_json::Error) -> Self {
        ZwoError::Serialization(err.to_string())
    }
}

impl ZwoError {
    /// Transient storage failures worth one more attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ZwoError::Io(_) | ZwoError::Storage { .. })
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ZwoError::Validation(_) => ErrorSeverity::Warning,
            ZwoError::UnknownPreset { .. } => ErrorSeverity::Warning,
            ZwoError::Serialization(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ZwoError::Storage { path, .. } => {
                format!("Could not save workout file to {}", path.display())
            }
            ZwoError::UnknownPreset { key } => {
                format!(
                    "No preset named '{}'. Run `zwogen presets` to see the available ones.",
                    key
                )
            }
            ZwoError::Validation(reason) => reason.clone(),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = ZwoError::Validation("Workout name is required".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = ZwoError::Serialization("bad cdata".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_retryable() {
        let err = ZwoError::Storage {
            path: PathBuf::from("/tmp/out.zwo"),
            reason: "disk full".to_string(),
        };
        assert!(err.is_retryable());

        let err = ZwoError::UnknownPreset {
            key: "nope".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = ZwoError::UnknownPreset {
            key: "sweet-spot".to_string(),
        };
        assert!(err.user_message().contains("sweet-spot"));

        let err = ZwoError::Storage {
            path: PathBuf::from("workouts/a.zwo"),
            reason: "denied".to_string(),
        };
        assert!(err.user_message().contains("Could not save"));
    }
}
