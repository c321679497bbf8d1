//! Error types for wshlnk.
//!
//! `LnkError` is what every public operation returns. Backend calls against the
//! shell automation service fail with the lower-level `CallError`, which the
//! session and mapper wrap with the context (path or field) of the step that
//! failed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::shortcut::ShortcutField;

/// Main error type for shortcut operations.
#[derive(Debug, Error)]
pub enum LnkError {
    // Session errors
    #[error("Shell automation unavailable")]
    AutomationUnavailable {
        #[source]
        source: CallError,
    },

    #[error("Failed to open shortcut at {path:?}")]
    ShortcutOpenFailed {
        path: PathBuf,
        #[source]
        source: CallError,
    },

    // Property transfer errors
    #[error("Failed to read shortcut property {field}")]
    PropertyReadFailed {
        field: ShortcutField,
        #[source]
        source: CallError,
    },

    #[error("Failed to write shortcut property {field}")]
    PropertyWriteFailed {
        field: ShortcutField,
        #[source]
        source: CallError,
    },

    #[error("Failed to save shortcut to {path:?}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: CallError,
    },

    // Validation errors
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: ShortcutField, message: String },
}

/// Result type alias for shortcut operations.
pub type Result<T> = std::result::Result<T, LnkError>;

impl LnkError {
    /// Create an `AutomationUnavailable` error from a failed backend call.
    pub fn unavailable(err: CallError) -> Self {
        LnkError::AutomationUnavailable { source: err }
    }

    /// Create a `ShortcutOpenFailed` error with path context.
    pub fn open_failed(path: impl Into<PathBuf>, err: CallError) -> Self {
        LnkError::ShortcutOpenFailed {
            path: path.into(),
            source: err,
        }
    }

    /// The shortcut field a property transfer error refers to.
    pub fn field(&self) -> Option<ShortcutField> {
        match self {
            LnkError::PropertyReadFailed { field, .. }
            | LnkError::PropertyWriteFailed { field, .. }
            | LnkError::InvalidValue { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// Whether the on-disk shortcut may have been left in an unknown state.
    ///
    /// Only a failed save can have touched the file; every earlier failure
    /// aborts before anything is committed.
    pub fn leaves_file_untrusted(&self) -> bool {
        matches!(self, LnkError::SaveFailed { .. })
    }

    /// Check if this error should trigger a retry.
    ///
    /// Automation calls are not guaranteed idempotent, so nothing is.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Convert to a process exit code (sysexits.h values).
    ///
    /// - 64: invalid value supplied by the caller
    /// - 65: property transfer failed
    /// - 66: shortcut could not be opened
    /// - 69: automation service unavailable
    /// - 74: save failed
    pub fn to_exit_code(&self) -> i32 {
        match self {
            LnkError::InvalidValue { .. } => 64,
            LnkError::PropertyReadFailed { .. } | LnkError::PropertyWriteFailed { .. } => 65,
            LnkError::ShortcutOpenFailed { .. } => 66,
            LnkError::AutomationUnavailable { .. } => 69,
            LnkError::SaveFailed { .. } => 74,
        }
    }
}

/// Failure of a single call against the automation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallError {
    /// Human-readable description from the backend.
    pub message: String,
    /// Backend status code (an `HRESULT` on Windows), if any.
    pub code: Option<i32>,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (0x{:08X})", self.message, code as u32),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for CallError {}
