//! Crate-level error handling for imaginary worlds
//!
//! Storage-level failures live in [`crate::world::storage::StorageError`];
//! this module wraps them together with the failures of world creation and
//! configuration so hosts deal with a single error type.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::world::storage::StorageError;

/// Main error type for imaginary world creation and hosting
#[derive(Debug)]
pub enum ImaginaryError {
    // Creation Errors
    UnknownTemplate {
        folder: String,
    },
    NoMatchingProvider {
        path: PathBuf,
    },
    AlreadyWritable {
        folder: String,
    },

    // Storage Errors
    Storage(StorageError),

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
    Config {
        error: String,
    },

    // System Errors
    Io {
        path: String,
        error: String,
    },
    WorldNotFound {
        id: u32,
    },
}

impl fmt::Display for ImaginaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImaginaryError::UnknownTemplate { folder } => write!(
                f,
                "Unknown template world '{}', use create_void() if a template is unneeded",
                folder
            ),
            ImaginaryError::NoMatchingProvider { path } => write!(
                f,
                "Imaginary world template matched no provider: {}",
                path.display()
            ),
            ImaginaryError::AlreadyWritable { folder } => write!(
                f,
                "'{}' is already loaded as a writable world and cannot be a template, operate on it directly instead",
                folder
            ),

            ImaginaryError::Storage(e) => write!(f, "Storage error: {}", e),

            ImaginaryError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
            ImaginaryError::Config { error } => write!(f, "Config parse error: {}", error),

            ImaginaryError::Io { path, error } => write!(f, "IO error for {}: {}", path, error),
            ImaginaryError::WorldNotFound { id } => write!(f, "World not found: {}", id),
        }
    }
}

impl StdError for ImaginaryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ImaginaryError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Type alias for Results across the crate
pub type ImaginaryResult<T> = Result<T, ImaginaryError>;

impl From<StorageError> for ImaginaryError {
    fn from(error: StorageError) -> Self {
        ImaginaryError::Storage(error)
    }
}

impl From<std::io::Error> for ImaginaryError {
    fn from(error: std::io::Error) -> Self {
        ImaginaryError::Io {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<toml::de::Error> for ImaginaryError {
    fn from(error: toml::de::Error) -> Self {
        ImaginaryError::Config {
            error: error.to_string(),
        }
    }
}

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_imaginary<F>(self, f: F) -> ImaginaryResult<T>
    where
        F: FnOnce() -> ImaginaryError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_imaginary<F>(self, f: F) -> ImaginaryResult<T>
    where
        F: FnOnce() -> ImaginaryError,
    {
        self.ok_or_else(f)
    }
}
