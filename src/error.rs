//! Error handling types and utilities.

use std::path::PathBuf;

/// A specialized Result type for module-usage-tracker operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` on startup, configuration and CLI paths. Request paths use the
/// typed errors below.
pub type Result<T> = anyhow::Result<T>;

/// Error returned by a [`DocumentStore`](crate::store::DocumentStore) query.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store cannot be reached at all (missing root, poisoned state).
    #[error("document store unreachable: {reason}")]
    Unreachable { reason: String },
    /// Reading a stored document failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A stored document could not be decoded.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Error returned when the module registry manifest cannot be loaded.
///
/// Registry absence is never fatal: providers log this and report an empty registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("module registry not readable at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("module registry at {} is malformed: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure of a detail lookup. Each variant maps to a user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetailError {
    /// Missing or mismatched anti-forgery token, or the caller lacks the capability.
    #[error("Unauthorized access")]
    Unauthorized,
    /// The request carried no module identifier.
    #[error("No module specified")]
    MissingModuleParameter,
    /// The module is not part of the current registry scan.
    #[error("Module not found")]
    ModuleNotFound {
        module: String,
        /// Registry identifiers that look close to the requested one.
        suggestions: Vec<String>,
    },
    /// The aggregation task itself failed.
    #[error("Module scan failed: {0}")]
    ScanFailed(String),
}

impl DetailError {
    /// Close registry names offered for an unknown module.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::ModuleNotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}
