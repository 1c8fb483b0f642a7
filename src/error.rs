//! Typed errors for planning, applying and store loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a planning pass before any plan is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
  /// Another planning pass is already in flight against this planner.
  ///
  /// Sessions are an explicit value owned by the caller; a concurrent attempt
  /// gets this typed result instead of consulting process-wide state.
  #[error("a planning pass is already in flight")]
  Busy,

  /// The external store reported unsaved editing state.
  ///
  /// The rendered message is the single error result line surfaced to the UI.
  #[error("Cannot run analysis with unsaved changes")]
  UnsavedState,
}

/// Errors that abort an apply before any mutation happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplyError {
  /// The configured group-settings template does not exist in the store.
  #[error("group template \"{name}\" not found")]
  TemplateNotFound {
    /// Name of the missing template.
    name: String,
  },
}

/// Errors raised while loading or persisting a JSON-backed store.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Reading the file failed.
  #[error("failed to read {}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },

  /// Parsing or serialising the JSON payload failed.
  #[error("failed to parse {}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source serde error.
    #[source]
    source: serde_json::Error,
  },
}
