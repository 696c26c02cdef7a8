//! Error types shared across ClaudeWatch components.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the settings store and the hook merge.
///
/// "Already registered" and "nothing to remove" are not errors; both
/// operations report those outcomes through their `changed` flag.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The stored document is not valid JSON. Fatal: the operator has to
    /// fix or remove the file, we never overwrite content we cannot parse.
    #[error("failed to parse settings at {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document (or its `hooks` subtree) is not the mapping shape we
    /// expect, so neither registration nor removal can proceed safely.
    #[error("settings {context} is not a JSON object")]
    NotAnObject { context: &'static str },

    #[error("settings I/O error at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
