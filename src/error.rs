//! Error types for rendering and schema loading.

use std::path::PathBuf;

/// Failure to render a parameter line or class block.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The parameter has no entry in its class's constraint mapping.
    #[error("class `{class}` declares no constraint for parameter `{param}`")]
    MissingConstraint { class: String, param: String },

    #[error("enumeration has no values to document")]
    EmptyEnum,

    /// The descriptor is of a known kind but in a shape the renderer has no
    /// text for. Means the dispatch in `render` needs extending.
    #[error("no rendering for constraint {0}")]
    Unsupported(String),
}

/// Failure to locate or parse schema input.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("at JSON path {pointer} → {source}")]
    Json {
        pointer: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("class `{class}` declares parameter `{param}` more than once")]
    DuplicateParam { class: String, param: String },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("unreadable glob match: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("glob pattern matched no files: {0}")]
    NoMatches(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
pub type SchemaResult<T> = Result<T, SchemaError>;
