//! Error types shared by the parser front end and the collapse-state storage.
//!
//! Nothing in the visibility engine itself can fail. Errors only arise at the edges: reading a
//! document, compiling the tree-sitter grammar and queries, and touching durable storage.

use thiserror::Error;

/// Result type alias using foldmark's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures at the I/O and parsing edges of foldmark.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record or storage file was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tree-sitter grammar could not be loaded into the parser.
    #[error("Language error: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// A tree-sitter query failed to compile.
    #[error("Query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    /// The parser gave up on a document.
    #[error("Failed to parse {0}")]
    Parse(String),

    /// No per-user data directory exists on this platform.
    #[error("Could not determine data directory")]
    NoDataDir,
}
