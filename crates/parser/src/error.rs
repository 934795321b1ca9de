use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that make a source file unusable even for best-effort analysis
#[derive(Error, Debug)]
pub enum ParseError {
    /// File extension has no grammar
    #[error("Unsupported source language: {0}")]
    UnsupportedLanguage(String),

    /// Tree-sitter setup failed
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Tree-sitter returned no tree at all
    #[error("Parser produced no syntax tree")]
    NoTree,

    /// Recovery left too much of the file inside error nodes
    #[error("Source too malformed to recover: {error_bytes} of {total_bytes} bytes are syntax errors")]
    Unrecoverable {
        error_bytes: usize,
        total_bytes: usize,
    },

    /// Syntax nested deeper than the configured limit
    #[error("Syntax nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

impl ParseError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }
}
