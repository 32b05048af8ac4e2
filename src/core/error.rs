//! Error types for pvs1-refdata
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for reference data operations
#[derive(Debug, Error)]
pub enum RefDataError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Requested build has no configuration section
    #[error("Unknown genome build: {0}")]
    UnknownBuild(String),

    /// A configured data file failed to load
    #[error("Failed to load '{key}' from {path:?}: {source}")]
    Resource {
        key: String,
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// I/O errors outside of a specific resource
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading and resolving the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Configuration file could not be parsed
    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Options appear before the first section header
    #[error("Entries outside of any section in {0:?}")]
    MissingSectionHeader(PathBuf),

    /// Section is absent
    #[error("Missing section [{0}]")]
    MissingSection(String),

    /// Option is absent from a section (and from DEFAULT)
    #[error("Missing option '{key}' in section [{section}]")]
    MissingKey { section: String, key: String },
}

/// Errors raised by the flat-file and FASTA loaders
#[derive(Debug, Error)]
pub enum FormatError {
    /// Record has fewer columns than the format requires
    #[error("Expected at least {expected} fields at line {line}, found {found}")]
    TooFewFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Numeric column failed to parse
    #[error("Invalid {field} '{value}' at line {line}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// Structurally invalid record
    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// A key was mapped to two different values
    #[error("Conflicting mapping for '{key}' at line {line}: '{existing}' vs '{new}'")]
    ConflictingMapping {
        line: usize,
        key: String,
        existing: String,
        new: String,
    },

    /// FASTA layout problem reported while indexing
    #[error("Invalid FASTA: {0}")]
    InvalidFasta(String),

    /// Unsupported compression format
    #[error("Unsupported compression format: {0}")]
    UnsupportedCompression(String),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when fetching sequence from a loaded genome
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// Sequence name not present in the index
    #[error("Sequence not found in genome: {0}")]
    UnknownSequence(String),

    /// Invalid coordinate range
    #[error("Invalid coordinate range: start ({start}) > end ({end})")]
    InvalidRange { start: u64, end: u64 },

    /// Range runs past the end of the sequence
    #[error("Range {start}-{end} exceeds length {length} of {name}")]
    OutOfBounds {
        name: String,
        start: u64,
        end: u64,
        length: u64,
    },

    /// Indexed read failed
    #[error("Failed to read {name}: {message}")]
    Read { name: String, message: String },
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RefDataError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for loader operations
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Result type alias for sequence fetches
pub type SequenceResult<T> = std::result::Result<T, SequenceError>;
