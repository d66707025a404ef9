//! Error types for the Level-1B reader.

use thiserror::Error;

/// Errors that can occur while opening or reading a Level-1B product.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Structural corruption in the EPS record stream.
    #[error(transparent)]
    Format(#[from] eps_parser::EpsError),

    /// Failed to read the product file.
    #[error("failed to read product file: {0}")]
    FileRead(#[from] std::io::Error),

    /// No packaged schema exists for the requested resource key.
    #[error("schema resource not found: {0}")]
    SchemaNotFound(String),

    /// A packaged schema that does not deserialize.
    #[error("invalid schema {path}: {message}")]
    InvalidSchema { path: String, message: String },

    /// A variable name absent from the registry; a caller error, not a data
    /// condition.
    #[error("variable not defined: {0}")]
    VariableNotDefined(String),

    /// Flag values that are not a comma-separated numeric list.
    #[error("invalid flag values for '{name}': {values}")]
    InvalidFlagValues { name: String, values: String },

    /// The product contains no Main Product Header Record.
    #[error("product has no MPHR record")]
    MissingMphr,

    /// The product contains no Measurement Data Records.
    #[error("product has no MDR records")]
    MissingMdr,

    /// The MDR layout version is not the supported pair.
    #[error("unsupported MDR version: {subclass} v {version}")]
    UnsupportedMdrVersion { subclass: u8, version: u8 },

    /// A filename that does not follow the EPS product naming convention.
    #[error("cannot extract date from filename: {0}")]
    InvalidFilename(String),
}

/// Result type for reader operations.
pub type ReaderResult<T> = std::result::Result<T, ReaderError>;
