use std::path::PathBuf;

use thiserror::Error;

/// The error type for `BANet-Burn` operations.
///
/// This enum covers everything that can go wrong while loading configuration
/// files, reading values out of a [`ConfigDict`](crate::ConfigDict), building
/// objects from specs and evaluating metrics.
#[derive(Error, Debug)]
pub enum BANetError {
    /// A key was looked up with subscript-style access and is not present.
    #[error("Missing key: '{key}'")]
    MissingKey {
        /// The key (or dotted path) that was not found.
        key: String,
    },

    /// A key was looked up with attribute-style access and is not present.
    #[error("'{type_name}' object has no attribute '{name}'")]
    MissingAttribute {
        /// The concrete container type.
        type_name: &'static str,
        /// The attribute that was requested.
        name: String,
    },

    /// The configuration file does not carry a supported extension.
    #[error("Only {expected} files can be parsed, but got {file_name} instead")]
    WrongFileType {
        /// The offending file name.
        file_name: String,
        /// Human readable list of accepted suffixes.
        expected: String,
    },

    /// The configuration file does not exist.
    #[error("There is no file at the path {}", path.display())]
    FileNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The configuration file stem contains a dot.
    #[error("Dots are not allowed in config file names: '{stem}'")]
    MalformedModuleName {
        /// The file stem that was rejected.
        stem: String,
    },

    /// An object spec is missing a required field.
    #[error("Missing required field: '{field}'")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// No constructor is registered under the requested type name.
    #[error("Unknown type '{name}', known types: [{}]", known.join(", "))]
    UnknownType {
        /// The requested type name.
        name: String,
        /// Type names that could have been built.
        known: Vec<String>,
    },

    /// A constructor rejected the arguments it was given.
    #[error("Invalid arguments for '{name}': {reason}")]
    InvalidArguments {
        /// The type name being built.
        name: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// A value has the wrong type for the way it is being read.
    #[error("Invalid value at '{key}': expected {expected}")]
    InvalidValue {
        /// The key holding the value.
        key: String,
        /// The expected kind of value.
        expected: &'static str,
    },

    /// A parsed document does not have the shape of a configuration.
    #[error("Invalid configuration document {}: {reason}", path.display())]
    InvalidDocument {
        /// The document that was parsed.
        path: PathBuf,
        /// Why the document was rejected.
        reason: String,
    },

    /// A configuration file includes itself, directly or transitively.
    #[error("Include cycle detected at {}", path.display())]
    IncludeCycle {
        /// The file that was reached a second time.
        path: PathBuf,
    },

    /// Two inputs that must have the same length do not.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// The expected shape.
        expected: String,
        /// The actual shape.
        actual: String,
    },

    /// A tensor could not be converted or inspected.
    #[error("Tensor operation failed: {operation}")]
    TensorOperationFailed {
        /// A description of the failed tensor operation.
        operation: String,
    },

    /// Reading a file failed.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// A TOML document could not be parsed.
    #[error("Failed to parse TOML config: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON config: {0}")]
    ParseJson(#[from] serde_json::Error),
}

/// A specialized `Result` type for `BANet-Burn` operations.
pub type BANetResult<T> = Result<T, BANetError>;
