//! # Error Handling
//!
//! This module defines the centralized error type for bundle resolution. It
//! uses the `thiserror` library to build one `Error` enum covering every fatal
//! failure mode of the resolver, each with enough context to be surfaced
//! verbatim to the caller.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Configuration problems (`ConfigParse`,
//!   `ProfileExpression`, `UnknownPackage`, `ManifestParse`), graph problems
//!   (`UnresolvedReference`, `CycleDetected`) and wrapped errors from the
//!   underlying crates (`Io`, `Yaml`, `Json`, `InvalidPattern`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! A requirement whose version differs from the bundled one is *not* an
//! error. It is recorded as a [`crate::bundle::Diagnostic`] and the edge is
//! left out of the graph.

use thiserror::Error;

/// Main error type for bundle resolution
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document could not be interpreted.
    ///
    /// Carries an optional hint about how to fix the document.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A profile expression does not follow the `name{a|b}suffix` grammar.
    #[error("Invalid profile expression '{expression}': {message}")]
    ProfileExpression { expression: String, message: String },

    /// A package named in the configuration has no manifest.
    #[error("Unknown package '{name}': no manifest found")]
    UnknownPackage { name: String },

    /// A manifest exists but could not be read or is inconsistent.
    #[error("Manifest error for '{name}': {message}")]
    ManifestParse { name: String, message: String },

    /// A requirement points at a package that is not part of the bundle.
    #[error("Unresolved reference: {package} requires {reference}, which is not in the bundle")]
    UnresolvedReference { package: String, reference: String },

    /// Layering made no progress while packages remained.
    #[error("Dependency cycle detected among: {cycle}")]
    CycleDetected { cycle: String },

    /// A profile or scheme filter is not a valid regular expression.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
