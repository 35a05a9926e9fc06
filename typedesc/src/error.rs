//! Error types for the crate.
//!
//! Describing an annotation never fails; unrecognized shapes degrade to the
//! `unknown` kind. The errors here cover the two things that can go wrong
//! around it: binding a string annotation to a type, and loading
//! configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::SyntaxError;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A model's fields could not be extracted.
    #[error("Failed to extract model fields: {0}")]
    Extract(#[from] ExtractError),

    /// Configuration could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Error while binding an annotation to concrete types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A name is bound neither in the namespace nor among the builtins.
    #[error("name '{name}' is not defined")]
    UndefinedName { name: String },

    /// A string annotation is not a valid annotation expression.
    #[error("invalid annotation {annotation:?}: {source}")]
    Syntax {
        annotation: String,
        source: SyntaxError,
    },

    /// A typing form was subscripted with the wrong arguments.
    #[error("{form}[...] {message}")]
    InvalidForm { form: &'static str, message: String },

    /// A `Literal[...]` argument is not a literal value.
    #[error("Literal[...] accepts only literal values, found {found}")]
    InvalidLiteral { found: String },

    /// A value that takes no type arguments was subscripted.
    #[error("'{target}' is not subscriptable")]
    NotSubscriptable { target: String },
}

/// Error while extracting the fields of one data-model class.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A field annotation could not be resolved.
    #[error("cannot resolve annotation of field '{field}' on model '{model}': {source}")]
    Resolution {
        model: String,
        field: String,
        source: ResolveError,
    },
}

impl ExtractError {
    /// Name of the model whose extraction failed.
    pub fn model(&self) -> &str {
        match self {
            ExtractError::Resolution { model, .. } => model,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ExtractError::Resolution { field, .. } => field,
        }
    }
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unexpected values.
    #[error("Invalid configuration{}: {message}", location(.path))]
    InvalidToml {
        path: Option<PathBuf>,
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid-TOML error.
    pub fn invalid_toml(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::InvalidToml {
            path,
            message: message.into(),
        }
    }
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" in {}", path.display()),
        None => String::new(),
    }
}
