//! Error types for schema construction and configuration loading.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while building a schema or loading `sqp.toml`.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(sqp::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid model definition.
    #[error("invalid model `{name}`: {message}")]
    #[diagnostic(code(sqp::schema::invalid_model))]
    InvalidModel { name: String, message: String },

    /// Invalid association definition.
    #[error("invalid association `{model}.{association}`: {message}")]
    #[diagnostic(
        code(sqp::schema::invalid_association),
        help("associations must name a model declared in the same schema")
    )]
    InvalidAssociation {
        model: String,
        association: String,
        message: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(sqp::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// The declared primary key is not an attribute of the model.
    #[error("model `{model}` declares primary key `{primary_key}` but has no such attribute")]
    #[diagnostic(code(sqp::schema::missing_primary_key))]
    MissingPrimaryKey { model: String, primary_key: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(sqp::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(sqp::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// Validation error with multiple issues.
    #[error("schema validation failed with {count} error(s)")]
    #[diagnostic(code(sqp::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an invalid model error.
    pub fn invalid_model(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidModel {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid association error.
    pub fn invalid_association(
        model: impl Into<String>,
        association: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAssociation {
            model: model.into(),
            association: association.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Collapse a list of errors into a single error.
    ///
    /// Returns `None` for an empty list and the error itself when there is
    /// exactly one.
    pub fn collect(mut errors: Vec<SchemaError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            count => Some(Self::ValidationFailed { count, errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SchemaError::invalid_association("User", "posts", "unknown target `Post`");
        assert_eq!(
            err.to_string(),
            "invalid association `User.posts`: unknown target `Post`"
        );
    }

    #[test]
    fn test_collect_errors() {
        assert!(SchemaError::collect(vec![]).is_none());

        let single = SchemaError::collect(vec![SchemaError::duplicate("model", "User")]);
        assert!(matches!(single, Some(SchemaError::Duplicate { .. })));

        let many = SchemaError::collect(vec![
            SchemaError::duplicate("model", "User"),
            SchemaError::config("bad"),
        ]);
        assert!(matches!(many, Some(SchemaError::ValidationFailed { count: 2, .. })));
    }
}
