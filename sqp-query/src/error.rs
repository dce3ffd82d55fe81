//! Error types for query-string parsing.
//!
//! Every failure carries an [`ErrorCode`] and a detailed message for logs.
//! What a client gets to see is always the same generic message, see
//! [`ParseError::public_message`].
//!
//! # Error Codes
//!
//! Error codes follow a pattern: SQP{category}{number}
//! - 1xxx: Context errors (parser data or model missing)
//! - 2xxx: Request errors (unknown include, attribute, filter, parameter)
//! - 3xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sqp_query::{ErrorCode, ParseError};
//!
//! let err = ParseError::invalid_include("User", "posts.nope");
//! assert_eq!(err.code, ErrorCode::InvalidInclude);
//! assert_eq!(err.message, "Invalid include for model User");
//! assert_eq!(err.public_message(), "Internal server error");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Message exposed to clients for every parsing failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message used when a step runs without parser data on the request.
pub const PARSER_DATA_NOT_FOUND: &str = "Query parser data not found on request";

/// Message used when parser data exists but no model was configured.
pub const MODEL_NOT_CONFIGURED: &str = "Model not configured for query parser";

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Context errors (1xxx)
    /// Parser data or model descriptor missing from the request (SQP1001).
    MissingContext = 1001,

    // Request errors (2xxx)
    /// An include path names an unreachable association (SQP2001).
    InvalidInclude = 2001,
    /// Unknown sort attribute, sort direction or selected attribute (SQP2002).
    InvalidAttribute = 2002,
    /// Malformed filter parameter (SQP2003).
    InvalidFilter = 2003,
    /// Malformed pagination or other parameter (SQP2004).
    InvalidParameter = 2004,

    // Configuration errors (3xxx)
    /// Invalid schema or parser configuration (SQP3001).
    InvalidConfiguration = 3001,

    // Internal errors (9xxx)
    /// Internal error (SQP9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "SQP2001").
    pub fn code(&self) -> String {
        format!("SQP{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingContext => "Missing parser context",
            Self::InvalidInclude => "Invalid include",
            Self::InvalidAttribute => "Invalid attribute",
            Self::InvalidFilter => "Invalid filter",
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }

    /// Whether the error stems from the request rather than from setup.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInclude
                | Self::InvalidAttribute
                | Self::InvalidFilter
                | Self::InvalidParameter
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// The model involved.
    pub model: Option<String>,
    /// The query parameter involved.
    pub parameter: Option<String>,
    /// The offending value.
    pub value: Option<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while translating a query string.
#[derive(Error, Debug)]
pub struct ParseError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl ParseError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the query parameter.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.context.parameter = Some(parameter.into());
        self
    }

    /// Set the offending value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.context.value = Some(value.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// The request carries no parser data at all.
    pub fn parser_data_not_found() -> Self {
        Self::new(ErrorCode::MissingContext, PARSER_DATA_NOT_FOUND)
            .with_help("Install the query parser layer before the route handler")
    }

    /// Parser data exists but no model descriptor was configured.
    pub fn model_not_configured() -> Self {
        Self::new(ErrorCode::MissingContext, MODEL_NOT_CONFIGURED)
            .with_help("Run the model configuration step before building query options")
    }

    /// An include path is not reachable from `model`.
    pub fn invalid_include(model: impl Into<String>, path: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::InvalidInclude,
            format!("Invalid include for model {}", model),
        )
        .with_model(model)
        .with_parameter("include")
        .with_value(path)
    }

    /// An attribute is not declared on `model`.
    pub fn invalid_attribute(
        model: impl Into<String>,
        parameter: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        let model = model.into();
        let attribute = attribute.into();
        Self::new(
            ErrorCode::InvalidAttribute,
            format!("Attribute {} does not exist on model {}", attribute, model),
        )
        .with_model(model)
        .with_parameter(parameter)
        .with_value(attribute)
    }

    /// A sort direction other than ASC or DESC.
    pub fn invalid_direction(model: impl Into<String>, direction: impl Into<String>) -> Self {
        let direction = direction.into();
        Self::new(
            ErrorCode::InvalidAttribute,
            format!("Invalid sort direction {}", direction),
        )
        .with_model(model)
        .with_parameter("order")
        .with_value(direction)
        .with_help("Use asc or desc")
    }

    /// A malformed filter parameter.
    pub fn invalid_filter(
        model: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let parameter = parameter.into();
        Self::new(
            ErrorCode::InvalidFilter,
            format!("Invalid filter {}: {}", parameter, message.into()),
        )
        .with_model(model)
        .with_parameter(parameter)
    }

    /// A malformed parameter value.
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        let parameter = parameter.into();
        Self::new(
            ErrorCode::InvalidParameter,
            format!("Invalid value for {}: {}", parameter, message.into()),
        )
        .with_parameter(parameter)
    }

    /// Invalid schema or parser configuration.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    // ============== Error Type Checks ==============

    /// Check if this is a missing-context error.
    pub fn is_missing_context(&self) -> bool {
        self.code == ErrorCode::MissingContext
    }

    /// Check if this error was caused by the request's query string.
    pub fn is_client_error(&self) -> bool {
        self.code.is_client_error()
    }

    /// The message safe to show to API consumers.
    ///
    /// Detail stays in [`Display`](fmt::Display) output for logs.
    pub fn public_message(&self) -> &'static str {
        INTERNAL_ERROR_MESSAGE
    }

    /// Display the full error with all context.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref parameter) = self.context.parameter {
            output.push_str(&format!("  → Parameter: {}\n", parameter));
        }
        if let Some(ref value) = self.context.value {
            output.push_str(&format!("  → Value: {}\n", value));
        }
        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<sqp_schema::SchemaError> for ParseError {
    fn from(err: sqp_schema::SchemaError) -> Self {
        Self::configuration(err.to_string()).with_source(err)
    }
}
