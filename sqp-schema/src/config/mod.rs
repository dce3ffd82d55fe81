//! Configuration file parsing for `sqp.toml`.
//!
//! ```toml
//! [query]
//! default_limit = 25
//! max_limit = 100
//! default_order_attribute = "createdAt"
//!
//! [debug]
//! log_parsed_queries = true
//!
//! [models.User]
//! table = "users"
//! primary_key = "id"
//!
//! [models.User.attributes]
//! id = { type = "integer" }
//! createdAt = { type = "date", field = "created_at" }
//!
//! [models.User.associations]
//! posts = { target = "Post", kind = "has_many" }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::model::{Association, AssociationKind, Attribute, DataType, ModelDef};
use crate::schema::Schema;

/// Main configuration structure for `sqp.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SqpConfig {
    /// Query-parsing defaults.
    #[serde(default)]
    pub query: QueryConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Model declarations, keyed by model name.
    #[serde(default)]
    pub models: IndexMap<String, ModelConfig>,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl SqpConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content)?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.query.validate()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    ///
    /// The query limits are validated again once the overrides are in place.
    pub fn with_environment(mut self, env: &str) -> SchemaResult<Self> {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(query) = overrides.query {
                if let Some(limit) = query.default_limit {
                    self.query.default_limit = limit;
                }
                if let Some(limit) = query.max_limit {
                    self.query.max_limit = limit;
                }
                if let Some(attribute) = query.default_order_attribute {
                    self.query.default_order_attribute = attribute;
                }
            }
            if let Some(debug) = overrides.debug {
                if let Some(log) = debug.log_parsed_queries {
                    self.debug.log_parsed_queries = log;
                }
                if let Some(level) = debug.log_level {
                    self.debug.log_level = Some(level);
                }
            }
        }
        self.query.validate()?;
        Ok(self)
    }

    /// Build the schema declared under `[models]`.
    pub fn to_schema(&self) -> SchemaResult<Arc<Schema>> {
        Schema::builder()
            .models(
                self.models
                    .iter()
                    .map(|(name, model)| model.to_model_def(name)),
            )
            .build()
    }
}

/// Query-parsing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size when the request sets no `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Upper bound applied to any requested `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,

    /// Attribute preferred for the default ordering.
    #[serde(default = "default_order_attribute")]
    pub default_order_attribute: String,
}

impl QueryConfig {
    /// Check that both limits are positive and the default fits the maximum.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(SchemaError::config("query limits must be greater than zero"));
        }
        if self.default_limit > self.max_limit {
            return Err(SchemaError::config(format!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_order_attribute: default_order_attribute(),
        }
    }
}

fn default_limit() -> u64 { 25 }
fn default_max_limit() -> u64 { 100 }
fn default_order_attribute() -> String { "createdAt".to_string() }

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every parsed set of query options at info level.
    #[serde(default)]
    pub log_parsed_queries: bool,

    /// Log level used when no environment variable sets one.
    pub log_level: Option<String>,
}

/// A model declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Table name (defaults to the model name).
    pub table: Option<String>,

    /// Primary-key attribute.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Attributes, keyed by name.
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeConfig>,

    /// Associations, keyed by name.
    #[serde(default)]
    pub associations: IndexMap<String, AssociationConfig>,
}

fn default_primary_key() -> String { "id".to_string() }

impl ModelConfig {
    fn to_model_def(&self, name: &str) -> ModelDef {
        let mut def = ModelDef::new(name).primary_key(self.primary_key.as_str());
        if let Some(table) = &self.table {
            def = def.table(table.as_str());
        }
        for (attr_name, attr) in &self.attributes {
            let attribute = Attribute::new(attr_name.as_str(), attr.data_type);
            def = def.attribute(match &attr.field {
                Some(field) => attribute.field(field.as_str()),
                None => attribute,
            });
        }
        for (assoc_name, assoc) in &self.associations {
            def = def.association(Association::new(
                assoc_name.as_str(),
                assoc.kind,
                assoc.target.as_str(),
            ));
        }
        def
    }
}

/// An attribute declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
    /// Storage type.
    #[serde(rename = "type", default)]
    pub data_type: DataType,

    /// Storage column, when it differs from the attribute name.
    pub field: Option<String>,
}

/// An association declaration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssociationConfig {
    /// Target model name.
    pub target: String,

    /// Association kind.
    #[serde(default)]
    pub kind: AssociationKind,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Query overrides.
    pub query: Option<QueryOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Query configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryOverride {
    /// Override default_limit.
    pub default_limit: Option<u64>,

    /// Override max_limit.
    pub max_limit: Option<u64>,

    /// Override default_order_attribute.
    pub default_order_attribute: Option<String>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_parsed_queries.
    pub log_parsed_queries: Option<bool>,

    /// Override log_level.
    pub log_level: Option<String>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left untouched.
fn expand_env_vars(content: &str) -> SchemaResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| SchemaError::config(e.to_string()))?;

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    Ok(result)
}
