//! Per-request parser context.

use serde::Serialize;
use smol_str::SmolStr;
use sqp_schema::ModelDescriptor;
use std::time::Instant;

use crate::error::{ParseError, ParseResult};
use crate::filter::Filter;
use crate::pagination::Pagination;
use crate::relations::IncludeTree;
use crate::types::OrderClause;

/// ORM query options handed to the executor.
///
/// Serializes to the option object an ORM `findAll` takes; empty parts are
/// left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    /// Associations to eager load.
    #[serde(skip_serializing_if = "IncludeTree::is_empty")]
    pub include: IncludeTree,
    /// Result ordering.
    #[serde(skip_serializing_if = "OrderClause::is_empty")]
    pub order: OrderClause,
    /// Filter conditions.
    #[serde(rename = "where", skip_serializing_if = "Filter::is_empty")]
    pub filter: Filter,
    /// Limit and offset.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// Attributes to project; `None` selects all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<SmolStr>>,
}

impl QueryOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Context carried through the step pipeline for one request.
///
/// Steps read the model from it and write their results into
/// [`QueryOptions`]. Nothing in it outlives the request.
#[derive(Debug, Clone)]
pub struct ParserContext {
    /// The model being queried, set by the configuration step.
    model: Option<ModelDescriptor>,
    /// Options built so far.
    options: QueryOptions,
    /// When parsing started.
    started_at: Instant,
}

impl Default for ParserContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserContext {
    /// Create a context with no model configured.
    pub fn new() -> Self {
        Self {
            model: None,
            options: QueryOptions::new(),
            started_at: Instant::now(),
        }
    }

    /// Create a context for `model`.
    pub fn for_model(model: ModelDescriptor) -> Self {
        let mut ctx = Self::new();
        ctx.set_model(model);
        ctx
    }

    /// Get the configured model, if any.
    pub fn model(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    /// Get the configured model or fail with a missing-context error.
    pub fn require_model(&self) -> ParseResult<&ModelDescriptor> {
        self.model.as_ref().ok_or_else(ParseError::model_not_configured)
    }

    /// Set the model.
    pub fn set_model(&mut self, model: ModelDescriptor) {
        self.model = Some(model);
    }

    /// Get the options built so far.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Get mutable options.
    pub fn options_mut(&mut self) -> &mut QueryOptions {
        &mut self.options
    }

    /// Consume the context, returning the options.
    pub fn into_options(self) -> QueryOptions {
        self.options
    }

    /// Get elapsed time in microseconds since parsing started.
    pub fn elapsed_us(&self) -> u64 {
        self.started_at.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::IncludeNode;
    use crate::types::OrderByField;
    use sqp_schema::{DataType, ModelDef, Schema};

    #[test]
    fn test_require_model() {
        let ctx = ParserContext::new();
        let err = ctx.require_model().unwrap_err();
        assert!(err.is_missing_context());

        let schema = Schema::builder()
            .model(ModelDef::new("User").attr("id", DataType::Integer))
            .build()
            .unwrap();
        let ctx = ParserContext::for_model(schema.model("User").unwrap());
        assert_eq!(ctx.require_model().unwrap().name(), "User");
    }

    #[test]
    fn test_empty_options_serialize_to_empty_object() {
        assert_eq!(QueryOptions::new().to_json(), serde_json::json!({}));
    }

    #[test]
    fn test_options_serialize() {
        let options = QueryOptions {
            include: [IncludeNode::new("posts")].into_iter().collect(),
            order: OrderClause::single(OrderByField::desc("id")),
            pagination: Some(Pagination { limit: 10, offset: 20 }),
            attributes: Some(vec!["id".into()]),
            ..QueryOptions::default()
        };

        assert_eq!(
            options.to_json(),
            serde_json::json!({
                "include": [{ "association": "posts", "required": false }],
                "order": [["id", "DESC"]],
                "limit": 10,
                "offset": 20,
                "attributes": ["id"],
            })
        );
    }
}
