//! # sqp-query
//!
//! Turns HTTP query-string parameters into ORM query options.
//!
//! This crate provides:
//! - Include trees for eager loading (`include=posts.comments`)
//! - Order resolution with model-aware defaults (`order=name:desc`)
//! - Typed filter conditions (`age[gte]=18`)
//! - Offset pagination (`page`, `limit`, `offset`)
//! - Attribute selection (`fields=id,name`)
//! - A step pipeline that runs all of the above per request
//!
//! ## Includes
//!
//! ```rust
//! use sqp_query::build_include;
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("User").attr("id", DataType::Integer).has_many("posts", "Post"))
//!     .model(ModelDef::new("Post").attr("id", DataType::Integer).has_many("comments", "Comment"))
//!     .model(ModelDef::new("Comment").attr("id", DataType::Integer))
//!     .build()
//!     .unwrap();
//! let user = schema.model("User").unwrap();
//!
//! let tree = build_include(&user, "posts.comments").unwrap();
//! assert_eq!(tree.nodes()[0].association, "posts");
//! assert_eq!(tree.nodes()[0].include[0].association, "comments");
//!
//! assert!(build_include(&user, "comments").is_err());
//! ```
//!
//! ## Ordering
//!
//! ```rust
//! use sqp_query::{resolve_order, OrderByField, OrderClause};
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("User").attr("id", DataType::Integer).attr("name", DataType::String))
//!     .build()
//!     .unwrap();
//! let user = schema.model("User").unwrap();
//!
//! // No createdAt attribute, so the primary key is used
//! let order = resolve_order(&user, None).unwrap();
//! assert_eq!(order, OrderClause::single(OrderByField::desc("id")));
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sqp_query::{ErrorCode, ParseError, INTERNAL_ERROR_MESSAGE};
//!
//! let err = ParseError::invalid_include("User", "comments");
//! assert_eq!(err.code, ErrorCode::InvalidInclude);
//! assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
//! ```

pub mod error;
pub mod filter;
pub mod logging;
pub mod middleware;
pub mod order;
pub mod pagination;
pub mod params;
pub mod relations;
pub mod types;

pub use error::{
    ErrorCode, ErrorContext, INTERNAL_ERROR_MESSAGE, MODEL_NOT_CONFIGURED, PARSER_DATA_NOT_FOUND,
    ParseError, ParseResult,
};
pub use filter::{Condition, Filter, FilterOperator, FilterValue, build_where};
pub use middleware::{ParserContext, Pipeline, PipelineBuilder, QueryOptions, Step};
pub use order::{DEFAULT_ORDER_ATTRIBUTE, resolve_order, resolve_order_with};
pub use pagination::{Pagination, paginate};
pub use params::{QueryParams, RESERVED_PARAMS};
pub use relations::{IncludeNode, IncludeTree, build_include, select_attributes};
pub use types::{OrderByField, OrderClause, SortOrder};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::error::{ErrorCode, ParseError, ParseResult};
    pub use crate::middleware::{ParserContext, Pipeline, QueryOptions, Step, StepResult};
    pub use crate::params::QueryParams;
    pub use crate::relations::{IncludeNode, IncludeTree};
    pub use crate::types::{OrderByField, OrderClause, SortOrder};
    pub use sqp_schema::{ModelDescriptor, QueryConfig, Schema};
}
