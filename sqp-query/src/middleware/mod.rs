//! Request pipeline that turns query parameters into ORM options.
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s sharing one
//! [`ParserContext`]. The standard pipeline configures the route's model and
//! then resolves includes, order, filters, pagination and attribute
//! selection. Any step failing stops the run.
//!
//! # Example
//!
//! ```rust
//! use sqp_query::QueryParams;
//! use sqp_query::middleware::{ParserContext, Pipeline, StepResult};
//! use sqp_schema::{DataType, ModelDef, QueryConfig, Schema};
//!
//! let schema = Schema::builder()
//!     .model(ModelDef::new("User").attr("id", DataType::Integer).has_many("posts", "Post"))
//!     .model(ModelDef::new("Post").attr("id", DataType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let mut pipeline = Pipeline::standard(schema.model("User").unwrap(), &QueryConfig::default());
//! pipeline.push(|ctx: &mut ParserContext, _params: &QueryParams| -> StepResult {
//!     assert!(ctx.model().is_some());
//!     Ok(())
//! });
//!
//! let ctx = pipeline.run(&QueryParams::parse("include=posts&order=id:asc")).unwrap();
//! assert_eq!(ctx.options().include.len(), 1);
//! ```

mod chain;
mod context;
mod steps;
mod types;

pub use chain::{Pipeline, PipelineBuilder};
pub use context::{ParserContext, QueryOptions};
pub use steps::{BuildInclude, BuildWhere, ConfigureModel, Paginate, ResolveOrder, SelectAttributes};
pub use types::{IntoSharedStep, SharedStep, Step, StepResult};
