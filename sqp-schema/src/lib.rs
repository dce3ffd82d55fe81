//! # sqp-schema
//!
//! Model descriptors and configuration for the sqp query-string parser.
//!
//! This crate provides:
//! - Model definitions (attributes, associations, primary key)
//! - An immutable [`Schema`] registry with association targets resolved up front
//! - Cheap [`ModelDescriptor`] handles used at request time
//! - Configuration parser for `sqp.toml` files
//!
//! ## Example
//!
//! ```rust
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! let schema = Schema::builder()
//!     .model(
//!         ModelDef::new("User")
//!             .attr("id", DataType::Integer)
//!             .attr("createdAt", DataType::Date)
//!             .has_many("posts", "Post"),
//!     )
//!     .model(ModelDef::new("Post").attr("id", DataType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let user = schema.model("User").unwrap();
//! assert_eq!(user.target("posts").unwrap().name(), "Post");
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod schema;

pub use config::{DebugConfig, QueryConfig, SqpConfig};
pub use error::{SchemaError, SchemaResult};
pub use model::{Association, AssociationKind, Attribute, DataType, ModelDef, ModelDescriptor};
pub use schema::{Schema, SchemaBuilder};
