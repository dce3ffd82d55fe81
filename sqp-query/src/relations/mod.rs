//! Association includes and attribute selection.
//!
//! This module turns the `include` and `fields` query parameters into the
//! option trees an ORM executor consumes:
//! - [`build_include`] validates dotted association paths and nests them
//! - [`select_attributes`] restricts the projected attributes
//!
//! ## Example
//!
//! ```rust
//! use sqp_query::relations::build_include;
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
//! ```

mod include;
mod select;

pub use include::{IncludeNode, IncludeTree, build_include};
pub use select::select_attributes;
