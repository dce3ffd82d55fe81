//! # sqp
//!
//! Translate HTTP query strings into ORM query options.
//!
//! sqp provides:
//! - Model descriptors with associations and storage fields
//! - Validated include trees for eager loading
//! - Order resolution with model-aware defaults
//! - Typed filters, pagination and attribute selection
//! - An axum layer and extractor (feature `axum`)
//!
//! ## Quick Start
//!
//! ```rust
//! use sqp::prelude::*;
//! use sqp::schema::{DataType, ModelDef};
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
//! let pipeline = Pipeline::standard(schema.model("User").unwrap(), &QueryConfig::default());
//! let ctx = pipeline.run(&QueryParams::parse("include=posts&id[gt]=10")).unwrap();
//!
//! let options = ctx.options();
//! assert_eq!(options.include.len(), 1);
//! assert_eq!(options.order, OrderClause::single(OrderByField::desc("createdAt")));
//! assert_eq!(options.filter.len(), 1);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Model descriptors, schema registry and configuration.
pub mod schema {
    pub use sqp_schema::*;
}

/// Query-string parsing into ORM options.
pub mod query {
    pub use sqp_query::*;
}

/// Axum integration.
#[cfg(feature = "axum")]
#[cfg_attr(docsrs, doc(cfg(feature = "axum")))]
pub mod axum {
    pub use sqp_axum::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sqp_query::prelude::*;
    pub use sqp_schema::SqpConfig;

    #[cfg(feature = "axum")]
    pub use sqp_axum::{ParsedQuery, QueryParserLayer};
}

// Re-export key types at the crate root
pub use sqp_query::{ParseError, ParseResult, Pipeline, QueryOptions, QueryParams};
pub use sqp_schema::{Schema, SchemaError, SqpConfig};
