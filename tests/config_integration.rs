//! Integration tests for configuration loading.
//!
//! These tests load `sqp.toml` files from disk and run the pipeline built
//! from them.

use sqp::query::{ErrorCode, OrderByField, OrderClause, QueryParams, SortOrder};
use sqp::schema::{AssociationKind, DataType, SchemaError};
use sqp::{Pipeline, SqpConfig};
use std::io::Write;

const CONFIG: &str = r#"
[query]
default_limit = 20
max_limit = 40

[models.User]
table = "users"

[models.User.attributes]
id = { type = "integer" }
email = { type = "string" }
createdAt = { type = "date", field = "created_at" }

[models.User.associations]
posts = { target = "Post", kind = "has_many" }

[models.Post]

[models.Post.attributes]
id = { type = "integer" }
published = { type = "boolean" }

[models.Post.associations]
author = { target = "User", kind = "belongs_to" }

[environments.test.query]
max_limit = 30
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

/// Test loading configuration from a file
#[test]
fn test_config_from_file() {
    let file = write_config(CONFIG);
    let config = SqpConfig::from_file(file.path()).expect("Failed to load config");

    assert_eq!(config.query.default_limit, 20);
    assert_eq!(config.query.max_limit, 40);
    assert_eq!(config.models.len(), 2);
    assert_eq!(config.models["User"].associations["posts"].kind, AssociationKind::HasMany);
    assert_eq!(config.models["Post"].attributes["published"].data_type, DataType::Boolean);
}

/// Test a missing file reports its path
#[test]
fn test_config_missing_file() {
    let err = SqpConfig::from_file("/nonexistent/sqp.toml").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::IoError { ref path, .. } if path == "/nonexistent/sqp.toml"
    ));
}

/// Test the pipeline built from configuration
#[test]
fn test_pipeline_from_config() {
    let config = SqpConfig::from_str(CONFIG).unwrap();
    let pipeline = Pipeline::from_config(&config, "User").unwrap();

    let ctx = pipeline
        .run(&QueryParams::parse("include=posts.author&limit=1000"))
        .unwrap();
    let options = ctx.options();

    assert_eq!(options.include.nodes()[0].depth(), 2);
    assert_eq!(
        options.order,
        OrderClause::single(OrderByField::new("createdAt", "created_at", SortOrder::Desc))
    );
    assert_eq!(options.pagination.map(|p| p.limit), Some(40));
}

/// Test environment overrides flow into the pipeline
#[test]
fn test_environment_override_applies() {
    let config = SqpConfig::from_str(CONFIG)
        .unwrap()
        .with_environment("test")
        .unwrap();
    let pipeline = Pipeline::from_config(&config, "Post").unwrap();

    let ctx = pipeline.run(&QueryParams::parse("limit=1000")).unwrap();
    assert_eq!(ctx.options().pagination.map(|p| p.limit), Some(30));
    // Post has no createdAt so the primary key orders
    assert_eq!(ctx.options().order, OrderClause::single(OrderByField::desc("id")));
}

/// Test an override that breaks the limit invariant is rejected
#[test]
fn test_environment_override_rejects_bad_limits() {
    let config = format!("{CONFIG}\n[environments.tiny.query]\nmax_limit = 5\n");
    let err = SqpConfig::from_str(&config)
        .unwrap()
        .with_environment("tiny")
        .unwrap_err();
    assert!(matches!(err, SchemaError::ConfigError { .. }));
}

/// Test environment variable interpolation
#[test]
fn test_env_var_interpolation() {
    // SAFETY: no other test reads this variable.
    unsafe {
        std::env::set_var("SQP_IT_USERS_TABLE", "app_users");
    }
    let config = SqpConfig::from_str(
        r#"
        [models.User]
        table = "${SQP_IT_USERS_TABLE}"
        attributes = { id = { type = "integer" } }
        "#,
    )
    .unwrap();
    unsafe {
        std::env::remove_var("SQP_IT_USERS_TABLE");
    }

    let schema = config.to_schema().unwrap();
    assert_eq!(schema.model("User").unwrap().table(), "app_users");
}

/// Test invalid association targets are reported on conversion
#[test]
fn test_unknown_target_is_configuration_error() {
    let config = SqpConfig::from_str(
        r#"
        [models.User.attributes]
        id = { type = "integer" }

        [models.User.associations]
        posts = { target = "Post" }
        "#,
    )
    .unwrap();

    assert!(config.to_schema().is_err());
    let err = Pipeline::from_config(&config, "User").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}
