//! Axum integration for sqp.
//!
//! [`QueryParserLayer`] runs the query-string pipeline for every request
//! before the handler sees it. On success the resulting [`ParserContext`]
//! is stored in the request extensions, where the [`ParsedQuery`] extractor
//! picks it up. Any failure short-circuits the request with
//! `500 {"error":"Internal server error"}` and logs the detail.
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{Json, Router, routing::get};
//! use sqp_axum::{ParsedQuery, QueryParserLayer};
//! use sqp_schema::{DataType, ModelDef, Schema};
//!
//! async fn list_users(ParsedQuery(ctx): ParsedQuery) -> Json<serde_json::Value> {
//!     // Hand ctx.options() to the ORM here.
//!     Json(ctx.options().to_json())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = Schema::builder()
//!         .model(ModelDef::new("User").attr("id", DataType::Integer))
//!         .build()
//!         .unwrap();
//!
//!     let app = Router::new()
//!         .route("/users", get(list_users))
//!         .layer(QueryParserLayer::new(schema.model("User").unwrap()));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    Json,
    extract::FromRequestParts,
    response::{IntoResponse, Response},
};
use http::{Request, StatusCode, request::Parts};
use thiserror::Error;
use tower_layer::Layer;
use tower_service::Service;
use tracing::{debug, error, info};

use sqp_query::{INTERNAL_ERROR_MESSAGE, ParseError, ParseResult, Pipeline, QueryParams};
use sqp_schema::{ModelDescriptor, QueryConfig, SqpConfig};

pub use sqp_query::middleware::{ParserContext, QueryOptions};

/// Boxed future returned by [`QueryParserMiddleware`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A parse failure turned into an HTTP response.
///
/// Always answers `500 {"error":"Internal server error"}`; the wrapped
/// [`ParseError`] carries the detail for logs.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct QueryParserError(#[from] pub ParseError);

impl QueryParserError {
    /// Get the underlying parse error.
    pub fn inner(&self) -> &ParseError {
        &self.0
    }
}

impl IntoResponse for QueryParserError {
    fn into_response(self) -> Response {
        error!(
            code = %self.0.code,
            error = %self.0,
            model = self.0.context.model.as_deref().unwrap_or_default(),
            "Query parsing failed"
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.public_message() })),
        )
            .into_response()
    }
}

/// Result type for axum integration.
pub type Result<T> = std::result::Result<T, QueryParserError>;

/// Tower layer that parses the query string of every request.
#[derive(Clone, Debug)]
pub struct QueryParserLayer {
    pipeline: Arc<Pipeline>,
}

impl QueryParserLayer {
    /// Layer running the standard pipeline for `model` with default limits.
    pub fn new(model: ModelDescriptor) -> Self {
        Self::with_config(model, &QueryConfig::default())
    }

    /// Layer running the standard pipeline for `model`.
    pub fn with_config(model: ModelDescriptor, config: &QueryConfig) -> Self {
        info!(model = model.name(), "QueryParserLayer created");
        Self::from_pipeline(Pipeline::standard(model, config))
    }

    /// Layer for the named model of a loaded configuration.
    pub fn from_config(config: &SqpConfig, model: &str) -> ParseResult<Self> {
        let pipeline = Pipeline::from_config(config, model)?;
        info!(model = model, "QueryParserLayer created from configuration");
        Ok(Self::from_pipeline(pipeline))
    }

    /// Layer running a custom pipeline.
    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Get the pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl<S> Layer<S> for QueryParserLayer {
    type Service = QueryParserMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        QueryParserMiddleware {
            inner,
            pipeline: self.pipeline.clone(),
        }
    }
}

/// Tower service produced by [`QueryParserLayer`].
#[derive(Clone, Debug)]
pub struct QueryParserMiddleware<S> {
    inner: S,
    pipeline: Arc<Pipeline>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for QueryParserMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, std::result::Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        // Take the instance that was polled ready and leave a fresh clone
        // behind. On a parse failure the taken instance is dropped uncalled,
        // which releases whatever its readiness reserved.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let params = QueryParams::parse(request.uri().query().unwrap_or(""));
        match self.pipeline.run(&params) {
            Ok(ctx) => {
                debug!(
                    path = request.uri().path(),
                    elapsed_us = ctx.elapsed_us(),
                    "Query parameters parsed"
                );
                request.extensions_mut().insert(ctx);
                Box::pin(inner.call(request))
            }
            Err(err) => {
                let response = QueryParserError(err).into_response();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// Extractor for the context produced by [`QueryParserLayer`].
///
/// Rejects with a 500 when the layer did not run for the route.
#[derive(Debug, Clone)]
pub struct ParsedQuery(pub ParserContext);

impl ParsedQuery {
    /// Get the built query options.
    pub fn options(&self) -> &QueryOptions {
        self.0.options()
    }

    /// Consume the extractor, returning the options.
    pub fn into_options(self) -> QueryOptions {
        self.0.into_options()
    }
}

impl std::ops::Deref for ParsedQuery {
    type Target = ParserContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ParsedQuery
where
    S: Send + Sync,
{
    type Rejection = QueryParserError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<ParserContext>()
            .cloned()
            .map(ParsedQuery)
            .ok_or_else(|| QueryParserError(ParseError::parser_data_not_found()))
    }
}

/// Public body of every error response.
pub fn error_body() -> serde_json::Value {
    serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE })
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ParsedQuery, QueryParserError, QueryParserLayer, QueryParserMiddleware, Result,
    };
    pub use sqp_query::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, routing::get};
    use pretty_assertions::assert_eq;
    use sqp_schema::{DataType, ModelDef, Schema};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Inner service that holds a slot from `poll_ready` until it is called
    /// or dropped.
    struct Gate {
        ready: bool,
        reserved: Arc<AtomicUsize>,
        calls: Arc<AtomicUsize>,
    }

    impl Clone for Gate {
        fn clone(&self) -> Self {
            Self {
                ready: false,
                reserved: self.reserved.clone(),
                calls: self.calls.clone(),
            }
        }
    }

    impl Service<Request<Body>> for Gate {
        type Response = Response;
        type Error = Infallible;
        type Future = std::future::Ready<std::result::Result<Response, Infallible>>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Infallible>> {
            if !self.ready {
                self.ready = true;
                self.reserved.fetch_add(1, Ordering::SeqCst);
            }
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _request: Request<Body>) -> Self::Future {
            assert!(self.ready, "called before poll_ready");
            self.ready = false;
            self.reserved.fetch_sub(1, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(StatusCode::OK.into_response()))
        }
    }

    impl Drop for Gate {
        fn drop(&mut self) {
            if self.ready {
                self.reserved.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    fn user() -> ModelDescriptor {
        Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .attr("name", DataType::String)
                    .attr("createdAt", DataType::Date)
                    .has_many("posts", "Post"),
            )
            .model(ModelDef::new("Post").attr("id", DataType::Integer))
            .build()
            .unwrap()
            .model("User")
            .unwrap()
    }

    async fn list(query: ParsedQuery) -> Json<serde_json::Value> {
        Json(query.options().to_json())
    }

    fn app() -> Router {
        Router::new()
            .route("/users", get(list))
            .layer(QueryParserLayer::new(user()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_request_reaches_handler() {
        let (status, body) = get_json(app(), "/users?include=posts&order=name:desc&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "include": [{ "association": "posts", "required": false }],
                "order": [["name", "DESC"]],
                "limit": 5,
                "offset": 0,
            })
        );
    }

    #[tokio::test]
    async fn test_defaults_without_query() {
        let (status, body) = get_json(app(), "/users").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"], serde_json::json!([["createdAt", "DESC"]]));
    }

    #[tokio::test]
    async fn test_invalid_order_is_internal_error() {
        let (status, body) = get_json(app(), "/users?order=nope").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, error_body());
    }

    #[tokio::test]
    async fn test_invalid_include_is_internal_error() {
        let (status, body) = get_json(app(), "/users?include=posts.author").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, error_body());
    }

    #[tokio::test]
    async fn test_extractor_without_layer() {
        let app = Router::new().route("/users", get(list));
        let (status, body) = get_json(app, "/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, error_body());
    }

    #[tokio::test]
    async fn test_rejected_request_releases_inner_readiness() {
        let reserved = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let mut service = QueryParserLayer::new(user()).layer(Gate {
            ready: false,
            reserved: reserved.clone(),
            calls: calls.clone(),
        });

        for (uri, status, expected_calls) in [
            ("/users?order=nope", StatusCode::INTERNAL_SERVER_ERROR, 0),
            ("/users?order=name", StatusCode::OK, 1),
            ("/users?include=nope", StatusCode::INTERNAL_SERVER_ERROR, 1),
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = ServiceExt::<Request<Body>>::ready(&mut service)
                .await
                .unwrap()
                .call(request)
                .await
                .unwrap();
            assert_eq!(response.status(), status, "uri {uri}");
            assert_eq!(reserved.load(Ordering::SeqCst), 0, "uri {uri}");
            assert_eq!(calls.load(Ordering::SeqCst), expected_calls, "uri {uri}");
        }
    }

    #[test]
    fn test_error_keeps_detail() {
        let err = QueryParserError::from(ParseError::invalid_include("User", "nope"));
        assert_eq!(err.inner().context.model.as_deref(), Some("User"));
        assert_eq!(err.to_string(), "[SQP2001] Invalid include for model User");
    }
}
