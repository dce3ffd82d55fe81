//! Core step types and traits.

use std::sync::Arc;

use crate::error::ParseResult;
use crate::params::QueryParams;

use super::context::ParserContext;

/// Result type for step operations.
pub type StepResult = ParseResult<()>;

/// One step of the request pipeline.
///
/// A step reads the query parameters, reads or writes the shared
/// [`ParserContext`], and either returns `Ok(())` to hand over to the next
/// step or fails, which stops the pipeline.
///
/// # Example
///
/// ```rust
/// use sqp_query::middleware::{ParserContext, Step, StepResult};
/// use sqp_query::QueryParams;
///
/// struct RequireLimit;
///
/// impl Step for RequireLimit {
///     fn apply(&self, _ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
///         if params.contains("limit") {
///             Ok(())
///         } else {
///             Err(sqp_query::ParseError::invalid_parameter("limit", "required"))
///         }
///     }
/// }
/// ```
pub trait Step: Send + Sync {
    /// Apply the step to the request.
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult;

    /// Name of this step (for debugging/logging).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether this step is enabled.
    fn enabled(&self) -> bool {
        true
    }
}

/// A step that can be shared across threads.
pub type SharedStep = Arc<dyn Step>;

/// Convenience trait for boxing steps.
pub trait IntoSharedStep {
    /// Convert into a shared step.
    fn into_shared(self) -> SharedStep;
}

impl<T: Step + 'static> IntoSharedStep for T {
    fn into_shared(self) -> SharedStep {
        Arc::new(self)
    }
}

impl<F> Step for F
where
    F: Fn(&mut ParserContext, &QueryParams) -> StepResult + Send + Sync,
{
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        self(ctx, params)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}
