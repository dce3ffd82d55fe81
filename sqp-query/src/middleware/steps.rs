//! Built-in pipeline steps.

use sqp_schema::{ModelDescriptor, QueryConfig};
use tracing::debug;

use crate::filter::build_where;
use crate::order::{DEFAULT_ORDER_ATTRIBUTE, resolve_order_with};
use crate::pagination::paginate;
use crate::params::QueryParams;
use crate::relations::{build_include, select_attributes};

use super::context::ParserContext;
use super::types::{Step, StepResult};

/// Puts the route's model into the context.
///
/// Every other built-in step needs a model and fails with a missing-context
/// error when this step did not run first.
#[derive(Debug, Clone)]
pub struct ConfigureModel {
    model: ModelDescriptor,
}

impl ConfigureModel {
    /// Create the step for `model`.
    pub fn new(model: ModelDescriptor) -> Self {
        Self { model }
    }

    /// Get the configured model.
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }
}

impl Step for ConfigureModel {
    fn apply(&self, ctx: &mut ParserContext, _params: &QueryParams) -> StepResult {
        ctx.set_model(self.model.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "configure_model"
    }
}

/// Builds the include tree from the `include` parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildInclude;

impl Step for BuildInclude {
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        let include = params.get("include").unwrap_or("");
        let include = build_include(ctx.require_model()?, include)?;
        ctx.options_mut().include = include;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "build_include"
    }
}

/// Resolves the order clause from the `order` parameter.
#[derive(Debug, Clone)]
pub struct ResolveOrder {
    default_attribute: String,
}

impl ResolveOrder {
    /// Create the step with a preferred default attribute.
    pub fn new(default_attribute: impl Into<String>) -> Self {
        Self {
            default_attribute: default_attribute.into(),
        }
    }
}

impl Default for ResolveOrder {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_ATTRIBUTE)
    }
}

impl Step for ResolveOrder {
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        let order = resolve_order_with(
            ctx.require_model()?,
            params.get("order"),
            &self.default_attribute,
        )?;
        ctx.options_mut().order = order;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "resolve_order"
    }
}

/// Builds filter conditions from attribute parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildWhere;

impl Step for BuildWhere {
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        let filter = build_where(ctx.require_model()?, params)?;
        ctx.options_mut().filter = filter;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "build_where"
    }
}

/// Resolves limit and offset.
#[derive(Debug, Clone, Default)]
pub struct Paginate {
    config: QueryConfig,
}

impl Paginate {
    /// Create the step with the given limits.
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }
}

impl Step for Paginate {
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        // Pagination does not depend on the model, but runs only for
        // configured routes like every other step.
        ctx.require_model()?;
        ctx.options_mut().pagination = Some(paginate(params, &self.config)?);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "paginate"
    }
}

/// Restricts projected attributes from the `fields` parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAttributes;

impl Step for SelectAttributes {
    fn apply(&self, ctx: &mut ParserContext, params: &QueryParams) -> StepResult {
        let fields = params.get("fields").unwrap_or("");
        let attributes = select_attributes(ctx.require_model()?, fields)?;
        if let Some(ref selected) = attributes {
            debug!(count = selected.len(), "Attribute selection applied");
        }
        ctx.options_mut().attributes = attributes;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "select_attributes"
    }
}
