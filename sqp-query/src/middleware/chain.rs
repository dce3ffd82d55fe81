//! Step pipeline and builder.

use std::sync::Arc;

use sqp_schema::{ModelDescriptor, QueryConfig, SqpConfig};
use tracing::{debug, info};

use crate::error::ParseResult;
use crate::params::QueryParams;

use super::context::ParserContext;
use super::steps::{
    BuildInclude, BuildWhere, ConfigureModel, Paginate, ResolveOrder, SelectAttributes,
};
use super::types::{SharedStep, Step};

/// An ordered list of steps run against one request.
///
/// Steps run in insertion order. Disabled steps are skipped and the first
/// failing step stops the run.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<SharedStep>,
    log_parsed: bool,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with initial steps.
    pub fn with(steps: Vec<SharedStep>) -> Self {
        Self {
            steps,
            log_parsed: false,
        }
    }

    /// The standard pipeline for `model`.
    ///
    /// Configures the model, then builds include, order, where, pagination
    /// and attribute selection in that order.
    pub fn standard(model: ModelDescriptor, config: &QueryConfig) -> Self {
        PipelineBuilder::new()
            .step(ConfigureModel::new(model))
            .step(BuildInclude)
            .step(ResolveOrder::new(config.default_order_attribute.clone()))
            .step(BuildWhere)
            .step(Paginate::new(config.clone()))
            .step(SelectAttributes)
            .build()
    }

    /// The standard pipeline for the named model of a loaded configuration.
    pub fn from_config(config: &SqpConfig, model: &str) -> ParseResult<Self> {
        let schema = config.to_schema()?;
        let descriptor = schema.model(model).ok_or_else(|| {
            crate::error::ParseError::configuration(format!("Model {model} is not defined"))
                .with_model(model)
        })?;
        let mut pipeline = Self::standard(descriptor, &config.query);
        pipeline.log_parsed = config.debug.log_parsed_queries;
        Ok(pipeline)
    }

    /// Log the built options at info level after each successful run.
    pub fn log_parsed(mut self, enabled: bool) -> Self {
        self.log_parsed = enabled;
        self
    }

    /// Add a step to the end of the pipeline.
    pub fn push<S: Step + 'static>(&mut self, step: S) {
        self.steps.push(Arc::new(step));
    }

    /// Add a step to the beginning of the pipeline.
    pub fn prepend<S: Step + 'static>(&mut self, step: S) {
        self.steps.insert(0, Arc::new(step));
    }

    /// Get the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the steps in run order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step against a fresh context.
    pub fn run(&self, params: &QueryParams) -> ParseResult<ParserContext> {
        let mut ctx = ParserContext::new();
        self.run_with(&mut ctx, params)?;
        Ok(ctx)
    }

    /// Run every step against an existing context.
    pub fn run_with(&self, ctx: &mut ParserContext, params: &QueryParams) -> ParseResult<()> {
        for step in &self.steps {
            if !step.enabled() {
                debug!(step = step.name(), "Skipping disabled step");
                continue;
            }
            step.apply(ctx, params).inspect_err(|e| {
                debug!(step = step.name(), error = %e, "Step failed");
            })?;
            debug!(step = step.name(), "Step applied");
        }

        if self.log_parsed {
            info!(
                model = ctx.model().map(|m| m.name()).unwrap_or_default(),
                options = %ctx.options().to_json(),
                elapsed_us = ctx.elapsed_us(),
                "Query parsed"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .field("log_parsed", &self.log_parsed)
            .finish()
    }
}

/// Builder for creating pipelines.
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<SharedStep>,
}

impl PipelineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step.
    pub fn step<S: Step + 'static>(mut self, step: S) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Add a shared step.
    pub fn shared(mut self, step: SharedStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Pipeline {
        Pipeline::with(self.steps)
    }
}
