//! The frozen model registry.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::model::{ModelDef, ModelDescriptor};

/// Immutable registry of models.
///
/// A schema is built once at startup and shared behind an [`Arc`] by every
/// request. Association targets are resolved to positions when the schema is
/// built, so lookups at request time never go through names twice.
#[derive(Debug)]
pub struct Schema {
    models: IndexMap<SmolStr, ModelDef>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Get a descriptor for a model by name.
    pub fn model(self: &Arc<Self>, name: &str) -> Option<ModelDescriptor> {
        self.models
            .get_index_of(name)
            .map(|index| ModelDescriptor::new(self.clone(), index))
    }

    /// Iterate descriptors for every model, in declaration order.
    pub fn models(self: &Arc<Self>) -> impl Iterator<Item = ModelDescriptor> + '_ {
        (0..self.models.len()).map(|index| ModelDescriptor::new(self.clone(), index))
    }

    /// Iterate model names in declaration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(SmolStr::as_str)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if the schema declares no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub(crate) fn def_at(&self, index: usize) -> &ModelDef {
        &self.models[index]
    }
}

/// Builder collecting model definitions into a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    models: Vec<ModelDef>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model definition.
    pub fn model(mut self, model: ModelDef) -> Self {
        self.models.push(model);
        self
    }

    /// Add several model definitions.
    pub fn models(mut self, models: impl IntoIterator<Item = ModelDef>) -> Self {
        self.models.extend(models);
        self
    }

    /// Validate the definitions and freeze them.
    ///
    /// All problems are reported at once: a single problem is returned as is,
    /// several are wrapped in [`SchemaError::ValidationFailed`].
    pub fn build(self) -> SchemaResult<Arc<Schema>> {
        let mut errors = Vec::new();
        let mut models: IndexMap<SmolStr, ModelDef> = IndexMap::with_capacity(self.models.len());

        for model in self.models {
            if models.contains_key(&model.name) {
                errors.push(SchemaError::duplicate("model", model.name.as_str()));
                continue;
            }
            models.insert(model.name.clone(), model);
        }

        let names: Vec<SmolStr> = models.keys().cloned().collect();
        for model in models.values_mut() {
            for name in &model.duplicates {
                errors.push(SchemaError::duplicate(
                    "member",
                    format!("{}.{}", model.name, name),
                ));
            }

            if !model.attributes.contains_key(&model.primary_key) {
                errors.push(SchemaError::MissingPrimaryKey {
                    model: model.name.to_string(),
                    primary_key: model.primary_key.to_string(),
                });
            }

            for association in model.associations.values_mut() {
                if model.attributes.contains_key(&association.name) {
                    errors.push(SchemaError::invalid_association(
                        model.name.as_str(),
                        association.name.as_str(),
                        "name collides with an attribute",
                    ));
                }

                match names.iter().position(|n| *n == association.target) {
                    Some(index) => association.target_index = index,
                    None => errors.push(SchemaError::invalid_association(
                        model.name.as_str(),
                        association.name.as_str(),
                        format!("unknown target model `{}`", association.target),
                    )),
                }
            }
        }

        if let Some(err) = SchemaError::collect(errors) {
            return Err(err);
        }

        debug!(models = models.len(), "Schema built");
        Ok(Arc::new(Schema { models }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    #[test]
    fn test_build_and_lookup() {
        let schema = Schema::builder()
            .model(ModelDef::new("User").attr("id", DataType::Integer))
            .model(ModelDef::new("Post").attr("id", DataType::Integer))
            .build()
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.model_names().collect::<Vec<_>>(), vec!["User", "Post"]);
        assert_eq!(schema.model("Post").unwrap().name(), "Post");
        assert!(schema.model("Comment").is_none());
        assert_eq!(schema.models().count(), 2);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let err = Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .has_many("posts", "Post"),
            )
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidAssociation { .. }));
        assert!(err.to_string().contains("User.posts"));
    }

    #[test]
    fn test_missing_primary_key() {
        let err = Schema::builder()
            .model(ModelDef::new("Tag").primary_key("slug").attr("name", DataType::String))
            .build()
            .unwrap_err();

        assert!(matches!(err, SchemaError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn test_duplicate_models_and_members() {
        let err = Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .attr("id", DataType::String),
            )
            .model(ModelDef::new("User").attr("id", DataType::Integer))
            .build()
            .unwrap_err();

        match err {
            SchemaError::ValidationFailed { count, .. } => assert_eq!(count, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_association_attribute_collision() {
        let err = Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .attr("profile", DataType::Json)
                    .has_one("profile", "User"),
            )
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("collides"));
    }
}
