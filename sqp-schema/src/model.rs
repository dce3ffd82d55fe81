//! Model definitions: attributes, associations and the descriptor handle.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::schema::Schema;

/// Storage type of a model attribute.
///
/// Used to type query-string values before they reach the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Text value.
    #[default]
    #[serde(alias = "text", alias = "varchar")]
    String,
    /// Signed integer.
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    /// Floating point number.
    #[serde(alias = "double", alias = "decimal")]
    Float,
    /// Boolean flag.
    #[serde(alias = "bool")]
    Boolean,
    /// Date or timestamp, kept in its textual form.
    #[serde(alias = "datetime", alias = "timestamp")]
    Date,
    /// UUID, kept in its textual form.
    Uuid,
    /// JSON document.
    Json,
}

impl DataType {
    /// Get the type name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Uuid => "uuid",
            Self::Json => "json",
        }
    }

    /// Whether values of this type have a meaningful ordering for range filters.
    pub fn is_comparable(&self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Date | Self::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared attribute of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name as exposed to API consumers.
    pub name: SmolStr,
    /// Storage column backing the attribute.
    pub field: SmolStr,
    /// Storage type.
    pub data_type: DataType,
}

impl Attribute {
    /// Create an attribute whose storage column has the same name.
    pub fn new(name: impl Into<SmolStr>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            data_type,
        }
    }

    /// Map the attribute to a differently named storage column.
    pub fn field(mut self, field: impl Into<SmolStr>) -> Self {
        self.field = field.into();
        self
    }
}

/// Kind of association between two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// One-to-one, foreign key on the target.
    HasOne,
    /// One-to-many, foreign key on the target.
    #[default]
    HasMany,
    /// Many-to-one, foreign key on the source.
    BelongsTo,
    /// Many-to-many through a join table.
    BelongsToMany,
}

impl AssociationKind {
    /// Check if this association yields multiple records.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::HasMany | Self::BelongsToMany)
    }
}

/// A declared association from one model to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Association name, as used in include paths.
    pub name: SmolStr,
    /// Association kind.
    pub kind: AssociationKind,
    /// Name of the target model.
    pub target: SmolStr,
    /// Position of the target in the owning schema, resolved at build time.
    pub(crate) target_index: usize,
}

impl Association {
    /// Create an unresolved association.
    pub fn new(
        name: impl Into<SmolStr>,
        kind: AssociationKind,
        target: impl Into<SmolStr>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            target_index: usize::MAX,
        }
    }
}

/// Definition of a single model before it is frozen into a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDef {
    pub(crate) name: SmolStr,
    pub(crate) table: SmolStr,
    pub(crate) primary_key: SmolStr,
    pub(crate) attributes: IndexMap<SmolStr, Attribute>,
    pub(crate) associations: IndexMap<SmolStr, Association>,
    pub(crate) duplicates: Vec<SmolStr>,
}

impl ModelDef {
    /// Start a model definition. Table defaults to the model name and the
    /// primary key to `id`.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            primary_key: SmolStr::new_static("id"),
            attributes: IndexMap::new(),
            associations: IndexMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Set the table name.
    pub fn table(mut self, table: impl Into<SmolStr>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the primary-key attribute.
    pub fn primary_key(mut self, attribute: impl Into<SmolStr>) -> Self {
        self.primary_key = attribute.into();
        self
    }

    /// Declare an attribute.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        if let Some(previous) = self.attributes.insert(attribute.name.clone(), attribute) {
            self.duplicates.push(previous.name);
        }
        self
    }

    /// Declare an attribute stored under its own name.
    pub fn attr(self, name: impl Into<SmolStr>, data_type: DataType) -> Self {
        self.attribute(Attribute::new(name, data_type))
    }

    /// Declare an association.
    pub fn association(mut self, association: Association) -> Self {
        if let Some(previous) = self
            .associations
            .insert(association.name.clone(), association)
        {
            self.duplicates.push(previous.name);
        }
        self
    }

    /// Declare a one-to-many association.
    pub fn has_many(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.association(Association::new(name, AssociationKind::HasMany, target))
    }

    /// Declare a one-to-one association.
    pub fn has_one(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.association(Association::new(name, AssociationKind::HasOne, target))
    }

    /// Declare a many-to-one association.
    pub fn belongs_to(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.association(Association::new(name, AssociationKind::BelongsTo, target))
    }

    /// Declare a many-to-many association.
    pub fn belongs_to_many(self, name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        self.association(Association::new(name, AssociationKind::BelongsToMany, target))
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read-only handle to a model inside a frozen [`Schema`].
///
/// Cloning is cheap: the handle holds the shared schema and the model's
/// position in it. Association targets are resolved through the same schema,
/// so cyclic associations are fine.
#[derive(Clone)]
pub struct ModelDescriptor {
    schema: Arc<Schema>,
    index: usize,
}

impl ModelDescriptor {
    pub(crate) fn new(schema: Arc<Schema>, index: usize) -> Self {
        Self { schema, index }
    }

    fn def(&self) -> &ModelDef {
        self.schema.def_at(self.index)
    }

    /// Get the model name.
    pub fn name(&self) -> &str {
        &self.def().name
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.def().table
    }

    /// Get the primary-key attribute name.
    pub fn primary_key(&self) -> &str {
        &self.def().primary_key
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.def().attributes.get(name)
    }

    /// Check whether an attribute is declared.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.def().attributes.contains_key(name)
    }

    /// Iterate attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.def().attributes.values()
    }

    /// Look up an association by name.
    pub fn association(&self, name: &str) -> Option<&Association> {
        self.def().associations.get(name)
    }

    /// Iterate associations in declaration order.
    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.def().associations.values()
    }

    /// Resolve the target model of an association.
    pub fn target(&self, association: &str) -> Option<ModelDescriptor> {
        self.association(association)
            .map(|assoc| Self::new(self.schema.clone(), assoc.target_index))
    }

    /// Get the schema this model belongs to.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name())
            .field("table", &self.table())
            .field("primary_key", &self.primary_key())
            .finish()
    }
}

impl PartialEq for ModelDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.index == other.index
    }
}

impl Eq for ModelDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog() -> Arc<Schema> {
        Schema::builder()
            .model(
                ModelDef::new("User")
                    .attr("id", DataType::Integer)
                    .attribute(Attribute::new("createdAt", DataType::Date).field("created_at"))
                    .has_many("posts", "Post"),
            )
            .model(
                ModelDef::new("Post")
                    .table("posts")
                    .attr("id", DataType::Integer)
                    .belongs_to("author", "User"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_attribute_lookup() {
        let user = blog().model("User").unwrap();
        let created = user.attribute("createdAt").unwrap();
        assert_eq!(created.field, "created_at");
        assert_eq!(created.data_type, DataType::Date);
        assert!(user.has_attribute("id"));
        assert!(!user.has_attribute("email"));
    }

    #[test]
    fn test_cyclic_targets() {
        let user = blog().model("User").unwrap();
        let post = user.target("posts").unwrap();
        assert_eq!(post.name(), "Post");
        assert_eq!(post.table(), "posts");

        let author = post.target("author").unwrap();
        assert_eq!(author, user);
        assert!(user.target("comments").is_none());
    }

    #[test]
    fn test_association_kind() {
        let user = blog().model("User").unwrap();
        assert!(user.association("posts").unwrap().kind.is_many());
        let post = user.target("posts").unwrap();
        assert!(!post.association("author").unwrap().kind.is_many());
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::Integer.to_string(), "integer");
        assert!(DataType::Date.is_comparable());
        assert!(!DataType::Boolean.is_comparable());
    }
}
