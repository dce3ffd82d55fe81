//! Include trees for eager loading associations.

use serde::Serialize;
use smol_str::SmolStr;
use sqp_schema::ModelDescriptor;
use tracing::debug;

use crate::error::{ParseError, ParseResult};

/// One association to eager load, possibly wrapping a deeper one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeNode {
    /// Name of the association on the parent model.
    pub association: SmolStr,
    /// Inner join when true; includes built from query strings are always
    /// left joins.
    pub required: bool,
    /// The next association down the path. At most one element; empty at
    /// the leaf and then left out of the serialized form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<IncludeNode>,
}

impl IncludeNode {
    /// Create a leaf node.
    pub fn new(association: impl Into<SmolStr>) -> Self {
        Self {
            association: association.into(),
            required: false,
            include: Vec::new(),
        }
    }

    /// Wrap a deeper node.
    pub fn wrap(mut self, inner: IncludeNode) -> Self {
        self.include = vec![inner];
        self
    }

    /// Check if the node has a nested include.
    pub fn has_nested(&self) -> bool {
        !self.include.is_empty()
    }

    /// Number of associations from this node down to its leaf.
    pub fn depth(&self) -> usize {
        1 + self.include.iter().map(IncludeNode::depth).max().unwrap_or(0)
    }
}

/// Ordered list of top-level include nodes.
///
/// One node per requested path, in request order. Paths are not merged:
/// `a,a.b` yields two independent `a` nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncludeTree(Vec<IncludeNode>);

impl IncludeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the top-level nodes.
    pub fn nodes(&self) -> &[IncludeNode] {
        &self.0
    }

    /// Check if there are any includes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of top-level includes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate the top-level nodes.
    pub fn iter(&self) -> impl Iterator<Item = &IncludeNode> {
        self.0.iter()
    }

    /// Consume the tree, returning its nodes.
    pub fn into_nodes(self) -> Vec<IncludeNode> {
        self.0
    }
}

impl FromIterator<IncludeNode> for IncludeTree {
    fn from_iter<T: IntoIterator<Item = IncludeNode>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build the include tree for a comma-separated list of dotted paths.
///
/// Every path is checked segment by segment against the association index
/// before anything is built; the first unreachable segment fails the whole
/// parameter with an error naming `model`. An empty parameter yields an
/// empty tree.
pub fn build_include(model: &ModelDescriptor, include: &str) -> ParseResult<IncludeTree> {
    if include.is_empty() {
        return Ok(IncludeTree::new());
    }

    let paths: Vec<&str> = include.split(',').collect();
    for path in &paths {
        validate_path(model, path)?;
    }

    let tree: IncludeTree = paths.into_iter().filter_map(nest).collect();
    debug!(model = model.name(), includes = tree.len(), "Include tree built");
    Ok(tree)
}

fn validate_path(model: &ModelDescriptor, path: &str) -> ParseResult<()> {
    let mut current = model.clone();
    for segment in path.split('.') {
        current = current.target(segment).ok_or_else(|| {
            debug!(
                model = model.name(),
                path,
                segment,
                at = current.name(),
                "Unreachable include segment"
            );
            ParseError::invalid_include(model.name(), path)
        })?;
    }
    Ok(())
}

/// Fold the reversed segments so the last one ends up as the innermost leaf.
fn nest(path: &str) -> Option<IncludeNode> {
    path.rsplit('.').fold(None, |inner, segment| {
        let node = IncludeNode::new(segment);
        Some(match inner {
            Some(inner) => node.wrap(inner),
            None => node,
        })
    })
}
