//! Typed taxonomy tree.
//!
//! The tree endpoint returns the whole node hierarchy of one taxonomy version
//! as nested JSON. Rather than querying that document for every lookup, the
//! document is walked once and every node is parsed into a [`TreeNode`]. A
//! node is any JSON object carrying an integer `id`, an integer `tc` (taxonomy
//! code) and a string `type`; the container keys between nodes are not
//! significant.

use serde_json::Value;

use crate::{EccairsAttribute, EccairsEntity, InternalId, NodeKind, TaxonomyCode, TaxonomyError};

/// One node of the taxonomy tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: InternalId,
    pub code: TaxonomyCode,
    pub kind: NodeKind,
    pub label: String,
    pub xsd_tag: Option<String>,
}

impl TreeNode {
    fn from_object(object: &serde_json::Map<String, Value>) -> Option<Self> {
        let id = object.get("id")?.as_i64()?;
        let code = u32::try_from(object.get("tc")?.as_u64()?).ok()?;
        let kind = NodeKind::from_discriminator(object.get("type")?.as_str()?);
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_owned);
        Some(Self {
            id: InternalId::new(id),
            code: TaxonomyCode::new(code),
            kind,
            label: text("label").unwrap_or_default(),
            xsd_tag: text("xsdTag"),
        })
    }

    /// Builds the attribute record for this node.
    pub fn to_attribute(&self) -> EccairsAttribute {
        EccairsAttribute {
            id: self.id,
            taxonomy_code: self.code,
            label: self.label.clone(),
            xsd_tag: self.xsd_tag.clone(),
        }
    }

    /// Builds the entity record for this node.
    pub fn to_entity(&self) -> EccairsEntity {
        EccairsEntity {
            id: self.id,
            taxonomy_code: self.code,
            label: self.label.clone(),
            xsd_tag: self.xsd_tag.clone(),
        }
    }
}

/// All nodes of one taxonomy version, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyTree {
    nodes: Vec<TreeNode>,
}

impl TaxonomyTree {
    /// Parses every node out of the tree document.
    pub fn from_document(document: &Value) -> Self {
        let mut nodes = Vec::new();
        let mut stack = vec![document];
        while let Some(current) = stack.pop() {
            match current {
                Value::Object(object) => {
                    nodes.extend(TreeNode::from_object(object));
                    stack.extend(object.values().rev());
                }
                Value::Array(items) => stack.extend(items.iter().rev()),
                _ => {}
            }
        }
        tracing::debug!(nodes = nodes.len(), "Parsed taxonomy tree");
        Self { nodes }
    }

    /// Number of attribute, entity and other nodes parsed from the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the document contained no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Finds the unique node with the given code and kind by scanning the
    /// whole tree.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::NotFound`] if no node matches.
    /// - [`TaxonomyError::AmbiguousCode`] if more than one node matches.
    pub fn find(&self, code: TaxonomyCode, kind: NodeKind) -> Result<&TreeNode, TaxonomyError> {
        let mut matches = self
            .nodes
            .iter()
            .filter(|node| node.code == code && node.kind == kind);
        let first = matches.next().ok_or(TaxonomyError::NotFound { code, kind })?;
        let extra = matches.count();
        if extra > 0 {
            return Err(TaxonomyError::AmbiguousCode {
                code,
                kind,
                matches: extra + 1,
            });
        }
        Ok(first)
    }
}
