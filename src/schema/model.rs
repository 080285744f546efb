//! Compiled schema model
//!
//! The model is an arena of [`SchemaNode`]s plus a mapping table from
//! qualified structural paths to node ids. It is built once from a
//! [`SchemaDefinition`] and is read-only afterwards, so one model can be
//! shared across threads by the filter and the populator.

use super::definition::{AttributeDefinition, ElementDefinition, SchemaDefinition, TypeDefinition};
use super::particles::Occurs;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::declared_name;
use crate::namespaces::QName;
use crate::subsets::{SubsetCategory, SubsetId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Index of a node inside its [`SchemaModel`]
pub type NodeId = usize;

/// Kind of schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Element declaration
    Element,
    /// Attribute declaration
    Attribute,
}

/// Content type of a schema node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlType {
    /// Type local name
    pub name: String,
    /// Base type local names, most specific first
    pub base_types: Vec<String>,
    /// Enumeration facet values
    pub enumeration: Vec<String>,
    /// Whether instances carry text content
    pub text_content: bool,
}

impl XmlType {
    fn from_definition(def: &TypeDefinition, has_children: bool) -> Self {
        Self {
            name: def.name.clone(),
            base_types: def.base_types.clone(),
            enumeration: def.enumeration.clone(),
            text_content: def.text_content.unwrap_or(!has_children),
        }
    }

    /// The type name followed by its base type names
    pub fn lineage(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.base_types.iter().map(String::as_str))
    }
}

/// Qualified structural path of a schema node
///
/// Element steps from the document root, plus an optional final attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SchemaPath {
    elements: Vec<QName>,
    attribute: Option<QName>,
}

impl SchemaPath {
    /// Path of a document element
    pub fn root(name: QName) -> Self {
        Self {
            elements: vec![name],
            attribute: None,
        }
    }

    /// Build a path from element steps
    pub fn from_elements<I: IntoIterator<Item = QName>>(elements: I) -> Self {
        Self {
            elements: elements.into_iter().collect(),
            attribute: None,
        }
    }

    /// Path of a child element
    pub fn child(&self, name: &QName) -> Self {
        let mut elements = self.elements.clone();
        elements.push(name.clone());
        Self {
            elements,
            attribute: None,
        }
    }

    /// Path of an attribute of this element
    pub fn attribute(&self, name: &QName) -> Self {
        Self {
            elements: self.elements.clone(),
            attribute: Some(name.clone()),
        }
    }

    /// Element steps
    pub fn elements(&self) -> &[QName] {
        &self.elements
    }

    /// Final attribute step, if any
    pub fn attribute_name(&self) -> Option<&QName> {
        self.attribute.as_ref()
    }

    /// Number of element steps
    pub fn depth(&self) -> usize {
        self.elements.len()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", name)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, "/@{}", attribute)?;
        }
        Ok(())
    }
}

/// Schema metadata for one element or attribute
#[derive(Debug, Clone)]
pub struct SchemaNode {
    id: NodeId,
    name: QName,
    kind: NodeKind,
    occurs: Occurs,
    xml_type: XmlType,
    common_subsets: BTreeSet<SubsetId>,
    identifier_subsets: BTreeSet<SubsetId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
    path: SchemaPath,
}

impl SchemaNode {
    /// Node id inside the owning model
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Qualified name
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Element or attribute
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Occurrence bounds
    pub fn occurs(&self) -> Occurs {
        self.occurs
    }

    /// Content type
    pub fn xml_type(&self) -> &XmlType {
        &self.xml_type
    }

    /// Qualified structural path
    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// Whether the node may occur more than once
    pub fn is_repeatable(&self) -> bool {
        self.occurs.is_repeatable()
    }

    /// Whether the node holds text content
    pub fn is_text_content(&self) -> bool {
        self.xml_type.text_content
    }

    /// Tags for "common" filtering
    pub fn common_subsets(&self) -> &BTreeSet<SubsetId> {
        &self.common_subsets
    }

    /// Tags for "identifier" filtering
    pub fn identifier_subsets(&self) -> &BTreeSet<SubsetId> {
        &self.identifier_subsets
    }

    /// Tags of the given category
    pub fn subsets(&self, category: SubsetCategory) -> &BTreeSet<SubsetId> {
        match category {
            SubsetCategory::Common => &self.common_subsets,
            SubsetCategory::Identifier => &self.identifier_subsets,
        }
    }

    /// Retention rule: untagged nodes are structural and always kept,
    /// tagged nodes are kept iff a tag is requested.
    pub fn is_retained(&self, category: SubsetCategory, requested: &BTreeSet<SubsetId>) -> bool {
        let tags = self.subsets(category);
        tags.is_empty() || !tags.is_disjoint(requested)
    }
}

/// Immutable schema model
#[derive(Debug, Clone)]
pub struct SchemaModel {
    nodes: Vec<SchemaNode>,
    root: NodeId,
    index: HashMap<SchemaPath, NodeId>,
}

impl SchemaModel {
    /// Build a model from a definition using default limits
    pub fn new(definition: &SchemaDefinition) -> Result<Self> {
        Self::from_definition(definition, &Limits::default())
    }

    /// Build a model from a definition
    pub fn from_definition(definition: &SchemaDefinition, limits: &Limits) -> Result<Self> {
        let mut builder = ModelBuilder {
            definition,
            limits,
            nodes: Vec::new(),
            index: HashMap::new(),
        };
        let root_name = builder.element_name(&definition.root, true);
        let root = builder.add_element(&definition.root, root_name, &SchemaPath::default(), 1)?;

        debug!(
            root = %builder.nodes[root].name,
            nodes = builder.nodes.len(),
            "built schema model"
        );

        Ok(Self {
            nodes: builder.nodes,
            root,
            index: builder.index,
        })
    }

    /// Parse a JSON schema definition
    pub fn from_json_str(json: &str) -> Result<Self> {
        let definition: SchemaDefinition = serde_json::from_str(json)?;
        Self::new(&definition)
    }

    /// Load a JSON schema definition file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Schema(format!("Failed to read schema '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Document element declaration
    pub fn root(&self) -> &SchemaNode {
        &self.nodes[self.root]
    }

    /// Number of element and attribute nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the model has no nodes (never true for a built model)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, in definition order
    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// Look up a node by its qualified structural path
    pub fn resolve(&self, path: &SchemaPath) -> Result<&SchemaNode> {
        self.index
            .get(path)
            .map(|&id| &self.nodes[id])
            .ok_or_else(|| Error::not_in_schema(path.to_string()))
    }

    /// Child elements in schema-declared order
    pub fn children<'a>(&'a self, node: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> + 'a {
        node.children.iter().map(move |&id| &self.nodes[id])
    }

    /// Attributes in schema-declared order
    pub fn attributes<'a>(&'a self, node: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> + 'a {
        node.attributes.iter().map(move |&id| &self.nodes[id])
    }

    /// Child element of `parent` with the given qualified name
    pub fn child(&self, parent: &SchemaNode, name: &QName) -> Result<&SchemaNode> {
        self.resolve(&parent.path.child(name))
    }

    /// Attribute of `parent` with the given qualified name
    pub fn attribute(&self, parent: &SchemaNode, name: &QName) -> Result<&SchemaNode> {
        self.resolve(&parent.path.attribute(name))
    }

    /// Child element of `parent` matched by local name only
    pub fn child_by_local_name<'a>(
        &'a self,
        parent: &'a SchemaNode,
        local_name: &str,
    ) -> Option<&'a SchemaNode> {
        self.children(parent).find(|c| c.name.local_name == local_name)
    }

    /// Attribute of `parent` matched by local name only
    pub fn attribute_by_local_name<'a>(
        &'a self,
        parent: &'a SchemaNode,
        local_name: &str,
    ) -> Option<&'a SchemaNode> {
        self.attributes(parent).find(|a| a.name.local_name == local_name)
    }

    /// Whether any node is tagged with `subset` in the given category
    pub fn has_subset(&self, category: SubsetCategory, subset: &SubsetId) -> bool {
        self.nodes.iter().any(|n| n.subsets(category).contains(subset))
    }

    /// Every subset id used in the given category
    pub fn subsets(&self, category: SubsetCategory) -> BTreeSet<SubsetId> {
        self.nodes
            .iter()
            .flat_map(|n| n.subsets(category).iter().cloned())
            .collect()
    }
}

struct ModelBuilder<'a> {
    definition: &'a SchemaDefinition,
    limits: &'a Limits,
    nodes: Vec<SchemaNode>,
    index: HashMap<SchemaPath, NodeId>,
}

impl ModelBuilder<'_> {
    fn element_name(&self, def: &ElementDefinition, is_root: bool) -> QName {
        let namespace = def.namespace.as_deref().or_else(|| {
            if is_root || self.definition.element_form_qualified {
                self.definition.target_namespace.as_deref()
            } else {
                None
            }
        });
        QName::new(namespace, def.name.as_str())
    }

    fn push(&mut self, node: SchemaNode) -> Result<NodeId> {
        let id = self.nodes.len();
        self.limits.check_nodes(id + 1)?;
        if self.index.insert(node.path.clone(), id).is_some() {
            return Err(Error::Schema(format!("Duplicate declaration: {}", node.path)));
        }
        self.nodes.push(node);
        Ok(id)
    }

    fn add_element(
        &mut self,
        def: &ElementDefinition,
        name: QName,
        parent: &SchemaPath,
        depth: usize,
    ) -> Result<NodeId> {
        self.limits.check_depth(depth)?;
        declared_name(&def.name)?;

        let occurs = def.occurrence();
        if !occurs.is_valid() {
            return Err(Error::Schema(format!(
                "minOccurs {} exceeds maxOccurs for '{}'",
                occurs.min, def.name
            )));
        }

        let path = parent.child(&name);
        let id = self.push(SchemaNode {
            id: self.nodes.len(),
            name,
            kind: NodeKind::Element,
            occurs,
            xml_type: XmlType::from_definition(&def.xml_type, !def.children.is_empty()),
            common_subsets: to_subset_set(&def.common_subsets)?,
            identifier_subsets: to_subset_set(&def.identifier_subsets)?,
            children: Vec::new(),
            attributes: Vec::new(),
            path: path.clone(),
        })?;

        let mut attributes = Vec::with_capacity(def.attributes.len());
        for attr in &def.attributes {
            attributes.push(self.add_attribute(attr, &path)?);
        }

        let mut children = Vec::with_capacity(def.children.len());
        for child in &def.children {
            let child_name = self.element_name(child, false);
            children.push(self.add_element(child, child_name, &path, depth + 1)?);
        }

        let node = &mut self.nodes[id];
        node.attributes = attributes;
        node.children = children;
        Ok(id)
    }

    fn add_attribute(&mut self, def: &AttributeDefinition, owner: &SchemaPath) -> Result<NodeId> {
        declared_name(&def.name)?;
        let name = QName::new(def.namespace.as_deref(), def.name.as_str());
        let path = owner.attribute(&name);
        self.push(SchemaNode {
            id: self.nodes.len(),
            name,
            kind: NodeKind::Attribute,
            occurs: def.occurrence(),
            xml_type: XmlType::from_definition(&def.xml_type, false),
            common_subsets: to_subset_set(&def.common_subsets)?,
            identifier_subsets: to_subset_set(&def.identifier_subsets)?,
            children: Vec::new(),
            attributes: Vec::new(),
            path,
        })
    }
}

fn to_subset_set(ids: &[String]) -> Result<BTreeSet<SubsetId>> {
    ids.iter().map(SubsetId::new).collect()
}
