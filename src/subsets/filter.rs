//! Subset filtering
//!
//! Walks a document and its [`SchemaModel`] in parallel, keeping structural
//! (untagged) nodes and nodes tagged with a requested subset. A dropped
//! element takes its whole subtree with it. The input is never modified.

use super::{SubsetCategory, SubsetId};
use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::schema::{SchemaModel, SchemaNode};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Subset filter bound to one schema
#[derive(Debug, Clone)]
pub struct SubsetFilter<'a> {
    schema: &'a SchemaModel,
    limits: Limits,
}

impl<'a> SubsetFilter<'a> {
    /// Create a filter with default limits
    pub fn new(schema: &'a SchemaModel) -> Self {
        Self {
            schema,
            limits: Limits::default(),
        }
    }

    /// Set the depth limit used during the walk
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Keep the nodes of the requested common subsets
    pub fn filter_common_subsets(
        &self,
        document: &Document,
        subsets: &BTreeSet<SubsetId>,
    ) -> Result<Document> {
        self.filter_document(document, subsets, SubsetCategory::Common)
    }

    /// Keep the nodes of the requested identifier subsets
    pub fn filter_identifier_subsets(
        &self,
        document: &Document,
        subsets: &BTreeSet<SubsetId>,
    ) -> Result<Document> {
        self.filter_document(document, subsets, SubsetCategory::Identifier)
    }

    /// Filter a whole document; fails with [`Error::Document`] if it is empty
    pub fn filter_document(
        &self,
        document: &Document,
        subsets: &BTreeSet<SubsetId>,
        category: SubsetCategory,
    ) -> Result<Document> {
        let root = document.require_root()?;
        self.filter(root, subsets, category).map(Document::with_root)
    }

    /// Filter a tree rooted at the schema's document element
    ///
    /// The root itself is always kept; its attributes are filtered like any
    /// other node's.
    pub fn filter(
        &self,
        root: &Element,
        subsets: &BTreeSet<SubsetId>,
        category: SubsetCategory,
    ) -> Result<Element> {
        let node = self.schema.root();
        if node.name() != &root.qname {
            return Err(Error::not_in_schema(root.qname.to_string()));
        }

        let filtered = self.filter_element(root, node, subsets, category, 1)?;
        debug!(
            %category,
            subsets = ?subsets.iter().map(SubsetId::as_str).collect::<Vec<_>>(),
            before = root.element_count(),
            after = filtered.element_count(),
            "filtered document"
        );
        Ok(filtered)
    }

    fn filter_element(
        &self,
        element: &Element,
        node: &SchemaNode,
        subsets: &BTreeSet<SubsetId>,
        category: SubsetCategory,
        depth: usize,
    ) -> Result<Element> {
        self.limits.check_depth(depth)?;

        let mut out = Element::new(element.qname.clone());
        out.text = element.text.clone();

        for (qname, value) in &element.attributes {
            let attribute = self.schema.attribute(node, qname)?;
            if attribute.is_retained(category, subsets) {
                out.attributes.insert(qname.clone(), value.clone());
            } else {
                trace!(path = %attribute.path(), "dropping attribute");
            }
        }

        for child in &element.children {
            let child_node = self.schema.child(node, &child.qname)?;
            if child_node.is_retained(category, subsets) {
                let filtered = self.filter_element(child, child_node, subsets, category, depth + 1)?;
                out.children.push(filtered);
            } else {
                self.check_declared(child, child_node, depth + 1)?;
                trace!(path = %child_node.path(), "dropping subtree");
            }
        }

        Ok(out)
    }

    /// Resolve every node of a dropped subtree so undeclared content still fails
    fn check_declared(&self, element: &Element, node: &SchemaNode, depth: usize) -> Result<()> {
        self.limits.check_depth(depth)?;
        for qname in element.attributes.keys() {
            self.schema.attribute(node, qname)?;
        }
        for child in &element.children {
            let child_node = self.schema.child(node, &child.qname)?;
            self.check_declared(child, child_node, depth + 1)?;
        }
        Ok(())
    }
}

/// Filter `root` against `schema` for the given category
pub fn filter(
    root: &Element,
    schema: &SchemaModel,
    subsets: &BTreeSet<SubsetId>,
    category: SubsetCategory,
) -> Result<Element> {
    SubsetFilter::new(schema).filter(root, subsets, category)
}

/// Keep the nodes of `document` that belong to the requested common subsets
pub fn filter_common_subsets(
    document: &Document,
    schema: &SchemaModel,
    subsets: &BTreeSet<SubsetId>,
) -> Result<Document> {
    SubsetFilter::new(schema).filter_common_subsets(document, subsets)
}

/// Keep the nodes of `document` that belong to the requested identifier subsets
pub fn filter_identifier_subsets(
    document: &Document,
    schema: &SchemaModel,
    subsets: &BTreeSet<SubsetId>,
) -> Result<Document> {
    SubsetFilter::new(schema).filter_identifier_subsets(document, subsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;
    use crate::schema::{AttributeDefinition, ElementDefinition, SchemaDefinition, TypeDefinition};
    use crate::subsets::parse_subset_ids;
    use pretty_assertions::assert_eq;

    const NS: &str = "http://example.com/test";

    fn schema() -> SchemaModel {
        let text = || TypeDefinition::text("string");
        let root = ElementDefinition::new("root")
            .attribute(AttributeDefinition::new("version").common_subsets(["FI02"]))
            .child(ElementDefinition::new("always").with_type(text()))
            .child(
                ElementDefinition::new("child")
                    .repeatable(0)
                    .common_subsets(["FI01"])
                    .attribute(AttributeDefinition::new("attr"))
                    .attribute(AttributeDefinition::new("attr2").common_subsets(["FI02"]))
                    .child(ElementDefinition::new("inner").with_type(text()).common_subsets(["FI02"])),
            )
            .child(
                ElementDefinition::new("identifier")
                    .with_type(text())
                    .identifier_subsets(["FI01"]),
            );
        SchemaModel::new(&SchemaDefinition::new(root).with_target_namespace(NS)).unwrap()
    }

    fn document() -> Document {
        Document::from_string(
            r#"<root xmlns="http://example.com/test" version="2">
                <always>a</always>
                <child attr="1" attr2="2"><inner>x</inner></child>
                <child attr="3"/>
                <identifier>id</identifier>
            </root>"#,
        )
        .unwrap()
    }

    fn ids(ids: &[&str]) -> BTreeSet<SubsetId> {
        parse_subset_ids(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_keeps_structural_and_requested() {
        let schema = schema();
        let filtered = filter_common_subsets(&document(), &schema, &ids(&["FI01"])).unwrap();
        let root = filtered.root.unwrap();

        assert_eq!(root.get_attribute("version"), None);
        let names: Vec<_> = root.children.iter().map(Element::local_name).collect();
        assert_eq!(names, vec!["always", "child", "child", "identifier"]);
        let child = &root.children[1];
        assert_eq!(child.get_attribute("attr"), Some("1"));
        assert_eq!(child.get_attribute("attr2"), None);
        assert!(child.children.is_empty());
    }

    #[test]
    fn test_drops_whole_subtree() {
        let schema = schema();
        let filtered = filter_common_subsets(&document(), &schema, &ids(&["FI02"])).unwrap();
        let root = filtered.root.unwrap();
        assert_eq!(root.get_attribute("version"), Some("2"));
        assert!(root.find_children("child").is_empty());
        assert_eq!(root.find_children("always").len(), 1);
    }

    #[test]
    fn test_categories_are_independent() {
        let schema = schema();
        let filtered = filter_identifier_subsets(&document(), &schema, &ids(&["FI02"])).unwrap();
        let root = filtered.root.unwrap();
        // Common tags are ignored by the identifier filter
        assert_eq!(root.find_children("child").len(), 2);
        assert!(root.find_children("identifier").is_empty());
        assert_eq!(root.get_attribute("version"), Some("2"));
    }

    #[test]
    fn test_empty_request_keeps_only_structure() {
        let schema = schema();
        let filtered = filter_common_subsets(&document(), &schema, &BTreeSet::new()).unwrap();
        let root = filtered.root.unwrap();
        let names: Vec<_> = root.children.iter().map(Element::local_name).collect();
        assert_eq!(names, vec!["always", "identifier"]);
    }

    #[test]
    fn test_input_untouched_and_idempotent() {
        let schema = schema();
        let doc = document();
        let before = doc.clone();
        let once = filter_common_subsets(&doc, &schema, &ids(&["FI01"])).unwrap();
        let twice = filter_common_subsets(&once, &schema, &ids(&["FI01"])).unwrap();
        assert_eq!(doc, before);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_nodes() {
        let schema = schema();
        let doc = Document::from_string(r#"<root xmlns="http://example.com/test"><other/></root>"#)
            .unwrap();
        let err = filter_common_subsets(&doc, &schema, &ids(&["FI01"])).unwrap_err();
        assert!(err.is_not_in_schema());

        let wrong_root = Element::new(QName::local("root"));
        let err = filter(&wrong_root, &schema, &ids(&["FI01"]), SubsetCategory::Common).unwrap_err();
        assert!(err.is_not_in_schema());

        let doc = Document::from_string(
            r#"<root xmlns="http://example.com/test"><always unknown="1">a</always></root>"#,
        )
        .unwrap();
        assert!(filter_common_subsets(&doc, &schema, &ids(&["FI01"]))
            .unwrap_err()
            .is_not_in_schema());
    }

    #[test]
    fn test_empty_document() {
        let schema = schema();
        let err = filter_common_subsets(&Document::new(), &schema, &ids(&["FI01"])).unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[test]
    fn test_depth_limit() {
        let schema = schema();
        let filter = SubsetFilter::new(&schema).with_limits(Limits::default().with_max_depth(1));
        let err = filter.filter_common_subsets(&document(), &ids(&["FI01"])).unwrap_err();
        assert!(matches!(err, Error::TreeTooLarge(_)));
    }
}
