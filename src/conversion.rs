//! Projection between schemas
//!
//! Turns a document valid for one schema into a document for a narrower
//! schema sharing the same structure, such as a consignment common document
//! into a consignment identifier document.

use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::schema::{SchemaModel, SchemaNode};
use tracing::{debug, trace};

/// Copy `document`, keeping only nodes declared by `target`
///
/// Nodes are matched by local name. Names in the namespace of the source
/// document element are moved to the namespace of the target document
/// element; other namespaces are left alone.
pub fn project(document: &Document, target: &SchemaModel) -> Result<Document> {
    let root = document.require_root()?;
    let node = target.root();
    if root.local_name() != node.name().local_name {
        return Err(Error::not_in_schema(root.qname.to_string()));
    }

    let projection = Projection {
        target,
        source_namespace: root.namespace(),
        target_namespace: node.name().namespace.as_deref(),
    };
    let projected = projection.element(root, node);
    debug!(
        source = %root.qname,
        target = %projected.qname,
        before = root.element_count(),
        after = projected.element_count(),
        "projected document"
    );
    Ok(Document::with_root(projected))
}

struct Projection<'a> {
    target: &'a SchemaModel,
    source_namespace: Option<&'a str>,
    target_namespace: Option<&'a str>,
}

impl Projection<'_> {
    fn rename(&self, qname: &QName) -> QName {
        if qname.namespace.is_some() && qname.namespace.as_deref() == self.source_namespace {
            qname.with_namespace(self.target_namespace)
        } else {
            qname.clone()
        }
    }

    fn element(&self, element: &Element, node: &SchemaNode) -> Element {
        let mut out = Element::new(self.rename(&element.qname));
        out.text = element.text.clone();

        for (qname, value) in &element.attributes {
            if self
                .target
                .attribute_by_local_name(node, &qname.local_name)
                .is_some()
            {
                out.attributes.insert(self.rename(qname), value.clone());
            }
        }

        for child in &element.children {
            match self.target.child_by_local_name(node, child.local_name()) {
                Some(child_node) => out.children.push(self.element(child, child_node)),
                None => trace!(element = %child.qname, "not in target schema"),
            }
        }
        out
    }
}
