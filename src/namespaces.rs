//! Qualified names and namespace scopes
//!
//! Schema nodes and document elements are both keyed by [`QName`]; the
//! document reader resolves raw `prefix:name` strings through a
//! [`NamespaceScope`] that follows the `xmlns` declarations in effect.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Namespace permanently bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace-qualified name, displayed in Clark notation `{ns}local`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, `None` when unqualified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Local part
    pub local_name: String,
}

impl QName {
    /// Name in the given namespace, or unqualified for `None`
    pub fn new(namespace: Option<&str>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local_name: local_name.into(),
        }
    }

    /// Unqualified name
    pub fn local(local_name: impl Into<String>) -> Self {
        Self::new(None, local_name)
    }

    /// Name in `namespace`
    pub fn namespaced(namespace: &str, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// Same local name in another namespace
    pub fn with_namespace(&self, namespace: Option<&str>) -> Self {
        Self::new(namespace, self.local_name.clone())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{{{}}}", ns)?;
        }
        f.write_str(&self.local_name)
    }
}

/// Namespace declarations in effect for one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceScope {
    prefixes: HashMap<String, String>,
    // `Some("")` is an explicit `xmlns=""`
    default_namespace: Option<String>,
}

impl NamespaceScope {
    /// Scope without declarations
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `attribute_name="value"` if it is an `xmlns` declaration
    ///
    /// Returns `false` for ordinary attributes, which are left to the caller.
    pub fn declare(&mut self, attribute_name: &str, value: &str) -> bool {
        if attribute_name == "xmlns" {
            self.default_namespace = Some(value.to_string());
            true
        } else if let Some(prefix) = attribute_name.strip_prefix("xmlns:") {
            self.prefixes.insert(prefix.to_string(), value.to_string());
            true
        } else {
            false
        }
    }

    /// Namespace bound to `prefix`; `xml` is always bound
    pub fn prefix_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Default namespace, `None` when undeclared or reset with `xmlns=""`
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref().filter(|ns| !ns.is_empty())
    }

    /// Whether the scope declares nothing
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// This scope with `declarations` layered on top
    pub fn nested(&self, declarations: &NamespaceScope) -> Self {
        let mut scope = self.clone();
        for (prefix, ns) in &declarations.prefixes {
            scope.prefixes.insert(prefix.clone(), ns.clone());
        }
        if declarations.default_namespace.is_some() {
            scope.default_namespace = declarations.default_namespace.clone();
        }
        scope
    }

    /// Resolve an element name; unprefixed names take the default namespace
    pub fn element_name(&self, raw: &str) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => self.prefixed(prefix, local),
            None => Ok(QName::new(self.default_namespace(), raw)),
        }
    }

    /// Resolve an attribute name; unprefixed names have no namespace
    pub fn attribute_name(&self, raw: &str) -> Result<QName> {
        match raw.split_once(':') {
            Some((prefix, local)) => self.prefixed(prefix, local),
            None => Ok(QName::local(raw)),
        }
    }

    fn prefixed(&self, prefix: &str, local: &str) -> Result<QName> {
        self.prefix_namespace(prefix)
            .map(|ns| QName::namespaced(ns, local))
            .ok_or_else(|| Error::Xml(format!("Undeclared namespace prefix '{}'", prefix)))
    }
}
