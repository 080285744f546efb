//! Serializable schema definitions
//!
//! A [`SchemaDefinition`] is the exchange format between an external schema
//! compiler and this crate: a nested tree of element declarations with
//! their occurrence bounds, content types, attributes and subset tags. It
//! deserializes from JSON and has a small builder API for constructing
//! schemas in code.

use super::particles::Occurs;
use serde::{Deserialize, Serialize};

fn default_min_occurs() -> u32 {
    1
}

fn default_max_occurs() -> Option<u32> {
    Some(1)
}

fn default_true() -> bool {
    true
}

/// Top-level schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Target namespace applied to element declarations without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    /// Whether local elements are qualified with the target namespace
    #[serde(default = "default_true")]
    pub element_form_qualified: bool,

    /// Document element declaration
    pub root: ElementDefinition,
}

impl SchemaDefinition {
    /// Create a definition with the given document element
    pub fn new(root: ElementDefinition) -> Self {
        Self {
            target_namespace: None,
            element_form_qualified: true,
            root,
        }
    }

    /// Set the target namespace
    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }

    /// Set whether local elements are namespace qualified
    pub fn with_element_form_qualified(mut self, qualified: bool) -> Self {
        self.element_form_qualified = qualified;
        self
    }
}

/// Content type of an element or attribute
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type local name, e.g. `string` or `Identifier17`
    #[serde(default)]
    pub name: String,

    /// Base type local names, most specific first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<String>,

    /// Enumeration facet values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<String>,

    /// Whether the type has text content; inferred from children when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<bool>,
}

impl TypeDefinition {
    /// A named type with text content
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text_content: Some(true),
            ..Default::default()
        }
    }

    /// A named type with element-only content
    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text_content: Some(false),
            ..Default::default()
        }
    }

    /// Add a base type
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_types.push(base.into());
        self
    }

    /// Set the enumeration values
    pub fn with_enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enumeration = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Element declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDefinition {
    /// Local name
    pub name: String,

    /// Explicit namespace; the target namespace applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// minOccurs
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,

    /// maxOccurs, `null` for unbounded
    #[serde(default = "default_max_occurs")]
    pub max_occurs: Option<u32>,

    /// Content type
    #[serde(rename = "type", default)]
    pub xml_type: TypeDefinition,

    /// Subset ids relevant for common filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_subsets: Vec<String>,

    /// Subset ids relevant for identifier filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier_subsets: Vec<String>,

    /// Attribute declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDefinition>,

    /// Child element declarations in sequence order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDefinition>,
}

impl ElementDefinition {
    /// Create a single-occurrence element declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            min_occurs: 1,
            max_occurs: Some(1),
            xml_type: TypeDefinition::default(),
            common_subsets: Vec::new(),
            identifier_subsets: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an explicit namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the occurrence bounds
    pub fn occurs(mut self, min: u32, max: Option<u32>) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self
    }

    /// Make the element repeatable with the given minimum and no maximum
    pub fn repeatable(self, min: u32) -> Self {
        self.occurs(min, None)
    }

    /// Set the content type
    pub fn with_type(mut self, xml_type: TypeDefinition) -> Self {
        self.xml_type = xml_type;
        self
    }

    /// Set the common subset tags
    pub fn common_subsets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common_subsets = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identifier subset tags
    pub fn identifier_subsets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_subsets = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Append a child element declaration
    pub fn child(mut self, child: ElementDefinition) -> Self {
        self.children.push(child);
        self
    }

    /// Append an attribute declaration
    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Occurrence bounds of this declaration
    pub fn occurrence(&self) -> Occurs {
        Occurs::new(self.min_occurs, self.max_occurs)
    }
}

/// Attribute declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Local name
    pub name: String,

    /// Namespace for qualified attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Whether the attribute is required
    #[serde(default)]
    pub required: bool,

    /// Value type
    #[serde(rename = "type", default)]
    pub xml_type: TypeDefinition,

    /// Subset ids relevant for common filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_subsets: Vec<String>,

    /// Subset ids relevant for identifier filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier_subsets: Vec<String>,
}

impl AttributeDefinition {
    /// Create an optional string-typed attribute declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            required: false,
            xml_type: TypeDefinition::text("string"),
            common_subsets: Vec::new(),
            identifier_subsets: Vec::new(),
        }
    }

    /// Mark the attribute as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the value type
    pub fn with_type(mut self, xml_type: TypeDefinition) -> Self {
        self.xml_type = xml_type;
        self
    }

    /// Set the common subset tags
    pub fn common_subsets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.common_subsets = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the identifier subset tags
    pub fn identifier_subsets<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_subsets = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Occurrence bounds of this declaration
    pub fn occurrence(&self) -> Occurs {
        if self.required {
            Occurs::required()
        } else {
            Occurs::optional()
        }
    }
}
