//! Text content overrides
//!
//! An override pins the content of the nodes selected by a location path,
//! written on the command line as `path:=value`.

use crate::error::{Error, Result};
use crate::schema::SchemaModel;
use crate::xpath::LocationPath;
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = ":=";

/// Fixed content for the nodes selected by `path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContentOverride {
    /// Selected nodes
    pub path: LocationPath,
    /// Replacement text
    pub value: String,
}

impl TextContentOverride {
    /// Create an override
    pub fn new(path: LocationPath, value: impl Into<String>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Parse `path:=value`; both sides are trimmed and the value may be empty
    pub fn parse(expression: &str) -> Result<Self> {
        let (path, value) = expression.split_once(SEPARATOR).ok_or_else(|| {
            Error::Override(format!(
                "Expected '<path>{}<value>', got '{}'",
                SEPARATOR, expression
            ))
        })?;
        if path.trim().is_empty() {
            return Err(Error::Override(format!("Missing path in '{}'", expression)));
        }
        let path = LocationPath::parse(path)
            .map_err(|e| Error::Override(format!("Invalid path in '{}': {}", expression, e)))?;
        Ok(Self::new(path, value.trim()))
    }

    /// Check that every step of the path names a node declared by `schema`
    pub fn resolve(&self, schema: &SchemaModel) -> Result<()> {
        let not_in_schema = || Error::not_in_schema(self.path.as_str());
        let mut steps = self.path.element_steps().iter();

        let mut node = schema.root();
        match steps.next() {
            Some(step) if step.name == node.name().local_name => {}
            _ => return Err(not_in_schema()),
        }
        for step in steps {
            node = schema
                .child_by_local_name(node, &step.name)
                .ok_or_else(not_in_schema)?;
        }
        if let Some(attribute) = self.path.target_attribute() {
            schema
                .attribute_by_local_name(node, attribute)
                .ok_or_else(not_in_schema)?;
        }
        Ok(())
    }
}

impl fmt::Display for TextContentOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.path, SEPARATOR, self.value)
    }
}

impl FromStr for TextContentOverride {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeDefinition, ElementDefinition, SchemaDefinition, TypeDefinition};

    fn schema() -> SchemaModel {
        let root = ElementDefinition::new("consignment")
            .child(
                ElementDefinition::new("carrier")
                    .repeatable(0)
                    .attribute(AttributeDefinition::new("schemeAgencyId"))
                    .child(ElementDefinition::new("name").with_type(TypeDefinition::text("string"))),
            );
        SchemaModel::new(&SchemaDefinition::new(root).with_target_namespace("http://example.com/c"))
            .unwrap()
    }

    #[test]
    fn test_parse() {
        let o = TextContentOverride::parse("consignment/carrier[2]/name:= Acme ").unwrap();
        assert_eq!(o.path.as_str(), "consignment/carrier[2]/name");
        assert_eq!(o.value, "Acme");

        let o: TextContentOverride = "a/b:=".parse().unwrap();
        assert_eq!(o.value, "");

        let o = TextContentOverride::parse("a/b:=x:=y").unwrap();
        assert_eq!(o.value, "x:=y");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(TextContentOverride::parse("a/b=x"), Err(Error::Override(_))));
        assert!(matches!(TextContentOverride::parse(":=x"), Err(Error::Override(_))));
        assert!(matches!(TextContentOverride::parse("a//b:=x"), Err(Error::Override(_))));
    }

    #[test]
    fn test_resolve() {
        let schema = schema();
        for ok in [
            "consignment",
            "/consignment/carrier/name",
            "consignment/carrier[3]/@schemeAgencyId",
            "c:consignment/c:carrier/text()",
        ] {
            TextContentOverride::parse(&format!("{}:=v", ok))
                .unwrap()
                .resolve(&schema)
                .unwrap();
        }
        for missing in ["shipment", "consignment/driver", "consignment/carrier/@id", "consignment/name"] {
            let err = TextContentOverride::parse(&format!("{}:=v", missing))
                .unwrap()
                .resolve(&schema)
                .unwrap_err();
            assert!(err.is_not_in_schema(), "{}", missing);
        }
    }
}
