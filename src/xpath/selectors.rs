//! Location path steps
//!
//! A step is a local name with an optional prefix (ignored when matching)
//! and an optional predicate: a 1-based position (`item[2]`) or an
//! attribute comparison (`item[@id='7']`).

use crate::error::{Error, Result};
use crate::names::prefixed_name;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::namespaces::QName;

static ATTRIBUTE_PREDICATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@([^\s='"]+)\s*=\s*(?:'([^']*)'|"([^"]*)")$"#).unwrap()
});

/// Kind of location step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStepKind {
    /// Child element step
    Child,
    /// Attribute step (`@name`), only valid as the last step
    Attribute,
    /// `text()` step, selects the text of the preceding element
    Text,
}

/// Step predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPredicate {
    /// 1-based position among same-named siblings
    Position(usize),
    /// Attribute with the given local name has the given value
    AttributeEquals {
        /// Attribute local name
        name: String,
        /// Expected value
        value: String,
    },
}

/// A single step in a location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// The kind of step
    pub kind: PathStepKind,
    /// The local name (empty for text steps)
    pub name: String,
    /// Optional namespace prefix, ignored when matching
    pub prefix: Option<String>,
    /// Optional predicate
    pub predicate: Option<PathPredicate>,
}

impl PathStep {
    /// Parse a step from a string
    pub fn parse(step: &str) -> Result<Self> {
        let step = step.trim();

        if step == "text()" {
            return Ok(Self {
                kind: PathStepKind::Text,
                name: String::new(),
                prefix: None,
                predicate: None,
            });
        }

        let (kind, rest) = if let Some(rest) = step.strip_prefix('@') {
            (PathStepKind::Attribute, rest)
        } else if let Some(rest) = step.strip_prefix("attribute::") {
            (PathStepKind::Attribute, rest)
        } else if let Some(rest) = step.strip_prefix("child::") {
            (PathStepKind::Child, rest)
        } else {
            (PathStepKind::Child, step)
        };

        // Extract predicate if present
        let (name_part, predicate) = match rest.find('[') {
            Some(bracket_pos) => {
                let pred = rest[bracket_pos + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| Error::Path(format!("Unclosed predicate in step '{}'", step)))?;
                (&rest[..bracket_pos], Some(parse_predicate(pred.trim())?))
            }
            None => (rest, None),
        };

        if kind == PathStepKind::Attribute && predicate.is_some() {
            return Err(Error::Path(format!("Attribute step '{}' cannot have a predicate", step)));
        }
        let (prefix, name) = prefixed_name(name_part)
            .ok_or_else(|| Error::Path(format!("Invalid name in step '{}'", step)))?;
        Ok(Self {
            kind,
            name: name.to_string(),
            prefix: prefix.map(str::to_string),
            predicate,
        })
    }

    /// Whether an element step matches an element by local name, 1-based
    /// position among same-named siblings, and attributes
    pub fn matches_element(
        &self,
        local_name: &str,
        position: usize,
        attributes: &IndexMap<QName, String>,
    ) -> bool {
        if self.kind != PathStepKind::Child || self.name != local_name {
            return false;
        }
        match &self.predicate {
            None => true,
            Some(PathPredicate::Position(p)) => *p == position,
            Some(PathPredicate::AttributeEquals { name, value }) => attributes
                .iter()
                .any(|(qname, v)| qname.local_name == *name && v == value),
        }
    }

    /// Whether the predicate can be decided from the position alone
    pub fn is_positional(&self) -> bool {
        !matches!(self.predicate, Some(PathPredicate::AttributeEquals { .. }))
    }
}

fn parse_predicate(pred: &str) -> Result<PathPredicate> {
    if let Ok(position) = pred.parse::<usize>() {
        if position == 0 {
            return Err(Error::Path("Positions are 1-based".to_string()));
        }
        return Ok(PathPredicate::Position(position));
    }

    let caps = ATTRIBUTE_PREDICATE
        .captures(pred)
        .ok_or_else(|| Error::Path(format!("Unsupported predicate '[{}]'", pred)))?;
    let (_, name) = prefixed_name(&caps[1])
        .ok_or_else(|| Error::Path(format!("Invalid attribute name in predicate '[{}]'", pred)))?;
    let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Ok(PathPredicate::AttributeEquals {
        name: name.to_string(),
        value,
    })
}

/// Split a path expression on `/`, keeping slashes inside predicates
pub fn split_path(path: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                steps.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    steps.push(&path[start..]);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_child_step() {
        let step = PathStep::parse("deliveryEvent").unwrap();
        assert_eq!(step.kind, PathStepKind::Child);
        assert_eq!(step.name, "deliveryEvent");
        assert!(step.predicate.is_none());
    }

    #[test]
    fn test_parse_prefixed_and_positional() {
        let step = PathStep::parse("c:item[2]").unwrap();
        assert_eq!(step.prefix.as_deref(), Some("c"));
        assert_eq!(step.name, "item");
        assert_eq!(step.predicate, Some(PathPredicate::Position(2)));
        assert!(PathStep::parse("item[0]").is_err());
    }

    #[test]
    fn test_parse_attribute_predicate() {
        let step = PathStep::parse("child[@attr='11']").unwrap();
        assert_eq!(
            step.predicate,
            Some(PathPredicate::AttributeEquals {
                name: "attr".to_string(),
                value: "11".to_string()
            })
        );
        let step = PathStep::parse(r#"child[@attr="a/b"]"#).unwrap();
        assert!(matches!(step.predicate, Some(PathPredicate::AttributeEquals { ref value, .. }) if value == "a/b"));
    }

    #[test]
    fn test_parse_attribute_and_text() {
        assert_eq!(PathStep::parse("@schemeAgencyId").unwrap().kind, PathStepKind::Attribute);
        assert_eq!(PathStep::parse("text()").unwrap().kind, PathStepKind::Text);
        assert!(PathStep::parse("@a[1]").is_err());
        assert!(PathStep::parse("1abc").is_err());
        assert!(PathStep::parse("item[last()]").is_err());
    }

    #[test]
    fn test_matches_element() {
        let mut attrs = IndexMap::new();
        attrs.insert(QName::local("attr"), "11".to_string());

        let step = PathStep::parse("child[@attr='11']").unwrap();
        assert!(step.matches_element("child", 5, &attrs));
        assert!(!step.matches_element("other", 1, &attrs));
        assert!(!step.is_positional());

        let step = PathStep::parse("child[2]").unwrap();
        assert!(step.matches_element("child", 2, &IndexMap::new()));
        assert!(!step.matches_element("child", 1, &IndexMap::new()));
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("a/b[@x='1/2']/c"), vec!["a", "b[@x='1/2']", "c"]);
        assert_eq!(split_path("a"), vec!["a"]);
    }
}
