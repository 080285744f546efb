//! Location paths
//!
//! A small XPath subset used to address document nodes from text content
//! overrides and the document manipulator.
//!
//! ## Supported syntax
//!
//! - `consignment/deliveryEvent/actualOccurrenceDateTime`, with an
//!   optional leading `/`; the first step names the document element
//! - positional predicates, 1-based: `usedTransportEquipment[2]`
//! - attribute predicates: `child[@attr='11']`
//! - a final attribute step `@schemeAgencyId` or `text()` step
//!
//! Names match by local name; namespace prefixes are accepted and ignored.

mod selectors;

pub use selectors::{split_path, PathPredicate, PathStep, PathStepKind};

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Parsed location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPath {
    raw: String,
    steps: Vec<PathStep>,
}

impl LocationPath {
    /// Parse a location path expression
    pub fn parse(expression: &str) -> Result<Self> {
        let raw = expression.trim();
        let body = raw.strip_prefix('/').unwrap_or(raw);
        if body.is_empty() {
            return Err(Error::Path(format!("Empty location path '{}'", expression)));
        }

        let steps = split_path(body)
            .into_iter()
            .map(|step| {
                if step.trim().is_empty() {
                    Err(Error::Path(format!(
                        "Empty step in '{}' (descendant axis is not supported)",
                        expression
                    )))
                } else {
                    PathStep::parse(step)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        for (i, step) in steps.iter().enumerate() {
            let is_last = i + 1 == steps.len();
            if step.kind != PathStepKind::Child && !is_last {
                return Err(Error::Path(format!(
                    "Only the last step of '{}' may select an attribute or text",
                    expression
                )));
            }
        }
        if steps.first().map(|s| s.kind) != Some(PathStepKind::Child) {
            return Err(Error::Path(format!(
                "'{}' must start with the document element",
                expression
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            steps,
        })
    }

    /// Original expression text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Every step, including a trailing attribute or text step
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Element steps only
    pub fn element_steps(&self) -> &[PathStep] {
        match self.steps.last().map(|s| s.kind) {
            Some(PathStepKind::Child) | None => &self.steps,
            Some(_) => &self.steps[..self.steps.len() - 1],
        }
    }

    /// Local name of the target attribute, if the path selects one
    pub fn target_attribute(&self) -> Option<&str> {
        self.steps
            .last()
            .filter(|s| s.kind == PathStepKind::Attribute)
            .map(|s| s.name.as_str())
    }
}

impl fmt::Display for LocationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for LocationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_absolute_are_equivalent() {
        let relative = LocationPath::parse("consignment/deliveryEvent").unwrap();
        let absolute = LocationPath::parse("/consignment/deliveryEvent").unwrap();
        assert_eq!(relative.steps(), absolute.steps());
        assert_eq!(absolute.as_str(), "/consignment/deliveryEvent");
    }

    #[test]
    fn test_attribute_target() {
        let path = LocationPath::parse("root/child/@attr2").unwrap();
        assert_eq!(path.element_steps().len(), 2);
        assert_eq!(path.target_attribute(), Some("attr2"));

        let path = LocationPath::parse("root/child/text()").unwrap();
        assert_eq!(path.element_steps().len(), 2);
        assert_eq!(path.target_attribute(), None);
    }

    #[test]
    fn test_rejects_malformed_paths() {
        assert!(LocationPath::parse("").is_err());
        assert!(LocationPath::parse("/").is_err());
        assert!(LocationPath::parse("root//child").is_err());
        assert!(LocationPath::parse("root/@a/child").is_err());
        assert!(LocationPath::parse("@a").is_err());
        assert!(matches!(LocationPath::parse("root/ch ild"), Err(Error::Path(_))));
    }
}
