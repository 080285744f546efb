//! Subset identifiers and subset filtering
//!
//! A subset is a named partition of schema fields (for example a national
//! reporting variant such as `FI01`). Schema nodes carry two tag sets, one
//! per [`SubsetCategory`], and the [`SubsetFilter`] prunes documents down to
//! the nodes tagged for the requested ids.

mod filter;

pub use filter::{filter, filter_common_subsets, filter_identifier_subsets, SubsetFilter};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Subset identifier such as `FI01`
///
/// Cloning is cheap: the identifier text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsetId(Arc<str>);

impl SubsetId {
    /// Create a subset id, rejecting blank identifiers and embedded whitespace
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref();
        if id.trim().is_empty() || id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidSubsetId(id.to_string()));
        }
        Ok(Self(Arc::from(id)))
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubsetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for SubsetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubsetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a list of raw identifiers into a subset set
///
/// Fails on the first malformed id, before any traversal starts.
pub fn parse_subset_ids<I, S>(ids: I) -> Result<BTreeSet<SubsetId>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter().map(SubsetId::new).collect()
}

/// Which tag set of a schema node a filter consults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubsetCategory {
    /// Fields relevant across all reporting contexts for a subset
    Common,
    /// Identifier-only fields
    Identifier,
}

impl fmt::Display for SubsetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetCategory::Common => write!(f, "common"),
            SubsetCategory::Identifier => write!(f, "identifier"),
        }
    }
}

impl FromStr for SubsetCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "common" => Ok(SubsetCategory::Common),
            "identifier" => Ok(SubsetCategory::Identifier),
            other => Err(Error::Schema(format!("Unknown subset category: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_id_accepts_codes() {
        let id = SubsetId::new("FI01").unwrap();
        assert_eq!(id.as_str(), "FI01");
        assert_eq!(id.to_string(), "FI01");
        assert_eq!("BE03a".parse::<SubsetId>().unwrap().as_str(), "BE03a");
    }

    #[test]
    fn test_subset_id_rejects_blank() {
        assert!(matches!(SubsetId::new(""), Err(Error::InvalidSubsetId(_))));
        assert!(matches!(SubsetId::new("   "), Err(Error::InvalidSubsetId(_))));
        assert!(matches!(SubsetId::new("FI 01"), Err(Error::InvalidSubsetId(_))));
    }

    #[test]
    fn test_parse_subset_ids_fails_fast() {
        let ids = parse_subset_ids(["FI01", "FI02", "FI01"]).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(parse_subset_ids(["FI01", ""]).is_err());
    }

    #[test]
    fn test_subset_id_serde() {
        let id: SubsetId = serde_json::from_str("\"LT01\"").unwrap();
        assert_eq!(id.as_str(), "LT01");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"LT01\"");
        assert!(serde_json::from_str::<SubsetId>("\"\"").is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Common".parse::<SubsetCategory>().unwrap(), SubsetCategory::Common);
        assert_eq!(
            "identifier".parse::<SubsetCategory>().unwrap(),
            SubsetCategory::Identifier
        );
        assert!("other".parse::<SubsetCategory>().is_err());
    }
}
