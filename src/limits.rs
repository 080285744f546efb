//! Limits and constraints for tree processing
//!
//! Filtering, population and parsing are recursive over the tree; these
//! limits bound their cost on pathological schemas or documents.

use crate::error::{Error, Result};

/// Size limits shared by the schema builder, filter, populator and parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth (the root is depth 1)
    pub max_depth: usize,

    /// Maximum number of element and attribute nodes in one tree
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_nodes: 1_000_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 100_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 4096,
            max_nodes: 50_000_000,
        }
    }

    /// Set the maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum node count
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Check if tree depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::TreeTooLarge(format!(
                "depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if node count is within limits
    pub fn check_nodes(&self, count: usize) -> Result<()> {
        if count > self.max_nodes {
            Err(Error::TreeTooLarge(format!(
                "node count {} exceeds maximum {}",
                count, self.max_nodes
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_depth, 256);
        assert!(limits.check_depth(200).is_ok());
        assert!(limits.check_depth(257).is_err());
    }

    #[test]
    fn test_strict_limits() {
        let limits = Limits::strict();
        assert!(limits.max_depth < Limits::default().max_depth);
        assert!(limits.check_nodes(100_001).is_err());
    }

    #[test]
    fn test_permissive_limits() {
        let limits = Limits::permissive();
        assert!(limits.max_depth > Limits::default().max_depth);
        assert!(limits.check_depth(1000).is_ok());
    }

    #[test]
    fn test_builder_and_error_kind() {
        let limits = Limits::new().with_max_depth(2).with_max_nodes(3);
        assert!(limits.check_depth(2).is_ok());
        assert!(matches!(limits.check_depth(3), Err(Error::TreeTooLarge(_))));
        assert!(matches!(limits.check_nodes(4), Err(Error::TreeTooLarge(_))));
    }
}
