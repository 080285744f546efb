//! Value paths
//!
//! A value path names one generated node by the local names and repeat
//! indices leading to it, e.g. `consignment/carrier/0/name`. The populator
//! seeds a fresh generator from each path, which is what makes every node's
//! content independent of the rest of the tree.

use std::fmt;

/// Path of a generated node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ValuePath {
    segments: Vec<String>,
}

impl ValuePath {
    /// Empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Path extended with an element local name
    pub fn append_name(&self, local_name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(local_name.to_string());
        Self { segments }
    }

    /// Path extended with a 0-based repeat index
    pub fn append_index(&self, repeat_index: u32) -> Self {
        let mut segments = self.segments.clone();
        segments.push(repeat_index.to_string());
        Self { segments }
    }

    /// Path extended with an attribute local name
    pub fn append_attribute(&self, local_name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("@{}", local_name));
        Self { segments }
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append() {
        let path = ValuePath::new()
            .append_name("consignment")
            .append_name("carrier")
            .append_index(1)
            .append_attribute("schemeAgencyId");
        assert_eq!(path.to_string(), "consignment/carrier/1/@schemeAgencyId");
        assert_eq!(path.segments().len(), 4);
    }

    #[test]
    fn test_append_does_not_mutate() {
        let parent = ValuePath::new().append_name("root");
        let _child = parent.append_name("child");
        assert_eq!(parent.to_string(), "root");
    }
}
