//! Occurrence bounds of element and attribute declarations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

// Random counts never exceed this many instances above max(min, 1)
const RANDOM_HEADROOM: u32 = 2;

/// `minOccurs`/`maxOccurs` of a declaration, `max: None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurs {
    /// Minimum count
    pub min: u32,
    /// Maximum count
    pub max: Option<u32>,
}

impl Occurs {
    /// Bounds `min..=max`
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Exactly once
    pub const fn required() -> Self {
        Self::new(1, Some(1))
    }

    /// At most once
    pub const fn optional() -> Self {
        Self::new(0, Some(1))
    }

    /// Any number of times
    pub const fn unbounded() -> Self {
        Self::new(0, None)
    }

    /// Whether more than one instance may occur under one parent
    pub fn is_repeatable(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// Whether `min <= max` holds
    pub fn is_valid(&self) -> bool {
        self.max.map_or(true, |max| self.min <= max)
    }

    /// Count used when every declaration is instantiated at least once
    ///
    /// Declarations with `max == 0` stay absent.
    pub fn at_least_one(&self) -> u32 {
        self.capped(self.min.max(1))
    }

    /// `count` lowered to the declared maximum
    pub fn capped(&self, count: u32) -> u32 {
        self.max.map_or(count, |max| count.min(max))
    }

    /// Range a random instance count is drawn from
    ///
    /// Starts at `min` and ends at `max` or `max(min, 1) + 2`, whichever is
    /// lower, but never below `min`.
    pub fn random_range(&self) -> RangeInclusive<u32> {
        let cap = self.min.max(1).saturating_add(RANDOM_HEADROOM);
        let high = self.max.map_or(cap, |max| max.min(cap)).max(self.min);
        self.min..=high
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::required()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..unbounded", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeatable() {
        assert!(!Occurs::required().is_repeatable());
        assert!(!Occurs::optional().is_repeatable());
        assert!(!Occurs::new(0, Some(0)).is_repeatable());
        assert!(Occurs::unbounded().is_repeatable());
        assert!(Occurs::new(0, Some(2)).is_repeatable());
    }

    #[test]
    fn test_at_least_one() {
        assert_eq!(Occurs::optional().at_least_one(), 1);
        assert_eq!(Occurs::new(3, None).at_least_one(), 3);
        assert_eq!(Occurs::new(0, Some(0)).at_least_one(), 0);
        assert_eq!(Occurs::new(0, Some(0)).capped(1), 0);
        assert_eq!(Occurs::unbounded().capped(7), 7);
    }

    #[test]
    fn test_random_range() {
        assert_eq!(Occurs::required().random_range(), 1..=1);
        assert_eq!(Occurs::optional().random_range(), 0..=1);
        assert_eq!(Occurs::unbounded().random_range(), 0..=3);
        assert_eq!(Occurs::new(0, Some(2)).random_range(), 0..=2);
        assert_eq!(Occurs::new(4, None).random_range(), 4..=6);
        assert_eq!(Occurs::new(0, Some(0)).random_range(), 0..=0);
    }

    #[test]
    fn test_validity_and_display() {
        assert!(Occurs::new(2, Some(2)).is_valid());
        assert!(!Occurs::new(3, Some(1)).is_valid());
        assert_eq!(Occurs::unbounded().to_string(), "0..unbounded");
        assert_eq!(Occurs::new(1, Some(5)).to_string(), "1..5");
    }
}
