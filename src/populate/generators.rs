//! Seeded value generators
//!
//! [`ValueGeneratorFactory`] hands out one [`ValueGenerator`] per value
//! path, seeded from a stable hash of the path and the populate seed. Leaf
//! content is produced by the most specific [`ValueMatcher`] found along
//! the node's type lineage.

use super::value_path::ValuePath;
use crate::namespaces::QName;
use crate::schema::XmlType;
use base64::Engine;
use chrono::{DateTime, Utc};
use fastrand::Rng;
use rust_decimal::Decimal;

const ASCII_LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

// 2020-01-01T00:00:00Z and 2040-01-01T00:00:00Z
const INSTANT_START: i64 = 1_577_836_800;
const INSTANT_END: i64 = 2_208_988_800;

/// Stable 64-bit FNV-1a hash; independent of the std hasher so fixtures
/// stay reproducible across toolchains.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Creates per-path generators for one populate call
#[derive(Debug, Clone, Copy)]
pub struct ValueGeneratorFactory {
    seed: u64,
}

impl ValueGeneratorFactory {
    /// Create a factory for the given seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Fresh generator for a value path
    pub fn for_path(&self, path: &ValuePath) -> ValueGenerator {
        let key = format!("{}.{}", path, self.seed);
        ValueGenerator {
            rng: Rng::with_seed(fnv1a(key.as_bytes())),
        }
    }
}

/// Deterministic random source for one node
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    rng: Rng,
}

impl ValueGenerator {
    /// Lowercase ASCII letter
    pub fn next_ascii_char(&mut self) -> char {
        char::from(ASCII_LOWERCASE[self.rng.usize(..ASCII_LOWERCASE.len())])
    }

    /// Token of lowercase ASCII letters
    pub fn next_token(&mut self, length: usize) -> String {
        (0..length).map(|_| self.next_ascii_char()).collect()
    }

    /// One of the given choices, `None` when empty
    pub fn next_choice<'a, T>(&mut self, choices: &'a [T]) -> Option<&'a T> {
        if choices.is_empty() {
            None
        } else {
            choices.get(self.rng.usize(..choices.len()))
        }
    }

    /// Random boolean
    pub fn next_bool(&mut self) -> bool {
        self.rng.bool()
    }

    /// Integer in `[start, end]`
    pub fn next_u32_inclusive(&mut self, start: u32, end: u32) -> u32 {
        self.rng.u32(start..=end)
    }

    /// Integer in `[start, end)`
    pub fn next_i64(&mut self, start: i64, end: i64) -> i64 {
        self.rng.i64(start..end)
    }

    /// Instant between 2020 and 2040
    pub fn next_instant(&mut self) -> DateTime<Utc> {
        let seconds = self.next_i64(INSTANT_START, INSTANT_END);
        DateTime::from_timestamp(seconds, 0).unwrap_or_default()
    }
}

/// Selects which generator applies to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMatcher {
    /// Node local name equals the given name
    Name(&'static str),
    /// Type (or base type) local name equals the given name
    Type(&'static str),
    /// Type has enumeration values
    Enumeration,
}

impl ValueMatcher {
    fn matches(&self, name: &QName, type_name: &str, xml_type: &XmlType) -> bool {
        match self {
            ValueMatcher::Name(local) => name.local_name == *local,
            ValueMatcher::Type(local) => type_name == *local,
            ValueMatcher::Enumeration => !xml_type.enumeration.is_empty(),
        }
    }
}

/// Kind of generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Lowercase token of the given length
    Token(usize),
    /// 1-based repeat index of the instance
    RepeatIndex,
    /// Base64 of a token
    Base64,
    /// `true` or `false`
    Boolean,
    /// Fixed text
    Fixed(&'static str),
    /// `yyyyMMddHHmm+0000`, the UN/CEFACT 205 date time format
    DateTime,
    /// Two-decimal number in `[0, 10)`
    Decimal,
    /// Integer in `[1000, 9999]`
    Integer,
    /// One of the type's enumeration values
    Enumeration,
}

/// Generator table, in priority order for each type of the lineage
pub const GENERATORS: &[(ValueMatcher, ValueKind)] = &[
    (ValueMatcher::Name("schemeAgencyId"), ValueKind::Token(6)),
    (ValueMatcher::Name("sequenceNumber"), ValueKind::RepeatIndex),
    (ValueMatcher::Type("base64Binary"), ValueKind::Base64),
    (ValueMatcher::Type("boolean"), ValueKind::Boolean),
    // Always the same format for simplicity
    (ValueMatcher::Type("DateTimeFormat"), ValueKind::Fixed("205")),
    (ValueMatcher::Type("DateTime"), ValueKind::DateTime),
    (ValueMatcher::Type("decimal"), ValueKind::Decimal),
    (ValueMatcher::Type("Identifier17"), ValueKind::Token(6)),
    (ValueMatcher::Type("integer"), ValueKind::Integer),
    (ValueMatcher::Type("string"), ValueKind::Token(4)),
    (ValueMatcher::Enumeration, ValueKind::Enumeration),
];

/// Most specific generator for a node: the first table match for the type
/// itself, then for each base type in order, else a 6-letter token.
pub fn find_generator(name: &QName, xml_type: &XmlType) -> ValueKind {
    xml_type
        .lineage()
        .find_map(|type_name| {
            GENERATORS
                .iter()
                .find(|(matcher, _)| matcher.matches(name, type_name, xml_type))
                .map(|(_, kind)| *kind)
        })
        .unwrap_or(ValueKind::Token(6))
}

/// Generate the content of one node
pub fn generate_value(
    kind: ValueKind,
    generator: &mut ValueGenerator,
    repeat_index: u32,
    xml_type: &XmlType,
) -> String {
    match kind {
        ValueKind::Token(length) => generator.next_token(length),
        ValueKind::RepeatIndex => (repeat_index + 1).to_string(),
        ValueKind::Base64 => {
            base64::engine::general_purpose::STANDARD.encode(generator.next_token(6))
        }
        ValueKind::Boolean => generator.next_bool().to_string(),
        ValueKind::Fixed(text) => text.to_string(),
        ValueKind::DateTime => generator.next_instant().format("%Y%m%d%H%M%z").to_string(),
        ValueKind::Decimal => Decimal::new(generator.next_i64(0, 1000), 2).to_string(),
        ValueKind::Integer => generator.next_u32_inclusive(1000, 9999).to_string(),
        ValueKind::Enumeration => generator
            .next_choice(&xml_type.enumeration)
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml_type(name: &str, bases: &[&str], enumeration: &[&str]) -> XmlType {
        XmlType {
            name: name.to_string(),
            base_types: bases.iter().map(|s| s.to_string()).collect(),
            enumeration: enumeration.iter().map(|s| s.to_string()).collect(),
            text_content: true,
        }
    }

    #[test]
    fn test_fnv1a_is_stable() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_same_path_same_values() {
        let factory = ValueGeneratorFactory::new(42);
        let path = ValuePath::new().append_name("root").append_name("leaf");
        let a = factory.for_path(&path).next_token(12);
        let b = factory.for_path(&path).next_token(12);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_seed_changes_values() {
        let path = ValuePath::new().append_name("root");
        let tokens: std::collections::HashSet<_> = (0..8)
            .map(|seed| ValueGeneratorFactory::new(seed).for_path(&path).next_token(16))
            .collect();
        assert!(tokens.len() > 1);
    }

    #[test]
    fn test_name_matchers_win() {
        let ty = xml_type("integer", &[], &[]);
        assert_eq!(find_generator(&QName::local("sequenceNumber"), &ty), ValueKind::RepeatIndex);
        assert_eq!(find_generator(&QName::local("count"), &ty), ValueKind::Integer);
    }

    #[test]
    fn test_base_type_lineage() {
        let ty = xml_type("WeightType", &["decimal"], &[]);
        assert_eq!(find_generator(&QName::local("weight"), &ty), ValueKind::Decimal);

        let ty = xml_type("ModeCode", &["token"], &["1", "2", "8"]);
        assert_eq!(find_generator(&QName::local("modeCode"), &ty), ValueKind::Enumeration);

        let ty = xml_type("Unknown", &[], &[]);
        assert_eq!(find_generator(&QName::local("x"), &ty), ValueKind::Token(6));
    }

    #[test]
    fn test_generated_formats() {
        let factory = ValueGeneratorFactory::new(7);
        let mut gen = factory.for_path(&ValuePath::new().append_name("v"));
        let ty = xml_type("ModeCode", &[], &["1", "2", "8"]);

        let date = generate_value(ValueKind::DateTime, &mut gen, 0, &ty);
        assert_eq!(date.len(), 17);
        assert!(date.ends_with("+0000"));
        let year: i32 = date[..4].parse().unwrap();
        assert!((2020..2040).contains(&year));

        let decimal = generate_value(ValueKind::Decimal, &mut gen, 0, &ty);
        let parsed: f64 = decimal.parse().unwrap();
        assert!((0.0..10.0).contains(&parsed));
        assert_eq!(decimal.split('.').nth(1).map(str::len), Some(2));

        let integer: u32 = generate_value(ValueKind::Integer, &mut gen, 0, &ty).parse().unwrap();
        assert!((1000..=9999).contains(&integer));

        let choice = generate_value(ValueKind::Enumeration, &mut gen, 0, &ty);
        assert!(["1", "2", "8"].contains(&choice.as_str()));

        assert_eq!(generate_value(ValueKind::RepeatIndex, &mut gen, 2, &ty), "3");
        assert_eq!(generate_value(ValueKind::Fixed("205"), &mut gen, 0, &ty), "205");

        let encoded = generate_value(ValueKind::Base64, &mut gen, 0, &ty);
        let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded.len(), 6);
    }
}
