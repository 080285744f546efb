//! XML name checks shared by schema loading and location paths

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII and Latin-1 subset of the NCName production
static NCNAME: Lazy<Regex> = Lazy::new(|| {
    let start = r"A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}";
    Regex::new(&format!(r"^[{start}][{start}\-\.0-9\u{{B7}}]*$")).unwrap()
});

/// Whether `name` is a non-colonized XML name
pub fn is_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Split `prefix:local` or `local`, `None` unless every part is an NCName
pub fn prefixed_name(raw: &str) -> Option<(Option<&str>, &str)> {
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    };
    (prefix.map_or(true, is_ncname) && is_ncname(local)).then_some((prefix, local))
}

/// Reject a schema declaration whose name is not an NCName
pub fn declared_name(name: &str) -> Result<&str> {
    if is_ncname(name) {
        Ok(name)
    } else {
        Err(Error::Schema(format!("Invalid NCName: '{}'", name)))
    }
}
