//! Case conversion and English pluralization for entity and member names.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Naming convention applied uniformly to an outline's own name and to all of its members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseConvention {
    #[default]
    Snake,
    Camel,
}

impl CaseConvention {
    /// Convert a field identifier (snake_case in Rust source) into this convention.
    pub fn member(self, field: &str) -> String {
        match self {
            CaseConvention::Snake => to_snake_case(field),
            CaseConvention::Camel => to_camel_case(field),
        }
    }
}

impl FromStr for CaseConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snake" | "snake_case" => Ok(CaseConvention::Snake),
            "camel" | "camelcase" | "camel_case" => Ok(CaseConvention::Camel),
            other => Err(format!("unknown case convention '{}'", other)),
        }
    }
}

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "user_id" -> "userId", "created_at" -> "createdAt"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = !out.is_empty();
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from camelCase (or PascalCase) to snake_case.
/// e.g. "userId" -> "user_id", "QuarkFlavor" -> "quark_flavor"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// English plural of a singular noun: sibilant endings take "es", consonant + "y" becomes "ies",
/// everything else takes "s". The case of the input is kept.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    let upper = word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase);
    let suffix = |s: &str| if upper { s.to_uppercase() } else { s.to_string() };

    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{}{}", word, suffix("es"));
    }
    if lower.ends_with('y') {
        let before = lower.chars().rev().nth(1);
        if before.map(|c| !"aeiou".contains(c)).unwrap_or(false) {
            let stem = &word[..word.len() - 1];
            return format!("{}{}", stem, suffix("ies"));
        }
    }
    format!("{}{}", word, suffix("s"))
}
