//! Member capture: resolve which field a selector refers to without passing strings around.
//!
//! A selector is a closure over the entity's field-token table, `|q| q.name`. Running it is a
//! plain function call returning the typed [`Field`] token, so capture keeps no shared or
//! per-thread state and concurrent captures cannot observe each other.

use super::{Entity, Field};

/// Run `select` against `T`'s field table and return the chosen token.
pub fn capture<T, V, F>(select: F) -> Field<T, V>
where
    T: Entity,
    F: FnOnce(&'static T::Fields) -> Field<T, V>,
{
    select(T::fields())
}

/// Derive a property name from an accessor-style identifier.
///
/// `get_`, `set_` and `is_` prefixes are stripped, as are `get`/`set`/`is` when followed by an
/// upper-case letter (`getName` -> `Name`). Anything else is returned verbatim.
pub fn accessor_name(method: &str) -> &str {
    for prefix in ["get_", "set_", "is_"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    for prefix in ["get", "set", "is"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            if rest.chars().next().map(char::is_uppercase).unwrap_or(false) {
                return rest;
            }
        }
    }
    method
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_prefixes() {
        assert_eq!(accessor_name("get_name"), "name");
        assert_eq!(accessor_name("set_name"), "name");
        assert_eq!(accessor_name("is_active"), "active");
        assert_eq!(accessor_name("getReadWriteProperty"), "ReadWriteProperty");
        assert_eq!(accessor_name("setReadWriteProperty"), "ReadWriteProperty");
        assert_eq!(accessor_name("isActive"), "Active");
    }

    #[test]
    fn unknown_prefix_is_verbatim() {
        assert_eq!(accessor_name("name"), "name");
        assert_eq!(accessor_name("getaway"), "getaway");
        assert_eq!(accessor_name("island"), "island");
        assert_eq!(accessor_name("get_"), "get_");
    }
}
