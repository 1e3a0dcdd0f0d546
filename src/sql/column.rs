//! Column and table references used by the builder.

use crate::reflect::{Entity, Member, Outline};
use std::sync::Arc;

/// A column, optionally qualified by its table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    table: Option<String>,
    name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Column {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Unqualified column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Render as SQL. Plain identifiers without a table take `default_table` when given;
    /// `*` and expressions are left alone.
    pub(crate) fn render(&self, default_table: Option<&str>) -> String {
        match (&self.table, default_table) {
            (Some(t), _) => format!("{}.{}", t, self.name),
            (None, Some(t)) if is_identifier(&self.name) => format!("{}.{}", t, self.name),
            _ => self.name.clone(),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl From<&str> for Column {
    /// `"t.col"` is qualified; anything else (including expressions) is a bare name.
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((t, c)) if is_identifier(t) && (is_identifier(c) || c == "*") => Column::qualified(t, c),
            _ => Column::new(s),
        }
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Column::from(s.as_str())
    }
}

impl From<&String> for Column {
    fn from(s: &String) -> Self {
        Column::from(s.as_str())
    }
}

impl From<Member> for Column {
    fn from(m: Member) -> Self {
        Column::qualified(m.table(), m.name())
    }
}

impl From<&Member> for Column {
    fn from(m: &Member) -> Self {
        Column::qualified(m.table(), m.name())
    }
}

/// A table named directly or through an outline. Outlined tables qualify bare columns in SELECTs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRef {
    name: String,
    outlined: bool,
}

impl TableRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn default_qualifier(&self) -> Option<&str> {
        self.outlined.then_some(self.name.as_str())
    }
}

impl From<&str> for TableRef {
    fn from(s: &str) -> Self {
        TableRef {
            name: s.to_string(),
            outlined: false,
        }
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef { name, outlined: false }
    }
}

impl<T: Entity> From<&Outline<T>> for TableRef {
    fn from(o: &Outline<T>) -> Self {
        TableRef {
            name: o.table_name().to_string(),
            outlined: true,
        }
    }
}

impl<T: Entity> From<&Arc<Outline<T>>> for TableRef {
    fn from(o: &Arc<Outline<T>>) -> Self {
        TableRef::from(o.as_ref())
    }
}
