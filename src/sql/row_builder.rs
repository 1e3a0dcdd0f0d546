//! Column/value pairs for INSERT rows, UPDATE assignments and upserts.

use super::{Column, Statement};
use crate::reflect::{Entity, Outline};
use crate::value::Value;

/// Accumulates `(column -> value)` pairs in insertion order. Putting a column twice replaces
/// the earlier value. Null values render as the literal `NULL`, never as a placeholder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowBuilder {
    cells: Vec<(String, Value)>,
}

impl RowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| c.as_str() == column.name()) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column.name().to_string(), value)),
        }
        self
    }

    /// Writable properties of `entity`. Read-only properties are left to the database.
    pub fn from_entity<T: Entity>(outline: &Outline<T>, entity: &T) -> Self {
        outline
            .properties()
            .iter()
            .filter(|p| !p.is_read_only())
            .fold(RowBuilder::new(), |row, p| row.put(p.member(), Value::from(p.read(entity))))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Column>,
        V: Into<Value>,
    {
        pairs.into_iter().fold(RowBuilder::new(), |row, (k, v)| row.put(k, v))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.iter().find(|(c, _)| c.as_str() == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `a = ?, b = NULL` for SET and upsert clauses.
    pub(crate) fn render_assignments(&self, out: &mut Statement) {
        for (i, (column, value)) in self.cells.iter().enumerate() {
            if i > 0 {
                out.push_sql(", ");
            }
            out.push_sql(column);
            out.push_sql(" = ");
            push_value(out, value);
        }
    }
}

/// Placeholder for a value, `NULL` literal for an absent one.
pub(crate) fn push_value(out: &mut Statement, value: &Value) {
    if value.is_null() {
        out.push_sql("NULL");
    } else {
        out.push_param(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_and_keeps_order() {
        let row = RowBuilder::new().put("x", 1).put("y", "a").put("x", 2);
        assert_eq!(row.columns().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(row.get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn qualified_columns_drop_their_table() {
        let row = RowBuilder::new().put("t.x", 1);
        assert_eq!(row.columns().collect::<Vec<_>>(), ["x"]);
    }

    #[test]
    fn assignments_use_null_literal() {
        let mut out = Statement::default();
        RowBuilder::new()
            .put("a", 1)
            .put("b", Value::Null)
            .put("c", "z")
            .render_assignments(&mut out);
        assert_eq!(out.sql, "a = ?, b = NULL, c = ?");
        assert_eq!(out.params, vec![Value::Int(1), Value::from("z")]);
    }
}
