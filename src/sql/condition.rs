//! WHERE/ON predicates. Each predicate carries its own values, so rendering emits `?`
//! placeholders and pushes parameters in one left-to-right pass.

use super::row_builder::push_value;
use super::{Column, Dialect, Statement};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Compare { column: Column, op: &'static str, value: Value },
    Is { column: Column, value: Value },
    NotNull(Column),
    In { column: Column, values: Vec<Value> },
    ColumnsEq(Column, Column),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Not(Box<Node>),
}

/// A terminal or compound predicate.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition(Node);

impl Condition {
    /// `(self) AND (other)`.
    pub fn and(self, other: Condition) -> Condition {
        Condition(Node::And(Box::new(self.0), Box::new(other.0)))
    }

    /// `(self) OR (other)`.
    pub fn or(self, other: Condition) -> Condition {
        Condition(Node::Or(Box::new(self.0), Box::new(other.0)))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Condition {
        Condition(Node::Not(Box::new(self.0)))
    }

    pub(crate) fn columns_eq(left: Column, right: Column) -> Condition {
        Condition(Node::ColumnsEq(left, right))
    }

    pub(crate) fn render(&self, out: &mut Statement, dialect: Dialect, default_table: Option<&str>) {
        render(&self.0, out, dialect, default_table);
    }
}

fn render(node: &Node, out: &mut Statement, dialect: Dialect, table: Option<&str>) {
    match node {
        Node::Compare { column, op, value } => {
            out.push_sql(&column.render(table));
            out.push_sql(" ");
            out.push_sql(op);
            out.push_sql(" ");
            push_value(out, value);
        }
        Node::Is { column, value } => {
            out.push_sql(&column.render(table));
            if value.is_null() {
                out.push_sql(" IS NULL");
            } else {
                out.push_sql(" ");
                out.push_sql(dialect.null_safe_eq());
                out.push_sql(" ");
                out.push_param(value.clone());
            }
        }
        Node::NotNull(column) => {
            out.push_sql(&column.render(table));
            out.push_sql(" IS NOT NULL");
        }
        Node::In { column, values } => {
            if values.is_empty() {
                out.push_sql("1 = 0");
                return;
            }
            out.push_sql(&column.render(table));
            out.push_sql(" IN (");
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push_sql(", ");
                }
                push_value(out, v);
            }
            out.push_sql(")");
        }
        Node::ColumnsEq(left, right) => {
            out.push_sql(&left.render(table));
            out.push_sql(" = ");
            out.push_sql(&right.render(table));
        }
        Node::And(left, right) => binary(left, "AND", right, out, dialect, table),
        Node::Or(left, right) => binary(left, "OR", right, out, dialect, table),
        Node::Not(inner) => {
            out.push_sql("NOT (");
            render(inner, out, dialect, table);
            out.push_sql(")");
        }
    }
}

fn binary(left: &Node, op: &str, right: &Node, out: &mut Statement, dialect: Dialect, table: Option<&str>) {
    out.push_sql("(");
    render(left, out, dialect, table);
    out.push_sql(") ");
    out.push_sql(op);
    out.push_sql(" (");
    render(right, out, dialect, table);
    out.push_sql(")");
}

fn compare(column: impl Into<Column>, op: &'static str, value: impl Into<Value>) -> Condition {
    Condition(Node::Compare {
        column: column.into(),
        op,
        value: value.into(),
    })
}

pub fn eq(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, "=", value)
}

pub fn ne(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, "<>", value)
}

pub fn lt(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, "<", value)
}

pub fn le(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, "<=", value)
}

pub fn gt(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, ">", value)
}

pub fn ge(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    compare(column, ">=", value)
}

pub fn like(column: impl Into<Column>, pattern: impl Into<Value>) -> Condition {
    compare(column, "LIKE", pattern)
}

/// `col IS NULL` for a null value, otherwise the dialect's null-safe equality.
pub fn is(column: impl Into<Column>, value: impl Into<Value>) -> Condition {
    Condition(Node::Is {
        column: column.into(),
        value: value.into(),
    })
}

pub fn is_not_null(column: impl Into<Column>) -> Condition {
    Condition(Node::NotNull(column.into()))
}

/// One placeholder per element, in iteration order. An empty collection matches nothing.
pub fn in_<I, V>(column: impl Into<Column>, values: I) -> Condition
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Condition(Node::In {
        column: column.into(),
        values: values.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(c: &Condition, table: Option<&str>) -> Statement {
        let mut out = Statement::default();
        c.render(&mut out, Dialect::Sqlite, table);
        out
    }

    #[test]
    fn terminal_predicates() {
        let s = rendered(&eq("a", 2), None);
        assert_eq!(s.sql, "a = ?");
        assert_eq!(s.params, vec![Value::Int(2)]);
        assert_eq!(rendered(&lt("a", 1), None).sql, "a < ?");
        assert_eq!(rendered(&gt("a", 1), None).sql, "a > ?");
        assert_eq!(rendered(&is("a", Value::Null), None).sql, "a IS NULL");
        assert!(rendered(&is("a", Value::Null), None).params.is_empty());
        assert_eq!(rendered(&is("a", 1), None).sql, "a IS ?");
        assert_eq!(rendered(&is_not_null("a"), None).sql, "a IS NOT NULL");
    }

    #[test]
    fn null_operands_render_as_literals() {
        let s = rendered(&eq("hits", Value::Null).or(gt("hits", 3)), None);
        assert_eq!(s.sql, "(hits = NULL) OR (hits > ?)");
        assert_eq!(s.params, vec![Value::Int(3)]);
        let s = rendered(&in_("hits", [Value::Int(1), Value::Null]), None);
        assert_eq!(s.sql, "hits IN (?, NULL)");
        assert_eq!(s.params, vec![Value::Int(1)]);
    }

    #[test]
    fn in_expands_each_element() {
        let s = rendered(&in_("col", [1, 2, 3]), None);
        assert_eq!(s.sql, "col IN (?, ?, ?)");
        assert_eq!(s.params, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let empty: Vec<i32> = Vec::new();
        assert_eq!(rendered(&in_("col", empty), None).sql, "1 = 0");
    }

    #[test]
    fn compound_parenthesizes_and_orders_params() {
        let c = eq("a", 1).and(lt("b", 2).or(in_("c", ["x", "y"])));
        let s = rendered(&c, None);
        assert_eq!(s.sql, "(a = ?) AND ((b < ?) OR (c IN (?, ?)))");
        assert_eq!(
            s.params,
            vec![Value::Int(1), Value::Int(2), Value::from("x"), Value::from("y")]
        );
        assert_eq!(rendered(&eq("a", 1).not(), None).sql, "NOT (a = ?)");
    }

    #[test]
    fn default_table_qualifies_bare_columns() {
        let s = rendered(&eq("a", 1).and(eq("other.b", 2)), Some("quarks"));
        assert_eq!(s.sql, "(quarks.a = ?) AND (other.b = ?)");
    }

    #[test]
    fn null_safe_operator_follows_dialect() {
        let mut out = Statement::default();
        is("a", 1).render(&mut out, Dialect::Postgres, None);
        assert_eq!(out.sql, "a IS NOT DISTINCT FROM ?");
    }
}
