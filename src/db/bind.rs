//! Bind [`Value`] parameters to sqlx queries, one backend at a time.

use crate::value::{format_datetime, Value};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

pub(crate) fn bind_pg<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(n) => query.bind(*n),
            Value::Float(n) => query.bind(*n),
            Value::Text(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
            Value::DateTime(d) => query.bind(*d),
            Value::Uuid(u) => query.bind(*u),
            Value::Json(j) => query.bind(j.clone()),
        };
    }
    query
}

/// SQLite has no native uuid, datetime or json storage; those bind as text.
pub(crate) fn bind_sqlite<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(n) => query.bind(*n),
            Value::Float(n) => query.bind(*n),
            Value::Text(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
            Value::DateTime(d) => query.bind(format_datetime(d)),
            Value::Uuid(u) => query.bind(u.to_string()),
            Value::Json(j) => query.bind(j.to_string()),
        };
    }
    query
}
