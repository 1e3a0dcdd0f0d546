//! Decode driver rows into [`Row`]s of [`Value`]s.

use crate::error::DatabaseError;
use crate::value::{Row, Value};
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use std::sync::Arc;

pub(crate) fn column_names<R: sqlx::Row>(row: &R) -> Arc<[String]> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

pub(crate) fn pg_row(row: &PgRow, columns: &Arc<[String]>) -> Result<Row, DatabaseError> {
    let values = (0..row.len())
        .map(|i| pg_cell(row, i))
        .collect::<Result<_, _>>()?;
    Ok(Row::new(Arc::clone(columns), values))
}

pub(crate) fn sqlite_row(row: &SqliteRow, columns: &Arc<[String]>) -> Row {
    let values = (0..row.len()).map(|i| sqlite_cell(row, i)).collect();
    Row::new(Arc::clone(columns), values)
}

/// Postgres types are fixed per column; the first compatible decode wins. A type with no
/// compatible decode is an error rather than a null.
fn pg_cell(row: &PgRow, i: usize) -> Result<Value, DatabaseError> {
    if row.try_get_raw(i).map(|v| v.is_null()).unwrap_or(true) {
        return Ok(Value::Null);
    }
    pg_typed_cell(row, i).ok_or_else(|| {
        let column = row.column(i);
        DatabaseError::UnsupportedColumn {
            column: column.name().to_string(),
            type_name: column.type_info().name().to_string(),
        }
    })
}

fn pg_typed_cell(row: &PgRow, i: usize) -> Option<Value> {
    if let Ok(n) = row.try_get::<i16, _>(i) {
        return Some(Value::Int(n.into()));
    }
    if let Ok(n) = row.try_get::<i32, _>(i) {
        return Some(Value::Int(n.into()));
    }
    if let Ok(n) = row.try_get::<i64, _>(i) {
        return Some(Value::Int(n));
    }
    if let Ok(n) = row.try_get::<f32, _>(i) {
        return Some(Value::Float(n.into()));
    }
    if let Ok(n) = row.try_get::<f64, _>(i) {
        return Some(Value::Float(n));
    }
    if let Ok(b) = row.try_get::<bool, _>(i) {
        return Some(Value::Bool(b));
    }
    if let Ok(u) = row.try_get::<uuid::Uuid, _>(i) {
        return Some(Value::Uuid(u));
    }
    if let Ok(d) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(i) {
        return Some(Value::DateTime(d.naive_utc()));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDateTime, _>(i) {
        return Some(Value::DateTime(d));
    }
    if let Ok(d) = row.try_get::<chrono::NaiveDate, _>(i) {
        return d.and_hms_opt(0, 0, 0).map(Value::DateTime);
    }
    if let Ok(t) = row.try_get::<chrono::NaiveTime, _>(i) {
        return Some(Value::Text(t.to_string()));
    }
    // NUMERIC, e.g. SUM over integers: whole values fit Int, the rest keep exact text.
    if let Ok(d) = row.try_get::<rust_decimal::Decimal, _>(i) {
        return Some(match i64::try_from(d) {
            Ok(n) if d.fract().is_zero() => Value::Int(n),
            _ => Value::Text(d.to_string()),
        });
    }
    if let Ok(s) = row.try_get::<String, _>(i) {
        return Some(Value::Text(s));
    }
    if let Ok(b) = row.try_get::<Vec<u8>, _>(i) {
        return Some(Value::Bytes(b));
    }
    if let Ok(j) = row.try_get::<serde_json::Value, _>(i) {
        return Some(Value::Json(j));
    }
    None
}

/// SQLite types are per value (storage class), so booleans arrive as integers and
/// datetimes as text; coercion takes it from there.
fn sqlite_cell(row: &SqliteRow, i: usize) -> Value {
    if row.try_get_raw(i).map(|v| v.is_null()).unwrap_or(true) {
        return Value::Null;
    }
    if let Ok(n) = row.try_get::<i64, _>(i) {
        return Value::Int(n);
    }
    if let Ok(n) = row.try_get::<f64, _>(i) {
        return Value::Float(n);
    }
    if let Ok(s) = row.try_get::<String, _>(i) {
        return Value::Text(s);
    }
    if let Ok(b) = row.try_get::<Vec<u8>, _>(i) {
        return Value::Bytes(b);
    }
    Value::Null
}
