use super::{format_datetime, Value};
use chrono::NaiveDateTime;
use serde_json::Value as Json;
use uuid::Uuid;

/// A value of exactly one declared field kind, as produced by the coercion switch.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Json(Json),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Byte(_) => "byte",
            FieldValue::Char(_) => "char",
            FieldValue::Short(_) => "short",
            FieldValue::Int(_) => "int",
            FieldValue::Long(_) => "long",
            FieldValue::Float(_) => "float",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Uuid(_) => "uuid",
            FieldValue::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// JSON rendering used for HTTP responses.
    pub fn to_json(&self) -> Json {
        match self {
            FieldValue::Null => Json::Null,
            FieldValue::Bool(b) => Json::Bool(*b),
            FieldValue::Byte(n) => Json::from(*n),
            FieldValue::Char(c) => Json::String(c.to_string()),
            FieldValue::Short(n) => Json::from(*n),
            FieldValue::Int(n) => Json::from(*n),
            FieldValue::Long(n) => Json::from(*n),
            FieldValue::Float(n) => serde_json::Number::from_f64(*n as f64)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            FieldValue::Double(n) => serde_json::Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null),
            FieldValue::String(s) => Json::String(s.clone()),
            FieldValue::Bytes(b) => Json::Array(b.iter().map(|x| Json::from(*x)).collect()),
            FieldValue::DateTime(d) => Json::String(format_datetime(d)),
            FieldValue::Uuid(u) => Json::String(u.to_string()),
            FieldValue::Json(j) => j.clone(),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Byte(n) => Value::Int(n.into()),
            FieldValue::Char(c) => Value::Text(c.to_string()),
            FieldValue::Short(n) => Value::Int(n.into()),
            FieldValue::Int(n) => Value::Int(n.into()),
            FieldValue::Long(n) => Value::Int(n),
            FieldValue::Float(n) => Value::Float(n.into()),
            FieldValue::Double(n) => Value::Float(n),
            FieldValue::String(s) => Value::Text(s),
            FieldValue::Bytes(b) => Value::Bytes(b),
            FieldValue::DateTime(d) => Value::DateTime(d),
            FieldValue::Uuid(u) => Value::Uuid(u),
            FieldValue::Json(Json::Null) => Value::Null,
            FieldValue::Json(j) => Value::Json(j),
        }
    }
}
