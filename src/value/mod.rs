//! Untyped values, typed field values, the coercion switch between them, and result rows.

mod coerce;
mod field;
mod row;

pub use coerce::{coerce, coerce_json};
pub use field::FieldValue;
pub use row::Row;

use crate::error::ConversionError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as Json;
use uuid::Uuid;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Untyped cell or content: a database column value, a JSON property, or plain text.
/// Typed accessors convert on demand and fail with [`ConversionError`] on illegal conversions.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    /// Structured JSON (arrays and objects). Scalars coming from JSON are unwrapped by [`Value::from_json`].
    Json(Json),
}

impl Value {
    /// Wrap a JSON property. Scalars become their plain variants, arrays and objects stay structured.
    pub fn from_json(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
            Value::Json(Json::Array(_)) => "json array",
            Value::Json(Json::Object(_)) => "json object",
            Value::Json(_) => "json",
        }
    }

    fn unsupported(&self, target: &'static str) -> ConversionError {
        ConversionError::Unsupported {
            target,
            found: self.kind_name(),
        }
    }

    /// Scalars wrapped directly in `Value::Json` are treated like their plain counterparts.
    fn scalar(&self) -> Option<Value> {
        match self {
            Value::Json(j) if !j.is_array() && !j.is_object() => Some(Value::from_json(j.clone())),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => Ok(true),
                "false" | "f" | "0" | "no" => Ok(false),
                _ => Err(ConversionError::Malformed {
                    target: "boolean",
                    text: s.clone(),
                }),
            },
            other => match other.scalar() {
                Some(v) => v.as_bool(),
                None => Err(other.unsupported("boolean")),
            },
        }
    }

    pub fn as_long(&self) -> Result<i64, ConversionError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Ok(*f as i64)
                } else {
                    Err(ConversionError::OutOfRange {
                        target: "long",
                        value: f.to_string(),
                    })
                }
            }
            Value::Text(s) => s.trim().parse::<i64>().map_err(|_| ConversionError::Malformed {
                target: "long",
                text: s.clone(),
            }),
            other => match other.scalar() {
                Some(v) => v.as_long(),
                None => Err(other.unsupported("long")),
            },
        }
    }

    pub fn as_int(&self) -> Result<i32, ConversionError> {
        narrow(self.as_long()?, "int")
    }

    pub fn as_short(&self) -> Result<i16, ConversionError> {
        narrow(self.as_long()?, "short")
    }

    pub fn as_byte(&self) -> Result<i8, ConversionError> {
        narrow(self.as_long()?, "byte")
    }

    pub fn as_double(&self) -> Result<f64, ConversionError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Text(s) => s.trim().parse::<f64>().map_err(|_| ConversionError::Malformed {
                target: "double",
                text: s.clone(),
            }),
            other => match other.scalar() {
                Some(v) => v.as_double(),
                None => Err(other.unsupported("double")),
            },
        }
    }

    pub fn as_float(&self) -> Result<f32, ConversionError> {
        let d = self.as_double()?;
        if d.is_finite() && d.abs() > f32::MAX as f64 {
            return Err(ConversionError::OutOfRange {
                target: "float",
                value: d.to_string(),
            });
        }
        Ok(d as f32)
    }

    pub fn as_char(&self) -> Result<char, ConversionError> {
        match self {
            Value::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConversionError::Malformed {
                        target: "character",
                        text: s.clone(),
                    }),
                }
            }
            Value::Int(i) => u32::try_from(*i)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| ConversionError::OutOfRange {
                    target: "character",
                    value: i.to_string(),
                }),
            other => match other.scalar() {
                Some(v) => v.as_char(),
                None => Err(other.unsupported("character")),
            },
        }
    }

    pub fn as_string(&self) -> Result<String, ConversionError> {
        match self {
            Value::Null => Err(self.unsupported("string")),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            Value::Text(s) => Ok(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).map_err(|_| ConversionError::Malformed {
                target: "string",
                text: format!("{} non-utf8 bytes", b.len()),
            }),
            Value::DateTime(d) => Ok(format_datetime(d)),
            Value::Uuid(u) => Ok(u.to_string()),
            Value::Json(Json::String(s)) => Ok(s.clone()),
            Value::Json(j) => Ok(j.to_string()),
        }
    }

    pub fn as_datetime(&self) -> Result<NaiveDateTime, ConversionError> {
        match self {
            Value::DateTime(d) => Ok(*d),
            Value::Text(s) => parse_datetime(s.trim()).ok_or_else(|| ConversionError::Malformed {
                target: "datetime",
                text: s.clone(),
            }),
            other => match other.scalar() {
                Some(v) => v.as_datetime(),
                None => Err(other.unsupported("datetime")),
            },
        }
    }

    pub fn as_bytes(&self) -> Result<Vec<u8>, ConversionError> {
        match self {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            other => match other.scalar() {
                Some(v) => v.as_bytes(),
                None => Err(other.unsupported("bytes")),
            },
        }
    }

    pub fn as_uuid(&self) -> Result<Uuid, ConversionError> {
        match self {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s.trim()).map_err(|_| ConversionError::Malformed {
                target: "uuid",
                text: s.clone(),
            }),
            Value::Bytes(b) => Uuid::from_slice(b).map_err(|_| ConversionError::Malformed {
                target: "uuid",
                text: format!("{} bytes", b.len()),
            }),
            other => match other.scalar() {
                Some(v) => v.as_uuid(),
                None => Err(other.unsupported("uuid")),
            },
        }
    }

    /// Structured view of the value. Text is parsed as JSON when it holds an array or object.
    pub fn as_json(&self) -> Result<Json, ConversionError> {
        match self {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Int(i) => Ok(Json::from(*i)),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .ok_or_else(|| self.unsupported("json")),
            Value::Text(s) => {
                let t = s.trim_start();
                if t.starts_with('{') || t.starts_with('[') {
                    serde_json::from_str(s).map_err(|_| ConversionError::Malformed {
                        target: "json",
                        text: s.clone(),
                    })
                } else {
                    Ok(Json::String(s.clone()))
                }
            }
            Value::Bytes(_) => Err(self.unsupported("json")),
            Value::DateTime(d) => Ok(Json::String(format_datetime(d))),
            Value::Uuid(u) => Ok(Json::String(u.to_string())),
            Value::Json(j) => Ok(j.clone()),
        }
    }

    /// Type-directed conversion; delegates to the coercion switch.
    pub fn as_kind(&self, kind: crate::reflect::FieldKind) -> Result<FieldValue, ConversionError> {
        coerce(kind, self)
    }
}

fn narrow<T: TryFrom<i64>>(v: i64, target: &'static str) -> Result<T, ConversionError> {
    T::try_from(v).map_err(|_| ConversionError::OutOfRange {
        target,
        value: v.to_string(),
    })
}

pub(crate) fn format_datetime(d: &NaiveDateTime) -> String {
    d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    for fmt in DATETIME_FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => Int as i64,
    u16 => Int as i64,
    u32 => Int as i64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Text as String,
    &str => Text as String,
    Vec<u8> => Bytes as Vec<u8>,
    &[u8] => Bytes as Vec<u8>,
    NaiveDateTime => DateTime as NaiveDateTime,
    Uuid => Uuid as Uuid,
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.to_string())
    }
}

impl From<Json> for Value {
    fn from(j: Json) -> Self {
        Value::from_json(j)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_converts_on_demand() {
        let v = Value::from("12");
        assert_eq!(v.as_int(), Ok(12));
        assert_eq!(v.as_long(), Ok(12));
        assert_eq!(v.as_double(), Ok(12.0));
        assert_eq!(v.as_string(), Ok("12".to_string()));
        assert_eq!(Value::from("true").as_bool(), Ok(true));
        assert_eq!(Value::from("0").as_bool(), Ok(false));
        assert_eq!(Value::from("x").as_char(), Ok('x'));
    }

    #[test]
    fn malformed_number_is_reported() {
        let err = Value::from("twelve").as_int().unwrap_err();
        assert_eq!(
            err,
            ConversionError::Malformed {
                target: "long",
                text: "twelve".into()
            }
        );
    }

    #[test]
    fn narrowing_checks_range() {
        assert!(matches!(
            Value::Int(300).as_byte(),
            Err(ConversionError::OutOfRange { target: "byte", .. })
        ));
        assert_eq!(Value::Int(-128).as_byte(), Ok(-128));
        assert!(Value::Float(1.5).as_long().is_err());
        assert_eq!(Value::Float(3.0).as_long(), Ok(3));
    }

    #[test]
    fn structured_json_is_not_a_boolean() {
        let v = Value::from_json(serde_json::json!({"a": 1}));
        assert_eq!(
            v.as_bool(),
            Err(ConversionError::Unsupported {
                target: "boolean",
                found: "json object"
            })
        );
        assert_eq!(v.as_string(), Ok(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn json_scalars_unwrap() {
        assert_eq!(Value::from_json(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from_json(serde_json::json!("hi")), Value::Text("hi".into()));
        assert_eq!(Value::Json(serde_json::json!(true)).as_bool(), Ok(true));
    }

    #[test]
    fn datetimes_parse_from_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        assert_eq!(Value::from("2024-05-17T08:30:00").as_datetime(), Ok(expected));
        assert_eq!(Value::from("2024-05-17 08:30:00").as_datetime(), Ok(expected));
        assert_eq!(Value::from("2024-05-17T08:30:00Z").as_datetime(), Ok(expected));
        assert_eq!(
            Value::from("2024-05-17").as_datetime(),
            Ok(expected.date().and_hms_opt(0, 0, 0).unwrap())
        );
        assert!(Value::from("yesterday").as_datetime().is_err());
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("v")), Value::Text("v".into()));
    }
}
