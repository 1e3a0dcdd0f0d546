//! The coercion switch: untyped [`Value`] to the exact [`FieldValue`] a property declares.
//! Used for bean assignment from query rows and for JSON property extraction alike.

use super::{FieldValue, Value};
use crate::error::ConversionError;
use crate::reflect::FieldKind;

/// Convert `value` into the variant matching `kind`. A null source yields [`FieldValue::Null`]
/// without attempting conversion; the receiving field turns that into `None` or its default.
pub fn coerce(kind: FieldKind, value: &Value) -> Result<FieldValue, ConversionError> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }
    Ok(match kind {
        FieldKind::Bool => FieldValue::Bool(value.as_bool()?),
        FieldKind::Byte => FieldValue::Byte(value.as_byte()?),
        FieldKind::Char => FieldValue::Char(value.as_char()?),
        FieldKind::Short => FieldValue::Short(value.as_short()?),
        FieldKind::Int => FieldValue::Int(value.as_int()?),
        FieldKind::Long => FieldValue::Long(value.as_long()?),
        FieldKind::Float => FieldValue::Float(value.as_float()?),
        FieldKind::Double => FieldValue::Double(value.as_double()?),
        FieldKind::String => FieldValue::String(value.as_string()?),
        FieldKind::Bytes => FieldValue::Bytes(value.as_bytes()?),
        FieldKind::DateTime => FieldValue::DateTime(value.as_datetime()?),
        FieldKind::Uuid => FieldValue::Uuid(value.as_uuid()?),
        FieldKind::Json => FieldValue::Json(value.as_json()?),
    })
}

/// Same conversion for a JSON property.
pub fn coerce_json(kind: FieldKind, json: &serde_json::Value) -> Result<FieldValue, ConversionError> {
    coerce(kind, &Value::from_json(json.clone()))
}
