//! Entity declaration: declared field kinds, typed field tokens and the `entity!` macro.

use crate::error::{ConversionError, Error, ReflectionError};
use crate::value::FieldValue;
use chrono::NaiveDateTime;
use uuid::Uuid;

/// Closed set of declared field kinds a property can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Bytes,
    DateTime,
    Uuid,
    Json,
}

impl FieldKind {
    /// Primitive, string or temporal, as opposed to a nested structure.
    pub fn is_simple(self) -> bool {
        !matches!(self, FieldKind::Json)
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Byte => "byte",
            FieldKind::Char => "char",
            FieldKind::Short => "short",
            FieldKind::Int => "int",
            FieldKind::Long => "long",
            FieldKind::Float => "float",
            FieldKind::Double => "double",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::DateTime => "datetime",
            FieldKind::Uuid => "uuid",
            FieldKind::Json => "json",
        }
    }
}

/// Rust types that may appear as entity fields. `Option<V>` is the boxed (nullable) form of `V`.
pub trait FieldType: Clone + Send + Sync + 'static {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    fn into_field_value(self) -> FieldValue;

    /// A [`FieldValue::Null`] becomes the type's default (or `None` for boxed fields).
    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError>;
}

macro_rules! field_type {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn into_field_value(self) -> FieldValue {
                    FieldValue::$kind(self)
                }

                fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
                    match value {
                        FieldValue::$kind(v) => Ok(v),
                        FieldValue::Null => Ok(<$ty>::default()),
                        other => Err(ConversionError::Mismatch {
                            expected: FieldKind::$kind.name(),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

field_type! {
    bool => Bool,
    i8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    Vec<u8> => Bytes,
    NaiveDateTime => DateTime,
    Uuid => Uuid,
    serde_json::Value => Json,
}

impl<V: FieldType> FieldType for Option<V> {
    const KIND: FieldKind = V::KIND;
    const NULLABLE: bool = true;

    fn into_field_value(self) -> FieldValue {
        match self {
            Some(v) => v.into_field_value(),
            None => FieldValue::Null,
        }
    }

    fn from_field_value(value: FieldValue) -> Result<Self, ConversionError> {
        match value {
            FieldValue::Null => Ok(None),
            other => V::from_field_value(other).map(Some),
        }
    }
}

/// Typed token for one field of entity `T` holding a `V`. Selected through the entity's
/// field table, e.g. `outline.member(|q| q.name)`.
pub struct Field<T, V> {
    name: &'static str,
    get: fn(&T) -> &V,
    set: fn(&mut T, V),
    read_only: bool,
}

impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Field<T, V> {}

impl<T, V> Field<T, V> {
    pub const fn new(name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self {
        Field {
            name,
            get,
            set,
            read_only: false,
        }
    }

    /// A field callers may not set. It is still populated when decoding database rows.
    pub const fn read_only(name: &'static str, get: fn(&T) -> &V, set: fn(&mut T, V)) -> Self {
        Field {
            name,
            get,
            set,
            read_only: true,
        }
    }

    /// The Rust field identifier.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn get<'a>(&self, entity: &'a T) -> &'a V {
        (self.get)(entity)
    }

    pub(crate) fn setter(&self) -> Option<fn(&mut T, V)> {
        (!self.read_only).then_some(self.set)
    }
}

impl<T, V: FieldType> Field<T, V> {
    pub fn kind(&self) -> FieldKind {
        V::KIND
    }
}

/// Type-erased view of a field, used where properties are handled by name.
pub trait Accessor<T>: Send + Sync {
    fn name(&self) -> &'static str;
    fn kind(&self) -> FieldKind;
    fn nullable(&self) -> bool;
    fn read_only(&self) -> bool;
    fn read(&self, entity: &T) -> FieldValue;
    /// Store a value; fails on read-only fields.
    fn write(&self, entity: &mut T, value: FieldValue) -> Result<(), Error>;
    /// Store a value regardless of the read-only flag. Used when decoding rows.
    fn hydrate(&self, entity: &mut T, value: FieldValue) -> Result<(), ConversionError>;
}

impl<T: Entity, V: FieldType> Accessor<T> for Field<T, V> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> FieldKind {
        V::KIND
    }

    fn nullable(&self) -> bool {
        V::NULLABLE
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn read(&self, entity: &T) -> FieldValue {
        (self.get)(entity).clone().into_field_value()
    }

    fn write(&self, entity: &mut T, value: FieldValue) -> Result<(), Error> {
        if self.read_only {
            return Err(ReflectionError::ReadOnly {
                entity: T::TYPE_NAME,
                name: self.name.to_string(),
            }
            .into());
        }
        self.hydrate(entity, value)?;
        Ok(())
    }

    fn hydrate(&self, entity: &mut T, value: FieldValue) -> Result<(), ConversionError> {
        (self.set)(entity, V::from_field_value(value)?);
        Ok(())
    }
}

/// A plain data-holder type with introspectable fields. Implemented by [`entity!`](crate::entity).
pub trait Entity: Default + Send + Sync + 'static {
    /// Companion struct with one [`Field`] token per field.
    type Fields: Send + Sync + 'static;

    const TYPE_NAME: &'static str;

    fn fields() -> &'static Self::Fields;

    /// Accessors in declaration order.
    fn accessors() -> Vec<&'static dyn Accessor<Self>>;
}

/// Declare an entity struct together with its field-token table.
///
/// ```ignore
/// outline_sdk::entity! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Quark: QuarkFields {
///         pub id: i64,
///         pub name: String,
///         pub charge: Option<f64>,
///         #[read_only]
///         pub observed_at: Option<chrono::NaiveDateTime>,
///     }
/// }
/// ```
///
/// `Default` must be derived or implemented. `#[read_only]` fields reject writes through a
/// bean and are left out of inserts and updates built from an entity, but rows still populate them.
#[macro_export]
macro_rules! entity {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $fields:ident {
            $(
                $(#[$flag:ident])?
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field: $fty, )*
        }

        #[doc = concat!("Field tokens of [`", stringify!($name), "`].")]
        #[derive(Clone, Copy)]
        $vis struct $fields {
            $( pub $field: $crate::reflect::Field<$name, $fty>, )*
        }

        impl $crate::reflect::Entity for $name {
            type Fields = $fields;

            const TYPE_NAME: &'static str = stringify!($name);

            fn fields() -> &'static Self::Fields {
                static FIELDS: $fields = $fields {
                    $( $field: $crate::__entity_field!($($flag)? ; $name ; $field ; $fty), )*
                };
                &FIELDS
            }

            fn accessors() -> ::std::vec::Vec<&'static dyn $crate::reflect::Accessor<Self>> {
                let fields = <Self as $crate::reflect::Entity>::fields();
                ::std::vec![ $( &fields.$field as &'static dyn $crate::reflect::Accessor<Self>, )* ]
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __entity_field {
    (read_only ; $name:ident ; $field:ident ; $fty:ty) => {
        $crate::reflect::Field::<$name, $fty>::read_only(stringify!($field), |e| &e.$field, |e, v| e.$field = v)
    };
    ( ; $name:ident ; $field:ident ; $fty:ty) => {
        $crate::reflect::Field::<$name, $fty>::new(stringify!($field), |e| &e.$field, |e, v| e.$field = v)
    };
}
