//! Bean: typed read/write access to one entity instance through its outline.

use super::capture::capture;
use super::{Entity, Field, FieldType, Member, Outline};
use crate::error::{Error, ReflectionError};
use crate::value::{FieldValue, Value};

/// Wraps one entity instance. Exclusively owned for one read/modify/write sequence.
pub struct Bean<'o, T: Entity> {
    outline: &'o Outline<T>,
    instance: T,
}

impl<'o, T: Entity> Bean<'o, T> {
    pub fn new(outline: &'o Outline<T>, instance: T) -> Self {
        Bean { outline, instance }
    }

    pub fn outline(&self) -> &'o Outline<T> {
        self.outline
    }

    pub fn instance(&self) -> &T {
        &self.instance
    }

    pub fn into_inner(self) -> T {
        self.instance
    }

    /// Read the field chosen by `select`.
    pub fn get<V, F>(&self, select: F) -> Result<&V, ReflectionError>
    where
        V: FieldType,
        F: FnOnce(&'static T::Fields) -> Field<T, V>,
    {
        let field = capture(select);
        self.outline.property_for(&field)?;
        Ok(field.get(&self.instance))
    }

    /// Store an already typed value.
    pub fn set<V, F>(&mut self, select: F, value: V) -> Result<(), ReflectionError>
    where
        V: FieldType,
        F: FnOnce(&'static T::Fields) -> Field<T, V>,
    {
        let field = capture(select);
        self.outline.property_for(&field)?;
        let set = field.setter().ok_or_else(|| ReflectionError::ReadOnly {
            entity: T::TYPE_NAME,
            name: field.name().to_string(),
        })?;
        set(&mut self.instance, value);
        Ok(())
    }

    /// Store an untyped value, coerced to the field's declared kind. A null value stores
    /// `None` for boxed fields and the type's default otherwise.
    pub fn set_value<V, F>(&mut self, select: F, value: &Value) -> Result<(), Error>
    where
        V: FieldType,
        F: FnOnce(&'static T::Fields) -> Field<T, V>,
    {
        let field = capture(select);
        self.outline.property_for(&field)?.assign(&mut self.instance, value)
    }

    /// Dynamic read by any spelling of the property name.
    pub fn get_by_name(&self, name: &str) -> Result<FieldValue, ReflectionError> {
        Ok(self.outline.property_named(name)?.read(&self.instance))
    }

    /// Dynamic write by any spelling of the property name.
    pub fn set_by_name(&mut self, name: &str, value: &Value) -> Result<(), Error> {
        self.outline.property_named(name)?.assign(&mut self.instance, value)
    }

    /// Every property with its current value, in declaration order.
    pub fn values(&self) -> Vec<(Member, FieldValue)> {
        self.outline
            .properties()
            .iter()
            .map(|p| (p.member().clone(), p.read(&self.instance)))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.outline.to_json(&self.instance)
    }
}
