//! Outline: per-entity-type naming and property metadata, cached process-wide per convention.

use super::capture::{accessor_name, capture};
use super::{Accessor, Bean, Entity, Field, FieldKind};
use crate::case::{pluralize, to_snake_case, CaseConvention};
use crate::error::{Error, ReflectionError};
use crate::value::{coerce, FieldValue, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Naming of one entity type under a fixed convention.
#[derive(Debug, PartialEq, Eq)]
pub struct EntityNames {
    type_name: &'static str,
    convention: CaseConvention,
    camel: String,
    snake: String,
    plural_camel: String,
    plural_snake: String,
}

impl EntityNames {
    pub fn new(type_name: &'static str, convention: CaseConvention) -> Self {
        let camel = type_name.to_string();
        let snake = to_snake_case(type_name);
        EntityNames {
            type_name,
            convention,
            plural_camel: pluralize(&camel),
            plural_snake: pluralize(&snake),
            camel,
            snake,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn convention(&self) -> CaseConvention {
        self.convention
    }

    pub fn name(&self) -> &str {
        match self.convention {
            CaseConvention::Snake => &self.snake,
            CaseConvention::Camel => &self.camel,
        }
    }

    /// Plural name under the convention; this is the table name.
    pub fn plural_name(&self) -> &str {
        match self.convention {
            CaseConvention::Snake => &self.plural_snake,
            CaseConvention::Camel => &self.plural_camel,
        }
    }
}

/// Name handle for a column of an outlined entity, without get/set capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    field: &'static str,
    key: String,
    snake: String,
    camel: String,
    owner: Arc<EntityNames>,
}

impl Member {
    fn new(field: &'static str, owner: &Arc<EntityNames>) -> Self {
        let snake = CaseConvention::Snake.member(field);
        let camel = CaseConvention::Camel.member(field);
        let key = match owner.convention {
            CaseConvention::Snake => snake.clone(),
            CaseConvention::Camel => camel.clone(),
        };
        Member {
            field,
            key,
            snake,
            camel,
            owner: Arc::clone(owner),
        }
    }

    /// Column name under the owning outline's convention.
    pub fn name(&self) -> &str {
        &self.key
    }

    pub fn field_name(&self) -> &'static str {
        self.field
    }

    pub fn snake_cased_name(&self) -> &str {
        &self.snake
    }

    pub fn camel_cased_name(&self) -> &str {
        &self.camel
    }

    /// Table of the owning outline.
    pub fn table(&self) -> &str {
        self.owner.plural_name()
    }

    /// `table.column`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table(), self.key)
    }

    pub fn owner(&self) -> &EntityNames {
        &self.owner
    }
}

/// One entity field: its member naming plus declared kind and bound accessor.
pub struct Property<T: Entity> {
    member: Member,
    accessor: &'static dyn Accessor<T>,
}

impl<T: Entity> Property<T> {
    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn name(&self) -> &str {
        self.member.name()
    }

    pub fn kind(&self) -> FieldKind {
        self.accessor.kind()
    }

    /// Boxed field: accepts an absent value.
    pub fn is_nullable(&self) -> bool {
        self.accessor.nullable()
    }

    pub fn is_simple(&self) -> bool {
        self.kind().is_simple()
    }

    pub fn is_read_only(&self) -> bool {
        self.accessor.read_only()
    }

    pub fn read(&self, entity: &T) -> FieldValue {
        self.accessor.read(entity)
    }

    pub fn write(&self, entity: &mut T, value: FieldValue) -> Result<(), Error> {
        self.accessor.write(entity, value)
    }

    /// Coerce an untyped value to this property's kind and store it.
    pub fn assign(&self, entity: &mut T, value: &Value) -> Result<(), Error> {
        if self.is_read_only() {
            return Err(ReflectionError::ReadOnly {
                entity: T::TYPE_NAME,
                name: self.member.field.to_string(),
            }
            .into());
        }
        let typed = coerce(self.kind(), value)?;
        self.write(entity, typed)
    }

    /// Coerce and store, ignoring the read-only flag.
    pub(crate) fn hydrate(&self, entity: &mut T, value: &Value) -> Result<(), Error> {
        let typed = coerce(self.kind(), value)?;
        self.accessor.hydrate(entity, typed)?;
        Ok(())
    }
}

impl<T: Entity> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.member.key)
            .field("kind", &self.kind())
            .field("nullable", &self.is_nullable())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

pub struct Outline<T: Entity> {
    names: Arc<EntityNames>,
    properties: Vec<Property<T>>,
    by_key: HashMap<String, usize>,
    by_field: HashMap<&'static str, usize>,
}

impl<T: Entity> Outline<T> {
    /// Introspect `T` once. Prefer [`Outline::of`], which caches the result.
    pub fn build(convention: CaseConvention) -> Result<Self, ReflectionError> {
        let names = Arc::new(EntityNames::new(T::TYPE_NAME, convention));
        let accessors = T::accessors();
        if accessors.is_empty() {
            return Err(ReflectionError::NoProperties { entity: T::TYPE_NAME });
        }
        let mut properties = Vec::with_capacity(accessors.len());
        let mut by_key = HashMap::with_capacity(accessors.len());
        let mut by_field = HashMap::with_capacity(accessors.len());
        for (i, accessor) in accessors.into_iter().enumerate() {
            let member = Member::new(accessor.name(), &names);
            if by_key.insert(member.key.clone(), i).is_some() {
                return Err(ReflectionError::DuplicateProperty {
                    entity: T::TYPE_NAME,
                    key: member.key,
                });
            }
            by_field.insert(accessor.name(), i);
            properties.push(Property { member, accessor });
        }
        tracing::debug!(entity = T::TYPE_NAME, ?convention, properties = properties.len(), "outline built");
        Ok(Outline {
            names,
            properties,
            by_key,
            by_field,
        })
    }

    /// Cached outline of `T` under `convention`, from the global registry.
    pub fn of(convention: CaseConvention) -> Result<Arc<Self>, ReflectionError> {
        OutlineRegistry::global().get::<T>(convention)
    }

    pub fn convention(&self) -> CaseConvention {
        self.names.convention
    }

    pub fn names(&self) -> &EntityNames {
        &self.names
    }

    pub fn name(&self) -> &str {
        self.names.name()
    }

    pub fn plural_name(&self) -> &str {
        self.names.plural_name()
    }

    pub fn table_name(&self) -> &str {
        self.names.plural_name()
    }

    pub fn camel_cased_name(&self) -> &str {
        &self.names.camel
    }

    pub fn snake_cased_name(&self) -> &str {
        &self.names.snake
    }

    pub fn plural_camel_cased_name(&self) -> &str {
        &self.names.plural_camel
    }

    pub fn plural_snake_cased_name(&self) -> &str {
        &self.names.plural_snake
    }

    /// Member for the field chosen by `select`, e.g. `outline.member(|q| q.name)`.
    pub fn member<V, F>(&self, select: F) -> Member
    where
        F: FnOnce(&'static T::Fields) -> Field<T, V>,
    {
        Member::new(capture(select).name(), &self.names)
    }

    /// Full property for the field chosen by `select`.
    pub fn property<V, F>(&self, select: F) -> Result<&Property<T>, ReflectionError>
    where
        F: FnOnce(&'static T::Fields) -> Field<T, V>,
    {
        self.property_for(&capture(select))
    }

    pub(crate) fn property_for<V>(&self, field: &Field<T, V>) -> Result<&Property<T>, ReflectionError> {
        self.by_field
            .get(field.name())
            .map(|&i| &self.properties[i])
            .ok_or_else(|| ReflectionError::PropertyNotFound {
                entity: T::TYPE_NAME,
                name: field.name().to_string(),
            })
    }

    /// Lookup by key under this outline's convention.
    pub fn property_by_key(&self, key: &str) -> Option<&Property<T>> {
        self.by_key.get(key).map(|&i| &self.properties[i])
    }

    /// Lookup by any spelling: key, snake or camel form, or an accessor-style name
    /// (`get_name`, `getName`, `is_active`). Unquoted identifiers come back case-folded from
    /// some servers (`restmass` for `restMass`), so an ASCII case-insensitive key match is last.
    pub fn property_named(&self, name: &str) -> Result<&Property<T>, ReflectionError> {
        self.by_key
            .get(name)
            .or_else(|| self.by_field.get(name))
            .or_else(|| self.by_field.get(to_snake_case(name).as_str()))
            .or_else(|| self.by_field.get(to_snake_case(accessor_name(name)).as_str()))
            .copied()
            .or_else(|| {
                self.properties
                    .iter()
                    .position(|p| p.name().eq_ignore_ascii_case(name))
            })
            .map(|i| &self.properties[i])
            .ok_or_else(|| ReflectionError::PropertyNotFound {
                entity: T::TYPE_NAME,
                name: name.to_string(),
            })
    }

    pub fn member_named(&self, name: &str) -> Result<Member, ReflectionError> {
        self.property_named(name).map(|p| p.member.clone())
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(Property::name)
    }

    pub fn members(&self) -> Vec<Member> {
        self.properties.iter().map(|p| p.member.clone()).collect()
    }

    pub fn wrap(&self, instance: T) -> Bean<'_, T> {
        Bean::new(self, instance)
    }

    /// Bean around a default instance.
    pub fn create(&self) -> Bean<'_, T> {
        Bean::new(self, T::default())
    }

    /// Build an entity from a JSON object. Unknown keys are rejected; read-only keys are skipped.
    pub fn from_json(&self, object: &serde_json::Map<String, serde_json::Value>) -> Result<T, Error> {
        let mut bean = self.create();
        for (key, json) in object {
            let property = self.property_named(key)?;
            if property.is_read_only() {
                continue;
            }
            bean.set_by_name(key, &Value::from_json(json.clone()))?;
        }
        Ok(bean.into_inner())
    }

    pub fn to_json(&self, entity: &T) -> serde_json::Value {
        let map = self
            .properties
            .iter()
            .map(|p| (p.name().to_string(), p.read(entity).to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl<T: Entity> std::fmt::Debug for Outline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outline")
            .field("names", &self.names)
            .field("properties", &self.properties)
            .finish()
    }
}

type OutlineKey = (TypeId, CaseConvention);

/// Process-wide outline cache keyed by entity type and case convention.
/// Racing first users may each build an outline; the first one stored wins and all callers get it.
#[derive(Default)]
pub struct OutlineRegistry {
    outlines: RwLock<HashMap<OutlineKey, Arc<dyn Any + Send + Sync>>>,
}

impl OutlineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static OutlineRegistry {
        static GLOBAL: OnceLock<OutlineRegistry> = OnceLock::new();
        GLOBAL.get_or_init(OutlineRegistry::new)
    }

    pub fn get<T: Entity>(&self, convention: CaseConvention) -> Result<Arc<Outline<T>>, ReflectionError> {
        let key = (TypeId::of::<T>(), convention);
        let cached = self
            .outlines
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();
        if let Some(found) = cached.and_then(|o| o.downcast::<Outline<T>>().ok()) {
            return Ok(found);
        }
        let built = Arc::new(Outline::<T>::build(convention)?);
        let mut outlines = self.outlines.write().unwrap_or_else(|e| e.into_inner());
        let entry = outlines
            .entry(key)
            .or_insert_with(|| Arc::clone(&built) as Arc<dyn Any + Send + Sync>);
        Ok(Arc::clone(entry).downcast::<Outline<T>>().unwrap_or(built))
    }

    pub fn len(&self) -> usize {
        self.outlines.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
