//! Shared state for the HTTP surface.

use crate::case::CaseConvention;
use crate::config::{DatabaseConfig, DEFAULT_BODY_LIMIT};
use crate::db::Database;
use crate::error::Error;
use crate::reflect::{Entity, FieldKind, Member, Outline};
use crate::sql::{eq, Fetch};
use crate::value::{coerce, Value};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    /// Naming convention for outlines behind entity routes.
    pub case: CaseConvention,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            case: CaseConvention::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn from_config(db: Database, config: &DatabaseConfig) -> Self {
        AppState {
            db,
            case: config.case,
            body_limit: config.body_limit,
        }
    }
}

/// Per-entity state behind one set of entity routes.
pub(crate) struct EntityState<T: Entity> {
    pub db: Database,
    pub outline: Arc<Outline<T>>,
    pub key: Member,
    pub key_kind: FieldKind,
}

impl<T: Entity> Clone for EntityState<T> {
    fn clone(&self) -> Self {
        EntityState {
            db: self.db.clone(),
            outline: Arc::clone(&self.outline),
            key: self.key.clone(),
            key_kind: self.key_kind,
        }
    }
}

impl<T: Entity> EntityState<T> {
    /// Path or query text converted to the key's declared kind.
    pub fn parse_key(&self, raw: &str) -> Result<Value, Error> {
        Ok(coerce(self.key_kind, &Value::from(raw))?.into())
    }

    pub async fn find(&self, id: Value) -> Result<Option<T>, Error> {
        self.db
            .sql()
            .select_all()
            .from(&*self.outline)
            .where_(eq(self.key.clone(), id))
            .all()
            .first_as(&*self.outline)
            .await
    }
}
