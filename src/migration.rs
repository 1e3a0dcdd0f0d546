//! Schema setup and teardown for registered outlines, plus the seam for external runners.

use crate::db::Database;
use crate::error::{Error, ReflectionError};
use crate::reflect::{Entity, Outline};
use crate::schema::{create_table_sql, drop_table_sql};
use crate::sql::Dialect;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Applies and removes schema versions. External tools can implement this using
/// [`Database::migration_target`].
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    async fn migrate(&self, db: &Database) -> Result<(), Error>;
    async fn clean(&self, db: &Database) -> Result<(), Error>;
}

type CreateSql = Box<dyn Fn(Dialect) -> Result<String, ReflectionError> + Send + Sync>;

struct ManagedTable {
    name: String,
    create: CreateSql,
    drop: String,
}

/// Creates one table per registered outline, in registration order; `clean` drops them in
/// reverse.
#[derive(Default)]
pub struct OutlineMigrator {
    tables: Vec<ManagedTable>,
}

impl OutlineMigrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `outline` with `key` as primary key. The key is resolved now so a typo fails here
    /// rather than at migration time.
    pub fn register<T: Entity>(mut self, outline: Arc<Outline<T>>, key: &str) -> Result<Self, ReflectionError> {
        let key = outline.property_named(key)?.name().to_string();
        let name = outline.table_name().to_string();
        let drop = drop_table_sql(&outline);
        self.tables.push(ManagedTable {
            name,
            create: Box::new(move |dialect| create_table_sql(&outline, dialect, &key)),
            drop,
        });
        Ok(self)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

#[async_trait]
impl MigrationRunner for OutlineMigrator {
    async fn migrate(&self, db: &Database) -> Result<(), Error> {
        for table in &self.tables {
            let sql = (table.create)(db.dialect())?;
            db.execute(&sql).await?;
            info!(table = %table.name, "table migrated");
        }
        Ok(())
    }

    async fn clean(&self, db: &Database) -> Result<(), Error> {
        for table in self.tables.iter().rev() {
            db.execute(&table.drop).await?;
            info!(table = %table.name, "table dropped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseConvention;
    use crate::config::DatabaseConfig;

    crate::entity! {
        #[derive(Debug, Default)]
        struct Gauge: GaugeFields {
            id: i64,
            label: String,
        }
    }

    #[test]
    fn bad_key_fails_at_registration() {
        let outline = Outline::<Gauge>::of(CaseConvention::Snake).unwrap();
        assert!(OutlineMigrator::new().register(outline, "missing").is_err());
    }

    #[tokio::test]
    async fn migrate_then_clean() {
        let db = Database::connect(&DatabaseConfig::new("sqlite::memory:")).await.unwrap();
        let migrator = OutlineMigrator::new()
            .register(Outline::<Gauge>::of(CaseConvention::Snake).unwrap(), "id")
            .unwrap();
        assert_eq!(migrator.tables().collect::<Vec<_>>(), ["gauges"]);

        migrator.migrate(&db).await.unwrap();
        // Idempotent.
        migrator.migrate(&db).await.unwrap();
        db.execute("INSERT INTO gauges (label) VALUES ('x')").await.unwrap();

        migrator.clean(&db).await.unwrap();
        assert!(db.query("SELECT * FROM gauges", Vec::new()).first().await.is_err());
    }
}
