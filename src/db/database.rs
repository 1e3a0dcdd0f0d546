//! Pooled connections, lazy query streams and deferred writes.

use super::bind::{bind_pg, bind_sqlite};
use super::decode::{column_names, pg_row, sqlite_row};
use super::{RowStream, UpdateHandle};
use crate::config::DatabaseConfig;
use crate::error::DatabaseError;
use crate::sql::{Dialect, Sql};
use crate::value::{Row, Value};
use futures::StreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Rows buffered between the producer task and the consumer.
const STREAM_BUFFER: usize = 64;

#[derive(Clone, Debug)]
pub enum Pool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Connection URL and credentials handed to an external migration runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationTarget {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl MigrationTarget {
    pub fn from_url(url: &str) -> Self {
        let authority = url
            .split_once("://")
            .map(|(_, rest)| rest.split('/').next().unwrap_or(""))
            .unwrap_or("");
        let (user, password) = match authority.rsplit_once('@') {
            Some((credentials, _)) => match credentials.split_once(':') {
                Some((u, p)) => (Some(u.to_string()), Some(p.to_string())),
                None => (Some(credentials.to_string()), None),
            },
            None => (None, None),
        };
        MigrationTarget {
            url: url.to_string(),
            user: user.filter(|u| !u.is_empty()),
            password,
        }
    }
}

/// Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: Pool,
    dialect: Dialect,
    url: Option<Arc<str>>,
}

impl Database {
    /// Connects with the dialect implied by the URL scheme. In-memory SQLite is pinned to a
    /// single long-lived connection, since each connection would otherwise see its own database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let dialect = Dialect::from_url(&config.url)
            .filter(|d| *d != Dialect::MySql)
            .ok_or_else(|| DatabaseError::UnsupportedUrl(scheme_of(&config.url)))?;
        let pool = match dialect {
            Dialect::Sqlite => {
                let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
                let pool = if is_memory(&config.url) {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new().max_connections(config.max_connections)
                };
                Pool::Sqlite(pool.connect_with(options).await?)
            }
            _ => Pool::Postgres(
                PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.url)
                    .await?,
            ),
        };
        info!(dialect = ?dialect, max_connections = config.max_connections, "database connected");
        Ok(Database {
            pool,
            dialect,
            url: Some(config.url.as_str().into()),
        })
    }

    pub fn from_pg_pool(pool: PgPool) -> Self {
        Database {
            pool: Pool::Postgres(pool),
            dialect: Dialect::Postgres,
            url: None,
        }
    }

    pub fn from_sqlite_pool(pool: SqlitePool) -> Self {
        Database {
            pool: Pool::Sqlite(pool),
            dialect: Dialect::Sqlite,
            url: None,
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Builder whose terminal stages execute against this database.
    pub fn sql(&self) -> Sql {
        Sql::bound(self.clone())
    }

    /// Runs `sql` on a spawned task and streams its rows. Errors arrive in the stream.
    pub fn query(&self, sql: impl Into<String>, params: Vec<Value>) -> RowStream {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let sql = self.dialect.placeholders(&sql.into());
        let pool = self.pool.clone();
        tokio::spawn(async move {
            debug!(sql = %sql, params = ?params, "query");
            let mut columns: Option<Arc<[String]>> = None;
            match pool {
                Pool::Postgres(pool) => {
                    let mut rows = bind_pg(sqlx::query(&sql), &params).fetch(&pool);
                    while let Some(next) = rows.next().await {
                        let item = next.map_err(DatabaseError::from).and_then(|row| {
                            let columns = columns.get_or_insert_with(|| column_names(&row));
                            pg_row(&row, columns)
                        });
                        if !forward(&tx, item).await {
                            break;
                        }
                    }
                }
                Pool::Sqlite(pool) => {
                    let mut rows = bind_sqlite(sqlx::query(&sql), &params).fetch(&pool);
                    while let Some(next) = rows.next().await {
                        let item = next.map_err(DatabaseError::from).map(|row| {
                            let columns = columns.get_or_insert_with(|| column_names(&row));
                            sqlite_row(&row, columns)
                        });
                        if !forward(&tx, item).await {
                            break;
                        }
                    }
                }
            }
        });
        RowStream::new(rx)
    }

    /// Deferred write: nothing runs until the handle's `count` or `get_ids` is awaited.
    pub fn update(&self, sql: impl Into<String>, params: Vec<Value>) -> UpdateHandle {
        UpdateHandle::new(self.clone(), sql.into(), params)
    }

    /// Statement without parameters, typically DDL. Returns the affected row count.
    pub async fn execute(&self, sql: &str) -> Result<u64, DatabaseError> {
        self.run(sql, &[]).await
    }

    pub(crate) async fn run(&self, sql: &str, params: &[Value]) -> Result<u64, DatabaseError> {
        let sql = self.dialect.placeholders(sql);
        debug!(sql = %sql, params = ?params, "execute");
        let affected = match &self.pool {
            Pool::Postgres(pool) => bind_pg(sqlx::query(&sql), params).execute(pool).await?.rows_affected(),
            Pool::Sqlite(pool) => bind_sqlite(sqlx::query(&sql), params).execute(pool).await?.rows_affected(),
        };
        Ok(affected)
    }

    /// Round trip used by readiness checks.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.query("SELECT 1", Vec::new()).first().await.map(|_| ())
    }

    /// URL and credentials for an external migration tool. `None` for databases built from a pool.
    pub fn migration_target(&self) -> Option<MigrationTarget> {
        self.url.as_deref().map(MigrationTarget::from_url)
    }
}

/// Hands one item to the consumer. `false` once the stream should end: the consumer is gone
/// or the item was an error.
async fn forward(tx: &mpsc::Sender<Result<Row, DatabaseError>>, item: Result<Row, DatabaseError>) -> bool {
    let failed = item.is_err();
    if tx.send(item).await.is_err() {
        debug!("row stream dropped by subscriber, stopping producer");
        return false;
    }
    !failed
}

fn is_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn scheme_of(url: &str) -> String {
    url.split(':').next().unwrap_or(url).to_string()
}

/// Ensure the PostgreSQL database named in `database_url` exists; create it if not. Connects to
/// the default `postgres` database to run CREATE DATABASE. Other backends are left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), DatabaseError> {
    if Dialect::from_url(database_url) != Some(Dialect::Postgres) {
        return Ok(());
    }
    let (admin_url, db_name) = split_database_name(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let mut conn = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn split_database_name(url: &str) -> Result<(String, String), DatabaseError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| DatabaseError::UnsupportedUrl(format!("{}: no database path", scheme_of(url))))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_split() {
        let (admin, name) = split_database_name("postgres://u:p@localhost:5432/app?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "app");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("my\"db"), "\"my\"\"db\"");
    }

    #[test]
    fn migration_target_credentials() {
        let t = MigrationTarget::from_url("postgres://alice:s3cret@db:5432/app");
        assert_eq!(t.user.as_deref(), Some("alice"));
        assert_eq!(t.password.as_deref(), Some("s3cret"));
        let t = MigrationTarget::from_url("sqlite::memory:");
        assert_eq!(t.user, None);
        assert_eq!(t.password, None);
    }

    #[tokio::test]
    async fn mysql_urls_are_rejected() {
        let err = Database::connect(&DatabaseConfig::new("mysql://localhost/app")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::UnsupportedUrl(s) if s == "mysql"));
    }

    #[tokio::test]
    async fn memory_sqlite_round_trip() {
        let db = Database::connect(&DatabaseConfig::new("sqlite::memory:")).await.unwrap();
        assert_eq!(db.dialect(), Dialect::Sqlite);
        db.ping().await.unwrap();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)").await.unwrap();
        let n = db.update("INSERT INTO t (name) VALUES (?)", vec![Value::from("a")]).count().await.unwrap();
        assert_eq!(n, 1);
        let row = db.query("SELECT id, name FROM t", Vec::new()).first().await.unwrap().unwrap();
        assert_eq!(row.get("name"), Some(&Value::from("a")));
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
    }

    #[tokio::test]
    async fn sql_errors_arrive_in_the_stream() {
        let db = Database::connect(&DatabaseConfig::new("sqlite::memory:")).await.unwrap();
        let mut stream = db.query("SELECT * FROM missing", Vec::new());
        assert!(matches!(stream.next().await, Some(Err(DatabaseError::Sqlx(_)))));
        assert!(stream.next().await.is_none());
    }
}
