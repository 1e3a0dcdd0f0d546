//! Built statements, the builder entry point, and the execution traits shared by terminal stages.

use super::{Delete, Dialect, Insert, Select, TableRef, Update};
use crate::db::{Database, RowStream, UpdateHandle};
use crate::error::{DatabaseError, Error};
use crate::reflect::{Entity, Outline};
use crate::value::{Row, Value};
use async_trait::async_trait;

/// SQL text with `?` placeholders and the parameters bound to them, in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    /// Byte offset where a `RETURNING` clause belongs when it is not the end of `sql`.
    pub(crate) returning_at: Option<usize>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Statement {
            sql: sql.into(),
            params,
            returning_at: None,
        }
    }

    pub(crate) fn push_sql(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Emit one placeholder and record its value.
    pub(crate) fn push_param(&mut self, v: Value) {
        self.sql.push('?');
        self.params.push(v);
    }

    /// Append a trailing `LIMIT`, keeping `RETURNING` ahead of it.
    pub(crate) fn push_limit(&mut self, count: u64) {
        self.returning_at = Some(self.sql.len());
        self.sql.push_str(&format!(" LIMIT {}", count));
    }
}

/// Entry point for building statements, optionally bound to a database for execution.
#[derive(Clone, Debug)]
pub struct Sql {
    dialect: Dialect,
    db: Option<Database>,
}

impl Sql {
    /// Unbound builder: statements can be rendered but not executed.
    pub fn new(dialect: Dialect) -> Self {
        Sql { dialect, db: None }
    }

    pub(crate) fn bound(db: Database) -> Self {
        Sql {
            dialect: db.dialect(),
            db: Some(db),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub(crate) fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn select<I, C>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = C>,
        C: Into<super::Column>,
    {
        Select::new(self.clone(), columns.into_iter().map(Into::into).collect())
    }

    /// `SELECT *`.
    pub fn select_all(&self) -> Select {
        Select::new(self.clone(), Vec::new())
    }

    pub fn insert_into(&self, table: impl Into<TableRef>) -> Insert {
        Insert::new(self.clone(), table.into())
    }

    pub fn update(&self, table: impl Into<TableRef>) -> Update {
        Update::new(self.clone(), table.into())
    }

    pub fn delete_from(&self, table: impl Into<TableRef>) -> Delete {
        Delete::new(self.clone(), table.into())
    }
}

/// A stage that can render its statement.
pub trait Build {
    fn statement(&self) -> Statement;
    fn database(&self) -> Option<&Database>;

    /// Reject a stage whose statement would not be valid SQL. Runs before anything is sent.
    fn validate(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Terminal operations of a read statement.
#[async_trait]
pub trait Fetch: Build + Sized + Send {
    /// Lazy row stream. An unbound builder yields a single [`DatabaseError::Unbound`].
    fn fetch(self) -> RowStream {
        let statement = self.statement();
        match self.database() {
            Some(db) => db.query(statement.sql, statement.params),
            None => RowStream::failed(DatabaseError::Unbound),
        }
    }

    /// First row only; the stream is dropped right after it.
    async fn first(self) -> Result<Option<Row>, DatabaseError> {
        self.fetch().first().await
    }

    async fn get_as<T: Entity>(self, outline: &Outline<T>) -> Result<Vec<T>, Error> {
        self.fetch().get_as(outline).await
    }

    async fn first_as<T: Entity>(self, outline: &Outline<T>) -> Result<Option<T>, Error> {
        self.fetch().first_as(outline).await
    }
}

/// Terminal operations of a write statement. Each consumes the stage, so a statement runs at most once.
#[async_trait]
pub trait Execute: Build + Sized + Send {
    fn prepare(self) -> Result<UpdateHandle, DatabaseError> {
        self.validate()?;
        let statement = self.statement();
        let db = self.database().cloned().ok_or(DatabaseError::Unbound)?;
        Ok(db
            .update(statement.sql, statement.params)
            .returning_at(statement.returning_at))
    }

    /// Affected row count.
    async fn count(self) -> Result<u64, DatabaseError> {
        self.prepare()?.count().await
    }

    /// Generated `id` values of the affected rows.
    async fn get_ids(self) -> Result<Vec<Value>, DatabaseError> {
        self.prepare()?.get_ids().await
    }

    /// Values of `column` from the affected rows.
    async fn get_ids_of(self, column: &str) -> Result<Vec<Value>, DatabaseError> {
        self.prepare()?.get_ids_of(column).await
    }
}
