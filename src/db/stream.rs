//! Pull-based query results and deferred write execution.

use super::Database;
use crate::error::{DatabaseError, Error};
use crate::reflect::{Entity, Outline};
use crate::value::{Row, Value};
use tokio::sync::mpsc;

/// Rows produced by a spawned query task. Dropping the stream unsubscribes: the producer stops
/// at its next send, though the server may finish the statement on its own.
///
/// Execution failures arrive in-band as an `Err` item, after which the stream ends.
#[derive(Debug)]
pub struct RowStream {
    rx: mpsc::Receiver<Result<Row, DatabaseError>>,
}

impl RowStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<Row, DatabaseError>>) -> Self {
        RowStream { rx }
    }

    /// A stream whose only item is `err`.
    pub fn failed(err: DatabaseError) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // A fresh channel with capacity one always has room.
        let _ = tx.try_send(Err(err));
        RowStream { rx }
    }

    pub async fn next(&mut self) -> Option<Result<Row, DatabaseError>> {
        self.rx.recv().await
    }

    /// First row, then unsubscribe.
    pub async fn first(mut self) -> Result<Option<Row>, DatabaseError> {
        self.next().await.transpose()
    }

    pub async fn collect(mut self) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Decode every row into `T`. Fails on the first row that does not convert.
    pub async fn get_as<T: Entity>(mut self, outline: &Outline<T>) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();
        while let Some(row) = self.next().await {
            out.push(row?.decode(outline)?);
        }
        Ok(out)
    }

    pub async fn first_as<T: Entity>(self, outline: &Outline<T>) -> Result<Option<T>, Error> {
        match self.first().await? {
            Some(row) => Ok(Some(row.decode(outline)?)),
            None => Ok(None),
        }
    }
}

/// A write statement that has not run yet. Each terminal consumes the handle, so the statement
/// executes once, either for its row count or for returned keys.
#[derive(Clone, Debug)]
pub struct UpdateHandle {
    db: Database,
    sql: String,
    params: Vec<Value>,
    returning_at: Option<usize>,
}

impl UpdateHandle {
    pub(crate) fn new(db: Database, sql: String, params: Vec<Value>) -> Self {
        UpdateHandle {
            db,
            sql,
            params,
            returning_at: None,
        }
    }

    /// Where `RETURNING` goes when the statement ends in a trailing clause such as `LIMIT`.
    pub(crate) fn returning_at(mut self, at: Option<usize>) -> Self {
        self.returning_at = at.filter(|&i| self.sql.is_char_boundary(i));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub async fn count(self) -> Result<u64, DatabaseError> {
        self.db.run(&self.sql, &self.params).await
    }

    /// Generated `id` values of the affected rows.
    pub async fn get_ids(self) -> Result<Vec<Value>, DatabaseError> {
        self.get_ids_of("id").await
    }

    /// Runs the statement with `RETURNING column` added. Needs Postgres or SQLite 3.35+.
    pub async fn get_ids_of(self, column: &str) -> Result<Vec<Value>, DatabaseError> {
        let sql = with_returning(&self.sql, self.returning_at, column);
        let rows = self.db.query(sql, self.params).collect().await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.get_index(0).cloned())
            .collect())
    }
}

/// `sql` with `RETURNING column` spliced in at `at`, or appended when there is no offset.
fn with_returning(sql: &str, at: Option<usize>, column: &str) -> String {
    let (head, tail) = sql.split_at(at.unwrap_or(sql.len()));
    format!("{} RETURNING {}{}", head, column, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returning_appends_without_offset() {
        assert_eq!(
            with_returning("INSERT INTO t (a) VALUES (?)", None, "id"),
            "INSERT INTO t (a) VALUES (?) RETURNING id"
        );
    }

    #[test]
    fn returning_goes_before_trailing_limit() {
        let sql = "DELETE FROM t WHERE a = ? LIMIT 2";
        let at = sql.find(" LIMIT");
        assert_eq!(
            with_returning(sql, at, "id"),
            "DELETE FROM t WHERE a = ? RETURNING id LIMIT 2"
        );
    }

    #[tokio::test]
    async fn failed_stream_yields_error_once() {
        let mut stream = RowStream::failed(DatabaseError::Unbound);
        assert!(matches!(stream.next().await, Some(Err(DatabaseError::Unbound))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn failed_stream_surfaces_through_collect() {
        let err = RowStream::failed(DatabaseError::Unbound).collect().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Unbound));
    }
}
