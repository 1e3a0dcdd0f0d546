//! UPDATE stages: `update -> set -> where_|all -> [limit]`.

use super::{Build, Condition, Execute, RowBuilder, Sql, Statement, TableRef};
use crate::db::Database;
use crate::error::DatabaseError;
use crate::reflect::{Entity, Outline};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Update {
    sql: Sql,
    table: TableRef,
}

impl Update {
    pub(crate) fn new(sql: Sql, table: TableRef) -> Self {
        Update { sql, table }
    }

    pub fn set(self, build: impl FnOnce(RowBuilder) -> RowBuilder) -> UpdateSet {
        self.with(build(RowBuilder::new()))
    }

    pub fn set_values<M, K, V>(self, assignments: M) -> UpdateSet
    where
        M: IntoIterator<Item = (K, V)>,
        K: Into<super::Column>,
        V: Into<Value>,
    {
        self.with(RowBuilder::from_pairs(assignments))
    }

    /// Assign every writable property of `entity`.
    pub fn set_entity<T: Entity>(self, outline: &Outline<T>, entity: &T) -> UpdateSet {
        self.with(RowBuilder::from_entity(outline, entity))
    }

    fn with(self, assignments: RowBuilder) -> UpdateSet {
        UpdateSet {
            sql: self.sql,
            table: self.table,
            assignments,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateSet {
    sql: Sql,
    table: TableRef,
    assignments: RowBuilder,
}

impl UpdateSet {
    pub fn where_(self, condition: Condition) -> UpdateWhere {
        UpdateWhere {
            set: self,
            filter: Some(condition),
        }
    }

    /// Every row of the table.
    pub fn all(self) -> UpdateWhere {
        UpdateWhere {
            set: self,
            filter: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateWhere {
    set: UpdateSet,
    filter: Option<Condition>,
}

impl UpdateWhere {
    /// Only MySQL and SQLite builds compiled with `SQLITE_ENABLE_UPDATE_DELETE_LIMIT` accept this.
    pub fn limit(self, count: u64) -> UpdateLimit {
        UpdateLimit { inner: self, count }
    }
}

impl Build for UpdateWhere {
    fn statement(&self) -> Statement {
        let set = &self.set;
        let mut out = Statement::default();
        out.push_sql("UPDATE ");
        out.push_sql(set.table.name());
        out.push_sql(" SET ");
        set.assignments.render_assignments(&mut out);
        if let Some(filter) = &self.filter {
            out.push_sql(" WHERE ");
            filter.render(&mut out, set.sql.dialect(), None);
        }
        out
    }

    fn database(&self) -> Option<&Database> {
        self.set.sql.database()
    }

    fn validate(&self) -> Result<(), DatabaseError> {
        if self.set.assignments.is_empty() {
            return Err(DatabaseError::EmptyStatement(format!(
                "update of {} assigns nothing",
                self.set.table.name()
            )));
        }
        Ok(())
    }
}

impl Execute for UpdateWhere {}

#[derive(Clone, Debug)]
pub struct UpdateLimit {
    inner: UpdateWhere,
    count: u64,
}

impl Build for UpdateLimit {
    fn statement(&self) -> Statement {
        let mut out = self.inner.statement();
        out.push_limit(self.count);
        out
    }

    fn database(&self) -> Option<&Database> {
        self.inner.database()
    }

    fn validate(&self) -> Result<(), DatabaseError> {
        self.inner.validate()
    }
}

impl Execute for UpdateLimit {}

#[cfg(test)]
mod tests {
    use super::super::{eq, gt, Dialect};
    use super::*;

    #[test]
    fn set_with_null_and_filter() {
        let s = Sql::new(Dialect::Sqlite)
            .update("t")
            .set(|r| r.put("name", "x").put("note", Value::Null))
            .where_(eq("id", 3).and(gt("hits", 0)))
            .statement();
        assert_eq!(s.sql, "UPDATE t SET name = ?, note = NULL WHERE (id = ?) AND (hits > ?)");
        assert_eq!(s.params, vec![Value::from("x"), Value::Int(3), Value::Int(0)]);
    }

    #[test]
    fn all_with_limit() {
        let s = Sql::new(Dialect::MySql)
            .update("t")
            .set_values([("hits", 0)])
            .all()
            .limit(10)
            .statement();
        assert_eq!(s.sql, "UPDATE t SET hits = ? LIMIT 10");
        assert_eq!(s.params, vec![Value::Int(0)]);
        let at = s.returning_at.unwrap();
        assert_eq!(&s.sql[at..], " LIMIT 10");
    }

    #[test]
    fn empty_assignments_are_rejected() {
        let update = Sql::new(Dialect::Sqlite).update("stamps").set(|r| r).all();
        assert!(matches!(update.validate(), Err(DatabaseError::EmptyStatement(_))));
        assert!(matches!(
            update.limit(1).prepare(),
            Err(DatabaseError::EmptyStatement(_))
        ));
    }
}
