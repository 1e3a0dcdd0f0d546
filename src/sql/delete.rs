//! DELETE stages: `delete_from -> where_|all -> [limit]`.

use super::{Build, Condition, Execute, Sql, Statement, TableRef};
use crate::db::Database;

#[derive(Clone, Debug)]
pub struct Delete {
    sql: Sql,
    table: TableRef,
}

impl Delete {
    pub(crate) fn new(sql: Sql, table: TableRef) -> Self {
        Delete { sql, table }
    }

    pub fn where_(self, condition: Condition) -> DeleteWhere {
        DeleteWhere {
            delete: self,
            filter: Some(condition),
        }
    }

    pub fn all(self) -> DeleteWhere {
        DeleteWhere {
            delete: self,
            filter: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DeleteWhere {
    delete: Delete,
    filter: Option<Condition>,
}

impl DeleteWhere {
    pub fn limit(self, count: u64) -> DeleteLimit {
        DeleteLimit { inner: self, count }
    }
}

impl Build for DeleteWhere {
    fn statement(&self) -> Statement {
        let mut out = Statement::default();
        out.push_sql("DELETE FROM ");
        out.push_sql(self.delete.table.name());
        if let Some(filter) = &self.filter {
            out.push_sql(" WHERE ");
            filter.render(&mut out, self.delete.sql.dialect(), None);
        }
        out
    }

    fn database(&self) -> Option<&Database> {
        self.delete.sql.database()
    }
}

impl Execute for DeleteWhere {}

#[derive(Clone, Debug)]
pub struct DeleteLimit {
    inner: DeleteWhere,
    count: u64,
}

impl Build for DeleteLimit {
    fn statement(&self) -> Statement {
        let mut out = self.inner.statement();
        out.push_limit(self.count);
        out
    }

    fn database(&self) -> Option<&Database> {
        self.inner.database()
    }
}

impl Execute for DeleteLimit {}
