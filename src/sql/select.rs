//! SELECT stages: `select -> from -> [join -> on_eq] -> where_|all -> [order_by -> asc|desc] -> limit|all`.

use super::{Build, Column, Condition, Fetch, Sql, Statement, TableRef};
use crate::db::Database;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Clone, Debug)]
struct Join {
    kind: JoinKind,
    table: TableRef,
    on: Condition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Debug)]
pub struct Select {
    sql: Sql,
    columns: Vec<Column>,
}

impl Select {
    pub(crate) fn new(sql: Sql, columns: Vec<Column>) -> Self {
        Select { sql, columns }
    }

    pub fn from(self, table: impl Into<TableRef>) -> SelectFrom {
        SelectFrom {
            sql: self.sql,
            columns: self.columns,
            table: table.into(),
            joins: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SelectFrom {
    sql: Sql,
    columns: Vec<Column>,
    table: TableRef,
    joins: Vec<Join>,
}

impl SelectFrom {
    pub fn join(self, table: impl Into<TableRef>) -> SelectJoin {
        SelectJoin {
            from: self,
            kind: JoinKind::Inner,
            table: table.into(),
        }
    }

    pub fn left_join(self, table: impl Into<TableRef>) -> SelectJoin {
        SelectJoin {
            from: self,
            kind: JoinKind::Left,
            table: table.into(),
        }
    }

    pub fn where_(self, condition: Condition) -> SelectWhere {
        SelectWhere {
            from: self,
            filter: Some(condition),
            order: Vec::new(),
        }
    }

    /// No filter.
    pub fn all(self) -> SelectWhere {
        SelectWhere {
            from: self,
            filter: None,
            order: Vec::new(),
        }
    }
}

/// A join awaiting its equality condition.
#[derive(Clone, Debug)]
pub struct SelectJoin {
    from: SelectFrom,
    kind: JoinKind,
    table: TableRef,
}

impl SelectJoin {
    /// `ON left = right`; closes the join.
    pub fn on_eq(mut self, left: impl Into<Column>, right: impl Into<Column>) -> SelectFrom {
        self.from.joins.push(Join {
            kind: self.kind,
            table: self.table,
            on: Condition::columns_eq(left.into(), right.into()),
        });
        self.from
    }
}

#[derive(Clone, Debug)]
pub struct SelectWhere {
    from: SelectFrom,
    filter: Option<Condition>,
    order: Vec<(Column, Direction)>,
}

impl SelectWhere {
    pub fn order_by(self, column: impl Into<Column>) -> SelectOrder {
        SelectOrder {
            inner: self,
            column: column.into(),
        }
    }

    pub fn limit(self, count: u64) -> SelectLimit {
        SelectLimit {
            inner: self,
            offset: None,
            count: Some(count),
        }
    }

    pub fn limit_offset(self, offset: u64, count: u64) -> SelectLimit {
        SelectLimit {
            inner: self,
            offset: Some(offset),
            count: Some(count),
        }
    }

    /// No limit.
    pub fn all(self) -> SelectLimit {
        SelectLimit {
            inner: self,
            offset: None,
            count: None,
        }
    }

    fn render(&self) -> Statement {
        let from = &self.from;
        let qualifier = from.table.default_qualifier();
        let mut out = Statement::default();
        out.push_sql("SELECT ");
        if from.columns.is_empty() {
            out.push_sql("*");
        } else {
            let cols: Vec<String> = from.columns.iter().map(|c| c.render(qualifier)).collect();
            out.push_sql(&cols.join(", "));
        }
        out.push_sql(" FROM ");
        out.push_sql(from.table.name());
        for join in &from.joins {
            out.push_sql(match join.kind {
                JoinKind::Inner => " JOIN ",
                JoinKind::Left => " LEFT JOIN ",
            });
            out.push_sql(join.table.name());
            out.push_sql(" ON ");
            join.on.render(&mut out, from.sql.dialect(), qualifier);
        }
        if let Some(filter) = &self.filter {
            out.push_sql(" WHERE ");
            filter.render(&mut out, from.sql.dialect(), qualifier);
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(c, d)| {
                    let dir = match d {
                        Direction::Asc => "ASC",
                        Direction::Desc => "DESC",
                    };
                    format!("{} {}", c.render(qualifier), dir)
                })
                .collect();
            out.push_sql(" ORDER BY ");
            out.push_sql(&order.join(", "));
        }
        out
    }
}

/// An ORDER BY column awaiting its direction.
#[derive(Clone, Debug)]
pub struct SelectOrder {
    inner: SelectWhere,
    column: Column,
}

impl SelectOrder {
    pub fn asc(mut self) -> SelectWhere {
        self.inner.order.push((self.column, Direction::Asc));
        self.inner
    }

    pub fn desc(mut self) -> SelectWhere {
        self.inner.order.push((self.column, Direction::Desc));
        self.inner
    }
}

#[derive(Clone, Debug)]
pub struct SelectLimit {
    inner: SelectWhere,
    offset: Option<u64>,
    count: Option<u64>,
}

impl Build for SelectWhere {
    fn statement(&self) -> Statement {
        self.render()
    }

    fn database(&self) -> Option<&Database> {
        self.from.sql.database()
    }
}

impl Fetch for SelectWhere {}

impl Build for SelectLimit {
    fn statement(&self) -> Statement {
        let mut out = self.inner.render();
        if let Some(count) = self.count {
            out.push_sql(&format!(" LIMIT {}", count));
        }
        if let Some(offset) = self.offset {
            out.push_sql(&format!(" OFFSET {}", offset));
        }
        out
    }

    fn database(&self) -> Option<&Database> {
        self.inner.database()
    }
}

impl Fetch for SelectLimit {}
