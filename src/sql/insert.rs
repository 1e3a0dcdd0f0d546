//! INSERT stages: `insert_into -> row|values|entity -> [on_duplicate_key_update]`.

use super::row_builder::push_value;
use super::{Build, Dialect, Execute, RowBuilder, Sql, Statement, TableRef};
use crate::db::Database;
use crate::error::DatabaseError;
use crate::reflect::{Entity, Outline};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Insert {
    sql: Sql,
    table: TableRef,
}

impl Insert {
    pub(crate) fn new(sql: Sql, table: TableRef) -> Self {
        Insert { sql, table }
    }

    fn into_values(self) -> InsertValues {
        InsertValues {
            sql: self.sql,
            table: self.table,
            rows: Vec::new(),
        }
    }

    /// One row from a builder closure: `.row(|r| r.put("x", 2).put("y", Value::Null))`.
    pub fn row(self, build: impl FnOnce(RowBuilder) -> RowBuilder) -> InsertValues {
        self.into_values().row(build)
    }

    /// One row per map.
    pub fn values<I, M, K, V>(self, rows: I) -> InsertValues
    where
        I: IntoIterator<Item = M>,
        M: IntoIterator<Item = (K, V)>,
        K: Into<super::Column>,
        V: Into<Value>,
    {
        self.into_values().values(rows)
    }

    pub fn entity<T: Entity>(self, outline: &Outline<T>, entity: &T) -> InsertValues {
        self.into_values().entity(outline, entity)
    }

    pub fn entities<'e, T: Entity>(self, outline: &Outline<T>, entities: impl IntoIterator<Item = &'e T>) -> InsertValues {
        entities
            .into_iter()
            .fold(self.into_values(), |values, e| values.entity(outline, e))
    }
}

#[derive(Clone, Debug)]
pub struct InsertValues {
    sql: Sql,
    table: TableRef,
    rows: Vec<RowBuilder>,
}

impl InsertValues {
    pub fn row(mut self, build: impl FnOnce(RowBuilder) -> RowBuilder) -> Self {
        self.rows.push(build(RowBuilder::new()));
        self
    }

    pub fn values<I, M, K, V>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: IntoIterator<Item = (K, V)>,
        K: Into<super::Column>,
        V: Into<Value>,
    {
        self.rows.extend(rows.into_iter().map(RowBuilder::from_pairs));
        self
    }

    pub fn entity<T: Entity>(mut self, outline: &Outline<T>, entity: &T) -> Self {
        self.rows.push(RowBuilder::from_entity(outline, entity));
        self
    }

    /// Upsert: on a conflict over `keys`, apply the assignments built by `build`.
    pub fn on_duplicate_key_update(
        self,
        keys: &[&str],
        build: impl FnOnce(RowBuilder) -> RowBuilder,
    ) -> InsertUpsert {
        InsertUpsert {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            update: build(RowBuilder::new()),
            values: self,
        }
    }

    /// Upsert with assignments taken from a map.
    pub fn on_duplicate_key_update_values<M, K, V>(self, keys: &[&str], assignments: M) -> InsertUpsert
    where
        M: IntoIterator<Item = (K, V)>,
        K: Into<super::Column>,
        V: Into<Value>,
    {
        InsertUpsert {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            update: RowBuilder::from_pairs(assignments),
            values: self,
        }
    }

    /// Columns are the union of all rows' columns in first-seen order. A row missing a column,
    /// or holding null for it, gets a `NULL` literal in that position. Rows without any column
    /// take every default.
    fn render(&self) -> Statement {
        let columns = self.columns();
        let mut out = Statement::default();
        out.push_sql("INSERT INTO ");
        out.push_sql(self.table.name());
        if columns.is_empty() && self.sql.dialect() != Dialect::MySql {
            out.push_sql(" DEFAULT VALUES");
            return out;
        }
        out.push_sql(" (");
        out.push_sql(&columns.join(", "));
        out.push_sql(") VALUES ");
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                out.push_sql(", ");
            }
            out.push_sql("(");
            for (j, column) in columns.iter().enumerate() {
                if j > 0 {
                    out.push_sql(", ");
                }
                push_value(&mut out, row.get(column).unwrap_or(&Value::Null));
            }
            out.push_sql(")");
        }
        out
    }

    fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for c in row.columns() {
                if !columns.contains(&c) {
                    columns.push(c);
                }
            }
        }
        columns
    }

    /// `DEFAULT VALUES` covers a single row only; MySQL's `() VALUES (), ()` covers any number.
    fn check(&self) -> Result<(), DatabaseError> {
        let table = self.table.name();
        if self.rows.is_empty() {
            return Err(DatabaseError::EmptyStatement(format!("insert into {} has no rows", table)));
        }
        if self.rows.len() > 1 && self.sql.dialect() != Dialect::MySql && self.columns().is_empty() {
            return Err(DatabaseError::EmptyStatement(format!(
                "insert into {} has {} rows without columns",
                table,
                self.rows.len()
            )));
        }
        Ok(())
    }
}

impl Build for InsertValues {
    fn statement(&self) -> Statement {
        self.render()
    }

    fn validate(&self) -> Result<(), DatabaseError> {
        self.check()
    }

    fn database(&self) -> Option<&Database> {
        self.sql.database()
    }
}

impl Execute for InsertValues {}

#[derive(Clone, Debug)]
pub struct InsertUpsert {
    values: InsertValues,
    keys: Vec<String>,
    update: RowBuilder,
}

impl Build for InsertUpsert {
    fn statement(&self) -> Statement {
        let mut out = self.values.render();
        let mut assignments = Statement::default();
        self.update.render_assignments(&mut assignments);
        out.push_sql(&self.values.sql.dialect().upsert_clause(&self.keys, &assignments.sql));
        out.params.extend(assignments.params);
        out
    }

    fn validate(&self) -> Result<(), DatabaseError> {
        self.values.check()?;
        let table = self.values.table.name();
        if self.keys.is_empty() && self.values.sql.dialect() != Dialect::MySql {
            return Err(DatabaseError::MissingConflictTarget(table.to_string()));
        }
        if self.update.is_empty() {
            return Err(DatabaseError::EmptyStatement(format!("upsert into {} assigns nothing", table)));
        }
        Ok(())
    }

    fn database(&self) -> Option<&Database> {
        self.values.database()
    }
}

impl Execute for InsertUpsert {}

#[cfg(test)]
mod tests {
    use super::super::Dialect;
    use super::*;
    use crate::case::CaseConvention;

    crate::entity! {
        #[derive(Debug, Default)]
        struct Quark: QuarkFields {
            #[read_only]
            id: i64,
            name: String,
            charge: Option<f64>,
        }
    }

    fn sql(dialect: Dialect) -> Sql {
        Sql::new(dialect)
    }

    #[test]
    fn single_row_with_null_literal() {
        let s = sql(Dialect::Sqlite)
            .insert_into("t")
            .row(|r| r.put("x", 2).put("y", Value::Null))
            .statement();
        assert_eq!(s.sql, "INSERT INTO t (x, y) VALUES (?, NULL)");
        assert_eq!(s.params, vec![Value::Int(2)]);
    }

    #[test]
    fn multi_row_alignment_is_per_row() {
        let s = sql(Dialect::Sqlite)
            .insert_into("t")
            .row(|r| r.put("x", 2).put("y", Value::Null))
            .row(|r| r.put("x", Value::Null).put("y", "v"))
            .statement();
        assert_eq!(s.sql, "INSERT INTO t (x, y) VALUES (?, NULL), (NULL, ?)");
        assert_eq!(s.params, vec![Value::Int(2), Value::from("v")]);
    }

    #[test]
    fn missing_columns_become_null() {
        let s = sql(Dialect::Sqlite)
            .insert_into("t")
            .values(vec![vec![("x", Value::Int(1))], vec![("y", Value::Int(2))]])
            .statement();
        assert_eq!(s.sql, "INSERT INTO t (x, y) VALUES (?, NULL), (NULL, ?)");
        assert_eq!(s.params, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn entity_rows_skip_read_only() {
        let outline = Outline::<Quark>::build(CaseConvention::Snake).unwrap();
        let quarks = [
            Quark {
                id: 1,
                name: "up".into(),
                charge: Some(0.67),
            },
            Quark {
                id: 2,
                name: "down".into(),
                charge: None,
            },
        ];
        let s = sql(Dialect::Sqlite)
            .insert_into(&outline)
            .entities(&outline, &quarks)
            .statement();
        assert_eq!(s.sql, "INSERT INTO quarks (name, charge) VALUES (?, ?), (?, NULL)");
        assert_eq!(
            s.params,
            vec![Value::from("up"), Value::Float(0.67), Value::from("down")]
        );
    }

    #[test]
    fn upsert_per_dialect() {
        let build = |d| {
            sql(d)
                .insert_into("t")
                .row(|r| r.put("id", 1).put("name", "a"))
                .on_duplicate_key_update(&["id"], |r| r.put("name", "a").put("note", Value::Null))
                .statement()
        };
        let mysql = build(Dialect::MySql);
        assert_eq!(
            mysql.sql,
            "INSERT INTO t (id, name) VALUES (?, ?) ON DUPLICATE KEY UPDATE name = ?, note = NULL"
        );
        assert_eq!(mysql.params, vec![Value::Int(1), Value::from("a"), Value::from("a")]);
        assert_eq!(
            build(Dialect::Postgres).sql,
            "INSERT INTO t (id, name) VALUES (?, ?) ON CONFLICT (id) DO UPDATE SET name = ?, note = NULL"
        );
    }

    crate::entity! {
        #[derive(Debug, Default)]
        struct Stamp: StampFields {
            #[read_only]
            id: i64,
            #[read_only]
            created_at: Option<chrono::NaiveDateTime>,
        }
    }

    #[test]
    fn entity_without_writable_columns_takes_defaults() {
        let outline = Outline::<Stamp>::build(CaseConvention::Snake).unwrap();
        let insert = sql(Dialect::Sqlite)
            .insert_into(&outline)
            .entity(&outline, &Stamp::default());
        assert!(insert.validate().is_ok());
        let s = insert.statement();
        assert_eq!(s.sql, "INSERT INTO stamps DEFAULT VALUES");
        assert!(s.params.is_empty());

        let mysql = sql(Dialect::MySql).insert_into("stamps").row(|r| r).statement();
        assert_eq!(mysql.sql, "INSERT INTO stamps () VALUES ()");
    }

    #[test]
    fn inserts_without_rows_are_rejected() {
        let none = sql(Dialect::Sqlite)
            .insert_into("t")
            .values(Vec::<Vec<(&str, Value)>>::new());
        assert!(matches!(none.validate(), Err(DatabaseError::EmptyStatement(_))));

        let blank = sql(Dialect::Postgres).insert_into("t").row(|r| r).row(|r| r);
        assert!(matches!(blank.validate(), Err(DatabaseError::EmptyStatement(_))));
        let blank = sql(Dialect::MySql).insert_into("t").row(|r| r).row(|r| r);
        assert!(blank.validate().is_ok());
    }

    #[test]
    fn upsert_needs_conflict_keys_outside_mysql() {
        let upsert = |d| {
            sql(d)
                .insert_into("t")
                .row(|r| r.put("id", 1))
                .on_duplicate_key_update(&[], |r| r.put("hits", 1))
        };
        assert!(matches!(
            upsert(Dialect::Postgres).validate(),
            Err(DatabaseError::MissingConflictTarget(t)) if t == "t"
        ));
        assert!(matches!(
            upsert(Dialect::Sqlite).validate(),
            Err(DatabaseError::MissingConflictTarget(_))
        ));
        assert!(upsert(Dialect::MySql).validate().is_ok());

        let nothing = sql(Dialect::Postgres)
            .insert_into("t")
            .row(|r| r.put("id", 1))
            .on_duplicate_key_update(&["id"], |r| r);
        assert!(matches!(nothing.validate(), Err(DatabaseError::EmptyStatement(_))));
    }

    #[test]
    fn upsert_from_map() {
        let s = sql(Dialect::Sqlite)
            .insert_into("t")
            .row(|r| r.put("id", 1))
            .on_duplicate_key_update_values(&["id"], [("hits", 5)])
            .statement();
        assert_eq!(s.sql, "INSERT INTO t (id) VALUES (?) ON CONFLICT (id) DO UPDATE SET hits = ?");
        assert_eq!(s.params, vec![Value::Int(1), Value::Int(5)]);
    }
}
