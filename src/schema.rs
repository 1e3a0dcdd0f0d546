//! Table DDL derived from an outline's property kinds.

use crate::error::ReflectionError;
use crate::reflect::{Entity, FieldKind, Outline, Property};
use crate::sql::Dialect;

/// Column type for a declared kind.
pub fn column_type(kind: FieldKind, dialect: Dialect) -> &'static str {
    use FieldKind::*;
    match dialect {
        Dialect::Postgres => match kind {
            Bool => "BOOLEAN",
            Byte | Short => "SMALLINT",
            Char => "CHAR(1)",
            Int => "INTEGER",
            Long => "BIGINT",
            Float => "REAL",
            Double => "DOUBLE PRECISION",
            String => "TEXT",
            Bytes => "BYTEA",
            DateTime => "TIMESTAMP",
            Uuid => "UUID",
            Json => "JSONB",
        },
        Dialect::MySql => match kind {
            Bool => "BOOLEAN",
            Byte => "TINYINT",
            Short => "SMALLINT",
            Char => "CHAR(1)",
            Int => "INT",
            Long => "BIGINT",
            Float => "FLOAT",
            Double => "DOUBLE",
            String => "TEXT",
            Bytes => "BLOB",
            DateTime => "DATETIME",
            Uuid => "CHAR(36)",
            Json => "JSON",
        },
        Dialect::Sqlite => match kind {
            Bool => "BOOLEAN",
            Byte | Short | Int | Long => "INTEGER",
            Float | Double => "REAL",
            Bytes => "BLOB",
            Char | String | DateTime | Uuid | Json => "TEXT",
        },
    }
}

fn key_definition(kind: FieldKind, dialect: Dialect) -> String {
    let integral = matches!(kind, FieldKind::Short | FieldKind::Int | FieldKind::Long);
    match (dialect, integral) {
        (Dialect::Postgres, true) => format!("{} GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY", column_type(kind, dialect)),
        (Dialect::MySql, true) => format!("{} AUTO_INCREMENT PRIMARY KEY", column_type(kind, dialect)),
        // INTEGER PRIMARY KEY aliases the rowid and is assigned automatically.
        (Dialect::Sqlite, true) => "INTEGER PRIMARY KEY".to_string(),
        (_, false) => format!("{} PRIMARY KEY", column_type(kind, dialect)),
    }
}

fn column_definition<T: Entity>(property: &Property<T>, dialect: Dialect) -> String {
    let mut def = format!("{} {}", property.name(), column_type(property.kind(), dialect));
    // Read-only columns are filled by the database, so inserts leave them out.
    if !property.is_nullable() && !property.is_read_only() {
        def.push_str(" NOT NULL");
    }
    def
}

/// `CREATE TABLE IF NOT EXISTS` for the outline's table, with `key` (any spelling
/// [`Outline::property_named`] accepts) as primary key.
pub fn create_table_sql<T: Entity>(outline: &Outline<T>, dialect: Dialect, key: &str) -> Result<String, ReflectionError> {
    let key = outline.property_named(key)?.name().to_string();
    let columns: Vec<String> = outline
        .properties()
        .iter()
        .map(|p| {
            if p.name() == key {
                format!("{} {}", p.name(), key_definition(p.kind(), dialect))
            } else {
                column_definition(p, dialect)
            }
        })
        .collect();
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        outline.table_name(),
        columns.join(", ")
    ))
}

pub fn drop_table_sql<T: Entity>(outline: &Outline<T>) -> String {
    format!("DROP TABLE IF EXISTS {}", outline.table_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseConvention;

    crate::entity! {
        #[derive(Debug, Default)]
        struct LabRecord: LabRecordFields {
            #[read_only]
            id: i64,
            sample_name: String,
            mass: Option<f64>,
            #[read_only]
            taken_at: chrono::NaiveDateTime,
        }
    }

    #[test]
    fn sqlite_ddl() {
        let outline = Outline::<LabRecord>::build(CaseConvention::Snake).unwrap();
        assert_eq!(
            create_table_sql(&outline, Dialect::Sqlite, "id").unwrap(),
            "CREATE TABLE IF NOT EXISTS lab_records (id INTEGER PRIMARY KEY, sample_name TEXT NOT NULL, mass REAL, taken_at TEXT)"
        );
        assert_eq!(drop_table_sql(&outline), "DROP TABLE IF EXISTS lab_records");
    }

    #[test]
    fn postgres_ddl_in_camel_case() {
        let outline = Outline::<LabRecord>::build(CaseConvention::Camel).unwrap();
        assert_eq!(
            create_table_sql(&outline, Dialect::Postgres, "getId").unwrap(),
            "CREATE TABLE IF NOT EXISTS LabRecords (id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, \
             sampleName TEXT NOT NULL, mass DOUBLE PRECISION, takenAt TIMESTAMP)"
        );
    }

    #[test]
    fn unknown_key_is_reported() {
        let outline = Outline::<LabRecord>::build(CaseConvention::Snake).unwrap();
        let err = create_table_sql(&outline, Dialect::Sqlite, "nope").unwrap_err();
        assert!(matches!(err, ReflectionError::PropertyNotFound { .. }));
    }
}
