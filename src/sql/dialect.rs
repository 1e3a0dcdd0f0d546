//! Vendor differences the builder and client consult.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Infer from a connection URL scheme.
    pub fn from_url(url: &str) -> Option<Self> {
        let scheme = url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "sqlite" => Some(Dialect::Sqlite),
            _ => None,
        }
    }

    /// Upsert tail appended after `VALUES (...)`. `assignments` is the rendered `a = ?, b = NULL` list.
    /// MySQL infers the conflicting key itself and ignores `keys`. The others need at least one key;
    /// `InsertUpsert` rejects an empty list before this renders.
    pub fn upsert_clause(self, keys: &[String], assignments: &str) -> String {
        match self {
            Dialect::MySql => format!(" ON DUPLICATE KEY UPDATE {}", assignments),
            Dialect::Postgres | Dialect::Sqlite => {
                let target = if keys.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", keys.join(", "))
                };
                format!(" ON CONFLICT{} DO UPDATE SET {}", target, assignments)
            }
        }
    }

    /// Null-safe equality operator against a placeholder.
    pub fn null_safe_eq(self) -> &'static str {
        match self {
            Dialect::Postgres => "IS NOT DISTINCT FROM",
            Dialect::MySql => "<=>",
            Dialect::Sqlite => "IS",
        }
    }

    /// Rewrite `?` placeholders into the numbered form the driver expects.
    /// Question marks inside quoted literals and identifiers are kept.
    pub fn placeholders(self, sql: &str) -> String {
        if self != Dialect::Postgres {
            return sql.to_string();
        }
        let mut out = String::with_capacity(sql.len() + 8);
        let mut n = 0;
        let mut quote: Option<char> = None;
        for c in sql.chars() {
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                    out.push(c);
                }
                None => match c {
                    '\'' | '"' => {
                        quote = Some(c);
                        out.push(c);
                    }
                    '?' => {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    }
                    _ => out.push(c),
                },
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_url() {
        assert_eq!(Dialect::from_url("postgres://localhost/db"), Some(Dialect::Postgres));
        assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
        assert_eq!(Dialect::from_url("mysql://root@localhost/db"), Some(Dialect::MySql));
        assert_eq!(Dialect::from_url("redis://localhost"), None);
    }

    #[test]
    fn numbers_placeholders_for_postgres() {
        let sql = "SELECT a FROM t WHERE a = ? AND b = '?' AND c IN (?, ?)";
        assert_eq!(
            Dialect::Postgres.placeholders(sql),
            "SELECT a FROM t WHERE a = $1 AND b = '?' AND c IN ($2, $3)"
        );
        assert_eq!(Dialect::Sqlite.placeholders(sql), sql);
    }

    #[test]
    fn upsert_syntax_per_vendor() {
        let keys = vec!["id".to_string()];
        assert_eq!(
            Dialect::MySql.upsert_clause(&keys, "name = ?"),
            " ON DUPLICATE KEY UPDATE name = ?"
        );
        assert_eq!(
            Dialect::Postgres.upsert_clause(&keys, "name = ?"),
            " ON CONFLICT (id) DO UPDATE SET name = ?"
        );
    }
}
