//! Outline SDK: typed entity metadata, a staged SQL builder and a streaming database client.

pub mod case;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod migration;
pub mod reflect;
pub mod schema;
pub mod sql;
pub mod value;

pub use case::CaseConvention;
pub use config::DatabaseConfig;
pub use db::{ensure_database_exists, Database, MigrationTarget, RowStream, UpdateHandle};
pub use error::{ConversionError, DatabaseError, Error, ReflectionError};
pub use http::{common_routes, common_routes_with_ready, entity_routes, AppState};
pub use migration::{MigrationRunner, OutlineMigrator};
pub use reflect::{Bean, Entity, Field, FieldKind, Member, Outline, OutlineRegistry, Property};
pub use sql::{Build, Dialect, Execute, Fetch, Sql, Statement};
pub use value::{FieldValue, Row, Value};
