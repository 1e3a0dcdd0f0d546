//! Database client: sqlx pools behind a dialect-aware handle.

mod bind;
mod database;
mod decode;
mod stream;

pub use database::{ensure_database_exists, Database, MigrationTarget, Pool};
pub use stream::{RowStream, UpdateHandle};
