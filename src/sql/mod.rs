//! Safe SQL builder: identifiers from outlines or caller code, values always as parameters.

mod column;
mod condition;
mod delete;
mod dialect;
mod insert;
mod row_builder;
mod select;
mod statement;
mod update;

pub use column::{Column, TableRef};
pub use condition::{eq, gt, ge, in_, is, is_not_null, le, like, lt, ne, Condition};
pub use delete::{Delete, DeleteLimit, DeleteWhere};
pub use dialect::Dialect;
pub use insert::{Insert, InsertUpsert, InsertValues};
pub use row_builder::RowBuilder;
pub use select::{Select, SelectFrom, SelectJoin, SelectLimit, SelectOrder, SelectWhere};
pub use statement::{Build, Execute, Fetch, Sql, Statement};
pub use update::{Update, UpdateLimit, UpdateSet, UpdateWhere};
