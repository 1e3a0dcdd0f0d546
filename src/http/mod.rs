//! HTTP surface over outlines and the database client.

mod handlers;
pub mod response;
mod routes;
mod state;

pub use routes::{common_routes, common_routes_with_ready, entity_routes, entity_routes_with_key};
pub use state::AppState;
