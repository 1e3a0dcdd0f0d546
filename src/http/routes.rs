//! Routers for entity CRUD and service health.

use super::handlers::{create, delete, health, list, read, ready, version};
use super::state::{AppState, EntityState};
use crate::error::Error;
use crate::reflect::{Entity, Outline};
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

/// CRUD routes for `T` keyed by its `id` property:
/// `GET|POST /{plural}` and `GET|DELETE /{plural}/:id`.
pub fn entity_routes<T: Entity>(state: AppState) -> Result<Router, Error> {
    entity_routes_with_key::<T>(state, "id")
}

pub fn entity_routes_with_key<T: Entity>(state: AppState, key: &str) -> Result<Router, Error> {
    let outline = Outline::<T>::of(state.case)?;
    let key = outline.property_named(key)?;
    let entity_state = EntityState {
        db: state.db.clone(),
        key: key.member().clone(),
        key_kind: key.kind(),
        outline: outline.clone(),
    };
    let collection = format!("/{}", outline.plural_name());
    let item = format!("{}/:id", collection);
    info!(entity = T::TYPE_NAME, path = %collection, "entity routes");
    Ok(Router::new()
        .route(&collection, get(list::<T>).post(create::<T>))
        .route(&item, get(read::<T>).delete(delete::<T>))
        .layer(RequestBodyLimitLayer::new(state.body_limit))
        .with_state(entity_state))
}

/// GET /health and GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
}

/// Common routes plus GET /ready, which pings the database.
pub fn common_routes_with_ready(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
