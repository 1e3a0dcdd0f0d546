//! Entity CRUD handlers: list, read, create, delete.

use super::response::{success_many, success_one, success_one_ok};
use super::state::{AppState, EntityState};
use crate::error::Error;
use crate::reflect::Entity;
use crate::sql::{eq, Condition, Execute, Fetch};
use crate::value::{coerce, Value};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

fn parse_count(name: &str, v: &str) -> Result<u64, Error> {
    v.trim()
        .parse()
        .map_err(|_| Error::BadRequest(format!("{} must be a non-negative integer", name)))
}

fn not_found<T: Entity>(state: &EntityState<T>, id: &str) -> Error {
    Error::NotFound(format!("{} {}", state.outline.name(), id))
}

/// `?limit=&offset=` plus exact-match filters on known property keys; other parameters are ignored.
pub(crate) async fn list<T: Entity>(
    State(state): State<EntityState<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let mut limit: Option<u64> = None;
    let mut offset: Option<u64> = None;
    let mut filter: Option<Condition> = None;

    for (k, v) in &params {
        match k.as_str() {
            "limit" => limit = Some(parse_count("limit", v)?),
            "offset" => offset = Some(parse_count("offset", v)?),
            _ => {
                if let Some(property) = state.outline.property_by_key(k) {
                    let value: Value = coerce(property.kind(), &Value::from(v.as_str()))?.into();
                    let c = eq(property.member(), value);
                    filter = Some(match filter {
                        Some(f) => f.and(c),
                        None => c,
                    });
                }
            }
        }
    }

    let from = state.db.sql().select_all().from(&*state.outline);
    let ordered = match filter {
        Some(c) => from.where_(c),
        None => from.all(),
    }
    .order_by(state.key.clone())
    .asc();
    let query = match (limit, offset) {
        (Some(n), Some(o)) => ordered.limit_offset(o, n),
        (Some(n), None) => ordered.limit(n),
        (None, Some(o)) => ordered.limit_offset(o, i64::MAX as u64),
        (None, None) => ordered.all(),
    };
    let rows = query.get_as(&*state.outline).await?;
    let data: Vec<serde_json::Value> = rows.iter().map(|e| state.outline.to_json(e)).collect();
    Ok(success_many(data))
}

pub(crate) async fn read<T: Entity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let key = state.parse_key(&id)?;
    let entity = state.find(key).await?.ok_or_else(|| not_found(&state, &id))?;
    Ok(success_one_ok(state.outline.to_json(&entity)))
}

/// Body is a JSON object keyed by property; read-only keys are ignored, unknown keys rejected.
pub(crate) async fn create<T: Entity>(
    State(state): State<EntityState<T>>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, Error> {
    let object = body
        .as_object()
        .ok_or_else(|| Error::BadRequest("body must be a JSON object".into()))?;
    let entity = state.outline.from_json(object)?;
    let ids = state
        .db
        .sql()
        .insert_into(&*state.outline)
        .entity(&*state.outline, &entity)
        .get_ids_of(state.key.name())
        .await?;
    let id = ids
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("{} was not inserted", state.outline.name())))?;
    let label = id.as_string().unwrap_or_default();
    let created = state.find(id).await?.ok_or_else(|| not_found(&state, &label))?;
    Ok(success_one(state.outline.to_json(&created)))
}

pub(crate) async fn delete<T: Entity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let key = state.parse_key(&id)?;
    let removed = state
        .db
        .sql()
        .delete_from(&*state.outline)
        .where_(eq(state.key.clone(), key))
        .count()
        .await?;
    if removed == 0 {
        return Err(not_found(&state, &id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
pub(crate) struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

pub(crate) async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

pub(crate) async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if state.db.ping().await.is_err() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

pub(crate) async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
