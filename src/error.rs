//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// An entity type could not be introspected, or a captured member has no matching property.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectionError {
    #[error("{entity} has no property '{name}'")]
    PropertyNotFound { entity: &'static str, name: String },
    #[error("{entity}.{name} is read-only")]
    ReadOnly { entity: &'static str, name: String },
    #[error("{entity} declares property key '{key}' twice")]
    DuplicateProperty { entity: &'static str, key: String },
    #[error("{entity} declares no properties")]
    NoProperties { entity: &'static str },
}

/// A [`Value`](crate::value::Value) cannot be coerced to the requested type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert {found} to {target}")]
    Unsupported { target: &'static str, found: &'static str },
    #[error("malformed {target}: '{text}'")]
    Malformed { target: &'static str, text: String },
    #[error("{value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },
    #[error("expected {expected} value, found {found}")]
    Mismatch { expected: &'static str, found: &'static str },
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("statement is not bound to a database")]
    Unbound,
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
    /// The statement has no columns to write, so it is never sent.
    #[error("nothing to write: {0}")]
    EmptyStatement(String),
    #[error("upsert into {0} needs at least one conflict key")]
    MissingConflictTarget(String),
    #[error("column '{column}' has unsupported type {type_name}")]
    UnsupportedColumn { column: String, type_name: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reflection(#[from] ReflectionError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error("config: {0}")]
    Config(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Database(DatabaseError::Sqlx(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Error::Reflection(ReflectionError::PropertyNotFound { .. }) => {
                (StatusCode::BAD_REQUEST, "unknown_property")
            }
            Error::Reflection(ReflectionError::ReadOnly { .. }) => (StatusCode::BAD_REQUEST, "read_only"),
            Error::Reflection(_) => (StatusCode::INTERNAL_SERVER_ERROR, "reflection_error"),
            Error::Conversion(_) => (StatusCode::UNPROCESSABLE_ENTITY, "conversion_error"),
            Error::Database(DatabaseError::Sqlx(sqlx::Error::RowNotFound)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            Error::Database(DatabaseError::EmptyStatement(_)) => (StatusCode::BAD_REQUEST, "empty_statement"),
            Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
