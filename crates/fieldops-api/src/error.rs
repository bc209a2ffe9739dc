//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Business errors from the core taxonomy map to 4xx; storage failures map
//! to 500. The split is the contract: a 4xx generally indicates a client-side
//! bug, a 5xx a backend incident.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<fieldops_core::Error> for ApiError {
  fn from(err: fieldops_core::Error) -> Self {
    use fieldops_core::Error as E;
    match err {
      E::InvalidIdentifier(_)
      | E::UnknownEntityType(_)
      | E::UnsupportedEntity { .. }
      | E::UnsupportedPhase { .. } => Self::BadRequest(err.to_string()),

      E::NotFound { .. } | E::NoDeletionRecord { .. } | E::SnapshotUnavailable { .. } => {
        Self::NotFound(err.to_string())
      }

      E::NotArchived { .. } | E::HasActiveChildren { .. } => Self::Conflict(err.to_string()),

      E::Serialization(_) | E::Storage(_) => Self::Internal(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
