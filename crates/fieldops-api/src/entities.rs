//! Handlers for `/entities` lifecycle endpoints: archive, restore, hard
//! delete. All three are catalog-gated; asking for an operation a kind does
//! not support is a 400, not a silent no-op.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
};
use fieldops_core::{
  catalog::{self, EntityKind},
  identity,
  store::PortalStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{actor::actor_from_headers, error::ApiError};

/// `GET /entities/resolve/:id` — classify a free-form identifier against the
/// catalog's ID grammar. Never errors; unmatched input reports as invalid
/// with the `unknown` type.
pub async fn resolve(Path(id): Path<String>) -> Json<serde_json::Value> {
  let Some(canonical) = identity::normalize(&id) else {
    return Json(json!({
      "valid":  false,
      "type":   EntityKind::Unknown,
      "reason": "empty identifier",
    }));
  };

  let def = catalog::match_by_id_pattern(canonical.as_str());
  if def.kind == EntityKind::Unknown {
    Json(json!({
      "valid":  false,
      "type":   def.kind,
      "reason": "identifier matches no known entity pattern",
    }))
  } else {
    Json(json!({ "valid": true, "type": def.kind, "id": canonical }))
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct LifecycleBody {
  pub reason: Option<String>,
}

/// `POST /entities/:type/:id/archive` — body: `{"reason": "..."}` (optional)
pub async fn archive<S>(
  State(store): State<Arc<S>>,
  Path((entity_type, id)): Path<(String, String)>,
  headers: HeaderMap,
  body: Option<Json<LifecycleBody>>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
{
  let kind = EntityKind::parse(&entity_type)?;
  let actor = actor_from_headers(&headers);
  let reason = body.and_then(|Json(b)| b.reason);
  store.archive_entity(kind, &id, reason, actor).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /entities/:type/:id/restore`
pub async fn restore<S>(
  State(store): State<Arc<S>>,
  Path((entity_type, id)): Path<(String, String)>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
{
  let kind = EntityKind::parse(&entity_type)?;
  let actor = actor_from_headers(&headers);
  store.restore_entity(kind, &id, actor).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /entities/:type/:id` — body: `{"reason": "..."}` (optional)
///
/// Refused with 409 unless the entity is archived and has no live children.
pub async fn hard_delete<S>(
  State(store): State<Arc<S>>,
  Path((entity_type, id)): Path<(String, String)>,
  headers: HeaderMap,
  body: Option<Json<LifecycleBody>>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
{
  let kind = EntityKind::parse(&entity_type)?;
  let actor = actor_from_headers(&headers);
  let reason = body.and_then(|Json(b)| b.reason);
  store.hard_delete_entity(kind, &id, reason, actor).await?;
  Ok(StatusCode::NO_CONTENT)
}
