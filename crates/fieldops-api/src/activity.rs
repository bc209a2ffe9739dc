//! Handlers for activity timeline, tombstone, and dismissal endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activity/entity/:type/:id` | Oldest first; optional `?limit=` |
//! | `GET`  | `/deleted/:type/:id/snapshot` | Tombstone view |
//! | `POST` | `/activity/:id/dismiss` | Per-actor hide flag |
//! | `POST` | `/activity/dismiss-all` | Bulk hide for the actor |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use fieldops_core::{
  activity::{ActivityRecord, DeletionSnapshot},
  catalog::EntityKind,
  store::PortalStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{actor::actor_from_headers, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

/// `GET /activity/entity/:type/:id[?limit=n]`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path((entity_type, id)): Path<(String, String)>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError>
where
  S: PortalStore,
{
  let kind = EntityKind::parse(&entity_type)?;
  let events = store.entity_history(kind, &id, params.limit).await?;
  Ok(Json(events))
}

/// `GET /deleted/:type/:id/snapshot` — last known state before hard deletion.
pub async fn deletion_snapshot<S>(
  State(store): State<Arc<S>>,
  Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<DeletionSnapshot>, ApiError>
where
  S: PortalStore,
{
  let kind = EntityKind::parse(&entity_type)?;
  let snapshot = store.last_deletion_snapshot(kind, &id).await?;
  Ok(Json(snapshot))
}

/// `POST /activity/:id/dismiss` — idempotent; `dismissed` is `false` when the
/// flag already existed or the activity does not exist.
pub async fn dismiss<S>(
  State(store): State<Arc<S>>,
  Path(activity_id): Path<i64>,
  headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let dismissed = store.dismiss_activity(activity_id, &actor.audit_id()).await?;
  Ok(Json(json!({ "dismissed": dismissed })))
}

/// `POST /activity/dismiss-all`
pub async fn dismiss_all<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let dismissed = store.dismiss_all(&actor.audit_id()).await?;
  Ok(Json(json!({ "dismissed": dismissed })))
}
