//! Handlers for `/assignments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assignments/:resource/unassigned` | resource ∈ contractors, customers, centers, crew |
//! | `POST`   | `/assignments/contractors/:id/manager` | Body: `{"managerId":"MGR-005"}` |
//! | `DELETE` | `/assignments/contractors/:id/manager` | Unassign |
//!
//! The customer/center/crew pairs follow the same POST/DELETE shape.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use fieldops_core::{
  hierarchy::{AssignmentResult, UnassignedEntry},
  store::PortalStore,
};
use serde::Deserialize;

use crate::{actor::actor_from_headers, error::ApiError};

// ─── Unassigned listings ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /assignments/:resource/unassigned[?limit=n]`
pub async fn unassigned<S>(
  State(store): State<Arc<S>>,
  Path(resource): Path<String>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<UnassignedEntry>>, ApiError>
where
  S: PortalStore,
{
  let entries = match resource.as_str() {
    "contractors" => store.unassigned_contractors(params.limit).await?,
    "customers" => store.unassigned_customers(params.limit).await?,
    "centers" => store.unassigned_centers(params.limit).await?,
    "crew" => store.unassigned_crew(params.limit).await?,
    other => {
      return Err(ApiError::NotFound(format!("unsupported assignment resource: {other}")));
    }
  };
  Ok(Json(entries))
}

// ─── Contractor ↔ manager ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAssignment {
  pub manager_id: String,
}

/// `POST /assignments/contractors/:id/manager`
pub async fn assign_contractor<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<ManagerAssignment>,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store
    .assign_contractor_to_manager(&id, &body.manager_id, actor)
    .await?;
  Ok(Json(result))
}

/// `DELETE /assignments/contractors/:id/manager`
pub async fn unassign_contractor<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store.unassign_contractor_from_manager(&id, actor).await?;
  Ok(Json(result))
}

// ─── Customer ↔ contractor ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorAssignment {
  pub contractor_id: String,
}

/// `POST /assignments/customers/:id/contractor`
pub async fn assign_customer<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<ContractorAssignment>,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store
    .assign_customer_to_contractor(&id, &body.contractor_id, actor)
    .await?;
  Ok(Json(result))
}

/// `DELETE /assignments/customers/:id/contractor`
pub async fn unassign_customer<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store.unassign_customer_from_contractor(&id, actor).await?;
  Ok(Json(result))
}

// ─── Center ↔ customer ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAssignment {
  pub customer_id: String,
}

/// `POST /assignments/centers/:id/customer`
pub async fn assign_center<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<CustomerAssignment>,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store
    .assign_center_to_customer(&id, &body.customer_id, actor)
    .await?;
  Ok(Json(result))
}

/// `DELETE /assignments/centers/:id/customer`
pub async fn unassign_center<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store.unassign_center_from_customer(&id, actor).await?;
  Ok(Json(result))
}

// ─── Crew ↔ center ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterAssignment {
  pub center_id: String,
}

/// `POST /assignments/crew/:id/center`
pub async fn assign_crew<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Json(body): Json<CenterAssignment>,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store.assign_crew_to_center(&id, &body.center_id, actor).await?;
  Ok(Json(result))
}

/// `DELETE /assignments/crew/:id/center`
pub async fn unassign_crew<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<AssignmentResult>, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let result = store.unassign_crew_from_center(&id, actor).await?;
  Ok(Json(result))
}
