//! Handlers for `/directory` provisioning endpoints.
//!
//! One POST per hierarchy kind. Identifiers are caller-supplied (ID
//! generation belongs to the admin tooling) and validated against the
//! catalog's grammar; new non-manager nodes start unassigned.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use fieldops_core::{
  hierarchy::{NewCenter, NewContractor, NewCrewMember, NewCustomer, NewManager},
  store::PortalStore,
};

use crate::{actor::actor_from_headers, error::ApiError};

/// `POST /directory/managers`
pub async fn create_manager<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<NewManager>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let manager = store.create_manager(body, actor).await?;
  Ok((StatusCode::CREATED, Json(manager)))
}

/// `POST /directory/contractors`
pub async fn create_contractor<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<NewContractor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let contractor = store.create_contractor(body, actor).await?;
  Ok((StatusCode::CREATED, Json(contractor)))
}

/// `POST /directory/customers`
pub async fn create_customer<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<NewCustomer>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let customer = store.create_customer(body, actor).await?;
  Ok((StatusCode::CREATED, Json(customer)))
}

/// `POST /directory/centers`
pub async fn create_center<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<NewCenter>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let center = store.create_center(body, actor).await?;
  Ok((StatusCode::CREATED, Json(center)))
}

/// `POST /directory/crew`
pub async fn create_crew_member<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Json(body): Json<NewCrewMember>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
{
  let actor = actor_from_headers(&headers);
  let member = store.create_crew_member(body, actor).await?;
  Ok((StatusCode::CREATED, Json(member)))
}
