//! JSON REST API for the Fieldops portal core.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fieldops_core::store::PortalStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; actor identity arrives via `x-actor-*`
//! headers stamped by whatever sits in front of the router.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fieldops_api::api_router(store.clone()))
//! ```

pub mod activity;
pub mod actor;
pub mod assignments;
pub mod directory;
pub mod entities;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fieldops_core::store::PortalStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PortalStore + 'static,
{
  Router::new()
    // Assignments
    .route("/assignments/{resource}/unassigned", get(assignments::unassigned::<S>))
    .route(
      "/assignments/contractors/{id}/manager",
      post(assignments::assign_contractor::<S>).delete(assignments::unassign_contractor::<S>),
    )
    .route(
      "/assignments/customers/{id}/contractor",
      post(assignments::assign_customer::<S>).delete(assignments::unassign_customer::<S>),
    )
    .route(
      "/assignments/centers/{id}/customer",
      post(assignments::assign_center::<S>).delete(assignments::unassign_center::<S>),
    )
    .route(
      "/assignments/crew/{id}/center",
      post(assignments::assign_crew::<S>).delete(assignments::unassign_crew::<S>),
    )
    // Directory (provisioning)
    .route("/directory/managers", post(directory::create_manager::<S>))
    .route("/directory/contractors", post(directory::create_contractor::<S>))
    .route("/directory/customers", post(directory::create_customer::<S>))
    .route("/directory/centers", post(directory::create_center::<S>))
    .route("/directory/crew", post(directory::create_crew_member::<S>))
    // Entity lifecycle
    .route("/entities/resolve/{id}", get(entities::resolve))
    .route("/entities/{type}/{id}/archive", post(entities::archive::<S>))
    .route("/entities/{type}/{id}/restore", post(entities::restore::<S>))
    .route("/entities/{type}/{id}", axum::routing::delete(entities::hard_delete::<S>))
    // Activity
    .route("/activity/entity/{type}/{id}", get(activity::history::<S>))
    .route("/deleted/{type}/{id}/snapshot", get(activity::deletion_snapshot::<S>))
    .route("/activity/dismiss-all", post(activity::dismiss_all::<S>))
    .route("/activity/{id}/dismiss", post(activity::dismiss::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
