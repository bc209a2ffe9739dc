//! Actor identity extraction.
//!
//! Authentication is a collaborator outside this crate; whatever sits in
//! front of the router is expected to have verified the caller and stamped
//! these headers. Absent headers degrade to the `ADMIN`/`admin` audit
//! defaults inside [`ActorContext`].

use axum::http::HeaderMap;
use fieldops_core::activity::ActorContext;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned)
}

pub fn actor_from_headers(headers: &HeaderMap) -> ActorContext {
  ActorContext {
    actor_id:   header_str(headers, ACTOR_ID_HEADER).unwrap_or_default(),
    actor_role: header_str(headers, ACTOR_ROLE_HEADER).unwrap_or_default(),
    actor_name: header_str(headers, ACTOR_NAME_HEADER),
  }
}
