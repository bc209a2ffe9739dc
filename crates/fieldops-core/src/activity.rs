//! Activity log types — the append-only audit store.
//!
//! Records are created exactly once per mutating operation, read many times,
//! and never updated or deleted. Hard-deletion events double as tombstones:
//! their metadata carries the only surviving copy of the deleted row.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::EntityKind;
use crate::identity::{self, CanonicalId};

// ─── Actor ───────────────────────────────────────────────────────────────────

/// Authenticated actor identity supplied by the inbound collaborator.
#[derive(Debug, Clone)]
pub struct ActorContext {
  pub actor_id:   String,
  pub actor_role: String,
  pub actor_name: Option<String>,
}

impl ActorContext {
  /// The id written to audit rows: normalised, falling back to `ADMIN` when
  /// the supplied value does not normalise.
  pub fn audit_id(&self) -> String {
    identity::normalize(&self.actor_id)
      .map(CanonicalId::into_string)
      .unwrap_or_else(|| "ADMIN".to_string())
  }

  /// The role written to audit rows; empty roles fall back to `admin`.
  pub fn audit_role(&self) -> String {
    if self.actor_role.trim().is_empty() {
      "admin".to_string()
    } else {
      self.actor_role.clone()
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One append-only audit row. `activity_id` is monotonic within a store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
  pub activity_id:   i64,
  pub activity_type: String,
  pub actor_id:      String,
  pub actor_role:    String,
  pub target_id:     Option<String>,
  pub target_type:   Option<String>,
  pub description:   String,
  pub metadata:      Option<serde_json::Value>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::PortalStore::record_activity`]. `activity_id` and
/// `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewActivity {
  pub activity_type: String,
  pub description:   String,
  pub actor:         ActorContext,
  pub target_id:     Option<CanonicalId>,
  pub target_type:   Option<EntityKind>,
  pub metadata:      Option<serde_json::Value>,
}

// ─── Tombstones ──────────────────────────────────────────────────────────────

/// The last-known state of a hard-deleted entity, recovered from the most
/// recent deletion event's metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSnapshot {
  pub snapshot:   serde_json::Value,
  pub deleted_at: DateTime<Utc>,
  pub deleted_by: String,
  pub reason:     Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn audit_id_normalises_and_defaults() {
    let actor = ActorContext {
      actor_id:   "mgr-7".into(),
      actor_role: "manager".into(),
      actor_name: None,
    };
    assert_eq!(actor.audit_id(), "MGR-007");

    let blank = ActorContext {
      actor_id:   "   ".into(),
      actor_role: String::new(),
      actor_name: None,
    };
    assert_eq!(blank.audit_id(), "ADMIN");
    assert_eq!(blank.audit_role(), "admin");
  }
}
