//! Hierarchy node types — the five-level ownership chain
//! Manager → Contractor → Customer → Center → Crew.
//!
//! Each non-manager node carries an upward structural-parent reference
//! (`contractor_id`, `customer_id`, `assigned_center`) and a denormalised
//! `cks_manager` scoping field. The scoping invariant: after any committed
//! assignment, a node's `cks_manager` equals its structural parent's. The
//! denormalisation trades write-time cascades for join-free reads; it is
//! maintained by the assignment engine, not a database constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::CanonicalId;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Assignment status of a hierarchy node. Archival is tracked separately via
/// `archived_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
  Active,
  Unassigned,
}

// ─── Node rows ───────────────────────────────────────────────────────────────

/// Root of the hierarchy; has no structural parent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manager {
  pub manager_id:  CanonicalId,
  pub name:        String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub territory:   Option<String>,
  pub status:      NodeStatus,
  pub created_at:  DateTime<Utc>,
  pub archived_at: Option<DateTime<Utc>>,
}

/// For a contractor the structural parent and the scoping field are the same
/// column: `cks_manager`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
  pub contractor_id: CanonicalId,
  pub name:          String,
  pub cks_manager:   Option<CanonicalId>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        NodeStatus,
  pub created_at:    DateTime<Utc>,
  pub archived_at:   Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub customer_id:   CanonicalId,
  pub name:          String,
  /// Structural parent.
  pub contractor_id: Option<CanonicalId>,
  /// Denormalised manager scope.
  pub cks_manager:   Option<CanonicalId>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        NodeStatus,
  pub created_at:    DateTime<Utc>,
  pub archived_at:   Option<DateTime<Utc>>,
}

/// Centers additionally carry a denormalised `contractor_id`, copied from
/// their customer at assignment time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Center {
  pub center_id:     CanonicalId,
  pub name:          String,
  /// Structural parent.
  pub customer_id:   Option<CanonicalId>,
  pub contractor_id: Option<CanonicalId>,
  pub cks_manager:   Option<CanonicalId>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        NodeStatus,
  pub created_at:    DateTime<Utc>,
  pub archived_at:   Option<DateTime<Utc>>,
}

/// Leaf of the hierarchy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
  pub crew_id:         CanonicalId,
  pub name:            String,
  pub role:            Option<String>,
  /// Structural parent.
  pub assigned_center: Option<CanonicalId>,
  pub cks_manager:     Option<CanonicalId>,
  pub email:           Option<String>,
  pub phone:           Option<String>,
  pub status:          NodeStatus,
  pub created_at:      DateTime<Utc>,
  pub archived_at:     Option<DateTime<Utc>>,
}

// ─── Provisioning inputs ─────────────────────────────────────────────────────

/// Input to [`crate::store::PortalStore::create_manager`]. The identifier is
/// caller-supplied (provisioning owns ID generation); `created_at` is always
/// set by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManager {
  pub id:        String,
  pub name:      String,
  #[serde(default)]
  pub email:     Option<String>,
  #[serde(default)]
  pub phone:     Option<String>,
  #[serde(default)]
  pub territory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContractor {
  pub id:    String,
  pub name:  String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
  pub id:    String,
  pub name:  String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCenter {
  pub id:    String,
  pub name:  String,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCrewMember {
  pub id:    String,
  pub name:  String,
  #[serde(default)]
  pub role:  Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

// ─── Assignment results ──────────────────────────────────────────────────────

/// Outcome of an assignment or unassignment: what was (re)assigned and to
/// whom. For unassignment the `assigned_*` fields are `None`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
  pub id:            CanonicalId,
  pub name:          String,
  pub assigned_id:   Option<CanonicalId>,
  pub assigned_name: Option<String>,
}

/// One row of an unassigned-entities directory listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedEntry {
  pub id:    CanonicalId,
  pub name:  String,
  pub email: Option<String>,
  pub phone: Option<String>,
  /// Crew only.
  pub role:  Option<String>,
}
