//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings. Identifiers are canonical uppercase text;
//! decoding re-normalises them so a hand-edited database cannot smuggle a
//! malformed id past the type boundary. Activity metadata is compact JSON.

use chrono::{DateTime, Utc};
use fieldops_core::{
  Error, Result,
  activity::ActivityRecord,
  hierarchy::{Center, Contractor, CrewMember, Customer, Manager, NodeStatus, UnassignedEntry},
  identity::{self, CanonicalId},
};
use rusqlite::Row;

// ─── Scalar codecs ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::storage(DecodeError(format!("bad timestamp {s:?}: {e}"))))
}

pub fn decode_id(s: &str) -> Result<CanonicalId> {
  identity::normalize(s)
    .ok_or_else(|| Error::storage(DecodeError(format!("empty identifier in column: {s:?}"))))
}

pub fn decode_opt_id(s: Option<String>) -> Result<Option<CanonicalId>> {
  s.as_deref().map(decode_id).transpose()
}

pub fn encode_status(status: NodeStatus) -> &'static str {
  match status {
    NodeStatus::Active => "active",
    NodeStatus::Unassigned => "unassigned",
  }
}

pub fn decode_status(s: &str) -> Result<NodeStatus> {
  match s {
    "active" => Ok(NodeStatus::Active),
    "unassigned" => Ok(NodeStatus::Unassigned),
    other => Err(Error::storage(DecodeError(format!("unknown node status: {other:?}")))),
  }
}

pub fn decode_metadata(s: Option<String>) -> Result<Option<serde_json::Value>> {
  s.as_deref()
    .map(|raw| serde_json::from_str(raw).map_err(Error::Serialization))
    .transpose()
}

/// A column held a value the domain types cannot represent.
#[derive(Debug)]
pub struct DecodeError(String);

impl std::fmt::Display for DecodeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::error::Error for DecodeError {}

// ─── Row types ───────────────────────────────────────────────────────────────
// Raw strings read directly from table rows; converted to domain types on the
// async side of the connection boundary.

pub struct RawManager {
  pub manager_id:  String,
  pub name:        String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub territory:   Option<String>,
  pub status:      String,
  pub created_at:  String,
  pub archived_at: Option<String>,
}

pub const MANAGER_COLS: &str =
  "manager_id, name, email, phone, territory, status, created_at, archived_at";

impl RawManager {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      manager_id:  row.get(0)?,
      name:        row.get(1)?,
      email:       row.get(2)?,
      phone:       row.get(3)?,
      territory:   row.get(4)?,
      status:      row.get(5)?,
      created_at:  row.get(6)?,
      archived_at: row.get(7)?,
    })
  }

  pub fn into_manager(self) -> Result<Manager> {
    Ok(Manager {
      manager_id:  decode_id(&self.manager_id)?,
      name:        self.name,
      email:       self.email,
      phone:       self.phone,
      territory:   self.territory,
      status:      decode_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      archived_at: self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawContractor {
  pub contractor_id: String,
  pub name:          String,
  pub cks_manager:   Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        String,
  pub created_at:    String,
  pub archived_at:   Option<String>,
}

pub const CONTRACTOR_COLS: &str =
  "contractor_id, name, cks_manager, email, phone, status, created_at, archived_at";

impl RawContractor {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contractor_id: row.get(0)?,
      name:          row.get(1)?,
      cks_manager:   row.get(2)?,
      email:         row.get(3)?,
      phone:         row.get(4)?,
      status:        row.get(5)?,
      created_at:    row.get(6)?,
      archived_at:   row.get(7)?,
    })
  }

  pub fn into_contractor(self) -> Result<Contractor> {
    Ok(Contractor {
      contractor_id: decode_id(&self.contractor_id)?,
      name:          self.name,
      cks_manager:   decode_opt_id(self.cks_manager)?,
      email:         self.email,
      phone:         self.phone,
      status:        decode_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      archived_at:   self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawCustomer {
  pub customer_id:   String,
  pub name:          String,
  pub contractor_id: Option<String>,
  pub cks_manager:   Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        String,
  pub created_at:    String,
  pub archived_at:   Option<String>,
}

pub const CUSTOMER_COLS: &str =
  "customer_id, name, contractor_id, cks_manager, email, phone, status, created_at, archived_at";

impl RawCustomer {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:   row.get(0)?,
      name:          row.get(1)?,
      contractor_id: row.get(2)?,
      cks_manager:   row.get(3)?,
      email:         row.get(4)?,
      phone:         row.get(5)?,
      status:        row.get(6)?,
      created_at:    row.get(7)?,
      archived_at:   row.get(8)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      customer_id:   decode_id(&self.customer_id)?,
      name:          self.name,
      contractor_id: decode_opt_id(self.contractor_id)?,
      cks_manager:   decode_opt_id(self.cks_manager)?,
      email:         self.email,
      phone:         self.phone,
      status:        decode_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      archived_at:   self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawCenter {
  pub center_id:     String,
  pub name:          String,
  pub customer_id:   Option<String>,
  pub contractor_id: Option<String>,
  pub cks_manager:   Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub status:        String,
  pub created_at:    String,
  pub archived_at:   Option<String>,
}

pub const CENTER_COLS: &str = "center_id, name, customer_id, contractor_id, cks_manager, \
                               email, phone, status, created_at, archived_at";

impl RawCenter {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      center_id:     row.get(0)?,
      name:          row.get(1)?,
      customer_id:   row.get(2)?,
      contractor_id: row.get(3)?,
      cks_manager:   row.get(4)?,
      email:         row.get(5)?,
      phone:         row.get(6)?,
      status:        row.get(7)?,
      created_at:    row.get(8)?,
      archived_at:   row.get(9)?,
    })
  }

  pub fn into_center(self) -> Result<Center> {
    Ok(Center {
      center_id:     decode_id(&self.center_id)?,
      name:          self.name,
      customer_id:   decode_opt_id(self.customer_id)?,
      contractor_id: decode_opt_id(self.contractor_id)?,
      cks_manager:   decode_opt_id(self.cks_manager)?,
      email:         self.email,
      phone:         self.phone,
      status:        decode_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      archived_at:   self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub struct RawCrewMember {
  pub crew_id:         String,
  pub name:            String,
  pub role:            Option<String>,
  pub assigned_center: Option<String>,
  pub cks_manager:     Option<String>,
  pub email:           Option<String>,
  pub phone:           Option<String>,
  pub status:          String,
  pub created_at:      String,
  pub archived_at:     Option<String>,
}

pub const CREW_COLS: &str = "crew_id, name, role, assigned_center, cks_manager, \
                             email, phone, status, created_at, archived_at";

impl RawCrewMember {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      crew_id:         row.get(0)?,
      name:            row.get(1)?,
      role:            row.get(2)?,
      assigned_center: row.get(3)?,
      cks_manager:     row.get(4)?,
      email:           row.get(5)?,
      phone:           row.get(6)?,
      status:          row.get(7)?,
      created_at:      row.get(8)?,
      archived_at:     row.get(9)?,
    })
  }

  pub fn into_crew_member(self) -> Result<CrewMember> {
    Ok(CrewMember {
      crew_id:         decode_id(&self.crew_id)?,
      name:            self.name,
      role:            self.role,
      assigned_center: decode_opt_id(self.assigned_center)?,
      cks_manager:     decode_opt_id(self.cks_manager)?,
      email:           self.email,
      phone:           self.phone,
      status:          decode_status(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
      archived_at:     self.archived_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// A directory-listing row: id, name, contact columns, optional crew role.
pub struct RawUnassigned {
  pub id:    String,
  pub name:  String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub role:  Option<String>,
}

impl RawUnassigned {
  pub fn into_entry(self) -> Result<UnassignedEntry> {
    Ok(UnassignedEntry {
      id:    decode_id(&self.id)?,
      name:  self.name,
      email: self.email,
      phone: self.phone,
      role:  self.role,
    })
  }
}

pub struct RawActivity {
  pub activity_id:   i64,
  pub activity_type: String,
  pub actor_id:      String,
  pub actor_role:    String,
  pub target_id:     Option<String>,
  pub target_type:   Option<String>,
  pub description:   String,
  pub metadata:      Option<String>,
  pub created_at:    String,
}

pub const ACTIVITY_COLS: &str = "activity_id, activity_type, actor_id, actor_role, \
                                 target_id, target_type, description, metadata, created_at";

impl RawActivity {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      activity_id:   row.get(0)?,
      activity_type: row.get(1)?,
      actor_id:      row.get(2)?,
      actor_role:    row.get(3)?,
      target_id:     row.get(4)?,
      target_type:   row.get(5)?,
      description:   row.get(6)?,
      metadata:      row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<ActivityRecord> {
    Ok(ActivityRecord {
      activity_id:   self.activity_id,
      activity_type: self.activity_type,
      actor_id:      self.actor_id,
      actor_role:    self.actor_role,
      target_id:     self.target_id,
      target_type:   self.target_type,
      description:   self.description,
      metadata:      decode_metadata(self.metadata)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
