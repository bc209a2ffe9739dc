//! [`SqliteStore`] — the SQLite implementation of
//! [`PortalStore`](fieldops_core::store::PortalStore).
//!
//! Assignment operations run their parent update and scope cascade inside one
//! transaction; a failure anywhere rolls the whole thing back, so a partial
//! cascade is never visible. The audit append runs after commit and is
//! swallowed on failure — the business operation stays successful.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, types::ValueRef};
use serde_json::json;

use fieldops_core::{
  Error, Result,
  activity::{ActivityRecord, ActorContext, DeletionSnapshot, NewActivity},
  catalog::{self, EntityKind, LifecycleAction, LifecyclePhase},
  hierarchy::{
    AssignmentResult, Center, Contractor, CrewMember, Customer, Manager, NewCenter,
    NewContractor, NewCrewMember, NewCustomer, NewManager, NodeStatus, UnassignedEntry,
  },
  identity::{self, CanonicalId},
  store::PortalStore,
};

use crate::{
  cascade,
  encode::{
    ACTIVITY_COLS, CENTER_COLS, CONTRACTOR_COLS, CREW_COLS, CUSTOMER_COLS, MANAGER_COLS,
    RawActivity, RawCenter, RawContractor, RawCrewMember, RawCustomer, RawManager, RawUnassigned,
    encode_dt, encode_status,
  },
  schema::SCHEMA,
};

const DEFAULT_DIRECTORY_LIMIT: usize = 250;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fieldops portal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::storage)
  }

  // ── Live-row fetches ──────────────────────────────────────────────────────
  // The assignment paths only accept rows that are not soft-archived.

  async fn fetch_live_manager(&self, id: &CanonicalId) -> Result<Option<Manager>> {
    let id_str = id.as_str().to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {MANAGER_COLS} FROM managers
                 WHERE UPPER(manager_id) = ?1 AND archived_at IS NULL"
              ),
              params![id_str],
              RawManager::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawManager::into_manager).transpose()
  }

  async fn fetch_live_contractor(&self, id: &CanonicalId) -> Result<Option<Contractor>> {
    let id_str = id.as_str().to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CONTRACTOR_COLS} FROM contractors
                 WHERE UPPER(contractor_id) = ?1 AND archived_at IS NULL"
              ),
              params![id_str],
              RawContractor::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawContractor::into_contractor).transpose()
  }

  async fn fetch_live_customer(&self, id: &CanonicalId) -> Result<Option<Customer>> {
    let id_str = id.as_str().to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CUSTOMER_COLS} FROM customers
                 WHERE UPPER(customer_id) = ?1 AND archived_at IS NULL"
              ),
              params![id_str],
              RawCustomer::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn fetch_live_center(&self, id: &CanonicalId) -> Result<Option<Center>> {
    let id_str = id.as_str().to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CENTER_COLS} FROM centers
                 WHERE UPPER(center_id) = ?1 AND archived_at IS NULL"
              ),
              params![id_str],
              RawCenter::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCenter::into_center).transpose()
  }

  async fn fetch_live_crew_member(&self, id: &CanonicalId) -> Result<Option<CrewMember>> {
    let id_str = id.as_str().to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CREW_COLS} FROM crew
                 WHERE UPPER(crew_id) = ?1 AND archived_at IS NULL"
              ),
              params![id_str],
              RawCrewMember::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCrewMember::into_crew_member).transpose()
  }

  // ── Activity append ───────────────────────────────────────────────────────

  async fn insert_activity(&self, input: &NewActivity) -> Result<()> {
    let activity_type = input.activity_type.clone();
    let description   = input.description.clone();
    let actor_id      = input.actor.audit_id();
    let actor_role    = input.actor.audit_role();
    let target_id     = input.target_id.as_ref().map(|id| id.as_str().to_owned());
    let target_type   = input.target_type.map(|k| k.as_str().to_owned());
    let metadata      = input.metadata.as_ref().map(serde_json::Value::to_string);
    let created_at    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO system_activity (
             activity_type, description, actor_id, actor_role,
             target_id, target_type, metadata, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![
            activity_type,
            description,
            actor_id,
            actor_role,
            target_id,
            target_type,
            metadata,
            created_at,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)
  }
}

// ─── In-transaction helpers ──────────────────────────────────────────────────

/// Count live children directly below a hierarchy entity. Non-hierarchy kinds
/// have none.
fn active_children_count(conn: &Connection, kind: EntityKind, id: &str) -> rusqlite::Result<i64> {
  let sql = match kind {
    EntityKind::Manager => {
      "SELECT COUNT(*) FROM contractors WHERE cks_manager = ?1 AND archived_at IS NULL"
    }
    EntityKind::Contractor => {
      "SELECT COUNT(*) FROM customers WHERE contractor_id = ?1 AND archived_at IS NULL"
    }
    EntityKind::Customer => {
      "SELECT COUNT(*) FROM centers WHERE customer_id = ?1 AND archived_at IS NULL"
    }
    EntityKind::Center => {
      "SELECT COUNT(*) FROM crew WHERE assigned_center = ?1 AND archived_at IS NULL"
    }
    _ => return Ok(0),
  };
  conn.query_row(sql, params![id], |row| row.get(0))
}

/// Capture a full row as a JSON object, keyed by column name. This is the
/// payload tombstone retrieval hands back after the row itself is gone.
fn snapshot_row(
  conn: &Connection,
  table: &str,
  id_col: &str,
  id: &str,
) -> rusqlite::Result<Option<serde_json::Value>> {
  let mut stmt = conn.prepare(&format!("SELECT * FROM {table} WHERE UPPER({id_col}) = ?1"))?;
  let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

  let mut rows = stmt.query(params![id])?;
  let Some(row) = rows.next()? else {
    return Ok(None);
  };

  let mut object = serde_json::Map::new();
  for (i, name) in names.iter().enumerate() {
    let value = match row.get_ref(i)? {
      ValueRef::Null => serde_json::Value::Null,
      ValueRef::Integer(n) => serde_json::Value::from(n),
      ValueRef::Real(f) => serde_json::Value::from(f),
      ValueRef::Text(t) => serde_json::Value::from(String::from_utf8_lossy(t).into_owned()),
      // No table in this schema stores blobs.
      ValueRef::Blob(_) => serde_json::Value::Null,
    };
    object.insert(name.clone(), value);
  }
  Ok(Some(serde_json::Value::Object(object)))
}

enum DeleteOutcome {
  Deleted { snapshot: Option<serde_json::Value> },
  Missing,
  NotArchived,
  ActiveChildren(i64),
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  // ── Provisioning ──────────────────────────────────────────────────────────

  async fn create_manager(&self, input: NewManager, actor: ActorContext) -> Result<Manager> {
    let id = identity::normalize(&input.id).ok_or(Error::InvalidIdentifier("manager"))?;
    if !catalog::id_matches(EntityKind::Manager, id.as_str()) {
      return Err(Error::InvalidIdentifier("manager"));
    }

    let manager = Manager {
      manager_id:  id,
      name:        input.name,
      email:       input.email,
      phone:       input.phone,
      territory:   input.territory,
      status:      NodeStatus::Active,
      created_at:  Utc::now(),
      archived_at: None,
    };

    let id_str     = manager.manager_id.as_str().to_owned();
    let name       = manager.name.clone();
    let email      = manager.email.clone();
    let phone      = manager.phone.clone();
    let territory  = manager.territory.clone();
    let status     = encode_status(manager.status).to_owned();
    let created_at = encode_dt(manager.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO managers (manager_id, name, email, phone, territory, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![id_str, name, email, phone, territory, status, created_at],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    let event = catalog::activity_type_for(EntityKind::Manager, LifecyclePhase::Created)?;
    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Created manager {}", manager.manager_id),
        actor,
        target_id:     Some(manager.manager_id.clone()),
        target_type:   Some(EntityKind::Manager),
        metadata:      Some(json!({ "name": manager.name })),
      })
      .await;

    Ok(manager)
  }

  async fn create_contractor(
    &self,
    input: NewContractor,
    actor: ActorContext,
  ) -> Result<Contractor> {
    let id = identity::normalize(&input.id).ok_or(Error::InvalidIdentifier("contractor"))?;
    if !catalog::id_matches(EntityKind::Contractor, id.as_str()) {
      return Err(Error::InvalidIdentifier("contractor"));
    }

    let contractor = Contractor {
      contractor_id: id,
      name:          input.name,
      cks_manager:   None,
      email:         input.email,
      phone:         input.phone,
      status:        NodeStatus::Unassigned,
      created_at:    Utc::now(),
      archived_at:   None,
    };

    let id_str     = contractor.contractor_id.as_str().to_owned();
    let name       = contractor.name.clone();
    let email      = contractor.email.clone();
    let phone      = contractor.phone.clone();
    let status     = encode_status(contractor.status).to_owned();
    let created_at = encode_dt(contractor.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contractors (contractor_id, name, email, phone, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, name, email, phone, status, created_at],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    let event = catalog::activity_type_for(EntityKind::Contractor, LifecyclePhase::Created)?;
    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Created contractor {}", contractor.contractor_id),
        actor,
        target_id:     Some(contractor.contractor_id.clone()),
        target_type:   Some(EntityKind::Contractor),
        metadata:      Some(json!({ "name": contractor.name })),
      })
      .await;

    Ok(contractor)
  }

  async fn create_customer(&self, input: NewCustomer, actor: ActorContext) -> Result<Customer> {
    let id = identity::normalize(&input.id).ok_or(Error::InvalidIdentifier("customer"))?;
    if !catalog::id_matches(EntityKind::Customer, id.as_str()) {
      return Err(Error::InvalidIdentifier("customer"));
    }

    let customer = Customer {
      customer_id:   id,
      name:          input.name,
      contractor_id: None,
      cks_manager:   None,
      email:         input.email,
      phone:         input.phone,
      status:        NodeStatus::Unassigned,
      created_at:    Utc::now(),
      archived_at:   None,
    };

    let id_str     = customer.customer_id.as_str().to_owned();
    let name       = customer.name.clone();
    let email      = customer.email.clone();
    let phone      = customer.phone.clone();
    let status     = encode_status(customer.status).to_owned();
    let created_at = encode_dt(customer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (customer_id, name, email, phone, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, name, email, phone, status, created_at],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    let event = catalog::activity_type_for(EntityKind::Customer, LifecyclePhase::Created)?;
    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Created customer {}", customer.customer_id),
        actor,
        target_id:     Some(customer.customer_id.clone()),
        target_type:   Some(EntityKind::Customer),
        metadata:      Some(json!({ "name": customer.name })),
      })
      .await;

    Ok(customer)
  }

  async fn create_center(&self, input: NewCenter, actor: ActorContext) -> Result<Center> {
    let id = identity::normalize(&input.id).ok_or(Error::InvalidIdentifier("center"))?;
    if !catalog::id_matches(EntityKind::Center, id.as_str()) {
      return Err(Error::InvalidIdentifier("center"));
    }

    let center = Center {
      center_id:     id,
      name:          input.name,
      customer_id:   None,
      contractor_id: None,
      cks_manager:   None,
      email:         input.email,
      phone:         input.phone,
      status:        NodeStatus::Unassigned,
      created_at:    Utc::now(),
      archived_at:   None,
    };

    let id_str     = center.center_id.as_str().to_owned();
    let name       = center.name.clone();
    let email      = center.email.clone();
    let phone      = center.phone.clone();
    let status     = encode_status(center.status).to_owned();
    let created_at = encode_dt(center.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO centers (center_id, name, email, phone, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, name, email, phone, status, created_at],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    let event = catalog::activity_type_for(EntityKind::Center, LifecyclePhase::Created)?;
    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Created center {}", center.center_id),
        actor,
        target_id:     Some(center.center_id.clone()),
        target_type:   Some(EntityKind::Center),
        metadata:      Some(json!({ "name": center.name })),
      })
      .await;

    Ok(center)
  }

  async fn create_crew_member(
    &self,
    input: NewCrewMember,
    actor: ActorContext,
  ) -> Result<CrewMember> {
    let id = identity::normalize(&input.id).ok_or(Error::InvalidIdentifier("crew"))?;
    if !catalog::id_matches(EntityKind::Crew, id.as_str()) {
      return Err(Error::InvalidIdentifier("crew"));
    }

    let member = CrewMember {
      crew_id:         id,
      name:            input.name,
      role:            input.role,
      assigned_center: None,
      cks_manager:     None,
      email:           input.email,
      phone:           input.phone,
      status:          NodeStatus::Unassigned,
      created_at:      Utc::now(),
      archived_at:     None,
    };

    let id_str     = member.crew_id.as_str().to_owned();
    let name       = member.name.clone();
    let role       = member.role.clone();
    let email      = member.email.clone();
    let phone      = member.phone.clone();
    let status     = encode_status(member.status).to_owned();
    let created_at = encode_dt(member.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO crew (crew_id, name, role, email, phone, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![id_str, name, role, email, phone, status, created_at],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    let event = catalog::activity_type_for(EntityKind::Crew, LifecyclePhase::Created)?;
    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Created crew {}", member.crew_id),
        actor,
        target_id:     Some(member.crew_id.clone()),
        target_type:   Some(EntityKind::Crew),
        metadata:      Some(json!({ "name": member.name })),
      })
      .await;

    Ok(member)
  }

  // ── Node reads ────────────────────────────────────────────────────────────

  async fn get_manager(&self, id: &str) -> Result<Option<Manager>> {
    let Some(id) = identity::normalize(id) else {
      return Ok(None);
    };
    let id_str = id.into_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MANAGER_COLS} FROM managers WHERE UPPER(manager_id) = ?1"),
              params![id_str],
              RawManager::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawManager::into_manager).transpose()
  }

  async fn get_contractor(&self, id: &str) -> Result<Option<Contractor>> {
    let Some(id) = identity::normalize(id) else {
      return Ok(None);
    };
    let id_str = id.into_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CONTRACTOR_COLS} FROM contractors WHERE UPPER(contractor_id) = ?1"),
              params![id_str],
              RawContractor::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawContractor::into_contractor).transpose()
  }

  async fn get_customer(&self, id: &str) -> Result<Option<Customer>> {
    let Some(id) = identity::normalize(id) else {
      return Ok(None);
    };
    let id_str = id.into_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CUSTOMER_COLS} FROM customers WHERE UPPER(customer_id) = ?1"),
              params![id_str],
              RawCustomer::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn get_center(&self, id: &str) -> Result<Option<Center>> {
    let Some(id) = identity::normalize(id) else {
      return Ok(None);
    };
    let id_str = id.into_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CENTER_COLS} FROM centers WHERE UPPER(center_id) = ?1"),
              params![id_str],
              RawCenter::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCenter::into_center).transpose()
  }

  async fn get_crew_member(&self, id: &str) -> Result<Option<CrewMember>> {
    let Some(id) = identity::normalize(id) else {
      return Ok(None);
    };
    let id_str = id.into_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CREW_COLS} FROM crew WHERE UPPER(crew_id) = ?1"),
              params![id_str],
              RawCrewMember::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;
    raw.map(RawCrewMember::into_crew_member).transpose()
  }

  // ── Directory listings ────────────────────────────────────────────────────

  async fn unassigned_contractors(&self, limit: Option<usize>) -> Result<Vec<UnassignedEntry>> {
    let limit = limit.unwrap_or(DEFAULT_DIRECTORY_LIMIT) as i64;
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT contractor_id, name, email, phone FROM contractors
           WHERE (cks_manager IS NULL OR cks_manager = '')
             AND archived_at IS NULL
           ORDER BY contractor_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawUnassigned {
              id:    row.get(0)?,
              name:  row.get(1)?,
              email: row.get(2)?,
              phone: row.get(3)?,
              role:  None,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;
    raws.into_iter().map(RawUnassigned::into_entry).collect()
  }

  async fn unassigned_customers(&self, limit: Option<usize>) -> Result<Vec<UnassignedEntry>> {
    let limit = limit.unwrap_or(DEFAULT_DIRECTORY_LIMIT) as i64;
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT customer_id, name, email, phone FROM customers
           WHERE (contractor_id IS NULL OR contractor_id = '')
             AND archived_at IS NULL
           ORDER BY customer_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawUnassigned {
              id:    row.get(0)?,
              name:  row.get(1)?,
              email: row.get(2)?,
              phone: row.get(3)?,
              role:  None,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;
    raws.into_iter().map(RawUnassigned::into_entry).collect()
  }

  async fn unassigned_centers(&self, limit: Option<usize>) -> Result<Vec<UnassignedEntry>> {
    let limit = limit.unwrap_or(DEFAULT_DIRECTORY_LIMIT) as i64;
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT center_id, name, email, phone FROM centers
           WHERE (customer_id IS NULL OR customer_id = '')
             AND archived_at IS NULL
           ORDER BY center_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawUnassigned {
              id:    row.get(0)?,
              name:  row.get(1)?,
              email: row.get(2)?,
              phone: row.get(3)?,
              role:  None,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;
    raws.into_iter().map(RawUnassigned::into_entry).collect()
  }

  async fn unassigned_crew(&self, limit: Option<usize>) -> Result<Vec<UnassignedEntry>> {
    let limit = limit.unwrap_or(DEFAULT_DIRECTORY_LIMIT) as i64;
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT crew_id, name, role, email, phone FROM crew
           WHERE (assigned_center IS NULL OR assigned_center = '')
             AND archived_at IS NULL
           ORDER BY crew_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(params![limit], |row| {
            Ok(RawUnassigned {
              id:    row.get(0)?,
              name:  row.get(1)?,
              role:  row.get(2)?,
              email: row.get(3)?,
              phone: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;
    raws.into_iter().map(RawUnassigned::into_entry).collect()
  }

  // ── Assignment engine ─────────────────────────────────────────────────────

  async fn assign_contractor_to_manager(
    &self,
    contractor_id: &str,
    manager_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let contractor_id =
      identity::normalize(contractor_id).ok_or(Error::InvalidIdentifier("contractor"))?;
    let manager_id = identity::normalize(manager_id).ok_or(Error::InvalidIdentifier("manager"))?;

    let contractor = self
      .fetch_live_contractor(&contractor_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Contractor, contractor_id.as_str()))?;
    let manager = self
      .fetch_live_manager(&manager_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Manager, manager_id.as_str()))?;

    let child_str  = contractor.contractor_id.as_str().to_owned();
    let parent_str = manager.manager_id.as_str().to_owned();
    let now        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE contractors
           SET cks_manager = ?1, status = 'active', updated_at = ?3
           WHERE contractor_id = ?2",
          params![parent_str, child_str, now],
        )?;
        cascade::cascade_from_contractor(&tx, &child_str, Some(&parent_str), &now)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "contractor_assigned_to_manager".to_string(),
        description:   format!(
          "Assigned {} to manager {}",
          contractor.contractor_id, manager.manager_id
        ),
        actor,
        target_id:     Some(contractor.contractor_id.clone()),
        target_type:   Some(EntityKind::Contractor),
        metadata:      Some(json!({
          "contractorId":   contractor.contractor_id,
          "contractorName": contractor.name,
          "managerId":      manager.manager_id,
          "managerName":    manager.name,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            contractor.contractor_id,
      name:          contractor.name,
      assigned_id:   Some(manager.manager_id),
      assigned_name: Some(manager.name),
    })
  }

  async fn assign_customer_to_contractor(
    &self,
    customer_id: &str,
    contractor_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let customer_id =
      identity::normalize(customer_id).ok_or(Error::InvalidIdentifier("customer"))?;
    let contractor_id =
      identity::normalize(contractor_id).ok_or(Error::InvalidIdentifier("contractor"))?;

    let customer = self
      .fetch_live_customer(&customer_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Customer, customer_id.as_str()))?;
    let contractor = self
      .fetch_live_contractor(&contractor_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Contractor, contractor_id.as_str()))?;

    // The scope below a contractor is the contractor's own manager, which may
    // legitimately be absent; the cascade then propagates NULL.
    let scope      = contractor.cks_manager.clone();
    let child_str  = customer.customer_id.as_str().to_owned();
    let parent_str = contractor.contractor_id.as_str().to_owned();
    let scope_str  = scope.as_ref().map(|s| s.as_str().to_owned());
    let now        = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE customers
           SET contractor_id = ?1, cks_manager = ?2, status = 'active', updated_at = ?4
           WHERE customer_id = ?3",
          params![parent_str, scope_str, child_str, now],
        )?;
        cascade::cascade_from_customer(&tx, &child_str, scope_str.as_deref(), &now)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "customer_assigned_to_contractor".to_string(),
        description:   format!(
          "Assigned {} to contractor {}",
          customer.customer_id, contractor.contractor_id
        ),
        actor,
        target_id:     Some(customer.customer_id.clone()),
        target_type:   Some(EntityKind::Customer),
        metadata:      Some(json!({
          "customerId":     customer.customer_id,
          "customerName":   customer.name,
          "contractorId":   contractor.contractor_id,
          "contractorName": contractor.name,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            customer.customer_id,
      name:          customer.name,
      assigned_id:   Some(contractor.contractor_id),
      assigned_name: Some(contractor.name),
    })
  }

  async fn assign_center_to_customer(
    &self,
    center_id: &str,
    customer_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let center_id = identity::normalize(center_id).ok_or(Error::InvalidIdentifier("center"))?;
    let customer_id =
      identity::normalize(customer_id).ok_or(Error::InvalidIdentifier("customer"))?;

    let center = self
      .fetch_live_center(&center_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Center, center_id.as_str()))?;
    let customer = self
      .fetch_live_customer(&customer_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Customer, customer_id.as_str()))?;

    let scope          = customer.cks_manager.clone();
    let contractor_ref = customer.contractor_id.clone();
    let child_str      = center.center_id.as_str().to_owned();
    let parent_str     = customer.customer_id.as_str().to_owned();
    let scope_str      = scope.as_ref().map(|s| s.as_str().to_owned());
    let contractor_str = contractor_ref.as_ref().map(|s| s.as_str().to_owned());
    let now            = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // A customer with no contractor leaves the center's previous
        // contractor reference in place.
        tx.execute(
          "UPDATE centers
           SET customer_id = ?1,
               contractor_id = COALESCE(?2, contractor_id),
               cks_manager = ?3,
               status = 'active',
               updated_at = ?5
           WHERE center_id = ?4",
          params![parent_str, contractor_str, scope_str, child_str, now],
        )?;
        cascade::cascade_from_center(&tx, &child_str, scope_str.as_deref(), &now)?;
        tx.commit()?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "center_assigned_to_customer".to_string(),
        description:   format!(
          "Assigned {} to customer {}",
          center.center_id, customer.customer_id
        ),
        actor,
        target_id:     Some(center.center_id.clone()),
        target_type:   Some(EntityKind::Center),
        metadata:      Some(json!({
          "centerId":     center.center_id,
          "centerName":   center.name,
          "customerId":   customer.customer_id,
          "customerName": customer.name,
          "contractorId": contractor_ref,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            center.center_id,
      name:          center.name,
      assigned_id:   Some(customer.customer_id),
      assigned_name: Some(customer.name),
    })
  }

  async fn assign_crew_to_center(
    &self,
    crew_id: &str,
    center_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let crew_id = identity::normalize(crew_id).ok_or(Error::InvalidIdentifier("crew"))?;
    let center_id = identity::normalize(center_id).ok_or(Error::InvalidIdentifier("center"))?;

    let member = self
      .fetch_live_crew_member(&crew_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Crew, crew_id.as_str()))?;
    let center = self
      .fetch_live_center(&center_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Center, center_id.as_str()))?;

    let scope      = center.cks_manager.clone();
    let child_str  = member.crew_id.as_str().to_owned();
    let parent_str = center.center_id.as_str().to_owned();
    let scope_str  = scope.as_ref().map(|s| s.as_str().to_owned());
    let now        = encode_dt(Utc::now());

    // Crew are leaves: there is nothing below to cascade to.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE crew
           SET assigned_center = ?1, cks_manager = ?2, status = 'active', updated_at = ?4
           WHERE crew_id = ?3",
          params![parent_str, scope_str, child_str, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "crew_assigned_to_center".to_string(),
        description:   format!("Assigned {} to center {}", member.crew_id, center.center_id),
        actor,
        target_id:     Some(member.crew_id.clone()),
        target_type:   Some(EntityKind::Crew),
        metadata:      Some(json!({
          "crewId":     member.crew_id,
          "crewName":   member.name,
          "centerId":   center.center_id,
          "centerName": center.name,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            member.crew_id,
      name:          member.name,
      assigned_id:   Some(center.center_id),
      assigned_name: Some(center.name),
    })
  }

  async fn unassign_contractor_from_manager(
    &self,
    contractor_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let contractor_id =
      identity::normalize(contractor_id).ok_or(Error::InvalidIdentifier("contractor"))?;

    let contractor = self
      .fetch_live_contractor(&contractor_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Contractor, contractor_id.as_str()))?;

    let former    = contractor.cks_manager.clone();
    let child_str = contractor.contractor_id.as_str().to_owned();
    let now       = encode_dt(Utc::now());

    // No cascade: descendants keep their last-known manager scope so their
    // dashboards stay readable while the contractor is in limbo.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contractors
           SET cks_manager = NULL, status = 'unassigned', updated_at = ?2
           WHERE contractor_id = ?1",
          params![child_str, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "contractor_unassigned_from_manager".to_string(),
        description:   match &former {
          Some(m) => format!("Unassigned {} from manager {m}", contractor.contractor_id),
          None => format!("Unassigned {} from manager", contractor.contractor_id),
        },
        actor,
        target_id:     Some(contractor.contractor_id.clone()),
        target_type:   Some(EntityKind::Contractor),
        metadata:      Some(json!({
          "contractorId":   contractor.contractor_id,
          "contractorName": contractor.name,
          "managerId":      former,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            contractor.contractor_id,
      name:          contractor.name,
      assigned_id:   None,
      assigned_name: None,
    })
  }

  async fn unassign_customer_from_contractor(
    &self,
    customer_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let customer_id =
      identity::normalize(customer_id).ok_or(Error::InvalidIdentifier("customer"))?;

    let customer = self
      .fetch_live_customer(&customer_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Customer, customer_id.as_str()))?;

    let former    = customer.contractor_id.clone();
    let child_str = customer.customer_id.as_str().to_owned();
    let now       = encode_dt(Utc::now());

    // cks_manager survives as the stale scope; only the parent link clears.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE customers
           SET contractor_id = NULL, status = 'unassigned', updated_at = ?2
           WHERE customer_id = ?1",
          params![child_str, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "customer_unassigned_from_contractor".to_string(),
        description:   match &former {
          Some(c) => format!("Unassigned {} from contractor {c}", customer.customer_id),
          None => format!("Unassigned {} from contractor", customer.customer_id),
        },
        actor,
        target_id:     Some(customer.customer_id.clone()),
        target_type:   Some(EntityKind::Customer),
        metadata:      Some(json!({
          "customerId":   customer.customer_id,
          "customerName": customer.name,
          "contractorId": former,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            customer.customer_id,
      name:          customer.name,
      assigned_id:   None,
      assigned_name: None,
    })
  }

  async fn unassign_center_from_customer(
    &self,
    center_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let center_id = identity::normalize(center_id).ok_or(Error::InvalidIdentifier("center"))?;

    let center = self
      .fetch_live_center(&center_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Center, center_id.as_str()))?;

    let former    = center.customer_id.clone();
    let child_str = center.center_id.as_str().to_owned();
    let now       = encode_dt(Utc::now());

    // The contractor reference derives from the customer link, so it clears
    // with it; cks_manager survives.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE centers
           SET customer_id = NULL, contractor_id = NULL, status = 'unassigned', updated_at = ?2
           WHERE center_id = ?1",
          params![child_str, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "center_unassigned_from_customer".to_string(),
        description:   match &former {
          Some(c) => format!("Unassigned {} from customer {c}", center.center_id),
          None => format!("Unassigned {} from customer", center.center_id),
        },
        actor,
        target_id:     Some(center.center_id.clone()),
        target_type:   Some(EntityKind::Center),
        metadata:      Some(json!({
          "centerId":   center.center_id,
          "centerName": center.name,
          "customerId": former,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            center.center_id,
      name:          center.name,
      assigned_id:   None,
      assigned_name: None,
    })
  }

  async fn unassign_crew_from_center(
    &self,
    crew_id: &str,
    actor: ActorContext,
  ) -> Result<AssignmentResult> {
    let crew_id = identity::normalize(crew_id).ok_or(Error::InvalidIdentifier("crew"))?;

    let member = self
      .fetch_live_crew_member(&crew_id)
      .await?
      .ok_or_else(|| Error::not_found(EntityKind::Crew, crew_id.as_str()))?;

    let former    = member.assigned_center.clone();
    let child_str = member.crew_id.as_str().to_owned();
    let now       = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE crew
           SET assigned_center = NULL, status = 'unassigned', updated_at = ?2
           WHERE crew_id = ?1",
          params![child_str, now],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::storage)?;

    self
      .record_activity(NewActivity {
        activity_type: "crew_unassigned_from_center".to_string(),
        description:   match &former {
          Some(c) => format!("Unassigned {} from center {c}", member.crew_id),
          None => format!("Unassigned {} from center", member.crew_id),
        },
        actor,
        target_id:     Some(member.crew_id.clone()),
        target_type:   Some(EntityKind::Crew),
        metadata:      Some(json!({
          "crewId":   member.crew_id,
          "crewName": member.name,
          "centerId": former,
        })),
      })
      .await;

    Ok(AssignmentResult {
      id:            member.crew_id,
      name:          member.name,
      assigned_id:   None,
      assigned_name: None,
    })
  }

  // ── Entity lifecycle ──────────────────────────────────────────────────────

  async fn archive_entity(
    &self,
    kind: EntityKind,
    id: &str,
    reason: Option<String>,
    actor: ActorContext,
  ) -> Result<()> {
    let def = catalog::lookup(kind);
    if !def.supports(LifecycleAction::Archive) {
      return Err(Error::UnsupportedEntity { kind, action: "archive" });
    }
    let event = def.activity_type_for(LifecyclePhase::Archived)?;
    let id = identity::normalize(id).ok_or(Error::InvalidIdentifier("entity"))?;

    let table       = def.storage_table;
    let id_col      = def.storage_id_column;
    let id_str      = id.as_str().to_owned();
    let archived_by = actor.audit_id();
    let now         = encode_dt(Utc::now());
    let reason_sql  = reason.clone();

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!(
            "UPDATE {table}
             SET archived_at = ?1, archived_by = ?2, archive_reason = ?3, updated_at = ?1
             WHERE UPPER({id_col}) = ?4"
          ),
          params![now, archived_by, reason_sql, id_str],
        )?)
      })
      .await
      .map_err(Error::storage)?;

    if rows == 0 {
      return Err(Error::not_found(kind, id.as_str()));
    }

    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Archived {kind} {id}"),
        actor,
        target_id:     Some(id),
        target_type:   Some(kind),
        metadata:      reason.map(|r| json!({ "reason": r })),
      })
      .await;

    Ok(())
  }

  async fn restore_entity(&self, kind: EntityKind, id: &str, actor: ActorContext) -> Result<()> {
    let def = catalog::lookup(kind);
    if !def.supports(LifecycleAction::Restore) {
      return Err(Error::UnsupportedEntity { kind, action: "restore" });
    }
    let event = def.activity_type_for(LifecyclePhase::Restored)?;
    let id = identity::normalize(id).ok_or(Error::InvalidIdentifier("entity"))?;

    let table  = def.storage_table;
    let id_col = def.storage_id_column;
    let id_str = id.as_str().to_owned();
    let now    = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!(
            "UPDATE {table}
             SET archived_at = NULL, archived_by = NULL, archive_reason = NULL, updated_at = ?1
             WHERE UPPER({id_col}) = ?2 AND archived_at IS NOT NULL"
          ),
          params![now, id_str],
        )?)
      })
      .await
      .map_err(Error::storage)?;

    if rows == 0 {
      return Err(Error::not_found(kind, id.as_str()));
    }

    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Restored {kind} {id}"),
        actor,
        target_id:     Some(id),
        target_type:   Some(kind),
        metadata:      None,
      })
      .await;

    Ok(())
  }

  async fn hard_delete_entity(
    &self,
    kind: EntityKind,
    id: &str,
    reason: Option<String>,
    actor: ActorContext,
  ) -> Result<()> {
    let def = catalog::lookup(kind);
    if !def.supports(LifecycleAction::Delete) {
      return Err(Error::UnsupportedEntity { kind, action: "hard delete" });
    }
    let event = def.activity_type_for(LifecyclePhase::Deleted)?;
    let id = identity::normalize(id).ok_or(Error::InvalidIdentifier("entity"))?;

    let table         = def.storage_table;
    let id_col        = def.storage_id_column;
    let want_snapshot = def.supports_tombstone;
    let id_str        = id.as_str().to_owned();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let archived_at: Option<Option<String>> = tx
          .query_row(
            &format!("SELECT archived_at FROM {table} WHERE UPPER({id_col}) = ?1"),
            params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(archived_at) = archived_at else {
          return Ok(DeleteOutcome::Missing);
        };
        if archived_at.is_none() {
          return Ok(DeleteOutcome::NotArchived);
        }

        let children = active_children_count(&tx, kind, &id_str)?;
        if children > 0 {
          return Ok(DeleteOutcome::ActiveChildren(children));
        }

        // Capture the row before it is gone: the activity log cannot
        // retrieve data it was never given.
        let snapshot = if want_snapshot {
          snapshot_row(&tx, table, id_col, &id_str)?
        } else {
          None
        };

        tx.execute(
          &format!("DELETE FROM {table} WHERE UPPER({id_col}) = ?1"),
          params![id_str],
        )?;
        tx.commit()?;
        Ok(DeleteOutcome::Deleted { snapshot })
      })
      .await
      .map_err(Error::storage)?;

    let snapshot = match outcome {
      DeleteOutcome::Missing => return Err(Error::not_found(kind, id.as_str())),
      DeleteOutcome::NotArchived => {
        return Err(Error::NotArchived { kind, id: id.as_str().to_owned() });
      }
      DeleteOutcome::ActiveChildren(count) => {
        return Err(Error::HasActiveChildren { kind, id: id.as_str().to_owned(), count });
      }
      DeleteOutcome::Deleted { snapshot } => snapshot,
    };

    let mut metadata = json!({
      "deletedAt": encode_dt(Utc::now()),
      "reason":    reason,
    });
    if let Some(snapshot) = snapshot {
      metadata["snapshot"] = snapshot;
    }

    self
      .record_activity(NewActivity {
        activity_type: event.to_string(),
        description:   format!("Permanently deleted {kind} {id}"),
        actor,
        target_id:     Some(id),
        target_type:   Some(kind),
        metadata:      Some(metadata),
      })
      .await;

    Ok(())
  }

  // ── Activity log ──────────────────────────────────────────────────────────

  async fn record_activity(&self, input: NewActivity) {
    if let Err(error) = self.insert_activity(&input).await {
      // Audit-write failure is non-fatal to the operation it accompanies.
      tracing::warn!(
        activity_type = %input.activity_type,
        target_id = ?input.target_id,
        %error,
        "failed to record activity",
      );
    }
  }

  async fn entity_history(
    &self,
    kind: EntityKind,
    id: &str,
    limit: Option<usize>,
  ) -> Result<Vec<ActivityRecord>> {
    let def = catalog::lookup(kind);
    if !def.supports(LifecycleAction::History) {
      return Err(Error::UnsupportedEntity { kind, action: "history" });
    }
    let id = identity::normalize(id).ok_or(Error::InvalidIdentifier("entity"))?;

    let id_str  = id.into_string();
    let kind_str: String = kind.as_str().to_owned();
    let phases: Vec<String> = def.activity_types.iter().map(|(_, s)| s.to_string()).collect();
    let like    = format!("{kind_str}_%");
    let related = def.related_assignment;
    let limit_clause = limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default();

    let raws = self
      .conn
      .call(move |conn| {
        let placeholders = (0..phases.len())
          .map(|i| format!("?{}", i + 3))
          .collect::<Vec<_>>()
          .join(", ");
        let next = phases.len() + 3;

        let mut sql = format!(
          "SELECT {ACTIVITY_COLS} FROM system_activity
           WHERE (UPPER(target_id) = ?1 AND target_type = ?2
              AND (activity_type IN ({placeholders}) OR activity_type LIKE ?{next}))"
        );
        if let Some(rel) = related {
          // Parent-side view of assignments logged against a child.
          sql.push_str(&format!(
            " OR (activity_type = ?{} \
               AND UPPER(COALESCE(json_extract(metadata, '$.{}'), '')) = ?1)",
            next + 1,
            rel.metadata_key,
          ));
        }
        sql.push_str(" ORDER BY created_at ASC, activity_id ASC");
        sql.push_str(&limit_clause);

        let mut bind: Vec<String> = vec![id_str.clone(), kind_str.clone()];
        bind.extend(phases.iter().cloned());
        bind.push(like.clone());
        if let Some(rel) = related {
          bind.push(rel.activity_type.to_string());
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(bind), RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::storage)?;

    raws.into_iter().map(RawActivity::into_record).collect()
  }

  async fn last_deletion_snapshot(&self, kind: EntityKind, id: &str) -> Result<DeletionSnapshot> {
    let def = catalog::lookup(kind);
    if !def.supports(LifecycleAction::Tombstone) {
      return Err(Error::UnsupportedEntity { kind, action: "tombstone retrieval" });
    }
    let deletion_type = def.activity_type_for(LifecyclePhase::Deleted)?.to_owned();
    let id = identity::normalize(id).ok_or(Error::InvalidIdentifier("entity"))?;

    let id_str = id.as_str().to_owned();
    let row: Option<(Option<String>, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT metadata, created_at, actor_id FROM system_activity
               WHERE activity_type = ?1 AND UPPER(target_id) = ?2
               ORDER BY created_at DESC, activity_id DESC
               LIMIT 1",
              params![deletion_type, id_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::storage)?;

    let Some((metadata, created_at, actor_id)) = row else {
      return Err(Error::NoDeletionRecord { kind, id: id.as_str().to_owned() });
    };

    let metadata: serde_json::Value = metadata
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?
      .unwrap_or(serde_json::Value::Null);

    let snapshot = match metadata.get("snapshot") {
      Some(value) if !value.is_null() => value.clone(),
      // The deletion predates snapshot capture; nothing to hand back.
      _ => return Err(Error::SnapshotUnavailable { kind, id: id.as_str().to_owned() }),
    };

    let deleted_at = metadata
      .get("deletedAt")
      .and_then(serde_json::Value::as_str)
      .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
      .map(|dt| dt.with_timezone(&Utc));
    let deleted_at = match deleted_at {
      Some(dt) => dt,
      None => crate::encode::decode_dt(&created_at)?,
    };

    let reason = metadata
      .get("reason")
      .and_then(serde_json::Value::as_str)
      .map(str::to_owned);

    Ok(DeletionSnapshot { snapshot, deleted_at, deleted_by: actor_id, reason })
  }

  async fn dismiss_activity(&self, activity_id: i64, user_id: &str) -> Result<bool> {
    let user = identity::normalize(user_id).ok_or(Error::InvalidIdentifier("user"))?;
    let user_str = user.into_string();
    let now = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM system_activity WHERE activity_id = ?1",
            params![activity_id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }

        let inserted = conn.execute(
          "INSERT OR IGNORE INTO activity_dismissals (activity_id, user_id, created_at)
           VALUES (?1, ?2, ?3)",
          params![activity_id, user_str, now],
        )?;
        Ok(inserted > 0)
      })
      .await
      .map_err(Error::storage)
  }

  async fn dismiss_all(&self, user_id: &str) -> Result<u64> {
    let user = identity::normalize(user_id).ok_or(Error::InvalidIdentifier("user"))?;
    let user_str = user.into_string();
    let now = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO activity_dismissals (activity_id, user_id, created_at)
           SELECT a.activity_id, ?1, ?2
           FROM system_activity a
           WHERE NOT EXISTS (
             SELECT 1 FROM activity_dismissals d
             WHERE d.activity_id = a.activity_id AND d.user_id = ?1
           )",
          params![user_str, now],
        )?)
      })
      .await
      .map_err(Error::storage)?;

    Ok(inserted as u64)
  }
}
