//! The scope cascade — pushing a manager scope down the hierarchy.
//!
//! Each function runs inside the caller's transaction and updates every
//! transitive descendant of the re-parented node with set-based statements,
//! one per level. Cascades happen only on assignment; unassignment leaves
//! descendants' scope untouched.

use rusqlite::{Connection, params};

/// Push `scope` to everything below a contractor: its customers, their
/// centers, and those centers' crew.
pub fn cascade_from_contractor(
  conn: &Connection,
  contractor_id: &str,
  scope: Option<&str>,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE customers
     SET cks_manager = ?1, updated_at = ?3
     WHERE contractor_id = ?2",
    params![scope, contractor_id, now],
  )?;
  conn.execute(
    "UPDATE centers
     SET cks_manager = ?1, updated_at = ?3
     WHERE customer_id IN (SELECT customer_id FROM customers WHERE contractor_id = ?2)",
    params![scope, contractor_id, now],
  )?;
  conn.execute(
    "UPDATE crew
     SET cks_manager = ?1, updated_at = ?3
     WHERE assigned_center IN (
       SELECT center_id FROM centers
       WHERE customer_id IN (SELECT customer_id FROM customers WHERE contractor_id = ?2)
     )",
    params![scope, contractor_id, now],
  )?;
  Ok(())
}

/// Push `scope` to everything below a customer: its centers and their crew.
pub fn cascade_from_customer(
  conn: &Connection,
  customer_id: &str,
  scope: Option<&str>,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE centers
     SET cks_manager = ?1, updated_at = ?3
     WHERE customer_id = ?2",
    params![scope, customer_id, now],
  )?;
  conn.execute(
    "UPDATE crew
     SET cks_manager = ?1, updated_at = ?3
     WHERE assigned_center IN (SELECT center_id FROM centers WHERE customer_id = ?2)",
    params![scope, customer_id, now],
  )?;
  Ok(())
}

/// Push `scope` to a center's crew. Crew are leaves, so this is the last
/// level a cascade can reach.
pub fn cascade_from_center(
  conn: &Connection,
  center_id: &str,
  scope: Option<&str>,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE crew
     SET cks_manager = ?1, updated_at = ?3
     WHERE assigned_center = ?2",
    params![scope, center_id, now],
  )?;
  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::SCHEMA;

  fn seeded_conn() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory connection");
    conn.execute_batch(SCHEMA).expect("schema");

    // CON-001 → CUS-001 → {CEN-001, CEN-002}; CEN-001 → {CRW-001, CRW-002}.
    // CON-002 → CUS-002 is an unrelated branch that must not be touched.
    let rows = [
      "INSERT INTO contractors (contractor_id, name, status, created_at) \
       VALUES ('CON-001', 'Apex Facilities', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO contractors (contractor_id, name, status, created_at) \
       VALUES ('CON-002', 'Borealis Group', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO customers (customer_id, name, contractor_id, cks_manager, status, created_at) \
       VALUES ('CUS-001', 'Northwind', 'CON-001', 'MGR-001', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO customers (customer_id, name, contractor_id, cks_manager, status, created_at) \
       VALUES ('CUS-002', 'Southbound', 'CON-002', 'MGR-002', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO centers (center_id, name, customer_id, cks_manager, status, created_at) \
       VALUES ('CEN-001', 'Northwind HQ', 'CUS-001', 'MGR-001', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO centers (center_id, name, customer_id, cks_manager, status, created_at) \
       VALUES ('CEN-002', 'Northwind Annex', 'CUS-001', 'MGR-001', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO crew (crew_id, name, assigned_center, cks_manager, status, created_at) \
       VALUES ('CRW-001', 'Dana', 'CEN-001', 'MGR-001', 'active', '2025-01-01T00:00:00+00:00')",
      "INSERT INTO crew (crew_id, name, assigned_center, cks_manager, status, created_at) \
       VALUES ('CRW-002', 'Eli', 'CEN-001', 'MGR-001', 'active', '2025-01-01T00:00:00+00:00')",
    ];
    for sql in rows {
      conn.execute(sql, []).expect("seed row");
    }
    conn
  }

  fn scope_of(conn: &Connection, table: &str, id_col: &str, id: &str) -> Option<String> {
    conn
      .query_row(
        &format!("SELECT cks_manager FROM {table} WHERE {id_col} = ?1"),
        params![id],
        |row| row.get(0),
      )
      .expect("scope lookup")
  }

  #[test]
  fn contractor_cascade_reaches_every_level() {
    let conn = seeded_conn();
    cascade_from_contractor(&conn, "CON-001", Some("MGR-005"), "2025-06-01T00:00:00+00:00")
      .unwrap();

    assert_eq!(scope_of(&conn, "customers", "customer_id", "CUS-001").as_deref(), Some("MGR-005"));
    assert_eq!(scope_of(&conn, "centers", "center_id", "CEN-001").as_deref(), Some("MGR-005"));
    assert_eq!(scope_of(&conn, "centers", "center_id", "CEN-002").as_deref(), Some("MGR-005"));
    assert_eq!(scope_of(&conn, "crew", "crew_id", "CRW-001").as_deref(), Some("MGR-005"));
    assert_eq!(scope_of(&conn, "crew", "crew_id", "CRW-002").as_deref(), Some("MGR-005"));
  }

  #[test]
  fn contractor_cascade_leaves_other_branches_alone() {
    let conn = seeded_conn();
    cascade_from_contractor(&conn, "CON-001", Some("MGR-005"), "2025-06-01T00:00:00+00:00")
      .unwrap();

    assert_eq!(scope_of(&conn, "customers", "customer_id", "CUS-002").as_deref(), Some("MGR-002"));
  }

  #[test]
  fn customer_cascade_stops_at_its_subtree() {
    let conn = seeded_conn();
    cascade_from_customer(&conn, "CUS-001", Some("MGR-009"), "2025-06-01T00:00:00+00:00")
      .unwrap();

    assert_eq!(scope_of(&conn, "centers", "center_id", "CEN-001").as_deref(), Some("MGR-009"));
    assert_eq!(scope_of(&conn, "crew", "crew_id", "CRW-001").as_deref(), Some("MGR-009"));
    // The customer row itself is the caller's responsibility.
    assert_eq!(scope_of(&conn, "customers", "customer_id", "CUS-001").as_deref(), Some("MGR-001"));
  }

  #[test]
  fn center_cascade_updates_only_its_crew() {
    let conn = seeded_conn();
    cascade_from_center(&conn, "CEN-002", Some("MGR-009"), "2025-06-01T00:00:00+00:00").unwrap();

    // CEN-002 has no crew; CEN-001's crew keep their scope.
    assert_eq!(scope_of(&conn, "crew", "crew_id", "CRW-001").as_deref(), Some("MGR-001"));
  }

  #[test]
  fn cascade_can_clear_scope() {
    let conn = seeded_conn();
    cascade_from_contractor(&conn, "CON-001", None, "2025-06-01T00:00:00+00:00").unwrap();
    assert_eq!(scope_of(&conn, "customers", "customer_id", "CUS-001"), None);
    assert_eq!(scope_of(&conn, "crew", "crew_id", "CRW-001"), None);
  }
}
