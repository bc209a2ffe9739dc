//! Integration tests for `SqliteStore` against an in-memory database.

use fieldops_core::{
  Error,
  activity::ActorContext,
  catalog::EntityKind,
  hierarchy::{NewCenter, NewContractor, NewCrewMember, NewCustomer, NewManager, NodeStatus},
  store::PortalStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn admin() -> ActorContext {
  ActorContext {
    actor_id:   "ADM-001".into(),
    actor_role: "admin".into(),
    actor_name: Some("Portal Admin".into()),
  }
}

fn new_manager(id: &str, name: &str) -> NewManager {
  NewManager {
    id:        id.into(),
    name:      name.into(),
    email:     None,
    phone:     None,
    territory: None,
  }
}

fn new_contractor(id: &str, name: &str) -> NewContractor {
  NewContractor { id: id.into(), name: name.into(), email: None, phone: None }
}

fn new_customer(id: &str, name: &str) -> NewCustomer {
  NewCustomer { id: id.into(), name: name.into(), email: None, phone: None }
}

fn new_center(id: &str, name: &str) -> NewCenter {
  NewCenter { id: id.into(), name: name.into(), email: None, phone: None }
}

fn new_crew(id: &str, name: &str) -> NewCrewMember {
  NewCrewMember { id: id.into(), name: name.into(), role: None, email: None, phone: None }
}

/// CON-001 owning CUS-001 → {CEN-001, CEN-002}; CEN-001 staffed by CRW-001
/// and CRW-002. Built through the assignment ops themselves, before any
/// manager is involved, so every scope starts out NULL.
async fn seed_contractor_subtree(s: &SqliteStore) {
  s.create_contractor(new_contractor("CON-001", "Apex Facilities"), admin())
    .await
    .unwrap();
  s.create_customer(new_customer("CUS-001", "Northwind Foods"), admin())
    .await
    .unwrap();
  s.create_center(new_center("CEN-001", "Northwind HQ"), admin())
    .await
    .unwrap();
  s.create_center(new_center("CEN-002", "Northwind Annex"), admin())
    .await
    .unwrap();
  s.create_crew_member(new_crew("CRW-001", "Dana Reyes"), admin())
    .await
    .unwrap();
  s.create_crew_member(new_crew("CRW-002", "Eli Ossai"), admin())
    .await
    .unwrap();

  s.assign_customer_to_contractor("CUS-001", "CON-001", admin())
    .await
    .unwrap();
  s.assign_center_to_customer("CEN-001", "CUS-001", admin())
    .await
    .unwrap();
  s.assign_center_to_customer("CEN-002", "CUS-001", admin())
    .await
    .unwrap();
  s.assign_crew_to_center("CRW-001", "CEN-001", admin())
    .await
    .unwrap();
  s.assign_crew_to_center("CRW-002", "CEN-001", admin())
    .await
    .unwrap();
}

// ─── Provisioning ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_manager() {
  let s = store().await;
  let created = s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  assert_eq!(created.manager_id, "MGR-005");
  assert_eq!(created.status, NodeStatus::Active);

  let fetched = s.get_manager("mgr-5").await.unwrap().expect("manager exists");
  assert_eq!(fetched.manager_id, "MGR-005");
  assert_eq!(fetched.name, "Riley Kim");
}

#[tokio::test]
async fn create_contractor_starts_unassigned() {
  let s = store().await;
  let contractor = s
    .create_contractor(new_contractor("CON-001", "Apex Facilities"), admin())
    .await
    .unwrap();
  assert_eq!(contractor.status, NodeStatus::Unassigned);
  assert!(contractor.cks_manager.is_none());
}

#[tokio::test]
async fn create_rejects_mismatched_id_grammar() {
  let s = store().await;
  let err = s
    .create_contractor(new_contractor("MGR-001", "Not A Contractor"), admin())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier("contractor")));

  let err = s.create_manager(new_manager("", "Nameless"), admin()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier("manager")));
}

#[tokio::test]
async fn get_missing_node_returns_none() {
  let s = store().await;
  assert!(s.get_contractor("CON-404").await.unwrap().is_none());
  assert!(s.get_manager("  ").await.unwrap().is_none());
}

// ─── Directory listings ──────────────────────────────────────────────────────

#[tokio::test]
async fn unassigned_contractors_excludes_assigned_and_archived() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-002", "Borealis"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-003", "Cobalt"), admin()).await.unwrap();

  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.archive_entity(EntityKind::Contractor, "CON-003", None, admin()).await.unwrap();

  let unassigned = s.unassigned_contractors(None).await.unwrap();
  assert_eq!(unassigned.len(), 1);
  assert_eq!(unassigned[0].id, "CON-002");
}

#[tokio::test]
async fn unassigned_crew_carries_role() {
  let s = store().await;
  let mut input = new_crew("CRW-001", "Dana Reyes");
  input.role = Some("Lead".into());
  s.create_crew_member(input, admin()).await.unwrap();

  let unassigned = s.unassigned_crew(None).await.unwrap();
  assert_eq!(unassigned.len(), 1);
  assert_eq!(unassigned[0].role.as_deref(), Some("Lead"));
}

// ─── Assignment: cascades ────────────────────────────────────────────────────

#[tokio::test]
async fn contractor_assignment_cascades_to_every_descendant() {
  let s = store().await;
  s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  seed_contractor_subtree(&s).await;

  let result = s.assign_contractor_to_manager("CON-001", "MGR-005", admin()).await.unwrap();
  assert_eq!(result.id, "CON-001");
  assert_eq!(result.assigned_id.as_ref().unwrap(), "MGR-005");

  let contractor = s.get_contractor("CON-001").await.unwrap().unwrap();
  assert_eq!(contractor.cks_manager.as_ref().unwrap(), "MGR-005");
  assert_eq!(contractor.status, NodeStatus::Active);

  let customer = s.get_customer("CUS-001").await.unwrap().unwrap();
  assert_eq!(customer.cks_manager.as_ref().unwrap(), "MGR-005");

  for center_id in ["CEN-001", "CEN-002"] {
    let center = s.get_center(center_id).await.unwrap().unwrap();
    assert_eq!(center.cks_manager.as_ref().unwrap(), "MGR-005", "center {center_id}");
  }
  for crew_id in ["CRW-001", "CRW-002"] {
    let member = s.get_crew_member(crew_id).await.unwrap().unwrap();
    assert_eq!(member.cks_manager.as_ref().unwrap(), "MGR-005", "crew {crew_id}");
  }
}

#[tokio::test]
async fn contractor_assignment_appends_exactly_one_event() {
  let s = store().await;
  s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  seed_contractor_subtree(&s).await;
  s.assign_contractor_to_manager("CON-001", "MGR-005", admin()).await.unwrap();

  let history = s.entity_history(EntityKind::Contractor, "CON-001", None).await.unwrap();
  let assignments: Vec<_> = history
    .iter()
    .filter(|e| e.activity_type == "contractor_assigned_to_manager")
    .collect();
  assert_eq!(assignments.len(), 1);

  // Cascaded rows do not each get their own event.
  let customer_history = s.entity_history(EntityKind::Customer, "CUS-001", None).await.unwrap();
  assert!(
    customer_history
      .iter()
      .all(|e| e.activity_type != "contractor_assigned_to_manager")
  );
}

#[tokio::test]
async fn customer_assignment_inherits_contractor_scope() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();

  s.create_customer(new_customer("CUS-001", "Northwind"), admin()).await.unwrap();
  s.assign_customer_to_contractor("CUS-001", "CON-001", admin()).await.unwrap();

  let customer = s.get_customer("CUS-001").await.unwrap().unwrap();
  assert_eq!(customer.contractor_id.as_ref().unwrap(), "CON-001");
  assert_eq!(customer.cks_manager.as_ref().unwrap(), "MGR-001");
  assert_eq!(customer.status, NodeStatus::Active);
}

#[tokio::test]
async fn center_assignment_copies_contractor_reference() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.create_customer(new_customer("CUS-001", "Northwind"), admin()).await.unwrap();
  s.create_center(new_center("CEN-001", "Northwind HQ"), admin()).await.unwrap();
  s.create_crew_member(new_crew("CRW-001", "Dana Reyes"), admin()).await.unwrap();

  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.assign_customer_to_contractor("CUS-001", "CON-001", admin()).await.unwrap();
  s.assign_crew_to_center("CRW-001", "CEN-001", admin()).await.unwrap();
  s.assign_center_to_customer("CEN-001", "CUS-001", admin()).await.unwrap();

  let center = s.get_center("CEN-001").await.unwrap().unwrap();
  assert_eq!(center.customer_id.as_ref().unwrap(), "CUS-001");
  assert_eq!(center.contractor_id.as_ref().unwrap(), "CON-001");
  assert_eq!(center.cks_manager.as_ref().unwrap(), "MGR-001");

  // The center's crew picked the scope up through the cascade.
  let member = s.get_crew_member("CRW-001").await.unwrap().unwrap();
  assert_eq!(member.cks_manager.as_ref().unwrap(), "MGR-001");
}

#[tokio::test]
async fn assignment_accepts_unpadded_identifiers() {
  let s = store().await;
  s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();

  let result = s.assign_contractor_to_manager("con-1", "mgr-5", admin()).await.unwrap();
  assert_eq!(result.id, "CON-001");
  assert_eq!(result.assigned_id.as_ref().unwrap(), "MGR-005");
}

// ─── Assignment: failure semantics ───────────────────────────────────────────

#[tokio::test]
async fn assignment_rejects_empty_identifiers() {
  let s = store().await;
  let err = s.assign_contractor_to_manager("  ", "MGR-001", admin()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier("contractor")));

  let err = s.assign_contractor_to_manager("CON-001", "", admin()).await.unwrap_err();
  assert!(matches!(err, Error::InvalidIdentifier("manager")));
}

#[tokio::test]
async fn assignment_names_the_missing_side() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();

  let err = s.assign_contractor_to_manager("CON-404", "MGR-001", admin()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: EntityKind::Contractor, .. }));

  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  let err = s.assign_contractor_to_manager("CON-001", "MGR-404", admin()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: EntityKind::Manager, .. }));
}

#[tokio::test]
async fn archived_nodes_are_not_assignable() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.archive_entity(EntityKind::Manager, "MGR-001", None, admin()).await.unwrap();

  let err = s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: EntityKind::Manager, .. }));
}

// ─── Unassignment ────────────────────────────────────────────────────────────

#[tokio::test]
async fn unassignment_does_not_cascade_scope() {
  let s = store().await;
  s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  seed_contractor_subtree(&s).await;
  s.assign_contractor_to_manager("CON-001", "MGR-005", admin()).await.unwrap();

  let result = s.unassign_contractor_from_manager("CON-001", admin()).await.unwrap();
  assert!(result.assigned_id.is_none());

  // The contractor's own parent reference clears…
  let contractor = s.get_contractor("CON-001").await.unwrap().unwrap();
  assert!(contractor.cks_manager.is_none());
  assert_eq!(contractor.status, NodeStatus::Unassigned);

  // …but descendants keep their last-known scope.
  let customer = s.get_customer("CUS-001").await.unwrap().unwrap();
  assert_eq!(customer.cks_manager.as_ref().unwrap(), "MGR-005");
  let center = s.get_center("CEN-001").await.unwrap().unwrap();
  assert_eq!(center.cks_manager.as_ref().unwrap(), "MGR-005");
  let member = s.get_crew_member("CRW-001").await.unwrap().unwrap();
  assert_eq!(member.cks_manager.as_ref().unwrap(), "MGR-005");
}

#[tokio::test]
async fn unassigning_center_clears_derived_contractor_reference() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.create_customer(new_customer("CUS-001", "Northwind"), admin()).await.unwrap();
  s.create_center(new_center("CEN-001", "Northwind HQ"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.assign_customer_to_contractor("CUS-001", "CON-001", admin()).await.unwrap();
  s.assign_center_to_customer("CEN-001", "CUS-001", admin()).await.unwrap();

  s.unassign_center_from_customer("CEN-001", admin()).await.unwrap();

  let center = s.get_center("CEN-001").await.unwrap().unwrap();
  assert!(center.customer_id.is_none());
  assert!(center.contractor_id.is_none());
  assert_eq!(center.status, NodeStatus::Unassigned);
  // Stale scope is deliberate.
  assert_eq!(center.cks_manager.as_ref().unwrap(), "MGR-001");
}

#[tokio::test]
async fn unassignment_appends_one_event() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.unassign_contractor_from_manager("CON-001", admin()).await.unwrap();

  let history = s.entity_history(EntityKind::Contractor, "CON-001", None).await.unwrap();
  let unassignments: Vec<_> = history
    .iter()
    .filter(|e| e.activity_type == "contractor_unassigned_from_manager")
    .collect();
  assert_eq!(unassignments.len(), 1);
  let metadata = unassignments[0].metadata.as_ref().unwrap();
  assert_eq!(metadata["managerId"], "MGR-001");
}

// ─── History ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_is_oldest_first_and_complete() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.archive_entity(EntityKind::Contractor, "CON-001", Some("offboarding".into()), admin())
    .await
    .unwrap();
  s.restore_entity(EntityKind::Contractor, "CON-001", admin()).await.unwrap();

  let history = s.entity_history(EntityKind::Contractor, "CON-001", None).await.unwrap();
  let types: Vec<_> = history.iter().map(|e| e.activity_type.as_str()).collect();
  assert_eq!(
    types,
    [
      "contractor_created",
      "contractor_assigned_to_manager",
      "contractor_archived",
      "contractor_restored",
    ]
  );
}

#[tokio::test]
async fn manager_history_includes_related_assignments() {
  let s = store().await;
  s.create_manager(new_manager("MGR-005", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-005", admin()).await.unwrap();

  // The assignment event targets the contractor, yet the manager's timeline
  // sees it through the related-assignment pattern.
  let history = s.entity_history(EntityKind::Manager, "MGR-005", None).await.unwrap();
  assert!(
    history
      .iter()
      .any(|e| e.activity_type == "contractor_assigned_to_manager")
  );
}

#[tokio::test]
async fn history_respects_limit() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.archive_entity(EntityKind::Manager, "MGR-001", None, admin()).await.unwrap();
  s.restore_entity(EntityKind::Manager, "MGR-001", admin()).await.unwrap();

  let history = s.entity_history(EntityKind::Manager, "MGR-001", Some(2)).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].activity_type, "manager_created");
}

#[tokio::test]
async fn product_history_is_unsupported_not_empty() {
  let s = store().await;
  let err = s.entity_history(EntityKind::Product, "PRD-001", None).await.unwrap_err();
  assert!(matches!(
    err,
    Error::UnsupportedEntity { kind: EntityKind::Product, action: "history" }
  ));
}

// ─── Lifecycle and tombstones ────────────────────────────────────────────────

async fn seed_catalog_service(s: &SqliteStore) {
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO catalog_services (service_id, name, status, created_at)
         VALUES ('SRV-101', 'Deep Clean', 'active', '2025-01-01T00:00:00+00:00')",
        [],
      )?;
      Ok(())
    })
    .await
    .expect("seed catalog service");
}

#[tokio::test]
async fn hard_delete_requires_archive_first() {
  let s = store().await;
  seed_catalog_service(&s).await;

  let err = s
    .hard_delete_entity(EntityKind::CatalogService, "SRV-101", None, admin())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotArchived { kind: EntityKind::CatalogService, .. }));
}

#[tokio::test]
async fn hard_delete_refuses_active_children() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.assign_contractor_to_manager("CON-001", "MGR-001", admin()).await.unwrap();
  s.archive_entity(EntityKind::Manager, "MGR-001", None, admin()).await.unwrap();

  let err = s
    .hard_delete_entity(EntityKind::Manager, "MGR-001", None, admin())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::HasActiveChildren { count: 1, .. }));
}

#[tokio::test]
async fn tombstone_round_trip() {
  let s = store().await;
  seed_catalog_service(&s).await;

  s.archive_entity(EntityKind::CatalogService, "SRV-101", Some("retired".into()), admin())
    .await
    .unwrap();
  s.hard_delete_entity(
    EntityKind::CatalogService,
    "SRV-101",
    Some("duplicate entry".into()),
    admin(),
  )
  .await
  .unwrap();

  // The row is gone; the snapshot is the only surviving copy.
  let tombstone = s
    .last_deletion_snapshot(EntityKind::CatalogService, "SRV-101")
    .await
    .unwrap();
  assert_eq!(tombstone.snapshot["service_id"], "SRV-101");
  assert_eq!(tombstone.snapshot["name"], "Deep Clean");
  assert_eq!(tombstone.reason.as_deref(), Some("duplicate entry"));
  assert_eq!(tombstone.deleted_by, "ADM-001");
}

#[tokio::test]
async fn tombstone_is_unsupported_for_hierarchy_kinds() {
  let s = store().await;
  let err = s.last_deletion_snapshot(EntityKind::Manager, "MGR-001").await.unwrap_err();
  assert!(matches!(err, Error::UnsupportedEntity { kind: EntityKind::Manager, .. }));
}

#[tokio::test]
async fn missing_deletion_record_is_distinguished_from_missing_snapshot() {
  let s = store().await;

  let err = s
    .last_deletion_snapshot(EntityKind::CatalogService, "SRV-999")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NoDeletionRecord { .. }));

  // A deletion event written before snapshot capture existed.
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO system_activity
           (activity_type, description, actor_id, actor_role,
            target_id, target_type, metadata, created_at)
         VALUES ('catalog_service_deleted', 'Permanently deleted catalogService SRV-200',
                 'ADM-001', 'admin', 'SRV-200', 'catalogService',
                 '{\"reason\":null}', '2025-01-01T00:00:00+00:00')",
        [],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s
    .last_deletion_snapshot(EntityKind::CatalogService, "SRV-200")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SnapshotUnavailable { .. }));
}

#[tokio::test]
async fn restore_round_trip() {
  let s = store().await;
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();

  s.archive_entity(EntityKind::Contractor, "CON-001", Some("pause".into()), admin())
    .await
    .unwrap();
  let archived = s.get_contractor("CON-001").await.unwrap().unwrap();
  assert!(archived.archived_at.is_some());

  s.restore_entity(EntityKind::Contractor, "CON-001", admin()).await.unwrap();
  let restored = s.get_contractor("CON-001").await.unwrap().unwrap();
  assert!(restored.archived_at.is_none());

  // Restoring a live row is a NotFound, not a no-op.
  let err = s.restore_entity(EntityKind::Contractor, "CON-001", admin()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

// ─── Dismissals ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn dismiss_is_idempotent_and_leaves_the_record() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();

  let history = s.entity_history(EntityKind::Manager, "MGR-001", None).await.unwrap();
  let activity_id = history[0].activity_id;

  assert!(s.dismiss_activity(activity_id, "MGR-002").await.unwrap());
  assert!(!s.dismiss_activity(activity_id, "MGR-002").await.unwrap());

  // The audit record is unaffected by either call.
  let history = s.entity_history(EntityKind::Manager, "MGR-001", None).await.unwrap();
  assert_eq!(history[0].activity_id, activity_id);
}

#[tokio::test]
async fn dismissing_a_nonexistent_activity_returns_false() {
  let s = store().await;
  assert!(!s.dismiss_activity(9_999, "MGR-001").await.unwrap());
}

#[tokio::test]
async fn dismiss_all_counts_only_new_dismissals() {
  let s = store().await;
  s.create_manager(new_manager("MGR-001", "Riley Kim"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-001", "Apex"), admin()).await.unwrap();
  s.create_contractor(new_contractor("CON-002", "Borealis"), admin()).await.unwrap();

  // Pre-dismiss one of the three creation events.
  let history = s.entity_history(EntityKind::Manager, "MGR-001", None).await.unwrap();
  s.dismiss_activity(history[0].activity_id, "MGR-009").await.unwrap();

  assert_eq!(s.dismiss_all("MGR-009").await.unwrap(), 2);
  assert_eq!(s.dismiss_all("MGR-009").await.unwrap(), 0);
}
