//! The `PortalStore` trait — the storage abstraction the portal core runs on.
//!
//! Implemented by storage backends (e.g. `fieldops-store-sqlite`). Higher
//! layers (`fieldops-api`, `fieldops-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  Result,
  activity::{ActivityRecord, ActorContext, DeletionSnapshot, NewActivity},
  catalog::EntityKind,
  hierarchy::{
    AssignmentResult, Center, Contractor, CrewMember, Customer, Manager, NewCenter,
    NewContractor, NewCrewMember, NewCustomer, NewManager, UnassignedEntry,
  },
};

/// Abstraction over a Fieldops portal backend.
///
/// Assignment operations are transactional: the parent update and the scope
/// cascade either both commit or neither does. Activity appends ride outside
/// that transaction and never fail the business operation they accompany.
pub trait PortalStore: Send + Sync {
  // ── Provisioning ──────────────────────────────────────────────────────

  /// Create a manager. Managers are hierarchy roots and start `active`.
  /// The caller-supplied identifier is normalised and validated against the
  /// catalog's ID grammar.
  fn create_manager(
    &self,
    input: NewManager,
    actor: ActorContext,
  ) -> impl Future<Output = Result<Manager>> + Send + '_;

  /// Create a contractor; starts `unassigned` with no manager.
  fn create_contractor(
    &self,
    input: NewContractor,
    actor: ActorContext,
  ) -> impl Future<Output = Result<Contractor>> + Send + '_;

  fn create_customer(
    &self,
    input: NewCustomer,
    actor: ActorContext,
  ) -> impl Future<Output = Result<Customer>> + Send + '_;

  fn create_center(
    &self,
    input: NewCenter,
    actor: ActorContext,
  ) -> impl Future<Output = Result<Center>> + Send + '_;

  fn create_crew_member(
    &self,
    input: NewCrewMember,
    actor: ActorContext,
  ) -> impl Future<Output = Result<CrewMember>> + Send + '_;

  // ── Node reads ────────────────────────────────────────────────────────

  /// Fetch a manager by id (archived rows included). `None` if absent.
  fn get_manager<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Manager>>> + Send + 'a;

  fn get_contractor<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Contractor>>> + Send + 'a;

  fn get_customer<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Customer>>> + Send + 'a;

  fn get_center<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Center>>> + Send + 'a;

  fn get_crew_member<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<CrewMember>>> + Send + 'a;

  // ── Directory listings ────────────────────────────────────────────────

  /// Live contractors with no manager, id-ordered. `limit` defaults to 250.
  fn unassigned_contractors(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<UnassignedEntry>>> + Send + '_;

  fn unassigned_customers(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<UnassignedEntry>>> + Send + '_;

  fn unassigned_centers(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<UnassignedEntry>>> + Send + '_;

  fn unassigned_crew(
    &self,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<UnassignedEntry>>> + Send + '_;

  // ── Assignment engine ─────────────────────────────────────────────────

  /// Re-parent a contractor under a manager and cascade the manager scope to
  /// every transitive descendant (customers, their centers, those centers'
  /// crew) in one transaction. Appends exactly one
  /// `contractor_assigned_to_manager` event.
  fn assign_contractor_to_manager<'a>(
    &'a self,
    contractor_id: &'a str,
    manager_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn assign_customer_to_contractor<'a>(
    &'a self,
    customer_id: &'a str,
    contractor_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn assign_center_to_customer<'a>(
    &'a self,
    center_id: &'a str,
    customer_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn assign_crew_to_center<'a>(
    &'a self,
    crew_id: &'a str,
    center_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  /// Clear a contractor's manager. Does NOT cascade: descendants keep their
  /// last-known manager scope. Appends one
  /// `contractor_unassigned_from_manager` event.
  fn unassign_contractor_from_manager<'a>(
    &'a self,
    contractor_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn unassign_customer_from_contractor<'a>(
    &'a self,
    customer_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn unassign_center_from_customer<'a>(
    &'a self,
    center_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  fn unassign_crew_from_center<'a>(
    &'a self,
    crew_id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<AssignmentResult>> + Send + 'a;

  // ── Entity lifecycle ──────────────────────────────────────────────────

  /// Soft-archive any catalog entity that supports it.
  fn archive_entity<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
    reason: Option<String>,
    actor: ActorContext,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  fn restore_entity<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
    actor: ActorContext,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  /// Permanently delete an archived entity. When the catalog sets
  /// `supports_tombstone`, the full row is captured into the deletion
  /// event's metadata first — the activity log cannot retrieve data it was
  /// never given.
  fn hard_delete_entity<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
    reason: Option<String>,
    actor: ActorContext,
  ) -> impl Future<Output = Result<()>> + Send + 'a;

  // ── Activity log ──────────────────────────────────────────────────────

  /// Append an audit record. Never fails the caller: storage failures are
  /// logged locally and swallowed (availability over completeness).
  fn record_activity(&self, input: NewActivity) -> impl Future<Output = ()> + Send + '_;

  /// Lifecycle timeline for an entity, oldest first. Includes the kind's
  /// four standard phase events, kind-prefixed events, and — for parent-side
  /// hierarchy kinds — related assignment events logged against children.
  /// Fails `UnsupportedEntity` when the catalog says the kind has no
  /// history, even if matching rows exist.
  fn entity_history<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<ActivityRecord>>> + Send + 'a;

  /// The most recent hard-deletion snapshot for an entity.
  fn last_deletion_snapshot<'a>(
    &'a self,
    kind: EntityKind,
    id: &'a str,
  ) -> impl Future<Output = Result<DeletionSnapshot>> + Send + 'a;

  /// Hide one activity record from one user. Idempotent: `true` if a
  /// dismissal was newly recorded, `false` if already dismissed or the
  /// activity does not exist. The audit record itself is never touched.
  fn dismiss_activity<'a>(
    &'a self,
    activity_id: i64,
    user_id: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  /// Dismiss every not-yet-dismissed activity for a user in one statement;
  /// returns the number of dismissals inserted.
  fn dismiss_all<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<u64>> + Send + 'a;
}
