//! Entity catalog — the static registry of per-entity-kind metadata.
//!
//! Every entity kind the portal handles (orders, reports, services, the user
//! hierarchy, …) is described here with its ID grammar, storage mapping,
//! capability flags, and activity-event names. Kind-specific behaviour is
//! encoded as data, not subclassing: callers look a definition up and branch
//! on its fields.
//!
//! ID-pattern matching is a prioritised rule list, not a map lookup. Two
//! kinds share the `SRV` token and are disambiguated only by the presence of
//! a scope prefix (`CEN-010-SRV-001` is an active service instance, `SRV-123`
//! a catalog definition), so [`CATALOG`] is ordered most-specific-first and
//! [`match_by_id_pattern`] returns the first hit.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─── EntityKind ──────────────────────────────────────────────────────────────

/// Closed enumeration of entity kinds. The serde/discriminant strings are
/// wire-visible and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
  Order,
  Report,
  Feedback,
  Service,
  CatalogService,
  Product,
  Manager,
  Contractor,
  Customer,
  Center,
  Crew,
  Warehouse,
  /// Fallback for identifiers and type strings nothing else claims. All
  /// capabilities are false; no operation is legal on it.
  Unknown,
}

impl EntityKind {
  /// The discriminant string stored in `target_type` columns and used in
  /// URL paths. Must match the serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Order => "order",
      Self::Report => "report",
      Self::Feedback => "feedback",
      Self::Service => "service",
      Self::CatalogService => "catalogService",
      Self::Product => "product",
      Self::Manager => "manager",
      Self::Contractor => "contractor",
      Self::Customer => "customer",
      Self::Center => "center",
      Self::Crew => "crew",
      Self::Warehouse => "warehouse",
      Self::Unknown => "unknown",
    }
  }

  /// Parse a discriminant string. `unknown` itself is not accepted: callers
  /// naming a type explicitly must name a real one.
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "order" => Ok(Self::Order),
      "report" => Ok(Self::Report),
      "feedback" => Ok(Self::Feedback),
      "service" => Ok(Self::Service),
      "catalogService" => Ok(Self::CatalogService),
      "product" => Ok(Self::Product),
      "manager" => Ok(Self::Manager),
      "contractor" => Ok(Self::Contractor),
      "customer" => Ok(Self::Customer),
      "center" => Ok(Self::Center),
      "crew" => Ok(Self::Crew),
      "warehouse" => Ok(Self::Warehouse),
      other => Err(Error::UnknownEntityType(other.to_string())),
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Lifecycle phases and actions ────────────────────────────────────────────

/// The four standard lifecycle phases every catalog entry maps to an
/// activity-event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
  Created,
  Archived,
  Restored,
  Deleted,
}

impl LifecyclePhase {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Created => "created",
      Self::Archived => "archived",
      Self::Restored => "restored",
      Self::Deleted => "deleted",
    }
  }
}

/// Capability-gated lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
  DetailFetch,
  Archive,
  Delete,
  Restore,
  History,
  Tombstone,
}

impl LifecycleAction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::DetailFetch => "detail fetch",
      Self::Archive => "archive",
      Self::Delete => "delete",
      Self::Restore => "restore",
      Self::History => "history",
      Self::Tombstone => "tombstone",
    }
  }
}

// ─── EntityDefinition ────────────────────────────────────────────────────────

/// A parent-side pattern for assignment events logged against a child: the
/// child-side event type, and the metadata key whose value names this parent.
/// Lets a manager's timeline include `contractor_assigned_to_manager` events
/// without a duplicate write.
#[derive(Debug, Clone, Copy)]
pub struct RelatedAssignment {
  pub activity_type: &'static str,
  pub metadata_key:  &'static str,
}

/// Immutable per-kind metadata; one record per entity kind, loaded once.
#[derive(Debug)]
pub struct EntityDefinition {
  pub kind:         EntityKind,
  pub display_name: &'static str,

  /// Anchored, case-insensitive pattern accepting canonical and (where the
  /// kind allows it) scope-prefixed identifiers.
  pub id_pattern: &'static str,

  pub storage_table:     &'static str,
  pub storage_id_column: &'static str,

  pub supports_detail_fetch: bool,
  pub supports_archive:      bool,
  pub supports_delete:       bool,
  pub supports_restore:      bool,
  pub supports_history:      bool,
  pub supports_tombstone:    bool,

  /// Lifecycle phase → activity-event name. The event strings must match
  /// the activity-log writers verbatim; a mismatch silently breaks history
  /// and tombstone retrieval.
  pub activity_types: &'static [(LifecyclePhase, &'static str)],

  pub related_assignment: Option<RelatedAssignment>,
}

impl EntityDefinition {
  pub fn activity_type_for(&self, phase: LifecyclePhase) -> Result<&'static str> {
    self
      .activity_types
      .iter()
      .find(|(p, _)| *p == phase)
      .map(|(_, name)| *name)
      .ok_or(Error::UnsupportedPhase {
        kind:  self.kind,
        phase: phase.as_str(),
      })
  }

  pub fn supports(&self, action: LifecycleAction) -> bool {
    match action {
      LifecycleAction::DetailFetch => self.supports_detail_fetch,
      LifecycleAction::Archive => self.supports_archive,
      LifecycleAction::Delete => self.supports_delete,
      LifecycleAction::Restore => self.supports_restore,
      LifecycleAction::History => self.supports_history,
      LifecycleAction::Tombstone => self.supports_tombstone,
    }
  }
}

// ─── The catalog ─────────────────────────────────────────────────────────────

/// All definitions in ID-match priority order. Scoped `service` must come
/// before unscoped `catalogService` (both use the `SRV` token); `unknown` is
/// last and its pattern is never consulted.
pub const CATALOG: &[EntityDefinition] = &[
  EntityDefinition {
    kind:                  EntityKind::Service,
    display_name:          "Service",
    // Scoped IDs only (CEN-010-SRV-001): active instances created from
    // service orders. Unscoped SRV belongs to catalogService below.
    id_pattern:            r"^(?i)(?:[A-Z]{3}-\d{3}-)SRV-\d+$",
    storage_table:         "services",
    storage_id_column:     "service_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "service_created"),
      (LifecyclePhase::Archived, "service_archived"),
      (LifecyclePhase::Restored, "service_restored"),
      (LifecyclePhase::Deleted, "service_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::CatalogService,
    display_name:          "Service Definition",
    id_pattern:            r"^(?i)SRV-\d+$",
    storage_table:         "catalog_services",
    storage_id_column:     "service_id",
    supports_detail_fetch: true,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    true,
    activity_types:        &[
      (LifecyclePhase::Created, "catalog_service_created"),
      (LifecyclePhase::Archived, "catalog_service_archived"),
      (LifecyclePhase::Restored, "catalog_service_restored"),
      (LifecyclePhase::Deleted, "catalog_service_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Order,
    display_name:          "Order",
    id_pattern:            r"^(?i)(?:[A-Z]{3}-\d{3}-)?(?:S|P)O-\d+$",
    storage_table:         "orders",
    storage_id_column:     "order_id",
    supports_detail_fetch: true,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    true,
    activity_types:        &[
      (LifecyclePhase::Created, "order_created"),
      (LifecyclePhase::Archived, "order_archived"),
      (LifecyclePhase::Restored, "order_restored"),
      (LifecyclePhase::Deleted, "order_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Report,
    display_name:          "Report",
    id_pattern:            r"^(?i)(?:[A-Z]{3}-\d{3}-)?RPT-\d+$",
    storage_table:         "reports",
    storage_id_column:     "report_id",
    supports_detail_fetch: true,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    true,
    activity_types:        &[
      (LifecyclePhase::Created, "report_created"),
      (LifecyclePhase::Archived, "report_archived"),
      (LifecyclePhase::Restored, "report_restored"),
      (LifecyclePhase::Deleted, "report_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Feedback,
    display_name:          "Feedback",
    id_pattern:            r"^(?i)(?:[A-Z]{3}-\d{3}-)?FBK-\d+$",
    // Feedback shares the reports table.
    storage_table:         "reports",
    storage_id_column:     "report_id",
    supports_detail_fetch: true,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    true,
    activity_types:        &[
      (LifecyclePhase::Created, "feedback_created"),
      (LifecyclePhase::Archived, "feedback_archived"),
      (LifecyclePhase::Restored, "feedback_restored"),
      (LifecyclePhase::Deleted, "feedback_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Product,
    display_name:          "Product",
    // Catalog items, not product orders (those use the PO token).
    id_pattern:            r"^(?i)PRD-\d{1,8}$",
    storage_table:         "product_catalog",
    storage_id_column:     "product_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      false,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "product_created"),
      (LifecyclePhase::Archived, "product_archived"),
      (LifecyclePhase::Restored, "product_restored"),
      (LifecyclePhase::Deleted, "product_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Manager,
    display_name:          "Manager",
    id_pattern:            r"^(?i)MGR-\d+$",
    storage_table:         "managers",
    storage_id_column:     "manager_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "manager_created"),
      (LifecyclePhase::Archived, "manager_archived"),
      (LifecyclePhase::Restored, "manager_restored"),
      (LifecyclePhase::Deleted, "manager_hard_deleted"),
    ],
    related_assignment:    Some(RelatedAssignment {
      activity_type: "contractor_assigned_to_manager",
      metadata_key:  "managerId",
    }),
  },
  EntityDefinition {
    kind:                  EntityKind::Contractor,
    display_name:          "Contractor",
    id_pattern:            r"^(?i)CON-\d+$",
    storage_table:         "contractors",
    storage_id_column:     "contractor_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "contractor_created"),
      (LifecyclePhase::Archived, "contractor_archived"),
      (LifecyclePhase::Restored, "contractor_restored"),
      (LifecyclePhase::Deleted, "contractor_hard_deleted"),
    ],
    related_assignment:    Some(RelatedAssignment {
      activity_type: "customer_assigned_to_contractor",
      metadata_key:  "contractorId",
    }),
  },
  EntityDefinition {
    kind:                  EntityKind::Customer,
    display_name:          "Customer",
    id_pattern:            r"^(?i)CUS-\d+$",
    storage_table:         "customers",
    storage_id_column:     "customer_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "customer_created"),
      (LifecyclePhase::Archived, "customer_archived"),
      (LifecyclePhase::Restored, "customer_restored"),
      (LifecyclePhase::Deleted, "customer_hard_deleted"),
    ],
    related_assignment:    Some(RelatedAssignment {
      activity_type: "center_assigned_to_customer",
      metadata_key:  "customerId",
    }),
  },
  EntityDefinition {
    kind:                  EntityKind::Center,
    display_name:          "Center",
    id_pattern:            r"^(?i)CEN-\d+$",
    storage_table:         "centers",
    storage_id_column:     "center_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "center_created"),
      (LifecyclePhase::Archived, "center_archived"),
      (LifecyclePhase::Restored, "center_restored"),
      (LifecyclePhase::Deleted, "center_hard_deleted"),
    ],
    related_assignment:    Some(RelatedAssignment {
      activity_type: "crew_assigned_to_center",
      metadata_key:  "centerId",
    }),
  },
  EntityDefinition {
    kind:                  EntityKind::Crew,
    display_name:          "Crew",
    id_pattern:            r"^(?i)CRW-\d+$",
    storage_table:         "crew",
    storage_id_column:     "crew_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "crew_created"),
      (LifecyclePhase::Archived, "crew_archived"),
      (LifecyclePhase::Restored, "crew_restored"),
      (LifecyclePhase::Deleted, "crew_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Warehouse,
    display_name:          "Warehouse",
    id_pattern:            r"^(?i)WAR-\d+$",
    storage_table:         "warehouses",
    storage_id_column:     "warehouse_id",
    supports_detail_fetch: false,
    supports_archive:      true,
    supports_delete:       true,
    supports_restore:      true,
    supports_history:      true,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "warehouse_created"),
      (LifecyclePhase::Archived, "warehouse_archived"),
      (LifecyclePhase::Restored, "warehouse_restored"),
      (LifecyclePhase::Deleted, "warehouse_hard_deleted"),
    ],
    related_assignment:    None,
  },
  EntityDefinition {
    kind:                  EntityKind::Unknown,
    display_name:          "Unknown Entity",
    id_pattern:            r"^$",
    storage_table:         "",
    storage_id_column:     "",
    supports_detail_fetch: false,
    supports_archive:      false,
    supports_delete:       false,
    supports_restore:      false,
    supports_history:      false,
    supports_tombstone:    false,
    activity_types:        &[
      (LifecyclePhase::Created, "unknown_created"),
      (LifecyclePhase::Archived, "unknown_archived"),
      (LifecyclePhase::Restored, "unknown_restored"),
      (LifecyclePhase::Deleted, "unknown_deleted"),
    ],
    related_assignment:    None,
  },
];

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  CATALOG
    .iter()
    .map(|def| Regex::new(def.id_pattern).expect("catalog pattern is valid"))
    .collect()
});

// ─── Lookup functions ────────────────────────────────────────────────────────

/// Get the definition for a kind. Total: every kind, `Unknown` included, has
/// exactly one catalog entry.
pub fn lookup(kind: EntityKind) -> &'static EntityDefinition {
  CATALOG
    .iter()
    .find(|def| def.kind == kind)
    .expect("catalog covers every kind")
}

/// Find the entity kind an identifier belongs to by testing each definition's
/// pattern in priority order. Returns the `unknown` definition if nothing
/// matches.
pub fn match_by_id_pattern(id: &str) -> &'static EntityDefinition {
  CATALOG
    .iter()
    .zip(PATTERNS.iter())
    .filter(|(def, _)| def.kind != EntityKind::Unknown)
    .find(|(_, pattern)| pattern.is_match(id))
    .map(|(def, _)| def)
    .unwrap_or_else(|| lookup(EntityKind::Unknown))
}

/// `true` when `id` is a valid identifier for `kind` specifically.
pub fn id_matches(kind: EntityKind, id: &str) -> bool {
  CATALOG
    .iter()
    .zip(PATTERNS.iter())
    .find(|(def, _)| def.kind == kind)
    .is_some_and(|(_, pattern)| pattern.is_match(id))
}

/// Capability check. Unknown kinds and actions read as "capability absent",
/// never as an error.
pub fn supports_lifecycle_action(kind: EntityKind, action: LifecycleAction) -> bool {
  lookup(kind).supports(action)
}

/// The exact activity-event name for a lifecycle phase of a kind.
pub fn activity_type_for(kind: EntityKind, phase: LifecyclePhase) -> Result<&'static str> {
  lookup(kind).activity_type_for(phase)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scoped_srv_resolves_to_service() {
    assert_eq!(match_by_id_pattern("CEN-010-SRV-001").kind, EntityKind::Service);
  }

  #[test]
  fn unscoped_srv_resolves_to_catalog_service() {
    assert_eq!(match_by_id_pattern("SRV-123").kind, EntityKind::CatalogService);
  }

  #[test]
  fn plain_tokens_resolve() {
    assert_eq!(match_by_id_pattern("RPT-789").kind, EntityKind::Report);
    assert_eq!(match_by_id_pattern("MGR-005").kind, EntityKind::Manager);
    assert_eq!(match_by_id_pattern("PO-42").kind, EntityKind::Order);
    assert_eq!(match_by_id_pattern("CEN-010-SO-7").kind, EntityKind::Order);
    assert_eq!(match_by_id_pattern("PRD-00000123").kind, EntityKind::Product);
  }

  #[test]
  fn patterns_are_case_insensitive() {
    assert_eq!(match_by_id_pattern("con-004").kind, EntityKind::Contractor);
  }

  #[test]
  fn unmatched_id_falls_back_to_unknown() {
    assert_eq!(match_by_id_pattern("INVALID-999").kind, EntityKind::Unknown);
    assert_eq!(match_by_id_pattern("").kind, EntityKind::Unknown);
  }

  #[test]
  fn unknown_has_no_capabilities() {
    let def = lookup(EntityKind::Unknown);
    assert!(!def.supports_archive);
    assert!(!def.supports_delete);
    assert!(!def.supports_restore);
    assert!(!def.supports_history);
    assert!(!def.supports_tombstone);
    assert!(!def.supports_detail_fetch);
  }

  #[test]
  fn product_does_not_support_history() {
    assert!(!supports_lifecycle_action(EntityKind::Product, LifecycleAction::History));
    assert!(supports_lifecycle_action(EntityKind::Product, LifecycleAction::Archive));
  }

  #[test]
  fn activity_types_are_exact() {
    assert_eq!(
      activity_type_for(EntityKind::Order, LifecyclePhase::Deleted).unwrap(),
      "order_hard_deleted"
    );
    assert_eq!(
      activity_type_for(EntityKind::CatalogService, LifecyclePhase::Deleted).unwrap(),
      "catalog_service_deleted"
    );
    assert_eq!(
      activity_type_for(EntityKind::Contractor, LifecyclePhase::Created).unwrap(),
      "contractor_created"
    );
  }

  #[test]
  fn kind_parse_round_trips() {
    assert_eq!(EntityKind::parse("catalogService").unwrap(), EntityKind::CatalogService);
    assert_eq!(EntityKind::parse("crew").unwrap(), EntityKind::Crew);
    assert!(EntityKind::parse("unknown").is_err());
    assert!(EntityKind::parse("gizmo").is_err());
  }

  #[test]
  fn id_matches_is_kind_specific() {
    assert!(id_matches(EntityKind::Manager, "MGR-005"));
    assert!(!id_matches(EntityKind::Manager, "CON-005"));
  }
}
