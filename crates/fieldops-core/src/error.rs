//! Error types for `fieldops-core`.
//!
//! Business errors (`InvalidIdentifier`, `NotFound`, the `Unsupported*`
//! family) are caller errors and translate to 4xx responses. `Storage` wraps
//! backend failures and translates to 5xx.

use thiserror::Error;

use crate::catalog::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The supplied identifier was empty or malformed. Carries the name of the
  /// offending field.
  #[error("invalid {0} identifier")]
  InvalidIdentifier(&'static str),

  /// The referenced entity does not exist, or is soft-archived on a path
  /// that only accepts live rows.
  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: String },

  #[error("unknown entity type: {0:?}")]
  UnknownEntityType(String),

  /// The catalog says this entity kind does not support the operation.
  #[error("{kind} does not support {action}")]
  UnsupportedEntity {
    kind:   EntityKind,
    action: &'static str,
  },

  /// The catalog carries no activity-type mapping for this lifecycle phase.
  #[error("{kind} has no activity type for phase {phase}")]
  UnsupportedPhase {
    kind:  EntityKind,
    phase: &'static str,
  },

  /// Hard deletion requires the row to be archived first.
  #[error("{kind} {id} must be archived before hard deletion")]
  NotArchived { kind: EntityKind, id: String },

  /// Hard deletion refused: the entity still owns live children.
  #[error("cannot hard delete {kind} {id}: {count} active children")]
  HasActiveChildren {
    kind:  EntityKind,
    id:    String,
    count: i64,
  },

  /// No hard-deletion event exists for the target.
  #[error("no deletion record found for {kind} {id}")]
  NoDeletionRecord { kind: EntityKind, id: String },

  /// A hard-deletion event exists but carries no snapshot.
  #[error("snapshot not available for deleted {kind} {id}")]
  SnapshotUnavailable { kind: EntityKind, id: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Transaction or connectivity failure in the storage backend.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure. Not retried automatically; reported as 5xx.
  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(err))
  }

  pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  /// `true` for errors the caller caused; `false` for system failures.
  pub fn is_business_error(&self) -> bool {
    !matches!(self, Self::Storage(_) | Self::Serialization(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
