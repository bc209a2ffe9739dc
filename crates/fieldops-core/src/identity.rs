//! Identity normalisation — canonicalises externally supplied identifiers
//! into the catalog's `PREFIX-###` grammar.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A normalised entity identifier: uppercased, trimmed, numeric segment
/// zero-padded to three digits where the value follows the prefixed-id shape.
///
/// Only [`normalize`] and the storage layer construct these; free-form input
/// never becomes a `CanonicalId` without passing through normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }
}

impl AsRef<str> for CanonicalId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CanonicalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl PartialEq<str> for CanonicalId {
  fn eq(&self, other: &str) -> bool {
    self.0 == other
  }
}

impl PartialEq<&str> for CanonicalId {
  fn eq(&self, other: &&str) -> bool {
    self.0 == *other
  }
}

static ID_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([A-Za-z]+)-?(\d+)$").expect("id shape pattern is valid"));

/// Canonicalise a free-form identifier.
///
/// Trims and uppercases; values matching `PREFIX-NUMBER` (letters, optional
/// dash, digits) have the numeric segment left-padded to three digits and are
/// re-joined as `PREFIX-###`. Anything else is returned uppercased and
/// trimmed, unchanged. Empty or whitespace-only input yields `None` — callers
/// must treat that as "invalid identifier", never substitute a placeholder on
/// a mutating path.
pub fn normalize(raw: &str) -> Option<CanonicalId> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  let upper = trimmed.to_uppercase();
  match ID_SHAPE.captures(&upper) {
    Some(caps) => {
      let prefix = &caps[1];
      let digits = &caps[2];
      Some(CanonicalId(format!("{prefix}-{digits:0>3}")))
    }
    None => Some(CanonicalId(upper)),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pads_numeric_segment_to_three_digits() {
    assert_eq!(normalize("con-1").unwrap(), "CON-001");
    assert_eq!(normalize("MGR-42").unwrap(), "MGR-042");
    assert_eq!(normalize("crw007").unwrap(), "CRW-007");
  }

  #[test]
  fn longer_numeric_segments_are_preserved() {
    assert_eq!(normalize("PRD-00000123").unwrap(), "PRD-00000123");
    assert_eq!(normalize("rpt-1234").unwrap(), "RPT-1234");
  }

  #[test]
  fn non_matching_values_are_uppercased_and_trimmed() {
    assert_eq!(normalize("  cen-010-srv-001 ").unwrap(), "CEN-010-SRV-001");
    assert_eq!(normalize("freedom_exe").unwrap(), "FREEDOM_EXE");
  }

  #[test]
  fn empty_input_is_rejected() {
    assert!(normalize("").is_none());
    assert!(normalize("   ").is_none());
    assert!(normalize("\t\n").is_none());
  }
}
