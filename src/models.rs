//! Data structures shared between planning and applying.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for an asset.
///
/// Identity never derives from the asset's path: paths may change over an
/// asset's life and are only used for display, membership scoping and
/// extension checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
  /// Wrap a raw identifier, rejecting empty strings.
  pub fn new(raw: impl Into<String>) -> Option<Self> {
    let raw = raw.into();
    if raw.trim().is_empty() {
      None
    } else {
      Some(Self(raw))
    }
  }

  /// Borrow the underlying identifier.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for AssetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Opaque content-type filter handed through to the asset store.
///
/// The planner never interprets the filter itself; what a "type" means is
/// entirely up to the store that answers the listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeFilter(String);

impl TypeFilter {
  /// Wrap a raw filter expression.
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into())
  }

  /// Borrow the raw filter expression.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// Per-pass view of a single asset, built once at ingestion.
///
/// Ingestion is the only place casing is normalised: `normalized_path` is the
/// lower-cased form used for every extension test, while `path` keeps the
/// original casing for display and address construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
  /// Stable identity of the asset.
  pub id: AssetId,
  /// Display path with original casing, forward slashes enforced.
  pub path: String,
  /// Lower-cased path used for extension and label checks.
  pub normalized_path: String,
  /// Labels attached to the asset in the external store.
  pub labels: BTreeSet<String>,
}

impl AssetRecord {
  /// Build a record from raw store data, normalising separators and casing.
  ///
  /// Returns `None` for blank paths; an asset we cannot address is treated as
  /// excluded from the candidate set rather than propagated as a fault.
  pub fn ingest(id: AssetId, path: &str, labels: BTreeSet<String>) -> Option<Self> {
    let path = path.trim().replace('\\', "/");
    if path.is_empty() {
      return None;
    }
    let normalized_path = path.to_lowercase();
    Some(Self {
      id,
      path,
      normalized_path,
      labels,
    })
  }

  /// Whether the asset's path ends with any of the given lower-cased extensions.
  pub fn has_extension_in(&self, extensions: &BTreeSet<String>) -> bool {
    extensions
      .iter()
      .any(|ext| self.normalized_path.ends_with(ext.as_str()))
  }

  /// Whether the asset carries the given label.
  pub fn has_label(&self, label: &str) -> bool {
    self.labels.contains(label)
  }
}

/// A single recorded entry inside an existing bundle group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
  /// Identity of the recorded asset.
  pub asset_id: AssetId,
  /// Address the asset was recorded under.
  pub address: String,
  /// Marks sub-entries of compound assets; these are never reconciled.
  #[serde(default)]
  pub nested: bool,
}

/// Read-only snapshot of one existing bundle group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
  /// Group name as recorded in the external store.
  pub name: String,
  /// Entries currently recorded in the group.
  pub members: Vec<GroupMember>,
}

/// Settings template applied to newly created groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTemplate {
  /// Template name used for lookup.
  pub name: String,
  /// Opaque default settings copied onto each new group.
  #[serde(default)]
  pub defaults: BTreeMap<String, String>,
}

/// Direction of a single reconciliation edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
  /// Create the entry, or move it into the target group if recorded elsewhere.
  Create,
  /// Remove the recorded entry.
  Remove,
}

/// One entry-level edit scheduled against a bundle group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAction {
  /// Whether the entry is created/moved or removed.
  pub kind: ActionKind,
  /// Target group name, prefix included.
  pub group: String,
  /// Identity of the affected asset.
  pub asset_id: AssetId,
  /// Address the entry is (or was) recorded under.
  pub address: String,
}

/// Pure output of one planning pass, not yet applied.
///
/// A plan is a function of the graph, the policy inputs and the external
/// snapshot it was computed from; any external change invalidates it, so it
/// must be applied against the same snapshot or allowed to fail softly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  /// Managed groups that must be created.
  pub groups_to_create: BTreeSet<String>,
  /// Managed groups that must be removed.
  pub groups_to_remove: BTreeSet<String>,
  /// Ordered entry-level edits.
  pub asset_actions: Vec<AssetAction>,
}

impl Plan {
  /// Whether the plan contains no edits at all.
  pub fn is_empty(&self) -> bool {
    self.groups_to_create.is_empty()
      && self.groups_to_remove.is_empty()
      && self.asset_actions.is_empty()
  }
}
