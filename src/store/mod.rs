//! External collaborator interfaces.
//!
//! The planning side only ever consumes pure snapshot queries through
//! [`AssetStore`]; the apply side is the sole consumer of the mutating
//! [`BundleStore`]. Splitting the two keeps planning trivially repeatable and
//! confines side effects to one module.

mod memory;

pub use memory::{MemoryStore, StoredAsset, StoredEntry, StoredGroup};

use std::collections::BTreeSet;

use crate::models::{AssetId, GroupSnapshot, GroupTemplate, TypeFilter};

/// Read-only queries answered by the external asset store.
///
/// Every method is a blocking, single-shot query with no retry or timeout
/// logic in the core; answers must stay stable for the duration of one
/// planning pass.
pub trait AssetStore {
  /// Whether the store currently holds unsaved editing state.
  ///
  /// Planning refuses to run against a dirty store, since the on-disk
  /// snapshot and the in-editor state could disagree about dependencies.
  fn has_unsaved_state(&self) -> bool;

  /// Names of the immediate subfolders of `root`.
  fn list_subfolders(&self, root: &str) -> BTreeSet<String>;

  /// Identifiers of assets matching the type filter under any of the scopes.
  fn find_assets_by_type_filter(&self, filter: &TypeFilter, scopes: &[String]) -> BTreeSet<AssetId>;

  /// Current path of an asset, if it still exists.
  fn resolve_path(&self, id: &AssetId) -> Option<String>;

  /// Declared direct dependencies of an asset.
  fn dependencies(&self, id: &AssetId) -> BTreeSet<AssetId>;

  /// Labels attached to an asset.
  fn labels(&self, id: &AssetId) -> BTreeSet<String>;

  /// On-disk byte size of the file at `path`, zero when unknown.
  fn file_size_bytes(&self, path: &str) -> u64;

  /// Snapshot of every existing bundle group and its recorded entries.
  fn existing_groups(&self) -> Vec<GroupSnapshot>;
}

/// Mutating operations against the external bundle store.
pub trait BundleStore {
  /// Look up a group-settings template by name.
  fn resolve_template(&self, name: &str) -> Option<GroupTemplate>;

  /// Create a group with the given template's defaults applied.
  fn create_group(&mut self, name: &str, template: &GroupTemplate);

  /// Remove a group by exact name match.
  fn remove_group(&mut self, name: &str);

  /// Current group names, used as the post-create/remove lookup table.
  fn group_names(&self) -> BTreeSet<String>;

  /// Insert the asset into the group under the given address, moving it out
  /// of any group it was previously recorded in.
  fn create_or_move_entry(&mut self, group: &str, asset_id: &AssetId, address: &str);

  /// Remove the asset's recorded entry. Returns `false` when no entry existed.
  fn remove_entry(&mut self, asset_id: &AssetId) -> bool;
}
