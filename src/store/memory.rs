//! JSON-backed in-memory store implementing both collaborator traits.
//!
//! Backs the command-line workflow and the test suite: the asset table with
//! its declared dependencies, plus the recorded groups and available
//! templates, round-trips through one JSON document.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{AssetId, GroupMember, GroupSnapshot, GroupTemplate, TypeFilter};
use crate::store::{AssetStore, BundleStore};

/// One asset as recorded in the project document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredAsset {
  /// Stable identifier.
  pub id: String,
  /// Project-relative path with forward slashes.
  pub path: String,
  /// Content type matched against `t:<type>` filter tokens.
  pub asset_type: String,
  /// On-disk size in bytes.
  pub size_bytes: u64,
  /// Labels attached to the asset.
  pub labels: BTreeSet<String>,
  /// Identifiers of directly required assets.
  pub dependencies: Vec<String>,
}

/// One recorded entry of a stored group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredEntry {
  /// Identifier of the recorded asset.
  pub asset_id: String,
  /// Address the asset is recorded under.
  pub address: String,
  /// Sub-entry of a compound asset.
  pub nested: bool,
}

/// One bundle group as recorded in the project document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredGroup {
  /// Group name, prefix included for managed groups.
  pub name: String,
  /// Name of the template the group was created from, when known.
  pub template: Option<String>,
  /// Settings carried by the group.
  pub settings: BTreeMap<String, String>,
  /// Recorded entries.
  pub entries: Vec<StoredEntry>,
}

/// In-memory project store, loadable from and persistable to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryStore {
  /// All assets known to the project.
  pub assets: Vec<StoredAsset>,
  /// All recorded bundle groups, managed or not.
  pub groups: Vec<StoredGroup>,
  /// Group-settings templates available for new groups.
  pub templates: Vec<GroupTemplate>,
  /// Whether the project currently has unsaved editing state.
  pub unsaved_state: bool,
}

impl MemoryStore {
  /// Load a project document from a JSON file.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Persist the project document as prettified JSON.
  pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let contents = serde_json::to_string_pretty(self).map_err(|source| StoreError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    fs::write(path, contents).map_err(|source| StoreError::Io {
      path: path.to_path_buf(),
      source,
    })
  }

  fn asset_by_id(&self, id: &AssetId) -> Option<&StoredAsset> {
    self.assets.iter().find(|asset| asset.id == id.as_str())
  }

  fn group_mut(&mut self, name: &str) -> Option<&mut StoredGroup> {
    self.groups.iter_mut().find(|group| group.name == name)
  }
}

/// Whether `path` sits underneath the directory `scope`.
fn in_scope(path: &str, scope: &str) -> bool {
  path
    .strip_prefix(scope)
    .is_some_and(|rest| rest.starts_with('/'))
}

/// Parse the `t:<type>` tokens of a filter expression.
///
/// An expression with no recognised tokens matches every asset, which lets
/// tests and small projects skip typing altogether.
fn filter_types(filter: &TypeFilter) -> BTreeSet<&str> {
  filter
    .as_str()
    .split_whitespace()
    .filter_map(|token| token.strip_prefix("t:"))
    .filter(|name| !name.is_empty())
    .collect()
}

impl AssetStore for MemoryStore {
  fn has_unsaved_state(&self) -> bool {
    self.unsaved_state
  }

  fn list_subfolders(&self, root: &str) -> BTreeSet<String> {
    let mut folders = BTreeSet::new();
    for asset in &self.assets {
      if let Some(rest) = asset.path.strip_prefix(root) {
        if let Some(rest) = rest.strip_prefix('/') {
          // Only paths with a component below the folder mark it as a directory.
          if let Some((folder, remainder)) = rest.split_once('/') {
            if !folder.is_empty() && !remainder.is_empty() {
              folders.insert(folder.to_string());
            }
          }
        }
      }
    }
    folders
  }

  fn find_assets_by_type_filter(&self, filter: &TypeFilter, scopes: &[String]) -> BTreeSet<AssetId> {
    let types = filter_types(filter);
    self
      .assets
      .iter()
      .filter(|asset| types.is_empty() || types.contains(asset.asset_type.as_str()))
      .filter(|asset| scopes.iter().any(|scope| in_scope(&asset.path, scope)))
      .filter_map(|asset| AssetId::new(asset.id.clone()))
      .collect()
  }

  fn resolve_path(&self, id: &AssetId) -> Option<String> {
    self.asset_by_id(id).map(|asset| asset.path.clone())
  }

  fn dependencies(&self, id: &AssetId) -> BTreeSet<AssetId> {
    self
      .asset_by_id(id)
      .map(|asset| {
        asset
          .dependencies
          .iter()
          .filter_map(|dep| AssetId::new(dep.clone()))
          .collect()
      })
      .unwrap_or_default()
  }

  fn labels(&self, id: &AssetId) -> BTreeSet<String> {
    self
      .asset_by_id(id)
      .map(|asset| asset.labels.clone())
      .unwrap_or_default()
  }

  fn file_size_bytes(&self, path: &str) -> u64 {
    self
      .assets
      .iter()
      .find(|asset| asset.path == path)
      .map(|asset| asset.size_bytes)
      .unwrap_or(0)
  }

  fn existing_groups(&self) -> Vec<GroupSnapshot> {
    self
      .groups
      .iter()
      .map(|group| GroupSnapshot {
        name: group.name.clone(),
        members: group
          .entries
          .iter()
          .filter_map(|entry| match AssetId::new(entry.asset_id.clone()) {
            Some(asset_id) => Some(GroupMember {
              asset_id,
              address: entry.address.clone(),
              nested: entry.nested,
            }),
            None => {
              tracing::warn!(address = %entry.address, "recorded entry has no asset id");
              None
            }
          })
          .collect(),
      })
      .collect()
  }
}

impl BundleStore for MemoryStore {
  fn resolve_template(&self, name: &str) -> Option<GroupTemplate> {
    self
      .templates
      .iter()
      .find(|template| template.name == name)
      .cloned()
  }

  fn create_group(&mut self, name: &str, template: &GroupTemplate) {
    if self.group_mut(name).is_some() {
      return;
    }
    self.groups.push(StoredGroup {
      name: name.to_string(),
      template: Some(template.name.clone()),
      settings: template.defaults.clone(),
      entries: Vec::new(),
    });
  }

  fn remove_group(&mut self, name: &str) {
    self.groups.retain(|group| group.name != name);
  }

  fn group_names(&self) -> BTreeSet<String> {
    self.groups.iter().map(|group| group.name.clone()).collect()
  }

  fn create_or_move_entry(&mut self, group: &str, asset_id: &AssetId, address: &str) {
    for existing in &mut self.groups {
      existing.entries.retain(|entry| entry.asset_id != asset_id.as_str());
    }
    if let Some(target) = self.group_mut(group) {
      target.entries.push(StoredEntry {
        asset_id: asset_id.as_str().to_string(),
        address: address.to_string(),
        nested: false,
      });
    }
  }

  fn remove_entry(&mut self, asset_id: &AssetId) -> bool {
    let mut removed = false;
    for group in &mut self.groups {
      let before = group.entries.len();
      group.entries.retain(|entry| entry.asset_id != asset_id.as_str());
      removed |= group.entries.len() != before;
    }
    removed
  }
}
