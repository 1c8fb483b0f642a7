//! Discoverable configuration describing layout and policy knobs.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::TypeFilter;
use crate::policy::PolicyConfig;
use crate::project::PlannerLayout;

const DEFAULT_CONFIG_FILE: &str = "bundle-planner.config.json";

/// On-disk configuration for one planning setup.
///
/// Every field has a default so a project can start with an empty file, or
/// none at all, and override selectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerConfig {
  /// Root under which every asset in the project lives.
  pub content_root: String,
  /// Folder under the content root whose subfolders become groups.
  pub bundle_tree_name: String,
  /// Prefix carried by every managed group name. Never change it once groups
  /// exist; it is the only marker distinguishing managed groups.
  pub group_prefix: String,
  /// Group-settings template used when creating groups.
  pub group_template: String,
  /// Content-type filter handed to the asset store.
  pub type_filter: String,
  /// Extensions that are always independently addressable.
  pub always_include_extensions: BTreeSet<String>,
  /// Extensions that are never bundled.
  pub ignore_extensions: BTreeSet<String>,
  /// Label marking force-included assets.
  pub force_label: String,
  /// Whether assets nothing refers to are excluded.
  pub exclude_unreferenced: bool,
  /// Assets smaller than this many bytes are never bundled.
  pub min_size_bytes: u64,
}

impl Default for PlannerConfig {
  fn default() -> Self {
    let policy = PolicyConfig::default();
    Self {
      content_root: "Assets".into(),
      bundle_tree_name: "AutoBundles".into(),
      group_prefix: "(Auto) ".into(),
      group_template: "Packed Assets".into(),
      type_filter: "t:AudioClip t:Material t:Mesh t:Model t:Prefab t:Scene t:Shader t:Texture"
        .into(),
      always_include_extensions: policy.always_include_extensions,
      ignore_extensions: policy.ignore_extensions,
      force_label: policy.force_label,
      exclude_unreferenced: policy.exclude_unreferenced,
      min_size_bytes: policy.min_size_bytes,
    }
  }
}

impl PlannerConfig {
  /// Attempt to load configuration from the given directory.
  ///
  /// When the configuration file does not exist or fails to parse, defaults
  /// are used so callers can keep operating with sensible assumptions.
  pub fn discover(dir: &Path) -> Self {
    Self::from_path(&dir.join(DEFAULT_CONFIG_FILE)).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Split the configuration into its layout and policy halves.
  pub fn split(self) -> (PlannerLayout, PolicyConfig) {
    let layout = PlannerLayout {
      content_root: self.content_root,
      bundle_tree_name: self.bundle_tree_name,
      group_prefix: self.group_prefix,
      group_template: self.group_template,
      type_filter: TypeFilter::new(self.type_filter),
    };
    let policy = PolicyConfig {
      always_include_extensions: self.always_include_extensions,
      ignore_extensions: self.ignore_extensions,
      force_label: self.force_label,
      exclude_unreferenced: self.exclude_unreferenced,
      min_size_bytes: self.min_size_bytes,
    };
    (layout, policy)
  }
}
