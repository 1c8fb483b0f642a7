//! Layout description tying folder names, group names and addresses together.

use crate::models::TypeFilter;

/// Owned description of where bundled content lives and how groups are named.
///
/// The group prefix is the only marker distinguishing managed groups from
/// unrelated ones. Changing it after groups exist orphans every previously
/// created group, so it must stay stable for the lifetime of the data.
#[derive(Debug, Clone)]
pub struct PlannerLayout {
  /// Root under which every asset in the project lives.
  pub content_root: String,
  /// Name of the folder scanned for bundle subfolders, under the content root.
  pub bundle_tree_name: String,
  /// Prefix carried by every managed group name.
  pub group_prefix: String,
  /// Name of the group-settings template used for newly created groups.
  pub group_template: String,
  /// Content-type filter handed to the asset store when listing assets.
  pub type_filter: TypeFilter,
}

impl PlannerLayout {
  /// Full path of the scanned bundle tree.
  pub fn scan_root(&self) -> String {
    format!("{}/{}", self.content_root, self.bundle_tree_name)
  }

  /// Full path of one subfolder inside the scanned tree.
  pub fn folder_scope(&self, folder: &str) -> String {
    format!("{}/{}", self.scan_root(), folder)
  }

  /// Managed group name for a scanned subfolder.
  pub fn group_name(&self, folder: &str) -> String {
    format!("{}{}", self.group_prefix, folder)
  }

  /// Whether a recorded group name belongs to this planner.
  pub fn is_managed_group(&self, group_name: &str) -> bool {
    group_name.starts_with(&self.group_prefix)
  }

  /// Folder name encoded in a managed group name, if any.
  pub fn folder_for_group<'a>(&self, group_name: &'a str) -> Option<&'a str> {
    group_name.strip_prefix(&self.group_prefix)
  }

  /// Produce the canonical address for an asset inside the bundle tree.
  ///
  /// The scanned-root prefix is stripped and forward slashes are enforced so
  /// the resulting address is identical on every platform, regardless of the
  /// native separator used when the asset was discovered.
  pub fn bundle_address(&self, path: &str) -> String {
    let normalised = path.replace('\\', "/");
    let preamble = format!("{}/", self.scan_root());
    match normalised.strip_prefix(&preamble) {
      Some(stripped) => stripped.to_string(),
      None => normalised,
    }
  }
}
