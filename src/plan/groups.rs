//! Group-level diff between scanned folders and recorded managed groups.

use std::collections::BTreeSet;

use crate::plan::AnalysisReport;
use crate::project::PlannerLayout;

/// Managed groups to create and to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDiff {
  /// Desired groups with no recorded counterpart.
  pub to_create: BTreeSet<String>,
  /// Recorded managed groups whose folder no longer exists.
  pub to_remove: BTreeSet<String>,
}

/// Diff scanned folder names against recorded group names.
///
/// Folder and group names match by exact string equality after stripping the
/// managed prefix; unrelated groups are invisible to the diff.
pub fn diff_groups(
  layout: &PlannerLayout,
  folders: &BTreeSet<String>,
  existing_names: &BTreeSet<String>,
  report: &mut AnalysisReport,
) -> GroupDiff {
  let desired: BTreeSet<String> = folders.iter().map(|folder| layout.group_name(folder)).collect();
  let managed: BTreeSet<String> = existing_names
    .iter()
    .filter(|name| layout.is_managed_group(name))
    .cloned()
    .collect();

  let to_create: BTreeSet<String> = desired.difference(&managed).cloned().collect();
  let to_remove: BTreeSet<String> = managed.difference(&desired).cloned().collect();

  for name in &to_create {
    report.push_create_group(name);
  }
  for name in &to_remove {
    report.push_remove_group(name);
  }

  GroupDiff {
    to_create,
    to_remove,
  }
}
