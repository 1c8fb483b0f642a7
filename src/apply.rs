//! Executes a previously computed plan against the bundle store.

use crate::error::ApplyError;
use crate::models::{ActionKind, Plan};
use crate::store::BundleStore;

/// Counters describing what one apply actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
  /// Groups created from the template.
  pub groups_created: usize,
  /// Groups removed by name.
  pub groups_removed: usize,
  /// Entries created or moved into their target group.
  pub entries_created: usize,
  /// Entries removed.
  pub entries_removed: usize,
  /// Actions skipped because their target group no longer exists.
  pub skipped_missing_group: usize,
  /// Remove actions whose entry was already gone.
  pub stale_entries: usize,
}

/// Apply a plan, best-effort per action.
///
/// The template lookup is the only fail-closed step: without a template no
/// group can be configured, so the apply aborts before mutating anything.
/// Afterwards no single action's failure stops the rest. A missing target
/// group is an expected benign race between planning and applying, and an
/// already-removed entry is only worth a diagnostic.
pub fn apply(
  plan: &Plan,
  template_name: &str,
  store: &mut dyn BundleStore,
) -> Result<ApplyStats, ApplyError> {
  let Some(template) = store.resolve_template(template_name) else {
    tracing::warn!(template = template_name, "group template not found, aborting apply");
    return Err(ApplyError::TemplateNotFound {
      name: template_name.to_string(),
    });
  };

  let mut stats = ApplyStats::default();

  for name in &plan.groups_to_create {
    store.create_group(name, &template);
    stats.groups_created += 1;
  }
  for name in &plan.groups_to_remove {
    store.remove_group(name);
    stats.groups_removed += 1;
  }

  let current_groups = store.group_names();

  for action in &plan.asset_actions {
    if !current_groups.contains(&action.group) {
      stats.skipped_missing_group += 1;
      continue;
    }
    match action.kind {
      ActionKind::Create => {
        store.create_or_move_entry(&action.group, &action.asset_id, &action.address);
        stats.entries_created += 1;
      }
      ActionKind::Remove => {
        if store.remove_entry(&action.asset_id) {
          stats.entries_removed += 1;
        } else {
          tracing::debug!(
            asset = %action.asset_id,
            address = %action.address,
            "entry already removed"
          );
          stats.stale_entries += 1;
        }
      }
    }
  }

  tracing::info!(
    groups_created = stats.groups_created,
    groups_removed = stats.groups_removed,
    entries_created = stats.entries_created,
    entries_removed = stats.entries_removed,
    "apply finished"
  );
  Ok(stats)
}
