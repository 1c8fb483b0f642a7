//! Entry-level diff between classified candidates and recorded membership.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{DependencyGraph, ReachabilityIndex};
use crate::models::{ActionKind, AssetAction, AssetId, GroupSnapshot};
use crate::plan::AnalysisReport;
use crate::policy::{BundlingPolicy, Classification, ExclusionTally};
use crate::project::PlannerLayout;
use crate::store::AssetStore;

/// Borrowed inputs of the asset diff, all read-only.
pub struct AssetDiffContext<'a> {
  /// Layout mapping folders to groups and paths to addresses.
  pub layout: &'a PlannerLayout,
  /// The rule chain.
  pub policy: &'a BundlingPolicy,
  /// Dependency graph of the current pass.
  pub graph: &'a DependencyGraph,
  /// Ultimate-parent index of the current pass.
  pub reachability: &'a ReachabilityIndex,
  /// External asset store, consulted for listings and sizes only.
  pub store: &'a dyn AssetStore,
}

/// Entry-level edits plus the exclusion counters gathered on the way.
#[derive(Debug, Default)]
pub struct AssetDiff {
  /// Ordered create/remove edits.
  pub actions: Vec<AssetAction>,
  /// Counters behind the summary report lines.
  pub tally: ExclusionTally,
}

/// Compute the entry-level edits for every scanned folder.
///
/// Creation only considers assets still present on disk; retraction walks the
/// recorded membership of every managed group, so an asset that fell out of
/// policy is retracted even though no listing returns it any more. Every
/// non-nested recorded member whose address is outside the expressly bundled
/// set yields exactly one remove.
pub fn diff_assets(
  ctx: &AssetDiffContext<'_>,
  folders: &BTreeSet<String>,
  existing: &[GroupSnapshot],
  report: &mut AnalysisReport,
) -> AssetDiff {
  let recorded_anywhere: BTreeSet<&AssetId> = existing
    .iter()
    .flat_map(|group| group.members.iter())
    .map(|member| &member.asset_id)
    .collect();
  let managed: BTreeMap<&str, &GroupSnapshot> = existing
    .iter()
    .filter(|group| ctx.layout.is_managed_group(&group.name))
    .map(|group| (group.name.as_str(), group))
    .collect();

  let mut diff = AssetDiff::default();
  let mut reconciled: BTreeSet<String> = BTreeSet::new();

  for folder in folders {
    let group = ctx.layout.group_name(folder);
    let scope = vec![ctx.layout.folder_scope(folder)];
    let candidates = ctx
      .store
      .find_assets_by_type_filter(&ctx.layout.type_filter, &scope);

    let mut express: BTreeSet<String> = BTreeSet::new();
    for id in &candidates {
      // Assets rejected before graph construction were never candidates.
      let Some(record) = ctx.graph.node(id) else {
        continue;
      };

      match ctx
        .policy
        .classify(record, ctx.graph, ctx.reachability, ctx.store)
      {
        Classification::NeverBundle(reason) => diff.tally.record(reason),
        Classification::Bundle(_) => {
          let address = ctx.layout.bundle_address(&record.path);
          if recorded_anywhere.contains(id) {
            report.push_keep_or_move(&address);
          } else {
            report.push_add(&address);
          }
          express.insert(address.clone());
          diff.actions.push(AssetAction {
            kind: ActionKind::Create,
            group: group.clone(),
            asset_id: id.clone(),
            address,
          });
        }
      }
    }

    reconciled.insert(group.clone());
    if let Some(snapshot) = managed.get(group.as_str()) {
      retract_stale_members(snapshot, &express, &mut diff.actions, report);
    }
  }

  // Managed groups whose folder vanished keep no entries: their expressly
  // bundled set is empty, so every recorded member is retracted.
  for (name, snapshot) in &managed {
    if reconciled.contains(*name) {
      continue;
    }
    retract_stale_members(snapshot, &BTreeSet::new(), &mut diff.actions, report);
  }

  diff
}

fn retract_stale_members(
  snapshot: &GroupSnapshot,
  express: &BTreeSet<String>,
  actions: &mut Vec<AssetAction>,
  report: &mut AnalysisReport,
) {
  for member in &snapshot.members {
    if member.nested {
      continue;
    }
    if express.contains(&member.address) {
      continue;
    }
    report.push_remove(&member.address);
    actions.push(AssetAction {
      kind: ActionKind::Remove,
      group: snapshot.name.clone(),
      asset_id: member.asset_id.clone(),
      address: member.address.clone(),
    });
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::models::{GroupMember, TypeFilter};
  use crate::policy::PolicyConfig;
  use crate::store::{MemoryStore, StoredAsset};

  fn layout() -> PlannerLayout {
    PlannerLayout {
      content_root: "Assets".into(),
      bundle_tree_name: "AutoBundles".into(),
      group_prefix: "(Auto) ".into(),
      group_template: "Packed Assets".into(),
      type_filter: TypeFilter::new(""),
    }
  }

  fn asset(id: &str, path: &str, size: u64, deps: &[&str]) -> StoredAsset {
    StoredAsset {
      id: id.to_string(),
      path: path.to_string(),
      asset_type: "Mesh".to_string(),
      size_bytes: size,
      dependencies: deps.iter().map(|dep| dep.to_string()).collect(),
      ..StoredAsset::default()
    }
  }

  fn id(raw: &str) -> AssetId {
    AssetId::new(raw).unwrap()
  }

  struct Harness {
    layout: PlannerLayout,
    policy: BundlingPolicy,
    graph: DependencyGraph,
    reachability: ReachabilityIndex,
    store: MemoryStore,
  }

  impl Harness {
    fn new(store: MemoryStore) -> Self {
      let layout = layout();
      let policy = BundlingPolicy::new(PolicyConfig::default());
      let scan = store.find_assets_by_type_filter(
        &layout.type_filter,
        &[layout.content_root.clone()],
      );
      let graph = DependencyGraph::build(&scan, &store, |record| policy.admits(record));
      let reachability = ReachabilityIndex::build(&graph);
      Self {
        layout,
        policy,
        graph,
        reachability,
        store,
      }
    }

    fn run(&self, report: &mut AnalysisReport) -> AssetDiff {
      let ctx = AssetDiffContext {
        layout: &self.layout,
        policy: &self.policy,
        graph: &self.graph,
        reachability: &self.reachability,
        store: &self.store,
      };
      let folders = self.store.list_subfolders(&self.layout.scan_root());
      let existing = self.store.existing_groups();
      diff_assets(&ctx, &folders, &existing, report)
    }
  }

  /// Two required scenes referencing a large mesh: the mesh is created.
  fn bundleable_forest() -> Vec<StoredAsset> {
    vec![
      asset("scene_a", "Assets/AutoBundles/Forest/a.scene", 1, &["tree"]),
      asset("scene_b", "Assets/AutoBundles/Forest/b.scene", 1, &["tree"]),
      asset("tree", "Assets/AutoBundles/Forest/Tree.mesh", 50_000, &[]),
    ]
  }

  #[test]
  fn bundleable_assets_become_create_actions() {
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    let creates: Vec<&AssetAction> = diff
      .actions
      .iter()
      .filter(|action| action.kind == ActionKind::Create)
      .collect();
    // Both scenes are force-included, the mesh passes the whole chain.
    assert_eq!(creates.len(), 3);
    let tree = creates
      .iter()
      .find(|action| action.asset_id == id("tree"))
      .unwrap();
    assert_eq!(tree.group, "(Auto) Forest");
    assert_eq!(tree.address, "Forest/Tree.mesh");
    assert!(report.lines().contains(&"Add:Forest/Tree.mesh".to_string()));
  }

  #[test]
  fn unreferenced_assets_never_appear_as_creates() {
    let harness = Harness::new(MemoryStore {
      assets: vec![asset(
        "orphan",
        "Assets/AutoBundles/Forest/orphan.mesh",
        50_000,
        &[],
      )],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    assert!(diff.actions.is_empty());
    assert_eq!(diff.tally.no_references, 1);
  }

  #[test]
  fn recorded_assets_log_keep_or_move() {
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      groups: vec![crate::store::StoredGroup {
        name: "(Auto) Forest".to_string(),
        entries: vec![crate::store::StoredEntry {
          asset_id: "tree".to_string(),
          address: "Forest/Tree.mesh".to_string(),
          nested: false,
        }],
        ..crate::store::StoredGroup::default()
      }],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    assert!(
      report
        .lines()
        .contains(&"Keep or move:Forest/Tree.mesh".to_string())
    );
    // Still recorded under its current address: nothing to retract.
    assert!(
      diff
        .actions
        .iter()
        .all(|action| action.kind == ActionKind::Create)
    );
  }

  #[test]
  fn stale_recorded_entries_are_retracted_exactly_once() {
    // "ghost" was recorded but no longer exists on disk.
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      groups: vec![crate::store::StoredGroup {
        name: "(Auto) Forest".to_string(),
        entries: vec![crate::store::StoredEntry {
          asset_id: "ghost".to_string(),
          address: "Tree.fbx".to_string(),
          nested: false,
        }],
        ..crate::store::StoredGroup::default()
      }],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    let removes: Vec<&AssetAction> = diff
      .actions
      .iter()
      .filter(|action| action.kind == ActionKind::Remove)
      .collect();
    assert_eq!(removes.len(), 1);
    assert_eq!(removes[0].group, "(Auto) Forest");
    assert_eq!(removes[0].address, "Tree.fbx");
    assert_eq!(
      report
        .lines()
        .iter()
        .filter(|line| *line == "Remove:Tree.fbx")
        .count(),
      1
    );
  }

  #[test]
  fn orphaned_managed_groups_retract_every_member() {
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      groups: vec![crate::store::StoredGroup {
        name: "(Auto) Swamp".to_string(),
        entries: vec![
          crate::store::StoredEntry {
            asset_id: "reed".to_string(),
            address: "Swamp/Reed.mesh".to_string(),
            nested: false,
          },
          crate::store::StoredEntry {
            asset_id: "mud".to_string(),
            address: "Swamp/Mud.texture".to_string(),
            nested: false,
          },
        ],
        ..crate::store::StoredGroup::default()
      }],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    let removes: Vec<&AssetAction> = diff
      .actions
      .iter()
      .filter(|action| action.kind == ActionKind::Remove)
      .collect();
    assert_eq!(removes.len(), 2);
    assert!(removes.iter().all(|action| action.group == "(Auto) Swamp"));
  }

  #[test]
  fn nested_entries_are_never_reconciled() {
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      groups: vec![crate::store::StoredGroup {
        name: "(Auto) Forest".to_string(),
        entries: vec![crate::store::StoredEntry {
          asset_id: "tree_leaf".to_string(),
          address: "Forest/Tree.mesh[leaf]".to_string(),
          nested: true,
        }],
        ..crate::store::StoredGroup::default()
      }],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    assert!(
      diff
        .actions
        .iter()
        .all(|action| action.kind == ActionKind::Create)
    );
  }

  #[test]
  fn unrelated_groups_are_not_reconciled() {
    let harness = Harness::new(MemoryStore {
      assets: bundleable_forest(),
      groups: vec![crate::store::StoredGroup {
        name: "Built In Data".to_string(),
        entries: vec![crate::store::StoredEntry {
          asset_id: "builtin".to_string(),
          address: "builtin.asset".to_string(),
          nested: false,
        }],
        ..crate::store::StoredGroup::default()
      }],
      ..MemoryStore::default()
    });

    let mut report = AnalysisReport::default();
    let diff = harness.run(&mut report);

    assert!(
      diff
        .actions
        .iter()
        .all(|action| action.kind == ActionKind::Create)
    );
  }
}
