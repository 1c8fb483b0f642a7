//! In-memory dependency graph with a derived reverse index.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{AssetId, AssetRecord};
use crate::store::AssetStore;

/// Directed dependency graph over one pass's scanned assets.
///
/// Nodes are the scanned assets plus everything they directly depend on;
/// `parents` is the derived reverse index mapping an asset to its direct
/// referrers. Assets rejected by the admission predicate are never inserted
/// as nodes and never appear as keys or values in the reverse index.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  nodes: BTreeMap<AssetId, AssetRecord>,
  parents: BTreeMap<AssetId, BTreeSet<AssetId>>,
}

impl DependencyGraph {
  /// Build the graph from the scanned asset set.
  ///
  /// The store's dependency lookup is issued exactly once per scanned asset;
  /// path and label lookups are memoised so each distinct asset is resolved
  /// once per pass. Self-edges are discarded.
  pub fn build(
    scan: &BTreeSet<AssetId>,
    store: &dyn AssetStore,
    admit: impl Fn(&AssetRecord) -> bool,
  ) -> Self {
    let mut builder = GraphBuilder {
      store,
      admit,
      nodes: BTreeMap::new(),
      rejected: BTreeSet::new(),
    };

    let mut parents: BTreeMap<AssetId, BTreeSet<AssetId>> = BTreeMap::new();

    for id in scan {
      if !builder.admit_node(id) {
        continue;
      }
      for dep in store.dependencies(id) {
        if dep == *id {
          continue;
        }
        if !builder.admit_node(&dep) {
          continue;
        }
        parents.entry(dep).or_default().insert(id.clone());
      }
    }

    Self {
      nodes: builder.nodes,
      parents,
    }
  }

  /// Record for a graph node.
  pub fn node(&self, id: &AssetId) -> Option<&AssetRecord> {
    self.nodes.get(id)
  }

  /// Direct referrers of an asset, when anything refers to it.
  pub fn parents_of(&self, id: &AssetId) -> Option<&BTreeSet<AssetId>> {
    self.parents.get(id)
  }

  /// Number of direct referrers of an asset.
  pub fn direct_parent_count(&self, id: &AssetId) -> usize {
    self.parents.get(id).map_or(0, BTreeSet::len)
  }

  /// Iterator over every asset that has at least one referrer.
  pub fn referenced_assets(&self) -> impl Iterator<Item = &AssetId> {
    self.parents.keys()
  }

  /// Number of nodes in the graph.
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }
}

struct GraphBuilder<'a, F> {
  store: &'a dyn AssetStore,
  admit: F,
  nodes: BTreeMap<AssetId, AssetRecord>,
  rejected: BTreeSet<AssetId>,
}

impl<F: Fn(&AssetRecord) -> bool> GraphBuilder<'_, F> {
  /// Resolve, ingest and admit an asset, memoising the outcome for the pass.
  fn admit_node(&mut self, id: &AssetId) -> bool {
    if self.nodes.contains_key(id) {
      return true;
    }
    if self.rejected.contains(id) {
      return false;
    }

    let record = self
      .store
      .resolve_path(id)
      .and_then(|path| AssetRecord::ingest(id.clone(), &path, self.store.labels(id)));

    match record {
      Some(record) if (self.admit)(&record) => {
        self.nodes.insert(id.clone(), record);
        true
      }
      Some(_) => {
        self.rejected.insert(id.clone());
        false
      }
      None => {
        tracing::debug!(asset = %id, "skipping asset with unresolvable path");
        self.rejected.insert(id.clone());
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::store::{MemoryStore, StoredAsset};

  fn asset(id: &str, path: &str, deps: &[&str]) -> StoredAsset {
    StoredAsset {
      id: id.to_string(),
      path: path.to_string(),
      asset_type: "Mesh".to_string(),
      dependencies: deps.iter().map(|dep| dep.to_string()).collect(),
      ..StoredAsset::default()
    }
  }

  fn id(raw: &str) -> AssetId {
    AssetId::new(raw).unwrap()
  }

  fn scan_of(store: &MemoryStore) -> BTreeSet<AssetId> {
    store
      .assets
      .iter()
      .filter_map(|asset| AssetId::new(asset.id.clone()))
      .collect()
  }

  #[test]
  fn records_direct_referrers() {
    let store = MemoryStore {
      assets: vec![
        asset("scene", "Assets/AutoBundles/Forest/forest.scene", &["tree"]),
        asset("camp", "Assets/AutoBundles/Forest/camp.scene", &["tree"]),
        asset("tree", "Assets/AutoBundles/Forest/Tree.mesh", &[]),
      ],
      ..MemoryStore::default()
    };

    let graph = DependencyGraph::build(&scan_of(&store), &store, |_| true);

    assert_eq!(graph.direct_parent_count(&id("tree")), 2);
    assert_eq!(graph.direct_parent_count(&id("scene")), 0);
    assert_eq!(graph.node_count(), 3);
  }

  #[test]
  fn discards_self_edges() {
    let store = MemoryStore {
      assets: vec![asset(
        "loop",
        "Assets/AutoBundles/Forest/loop.mesh",
        &["loop"],
      )],
      ..MemoryStore::default()
    };

    let graph = DependencyGraph::build(&scan_of(&store), &store, |_| true);
    assert!(graph.parents_of(&id("loop")).is_none());
  }

  #[test]
  fn rejected_assets_never_enter_the_reverse_index() {
    let store = MemoryStore {
      assets: vec![
        asset("scene", "Assets/AutoBundles/Forest/forest.scene", &["raw"]),
        asset("raw", "Assets/AutoBundles/Forest/Tree.fbx", &[]),
        asset("banned", "Assets/AutoBundles/Forest/banned.scene", &["tree"]),
        asset("tree", "Assets/AutoBundles/Forest/Tree.mesh", &[]),
      ],
      ..MemoryStore::default()
    };

    let graph = DependencyGraph::build(&scan_of(&store), &store, |record| {
      !record.normalized_path.ends_with(".fbx") && record.id.as_str() != "banned"
    });

    // Rejected as a dependency: no key in the reverse index.
    assert!(graph.parents_of(&id("raw")).is_none());
    assert!(graph.node(&id("raw")).is_none());

    // Rejected as a referrer: no value in the reverse index.
    assert!(graph.parents_of(&id("tree")).is_none());
  }

  #[test]
  fn dependencies_outside_the_scan_become_nodes() {
    let store = MemoryStore {
      assets: vec![
        asset("scene", "Assets/AutoBundles/Forest/forest.scene", &["shared"]),
        asset("shared", "Assets/Shared/common.mesh", &[]),
      ],
      ..MemoryStore::default()
    };

    let scan: BTreeSet<AssetId> = [id("scene")].into_iter().collect();
    let graph = DependencyGraph::build(&scan, &store, |_| true);

    assert!(graph.node(&id("shared")).is_some());
    assert_eq!(graph.direct_parent_count(&id("shared")), 1);
  }

  #[test]
  fn unresolvable_dependencies_are_skipped() {
    let store = MemoryStore {
      assets: vec![asset(
        "scene",
        "Assets/AutoBundles/Forest/forest.scene",
        &["ghost"],
      )],
      ..MemoryStore::default()
    };

    let scan: BTreeSet<AssetId> = [id("scene")].into_iter().collect();
    let graph = DependencyGraph::build(&scan, &store, |_| true);

    assert!(graph.node(&id("ghost")).is_none());
    assert!(graph.parents_of(&id("ghost")).is_none());
  }
}
