//! Ultimate-parent computation over the reverse dependency index.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::graph::DependencyGraph;
use crate::models::AssetId;

/// Ultimate parents for every referenced asset in a graph.
///
/// An ultimate parent is a root referrer: a node with no recorded parents of
/// its own, reached by walking direct-referrer edges upward. Nodes that are
/// only reachable through a cycle, with no path to any zero-parent root, have
/// no ultimate parents at all.
#[derive(Debug, Default)]
pub struct ReachabilityIndex {
  ultimate: BTreeMap<AssetId, BTreeSet<AssetId>>,
}

impl ReachabilityIndex {
  /// Compute ultimate parents for every asset with at least one referrer.
  pub fn build(graph: &DependencyGraph) -> Self {
    let mut ultimate = BTreeMap::new();
    for start in graph.referenced_assets() {
      ultimate.insert(start.clone(), walk_to_roots(graph, start));
    }
    Self { ultimate }
  }

  /// Ultimate-parent set of an asset, when anything refers to it.
  pub fn ultimate_parents(&self, id: &AssetId) -> Option<&BTreeSet<AssetId>> {
    self.ultimate.get(id)
  }
}

/// Breadth-first walk upward from one asset's direct parents.
///
/// Each walk keeps its own visited set: only zero-parent nodes terminate a
/// branch, so without it a cycle among non-root assets would re-enqueue its
/// members forever. With it the walk is O(V+E) in the worst case. Multiple
/// branches reaching the same root collapse through the set result.
fn walk_to_roots(graph: &DependencyGraph, start: &AssetId) -> BTreeSet<AssetId> {
  let mut roots = BTreeSet::new();
  let mut seen: BTreeSet<AssetId> = BTreeSet::new();
  let mut queue: VecDeque<AssetId> = VecDeque::new();

  seen.insert(start.clone());
  if let Some(direct) = graph.parents_of(start) {
    for parent in direct {
      if seen.insert(parent.clone()) {
        queue.push_back(parent.clone());
      }
    }
  }

  while let Some(node) = queue.pop_front() {
    match graph.parents_of(&node) {
      None => {
        roots.insert(node);
      }
      Some(parents) => {
        for parent in parents {
          if seen.insert(parent.clone()) {
            queue.push_back(parent.clone());
          }
        }
      }
    }
  }

  roots
}
