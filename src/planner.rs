//! Planning pass orchestration.
//!
//! A pass runs to completion as one unit: folder scan, graph construction,
//! reachability, classification, diff. Nothing external is mutated; applying
//! the resulting plan is a distinct later step in [`crate::apply`].

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::graph::{DependencyGraph, ReachabilityIndex};
use crate::models::Plan;
use crate::plan::{AnalysisReport, AssetDiffContext, diff_assets, diff_groups};
use crate::policy::BundlingPolicy;
use crate::project::PlannerLayout;
use crate::store::AssetStore;

/// Everything produced by one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningOutcome {
  /// The edits to apply later.
  pub plan: Plan,
  /// The ordered diagnostic result log.
  pub report: AnalysisReport,
}

/// Owns the planning configuration and serialises passes.
///
/// Only one pass may be in flight at a time against a given external store:
/// interleaving two passes would let one read "current state" the other is
/// about to invalidate. The in-flight flag lives here, not in process-wide
/// state, so independent planners stay independent.
#[derive(Debug)]
pub struct Planner {
  layout: PlannerLayout,
  policy: BundlingPolicy,
  in_flight: AtomicBool,
}

impl Planner {
  /// Build a planner from a layout and a policy.
  pub fn new(layout: PlannerLayout, policy: BundlingPolicy) -> Self {
    Self {
      layout,
      policy,
      in_flight: AtomicBool::new(false),
    }
  }

  /// Build a planner straight from a loaded configuration.
  pub fn from_config(config: PlannerConfig) -> Self {
    let (layout, policy_config) = config.split();
    Self::new(layout, BundlingPolicy::new(policy_config))
  }

  /// The layout this planner operates on.
  pub fn layout(&self) -> &PlannerLayout {
    &self.layout
  }

  /// Start a planning session, or report that one is already in flight.
  pub fn begin(&self) -> Result<PlanningSession<'_>, PlanError> {
    if self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return Err(PlanError::Busy);
    }
    Ok(PlanningSession { planner: self })
  }
}

/// Exclusive handle on an in-flight planning pass.
///
/// Dropping the session releases the planner for the next pass, whether or
/// not a plan was produced.
#[derive(Debug)]
pub struct PlanningSession<'a> {
  planner: &'a Planner,
}

impl PlanningSession<'_> {
  /// Run one full analysis pass against the store's current snapshot.
  ///
  /// Repeatable by construction: the same snapshot yields the same outcome,
  /// ordered identically, because every intermediate collection iterates in
  /// sorted order.
  pub fn analyze(&mut self, store: &dyn AssetStore) -> Result<PlanningOutcome, PlanError> {
    if store.has_unsaved_state() {
      return Err(PlanError::UnsavedState);
    }

    let layout = &self.planner.layout;
    let policy = &self.planner.policy;
    let mut report = AnalysisReport::default();

    let folders = store.list_subfolders(&layout.scan_root());
    let existing = store.existing_groups();
    let existing_names = existing.iter().map(|group| group.name.clone()).collect();

    let group_diff = diff_groups(layout, &folders, &existing_names, &mut report);

    let scan =
      store.find_assets_by_type_filter(&layout.type_filter, &[layout.content_root.clone()]);
    let graph = DependencyGraph::build(&scan, store, |record| policy.admits(record));
    let reachability = ReachabilityIndex::build(&graph);
    tracing::debug!(
      nodes = graph.node_count(),
      folders = folders.len(),
      "dependency graph built"
    );

    let asset_diff = diff_assets(
      &AssetDiffContext {
        layout,
        policy,
        graph: &graph,
        reachability: &reachability,
        store,
      },
      &folders,
      &existing,
      &mut report,
    );
    report.push_summary(&asset_diff.tally);

    Ok(PlanningOutcome {
      plan: Plan {
        groups_to_create: group_diff.to_create,
        groups_to_remove: group_diff.to_remove,
        asset_actions: asset_diff.actions,
      },
      report,
    })
  }
}

impl Drop for PlanningSession<'_> {
  fn drop(&mut self) {
    self.planner.in_flight.store(false, Ordering::Release);
  }
}
