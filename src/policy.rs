//! Ordered bundling rules classifying each candidate asset.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{DependencyGraph, ReachabilityIndex};
use crate::models::AssetRecord;
use crate::store::AssetStore;

/// Configurable inputs of the rule chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
  /// Extensions whose assets must always be independently addressable.
  pub always_include_extensions: BTreeSet<String>,
  /// Extensions that are never bundled.
  pub ignore_extensions: BTreeSet<String>,
  /// Label marking an asset as force-included regardless of any other rule.
  pub force_label: String,
  /// Whether assets nothing refers to are excluded.
  pub exclude_unreferenced: bool,
  /// Assets smaller than this many bytes are never bundled.
  pub min_size_bytes: u64,
}

impl Default for PolicyConfig {
  fn default() -> Self {
    Self {
      always_include_extensions: [".scene".to_string()].into_iter().collect(),
      ignore_extensions: [".fbx".to_string(), ".psd".to_string()].into_iter().collect(),
      force_label: "force-include".to_string(),
      exclude_unreferenced: true,
      min_size_bytes: 10_000,
    }
  }
}

/// Why an asset is scheduled for a standalone bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InclusionCause {
  /// Extension is in the always-include set.
  ForcedExtension,
  /// Asset carries the force-include label.
  ForcedLabel,
  /// No exclusion rule fired.
  PolicyDefault,
}

/// Which rule excluded an asset from bundling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
  /// Extension is in the ignore set.
  IgnoredExtension,
  /// Nothing in the scanned tree refers to the asset.
  NoReferences,
  /// Exactly one direct referrer; the single consumer can embed it.
  SingleReference,
  /// At most one required ultimate parent would pull the asset in.
  TooFewRequiredRoots,
  /// Per-bundle overhead outweighs savings below the size floor.
  BelowSizeFloor,
}

/// Outcome of classifying one candidate, with the deciding rule attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
  /// Schedule the asset for a standalone bundle group.
  Bundle(InclusionCause),
  /// Leave the asset inlined into whatever references it.
  NeverBundle(ExclusionReason),
}

impl Classification {
  /// Whether the asset ends up bundled.
  pub fn is_bundle(&self) -> bool {
    matches!(self, Self::Bundle(_))
  }
}

/// Counters behind the exclusion summary lines of the result log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExclusionTally {
  /// Candidates excluded because nothing refers to them.
  pub no_references: usize,
  /// Candidates excluded for having a single referrer.
  pub single_reference: usize,
  /// Candidates excluded for too few required ultimate parents.
  pub too_few_required_roots: usize,
  /// Candidates excluded for being below the size floor.
  pub below_size_floor: usize,
}

impl ExclusionTally {
  /// Count one exclusion under the rule that decided it.
  pub fn record(&mut self, reason: ExclusionReason) {
    match reason {
      ExclusionReason::IgnoredExtension => {}
      ExclusionReason::NoReferences => self.no_references += 1,
      ExclusionReason::SingleReference => self.single_reference += 1,
      ExclusionReason::TooFewRequiredRoots => self.too_few_required_roots += 1,
      ExclusionReason::BelowSizeFloor => self.below_size_floor += 1,
    }
  }
}

/// The rule chain, evaluated eagerly in a fixed order per candidate.
///
/// Force-include wins over everything because independent addressability of
/// that content is a functional requirement, not an optimisation; the
/// remaining rules only fire once the trivial exclusions are out of the way.
#[derive(Debug, Clone)]
pub struct BundlingPolicy {
  config: PolicyConfig,
}

impl BundlingPolicy {
  /// Build a policy, normalising the configured extension lists.
  pub fn new(config: PolicyConfig) -> Self {
    let PolicyConfig {
      always_include_extensions,
      ignore_extensions,
      force_label,
      exclude_unreferenced,
      min_size_bytes,
    } = config;
    Self {
      config: PolicyConfig {
        always_include_extensions: normalise_extensions(always_include_extensions),
        ignore_extensions: normalise_extensions(ignore_extensions),
        force_label,
        exclude_unreferenced,
        min_size_bytes,
      },
    }
  }

  /// Access the normalised configuration.
  pub fn config(&self) -> &PolicyConfig {
    &self.config
  }

  /// Whether an asset may enter the dependency graph at all.
  ///
  /// Assets with an ignored extension are invisible to the graph unless
  /// force-included, so they can neither be referrers nor referents.
  pub fn admits(&self, record: &AssetRecord) -> bool {
    if self.is_required_root(record) {
      return true;
    }
    !record.has_extension_in(&self.config.ignore_extensions)
  }

  /// The force-include test, shared by rule one and the required-root count.
  pub fn is_required_root(&self, record: &AssetRecord) -> bool {
    record.has_extension_in(&self.config.always_include_extensions)
      || record.has_label(&self.config.force_label)
  }

  /// Run the rule chain for one candidate. First matching rule wins.
  pub fn classify(
    &self,
    record: &AssetRecord,
    graph: &DependencyGraph,
    reachability: &ReachabilityIndex,
    store: &dyn AssetStore,
  ) -> Classification {
    if record.has_extension_in(&self.config.always_include_extensions) {
      return Classification::Bundle(InclusionCause::ForcedExtension);
    }
    if record.has_label(&self.config.force_label) {
      return Classification::Bundle(InclusionCause::ForcedLabel);
    }
    if record.has_extension_in(&self.config.ignore_extensions) {
      return Classification::NeverBundle(ExclusionReason::IgnoredExtension);
    }

    let parent_count = graph.direct_parent_count(&record.id);
    if self.config.exclude_unreferenced && parent_count == 0 {
      return Classification::NeverBundle(ExclusionReason::NoReferences);
    }
    if parent_count == 1 {
      return Classification::NeverBundle(ExclusionReason::SingleReference);
    }

    let required_roots = reachability
      .ultimate_parents(&record.id)
      .map(|roots| {
        roots
          .iter()
          .filter(|root| {
            graph
              .node(root)
              .is_some_and(|parent| self.is_required_root(parent))
          })
          .count()
      })
      .unwrap_or(0);
    if required_roots <= 1 {
      return Classification::NeverBundle(ExclusionReason::TooFewRequiredRoots);
    }

    if store.file_size_bytes(&record.path) < self.config.min_size_bytes {
      return Classification::NeverBundle(ExclusionReason::BelowSizeFloor);
    }

    Classification::Bundle(InclusionCause::PolicyDefault)
  }
}

/// Trim, lower-case and de-duplicate an extension list, discarding blanks.
fn normalise_extensions(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|value| value.trim().to_lowercase())
    .filter(|value| !value.is_empty())
    .map(|value| {
      if value.starts_with('.') {
        value
      } else {
        format!(".{value}")
      }
    })
    .collect()
}
