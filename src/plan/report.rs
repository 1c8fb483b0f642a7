//! Ordered, human-readable result log of one planning pass.

use serde::{Deserialize, Serialize};

use crate::policy::ExclusionTally;

/// The diagnostic result log.
///
/// Line prefixes are a contract: UIs and test harnesses match on them
/// literally, so every constructor here is the single place its wording
/// lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisReport {
  lines: Vec<String>,
}

impl AnalysisReport {
  /// All lines, in emission order.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Record a group that will be created.
  pub fn push_create_group(&mut self, name: &str) {
    self.lines.push(format!("Create group \"{name}\""));
  }

  /// Record a group that will be removed.
  pub fn push_remove_group(&mut self, name: &str) {
    self.lines.push(format!("Remove group \"{name}\""));
  }

  /// Record an asset that will be newly added as addressable.
  pub fn push_add(&mut self, address: &str) {
    self.lines.push(format!("Add:{address}"));
  }

  /// Record an already-addressable asset that stays or moves.
  pub fn push_keep_or_move(&mut self, address: &str) {
    self.lines.push(format!("Keep or move:{address}"));
  }

  /// Record an entry that will be retracted.
  pub fn push_remove(&mut self, address: &str) {
    self.lines.push(format!("Remove:{address}"));
  }

  /// Append the exclusion summary counters.
  pub fn push_summary(&mut self, tally: &ExclusionTally) {
    self
      .lines
      .push(format!("Excluded (no references): {}", tally.no_references));
    self.lines.push(format!(
      "Excluded (single reference): {}",
      tally.single_reference
    ));
    self.lines.push(format!(
      "Excluded (too few required roots): {}",
      tally.too_few_required_roots
    ));
    self.lines.push(format!(
      "Excluded (below size floor): {}",
      tally.below_size_floor
    ));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_prefixes_are_literal() {
    let mut report = AnalysisReport::default();
    report.push_create_group("(Auto) Rocks");
    report.push_remove_group("(Auto) Swamp");
    report.push_add("Rocks/Boulder.mesh");
    report.push_keep_or_move("Rocks/Pebble.mesh");
    report.push_remove("Tree.fbx");

    assert_eq!(report.lines(), &[
      "Create group \"(Auto) Rocks\"".to_string(),
      "Remove group \"(Auto) Swamp\"".to_string(),
      "Add:Rocks/Boulder.mesh".to_string(),
      "Keep or move:Rocks/Pebble.mesh".to_string(),
      "Remove:Tree.fbx".to_string(),
    ]);
  }

  #[test]
  fn summary_lines_carry_all_four_counters() {
    let mut report = AnalysisReport::default();
    report.push_summary(&ExclusionTally {
      no_references: 3,
      single_reference: 2,
      too_few_required_roots: 1,
      below_size_floor: 4,
    });

    assert_eq!(report.lines(), &[
      "Excluded (no references): 3".to_string(),
      "Excluded (single reference): 2".to_string(),
      "Excluded (too few required roots): 1".to_string(),
      "Excluded (below size floor): 4".to_string(),
    ]);
  }
}
