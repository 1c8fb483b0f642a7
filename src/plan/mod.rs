//! Diffing the desired bundle membership against recorded state.
//!
//! Both diffs are pure: they read the folder listing, the classification and
//! the external snapshot, and emit edits without touching the store. The
//! split mirrors the two independent problems: group names on one side,
//! entry membership on the other.

mod assets;
mod groups;
mod report;

pub use assets::{AssetDiff, AssetDiffContext, diff_assets};
pub use groups::{GroupDiff, diff_groups};
pub use report::AnalysisReport;
