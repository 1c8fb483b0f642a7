#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod apply;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod plan;
pub mod planner;
pub mod policy;
pub mod project;
pub mod store;

pub use apply::{ApplyStats, apply};
pub use config::PlannerConfig;
pub use error::{ApplyError, PlanError, StoreError};
pub use models::{ActionKind, AssetAction, AssetId, Plan, TypeFilter};
pub use planner::{Planner, PlanningOutcome, PlanningSession};
pub use policy::{BundlingPolicy, Classification, PolicyConfig};
pub use project::PlannerLayout;
pub use store::{AssetStore, BundleStore, MemoryStore};
