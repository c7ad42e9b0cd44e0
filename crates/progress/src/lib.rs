//! Progress Tracking
//!
//! Lecture completion state, derived progress percentages, prerequisite
//! gating, and the dashboard/roadmap views built on top of them.

#![warn(missing_docs)]

pub mod hydration;
pub mod store;
pub mod dashboard;
pub mod roadmap;

pub use hydration::{HydrationGate, HydrationState};
pub use store::{ProgressStore, StoreConfig, DEFAULT_PREREQUISITE_THRESHOLD};
pub use dashboard::{CategoryProgress, DashboardStats, RecentActivity};
pub use roadmap::{LayoutNode, Position, RoadmapEdge, RoadmapError, RoadmapLayout, RoadmapNode};
