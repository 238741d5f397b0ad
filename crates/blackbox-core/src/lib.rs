//! Core types, snapping, and configuration for the Blackbox dashboard
//!
//! This crate provides:
//! - The dashboard data model (`WidgetInstance`, `DashboardState`, snapshots)
//! - Grid snapping (`snap`)
//! - Configuration management (`Config`, environment parsing)
//! - Id and timestamp helpers
//! - Common error types

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod paths;
pub mod snap;
pub mod timestamps;

// Re-export key types for convenience
pub use config::{Config, DEFAULT_HISTORY_DEPTH};
pub use error::{Error, Result};
pub use ids::{generate_id, generate_unique_id};
pub use models::{
    DashboardSnapshot, DashboardState, DashboardStatePatch, Geometry, GeometryPatch, InstanceId,
    TabId, WidgetInstance, WidgetKind,
};
pub use snap::{DEFAULT_GRID_STEP, snap, snap_default};
pub use timestamps::{format_millis, now_millis};
