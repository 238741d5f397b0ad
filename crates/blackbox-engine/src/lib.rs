//! Dashboard state engine for Blackbox
//!
//! This crate provides:
//! - The [`DashboardEngine`]: instances, layout, stack locks and undo/redo
//! - Drag/resize gesture coalescing
//! - The [`TemplateService`] with built-in and user templates
//! - Namespace persistence and the [`Workspace`] that ties it all to disk

#![forbid(unsafe_code)]

pub mod engine;
pub mod gesture;
pub mod history;
pub mod layout;
pub mod locks;
pub mod navigation;
pub mod persist;
pub mod registry;
pub mod templates;
pub mod workspace;

pub use engine::{DashboardEngine, EngineConfig};
pub use gesture::{Gesture, GestureKind};
pub use history::History;
pub use locks::StackGroup;
pub use navigation::{Navigation, NavigationSink};
pub use persist::{NamespaceStore, PersistedDocument, SCHEMA_VERSION};
pub use templates::{TemplatePreset, TemplateService};
pub use workspace::Workspace;
