//! Synchronization engine for results dashboards.
//!
//! A dashboard page keeps its state in the URL fragment and needs a set of
//! results files before it can draw anything. This crate ties the two
//! together: it re-derives the page state whenever the location changes,
//! requests the resources named by the builder table, and calls the page's
//! render hook once every required resource has arrived.

pub mod config;
pub mod context;
/// Location change detection against the last processed snapshot.
pub mod detector;
/// Tokio-based driver loop and the event channel feeding it.
pub mod driver;
pub mod engine;
pub mod error;
/// Loading indicator and render coalescing.
pub mod gate;
pub mod host;
pub mod registry;
/// One-tick deferral of continuations.
pub mod tick;

pub use config::{BuilderEntry, BuilderSet, BuilderTables, SyncConfig};
pub use context::PageContext;
pub use detector::ChangeDetector;
pub use driver::{EngineEvent, EventReceiver, EventSender, event_channel, run};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use gate::{GateDecision, GateStats, RenderGate};
pub use host::{DashboardPage, LoadRequest, Location, MemoryLocation, ResourceLoader};
pub use registry::{ResourceEntry, ResourceId, ResourceRegistry};
pub use tick::TickQueue;
