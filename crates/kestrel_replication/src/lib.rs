//! # KESTREL Replication - The Switchboard
//!
//! Network interest management for the KESTREL server. This crate decides
//! *which* entities are candidates for replication to each connection and
//! *what* per-class cadence and culling parameters apply. It does not touch
//! the wire: serialization, prioritization and sending belong to the
//! transport layer.
//!
//! ## Architecture
//!
//! ```text
//!  startup                          runtime (per spawn/despawn)
//!  ┌──────────────────┐            ┌──────────────────────────┐
//!  │ TypeRegistry     │            │ EntityInfo               │
//!  │ (kestrel_reflect)│            └────────────┬─────────────┘
//!  └────────┬─────────┘                         │
//!           ▼                                   ▼
//!  classify() ──► ClassPolicyMap ──► ReplicationGraph::on_entity_added
//!           │                                   │
//!           ▼                          ┌────────┴─────────┐
//!  ClassParameterTable                 ▼                  ▼
//!  (cull distance, period)      GridSpatialization   AlwaysRelevant
//!                               (static/dyn/dorm)    (global list)
//! ```
//!
//! ## Lifecycle Contract
//!
//! Classification and parameter derivation run exactly once, before any
//! connection exists. [`ReplicationGraphBuilder`] consumes itself to
//! produce a [`ReplicationGraph`]; there is no way to route an entity
//! through a graph that has not finished initializing.
//!
//! ## Failure Philosophy
//!
//! Interest management is opt-in by policy. An unmapped type routes
//! nowhere, a missing parent means "no inheritance comparison", a
//! degenerate update frequency is clamped. The only errors this crate
//! surfaces are configuration errors, at startup.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod params;
pub mod policy;

pub use classifier::{classify, should_spatialize, ClassDiagnostics, Classification};
pub use config::{GraphConfig, ParameterOverride, PolicyOverride};
pub use error::{GraphError, GraphResult};
pub use graph::{EntityInfo, ReplicationGraph, ReplicationGraphBuilder};
pub use nodes::{
    AlwaysRelevantNode, GatherPool, GraphNode, GridSpatializationNode, SpatialMode, ViewerInfo,
};
pub use params::{
    derive_parameters, replication_period, ClassParameterTable, ClassParameters,
    ParameterTableBuilder,
};
pub use policy::{ClassPolicyMap, PolicyMapBuilder, RoutingPolicy};
