//! # KESTREL Reflect - The Census
//!
//! Every class of replicable entity the server knows about, as plain data.
//!
//! ## Why not language inheritance?
//!
//! The simulation's object model has its own notion of class hierarchies.
//! Rather than coupling the replication layer to it, the lifecycle system
//! registers one [`TypeDescriptor`] per class here: a name, a parent link,
//! and the replication-relevant defaults of the class's default instance.
//! Downstream consumers walk the parent links themselves - no virtual
//! dispatch, no reflection, just lookups.
//!
//! ## Registration order
//!
//! Parents must be registered before their children. A parent handle that
//! does not resolve is stored as "no parent" - consumers treat such types
//! as having no comparable ancestor rather than failing.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod registry;

pub use registry::{RelevanceFlags, ReplicationDefaults, TypeDescriptor, TypeId, TypeRegistry};
