//! # Policy Classifier
//!
//! The one-shot startup pass that assigns a routing policy to every
//! replicated entity type.
//!
//! ## Design
//!
//! Explicit configuration overrides are seeded first and never revisited.
//! For the rest, the classifier compares each type's relevance flags
//! against its parent's: a type whose four flags match its parent adds no
//! new replication-relevant behavior, so it gets no entry of its own and
//! resolves through the ancestor-fallback lookup instead. This keeps the
//! policy map sparse on deep hierarchies.
//!
//! The pass runs exactly once per process lifetime, before any graph node
//! sees traffic. [`classify`] returns an already-frozen map; there is no
//! API to re-run it against a live graph.

use crate::policy::{ClassPolicyMap, PolicyMapBuilder, RoutingPolicy};
use kestrel_reflect::{RelevanceFlags, TypeId, TypeRegistry};

/// Name prefixes of compiler-generated skeleton/reinstance artifacts.
///
/// The simulation's hot-reload system produces transient duplicate types
/// under these prefixes. They must never be classified or routed.
pub const ARTIFACT_PREFIXES: [&str; 2] = ["SKEL_", "REINST_"];

fn is_artifact(name: &str) -> bool {
    ARTIFACT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// The core spatialization predicate.
///
/// A type is spatialized when it replicates and none of the global/owner
/// relevancy flags opt it out of position-based interest.
#[inline]
#[must_use]
pub const fn should_spatialize(flags: RelevanceFlags) -> bool {
    flags.replicated
        && !(flags.always_relevant || flags.only_relevant_to_owner || flags.owner_relevancy)
}

/// Diagnostic class lists produced alongside the policy map.
///
/// Consumers use these for logging and tooling; routing never reads them.
#[derive(Debug, Default)]
pub struct ClassDiagnostics {
    /// Every replicated, non-artifact type seen by the pass.
    pub replicated: Vec<TypeId>,
    /// Types assigned [`RoutingPolicy::SpatializeDynamic`] by inference.
    pub spatialized: Vec<TypeId>,
    /// Types assigned [`RoutingPolicy::RelevantAllConnections`] by inference.
    pub always_relevant: Vec<TypeId>,
    /// Types that spatialize although their parent does not - the point in
    /// the hierarchy where position-based interest switches on.
    pub newly_spatialized: Vec<TypeId>,
}

/// Result of the classification pass.
#[derive(Debug)]
pub struct Classification {
    /// The frozen type → policy mapping.
    pub policies: ClassPolicyMap,
    /// Diagnostic class lists.
    pub diagnostics: ClassDiagnostics,
}

/// Classifies every known entity type into a routing policy.
///
/// `overrides` are configuration-level forced mappings; they are seeded
/// into the map first and the inference pass never overwrites them.
#[must_use]
pub fn classify(registry: &TypeRegistry, overrides: &[(TypeId, RoutingPolicy)]) -> Classification {
    let mut builder = PolicyMapBuilder::new();
    let mut diagnostics = ClassDiagnostics::default();

    for &(type_id, policy) in overrides {
        builder.set(type_id, policy);
    }

    for (type_id, descriptor) in registry.iter() {
        // Types without a default instance cannot be inspected.
        let Some(defaults) = descriptor.defaults else {
            continue;
        };
        if !defaults.flags.replicated {
            continue;
        }
        if is_artifact(&descriptor.name) {
            continue;
        }

        diagnostics.replicated.push(type_id);

        if builder.contains(type_id) {
            continue;
        }

        // Inheritance diff: a parent without a default instance means
        // "no comparable ancestor" - skip the comparison, not the type.
        let parent_defaults = descriptor
            .parent
            .and_then(|parent| registry.defaults_of(parent));
        if let Some(parent_defaults) = parent_defaults {
            if parent_defaults.flags == defaults.flags {
                // Identical relevance behavior: rely on ancestor fallback
                // instead of a duplicate entry.
                continue;
            }
            if should_spatialize(defaults.flags) && !should_spatialize(parent_defaults.flags) {
                diagnostics.newly_spatialized.push(type_id);
            }
        }

        if should_spatialize(defaults.flags) {
            builder.set(type_id, RoutingPolicy::SpatializeDynamic);
            diagnostics.spatialized.push(type_id);
        } else if defaults.flags.always_relevant && !defaults.flags.only_relevant_to_owner {
            builder.set(type_id, RoutingPolicy::RelevantAllConnections);
            diagnostics.always_relevant.push(type_id);
        }
        // Everything else stays unmapped and defaults to NotRouted.
    }

    tracing::info!(
        replicated = diagnostics.replicated.len(),
        spatialized = diagnostics.spatialized.len(),
        always_relevant = diagnostics.always_relevant.len(),
        "classified entity types"
    );

    Classification {
        policies: builder.freeze(),
        diagnostics,
    }
}
