//! # Class Parameter Table
//!
//! Per-type culling distance and replication cadence, derived once at
//! startup from each class's desired update frequency and the server tick
//! rate. Explicit configuration entries always win over derivation and
//! cover every descendant that lacks its own entry.

use crate::policy::ClassPolicyMap;
use kestrel_reflect::{ReplicationDefaults, TypeId, TypeRegistry};
use std::collections::HashMap;

/// Replication parameters for one entity type.
///
/// The zeroed default is what lookups return for unmapped types; it is
/// never produced by derivation, which guarantees a period of at least
/// one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassParameters {
    /// Squared cull distance, world units squared. Only meaningful for
    /// spatialized types; zero otherwise.
    pub cull_distance_squared: f32,
    /// Server ticks between update considerations. Always >= 1 when
    /// derived.
    pub replication_period_ticks: u32,
}

/// Ticks between update considerations for a desired update frequency.
///
/// A non-positive frequency is a data-quality issue upstream: the divisor
/// is clamped to 1.0 rather than faulting, and a warning is logged. The
/// result is always >= 1. Every period in the system comes through here,
/// whether derived from class defaults or from a configuration override.
#[must_use]
pub fn replication_period(server_tick_rate: f32, update_frequency: f32) -> u32 {
    let divisor = if update_frequency > 0.0 {
        update_frequency
    } else {
        tracing::warn!(
            update_frequency,
            "degenerate update frequency, clamping divisor to 1.0"
        );
        1.0
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let period = ((server_tick_rate / divisor).round() as u32).max(1);
    period
}

/// Derives parameters for a replicated type.
///
/// The cull distance is taken only when the type's policy is spatialized.
#[must_use]
pub fn derive_parameters(
    defaults: &ReplicationDefaults,
    spatialized: bool,
    server_tick_rate: f32,
) -> ClassParameters {
    let cull_distance_squared = if spatialized {
        defaults.cull_distance_squared
    } else {
        0.0
    };

    ClassParameters {
        cull_distance_squared,
        replication_period_ticks: replication_period(server_tick_rate, defaults.update_frequency),
    }
}

/// Write-once builder for [`ClassParameterTable`].
#[derive(Debug, Default)]
pub struct ParameterTableBuilder {
    entries: HashMap<TypeId, ClassParameters>,
    explicit: Vec<TypeId>,
}

impl ParameterTableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hand-tuned entry. Explicit entries are never overwritten
    /// by derivation and cover every descendant lacking its own entry.
    pub fn set_explicit(&mut self, type_id: TypeId, parameters: ClassParameters) {
        self.entries.insert(type_id, parameters);
        self.explicit.push(type_id);
    }

    /// True if the type is an explicitly-configured type or descends from
    /// one.
    #[must_use]
    pub fn covered_by_explicit(&self, registry: &TypeRegistry, type_id: TypeId) -> bool {
        self.explicit
            .iter()
            .any(|&e| registry.is_descendant_of(type_id, e))
    }

    /// Derives entries for every replicated type not covered by an
    /// explicit entry.
    pub fn derive_remaining(
        &mut self,
        registry: &TypeRegistry,
        replicated: &[TypeId],
        policies: &ClassPolicyMap,
        server_tick_rate: f32,
    ) {
        for &type_id in replicated {
            if self.covered_by_explicit(registry, type_id) {
                continue;
            }
            let Some(defaults) = registry.defaults_of(type_id) else {
                continue;
            };
            let spatialized = policies.policy_for(registry, type_id).is_spatialized();
            self.entries.insert(
                type_id,
                derive_parameters(defaults, spatialized, server_tick_rate),
            );
        }
    }

    /// Freezes the builder into an immutable table.
    #[must_use]
    pub fn freeze(self) -> ClassParameterTable {
        ClassParameterTable {
            entries: self.entries,
        }
    }
}

/// Immutable type → parameters mapping, built once at startup.
#[derive(Debug)]
pub struct ClassParameterTable {
    entries: HashMap<TypeId, ClassParameters>,
}

impl ClassParameterTable {
    /// Returns the direct entry for a type, without ancestor fallback.
    #[must_use]
    pub fn entry(&self, type_id: TypeId) -> Option<ClassParameters> {
        self.entries.get(&type_id).copied()
    }

    /// Resolves parameters for a type, walking the ancestor chain and
    /// defaulting to zeroed parameters. Never errors.
    #[must_use]
    pub fn parameters_for(&self, registry: &TypeRegistry, type_id: TypeId) -> ClassParameters {
        let mut current = Some(type_id);
        while let Some(id) = current {
            if let Some(parameters) = self.entry(id) {
                return parameters;
            }
            current = registry.parent_of(id);
        }
        ClassParameters::default()
    }

    /// Number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
