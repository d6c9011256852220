//! # Grid Spatialization Node
//!
//! Partitions the world's horizontal plane into square cells and tracks
//! which entities fall in which cell. Entities join in one of three modes
//! that decide how often their cell membership is re-evaluated.
//!
//! This node is a collaborator of the routing engine, not its subject: the
//! bookkeeping here is deliberately modest. The per-tick runtime asks it
//! for the cells around a viewer; everything else is membership upkeep.

use crate::graph::EntityInfo;
use crate::nodes::{GraphNode, ViewerInfo};
use kestrel_shared::{EntityId, Vec2};
use std::collections::{HashMap, HashSet};

/// How often the grid re-evaluates an entity's cell membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpatialMode {
    /// Bucketed once on add, never moved.
    Static,
    /// Re-bucketed whenever a position update arrives.
    Dynamic,
    /// Dormancy-driven: behaves static while dormant, dynamic while awake.
    Dormancy,
}

#[derive(Clone, Copy, Debug)]
struct GridEntry {
    mode: SpatialMode,
    cell: (i32, i32),
    position: Vec2,
    dormant: bool,
}

/// 2D grid over the world extent, cell membership per entity.
#[derive(Debug)]
pub struct GridSpatializationNode {
    cell_size: f32,
    spatial_bias: Vec2,
    rebuild_disabled: bool,
    rebuild_blacklist: HashSet<kestrel_reflect::TypeId>,
    cells: HashMap<(i32, i32), Vec<EntityId>>,
    entries: HashMap<EntityId, GridEntry>,
}

impl GridSpatializationNode {
    /// Creates a grid with the given cell size and world-extent bias
    /// (the minimum X/Y the grid expects entities at).
    #[must_use]
    pub fn new(cell_size: f32, spatial_bias: Vec2) -> Self {
        Self {
            cell_size,
            spatial_bias,
            rebuild_disabled: false,
            rebuild_blacklist: HashSet::new(),
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Disables automatic bias rebuilding entirely.
    ///
    /// Rebuilding adapts the grid extent to actor distribution but costs
    /// CPU; stable worlds turn it off.
    pub fn set_rebuild_disabled(&mut self, disabled: bool) {
        self.rebuild_disabled = disabled;
    }

    /// Exempts a type from triggering bias rebuilds.
    pub fn add_rebuild_blacklist(&mut self, type_id: kestrel_reflect::TypeId) {
        self.rebuild_blacklist.insert(type_id);
    }

    /// Adds an entity in static mode.
    pub fn add_static(&mut self, info: &EntityInfo) {
        self.insert(info, SpatialMode::Static);
    }

    /// Adds an entity in dynamic mode.
    pub fn add_dynamic(&mut self, info: &EntityInfo) {
        self.insert(info, SpatialMode::Dynamic);
    }

    /// Adds an entity in dormancy-driven mode. Entities start awake.
    pub fn add_dormancy(&mut self, info: &EntityInfo) {
        self.insert(info, SpatialMode::Dormancy);
    }

    /// Removes a static-mode entity.
    pub fn remove_static(&mut self, entity: EntityId) {
        self.remove(entity, SpatialMode::Static);
    }

    /// Removes a dynamic-mode entity.
    pub fn remove_dynamic(&mut self, entity: EntityId) {
        self.remove(entity, SpatialMode::Dynamic);
    }

    /// Removes a dormancy-mode entity.
    pub fn remove_dormancy(&mut self, entity: EntityId) {
        self.remove(entity, SpatialMode::Dormancy);
    }

    /// Re-buckets a moving entity.
    ///
    /// Static entities and dormant dormancy-mode entities ignore position
    /// updates; that is the point of their modes.
    pub fn update_position(&mut self, entity: EntityId, position: Vec2) {
        let Some(entry) = self.entries.get(&entity).copied() else {
            return;
        };
        let movable = match entry.mode {
            SpatialMode::Static => false,
            SpatialMode::Dynamic => true,
            SpatialMode::Dormancy => !entry.dormant,
        };
        if !movable {
            return;
        }
        let old_cell = entry.cell;
        let new_cell = self.cell_for(position);
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.position = position;
            entry.cell = new_cell;
        }
        if new_cell != old_cell {
            self.detach_from_cell(entity, old_cell);
            self.cells.entry(new_cell).or_default().push(entity);
        }
    }

    /// Marks a dormancy-mode entity dormant or awake. No-op for entities
    /// added in other modes.
    pub fn set_dormant(&mut self, entity: EntityId, dormant: bool) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            if entry.mode == SpatialMode::Dormancy {
                entry.dormant = dormant;
            }
        }
    }

    /// Number of entities currently bucketed, across all modes.
    #[must_use]
    pub fn membership_count(&self) -> usize {
        self.entries.len()
    }

    /// True if the entity is currently bucketed.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entries.contains_key(&entity)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// The configured cell size.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The current spatial bias (minimum world X/Y of the grid extent).
    #[must_use]
    pub fn spatial_bias(&self) -> Vec2 {
        self.spatial_bias
    }

    /// The cell a grid-plane position falls into.
    #[must_use]
    pub fn cell_for(&self, position: Vec2) -> (i32, i32) {
        #[allow(clippy::cast_possible_truncation)]
        let cell = (
            ((position.x - self.spatial_bias.x) / self.cell_size).floor() as i32,
            ((position.y - self.spatial_bias.y) / self.cell_size).floor() as i32,
        );
        cell
    }

    fn insert(&mut self, info: &EntityInfo, mode: SpatialMode) {
        // Re-adding an entity replaces its previous record.
        if let Some(previous) = self.entries.remove(&info.entity) {
            self.detach_from_cell(info.entity, previous.cell);
        }

        let position = info.position.xy();
        self.maybe_rebuild(info, position);

        let cell = self.cell_for(position);
        self.cells.entry(cell).or_default().push(info.entity);
        self.entries.insert(
            info.entity,
            GridEntry {
                mode,
                cell,
                position,
                dormant: false,
            },
        );
    }

    fn remove(&mut self, entity: EntityId, expected_mode: SpatialMode) {
        let Some(entry) = self.entries.remove(&entity) else {
            return;
        };
        if entry.mode != expected_mode {
            tracing::debug!(
                entity = entity.raw(),
                ?expected_mode,
                actual_mode = ?entry.mode,
                "grid remove mode mismatch"
            );
        }
        self.detach_from_cell(entity, entry.cell);
    }

    fn detach_from_cell(&mut self, entity: EntityId, cell: (i32, i32)) {
        if let Some(members) = self.cells.get_mut(&cell) {
            if let Some(index) = members.iter().position(|&e| e == entity) {
                members.swap_remove(index);
            }
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Expands the grid extent when an entity appears below the bias
    /// origin, unless rebuilding is disabled or the type is blacklisted.
    /// Without a rebuild the entity lands in a negative cell, which is
    /// functionally harmless but grows the cell map asymmetrically.
    fn maybe_rebuild(&mut self, info: &EntityInfo, position: Vec2) {
        if position.x >= self.spatial_bias.x && position.y >= self.spatial_bias.y {
            return;
        }
        if self.rebuild_disabled || self.rebuild_blacklist.contains(&info.type_id) {
            return;
        }

        let new_bias = Vec2::new(
            self.spatial_bias
                .x
                .min((position.x / self.cell_size).floor() * self.cell_size),
            self.spatial_bias
                .y
                .min((position.y / self.cell_size).floor() * self.cell_size),
        );
        tracing::info!(
            old_x = self.spatial_bias.x,
            old_y = self.spatial_bias.y,
            new_x = new_bias.x,
            new_y = new_bias.y,
            "rebuilding grid spatial bias"
        );
        self.spatial_bias = new_bias;

        // Re-bucket every tracked entity against the new origin.
        self.cells.clear();
        let cell_size = self.cell_size;
        for (&entity, entry) in &mut self.entries {
            #[allow(clippy::cast_possible_truncation)]
            let cell = (
                ((entry.position.x - new_bias.x) / cell_size).floor() as i32,
                ((entry.position.y - new_bias.y) / cell_size).floor() as i32,
            );
            entry.cell = cell;
            self.cells.entry(cell).or_default().push(entity);
        }
    }

    /// Cells whose extent intersects the viewer's interest square.
    fn cell_range(&self, viewer: &ViewerInfo) -> ((i32, i32), (i32, i32)) {
        let center = viewer.position.xy();
        let radius = viewer.view_radius.max(0.0);
        let min = self.cell_for(Vec2::new(center.x - radius, center.y - radius));
        let max = self.cell_for(Vec2::new(center.x + radius, center.y + radius));
        (min, max)
    }
}

impl GraphNode for GridSpatializationNode {
    fn node_name(&self) -> &'static str {
        "grid_spatialization_2d"
    }

    fn gather_relevant(&self, viewer: &ViewerInfo, out: &mut Vec<EntityId>) {
        let ((min_x, min_y), (max_x, max_y)) = self.cell_range(viewer);
        for (&(cx, cy), members) in &self.cells {
            if cx >= min_x && cx <= max_x && cy >= min_y && cy <= max_y {
                out.extend_from_slice(members);
            }
        }
    }
}
