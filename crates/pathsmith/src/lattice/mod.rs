//! Lattice state: coordinate tensor, module registry, and adjacency graph
//! (spec §4.3). Grounded on `pathfinder/lattice/Lattice.h/.cpp` (`InitLattice`,
//! `AddModule`, `EdgeCheck`, `CheckConnected`, `MovableModules`,
//! `UpdateFromModuleInfo`/`GetModuleInfo`), translated from a static-class
//! singleton into an owned struct per the Design Notes' guidance to avoid
//! global mutable state.

pub mod articulation;

use crate::error::LatticeError;
use crate::module::{ModuleData, ModuleId, ModulePropertySet, ModuleRegistry};
use crate::tensor::{CoordTensor, FREE_SPACE, OUT_OF_BOUNDS};

/// Which neighbor offsets define an edge between two module coordinates.
#[derive(Debug, Clone)]
pub enum AdjacencyOffsets {
    /// The `2 * order` face-neighbors of a hypercube (±1 along one axis).
    CubeFace,
    /// The 12 edge-neighbors of a rhombic dodecahedron (order 3 only).
    RhombicDodecahedron,
    /// An explicit offset list, e.g. loaded from a scenario file.
    Custom(Vec<Vec<i32>>),
}

impl AdjacencyOffsets {
    pub fn offsets(&self, order: usize) -> Vec<Vec<i32>> {
        match self {
            Self::CubeFace => {
                let mut out = Vec::with_capacity(order * 2);
                for axis in 0..order {
                    for &sign in &[1, -1] {
                        let mut v = vec![0; order];
                        v[axis] = sign;
                        out.push(v);
                    }
                }
                out
            }
            Self::RhombicDodecahedron => {
                assert_eq!(order, 3, "rhombic dodecahedron adjacency is only defined for order 3");
                let mut out = Vec::with_capacity(12);
                for &(a, b) in &[(0usize, 1usize), (0, 2), (1, 2)] {
                    for &sa in &[1, -1] {
                        for &sb in &[1, -1] {
                            let mut v = vec![0; order];
                            v[a] = sa;
                            v[b] = sb;
                            out.push(v);
                        }
                    }
                }
                out
            }
            Self::Custom(list) => list.clone(),
        }
    }
}

/// Owns the cell-occupancy tensor, the module registry, and the undirected
/// adjacency graph over module ids.
#[derive(Debug)]
pub struct Lattice {
    order: usize,
    axis_size: i32,
    boundary_size: i32,
    coord_tensor: CoordTensor<i32>,
    adj_list: Vec<Vec<ModuleId>>,
    adj_index_offsets: Vec<i64>,
    registry: ModuleRegistry,
    ignore_properties: bool,
}

impl Lattice {
    /// Build an empty lattice. `usable_axis_size` is the caller-visible grid
    /// extent; the tensor is padded with `boundary_size` cells of
    /// `OUT_OF_BOUNDS` on every side so move checks never special-case edges.
    pub fn new(order: usize, usable_axis_size: i32, boundary_size: i32, adjacency: AdjacencyOffsets) -> Self {
        let axis_size = usable_axis_size + 2 * boundary_size;
        let mut coord_tensor = CoordTensor::new(order, axis_size, OUT_OF_BOUNDS, None);
        for index in 0..coord_tensor.as_slice().len() as i64 {
            let coords = coord_tensor.coords_from_index(index);
            let inside = coords.iter().all(|&c| c >= boundary_size && c < axis_size - boundary_size);
            if inside {
                *coord_tensor.get_mut_by_index(index) = FREE_SPACE;
            }
        }
        let adj_index_offsets = adjacency
            .offsets(order)
            .iter()
            .map(|o| coord_tensor.index_from_coords(o))
            .filter(|&delta| delta != 0)
            .collect();
        Self {
            order,
            axis_size,
            boundary_size,
            coord_tensor,
            adj_list: Vec::new(),
            adj_index_offsets,
            registry: ModuleRegistry::new(),
            ignore_properties: false,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn axis_size(&self) -> i32 {
        self.axis_size
    }

    pub fn boundary_size(&self) -> i32 {
        self.boundary_size
    }

    pub fn set_ignore_properties(&mut self, ignore: bool) {
        self.ignore_properties = ignore;
    }

    pub fn ignore_properties(&self) -> bool {
        self.ignore_properties
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    /// Cell contents at `coords`: a module id, or one of
    /// [`crate::tensor::FREE_SPACE`]/[`crate::tensor::OUT_OF_BOUNDS`].
    pub fn cell(&self, coords: &[i32]) -> i32 {
        *self.coord_tensor.get(coords)
    }

    /// As [`Self::cell`], but treats any coordinate the tensor itself cannot
    /// address (wrong arity, or a component outside `[0, axis_size)`) as
    /// [`crate::tensor::OUT_OF_BOUNDS`] rather than panicking. Move offsets
    /// are bounds-checked this way since a catalog's `max_distance` sizes the
    /// padding generously but a caller-supplied offset is not otherwise
    /// guaranteed to land inside it.
    pub fn cell_checked(&self, coords: &[i32]) -> i32 {
        if self.coord_tensor.in_bounds(coords) {
            self.cell(coords)
        } else {
            OUT_OF_BOUNDS
        }
    }

    /// Temporarily blank every free module's cell to `FREE_SPACE`, returning
    /// the `(id, coords)` pairs needed to restore them with
    /// [`Self::restore_free_modules`]. Used by heuristic-cache construction
    /// (spec §4.7), which must reason about reachability as if only static
    /// modules occupied the lattice. Adjacency is left untouched since cache
    /// construction never consults it.
    pub fn clear_free_modules(&mut self) -> Vec<(ModuleId, Vec<i32>)> {
        let mut cleared = Vec::with_capacity(self.registry.static_start());
        for idx in 0..self.registry.static_start() {
            let id = ModuleId(idx);
            let coords = self.registry.get(id).coords.clone();
            *self.coord_tensor.get_mut(&coords) = FREE_SPACE;
            cleared.push((id, coords));
        }
        cleared
    }

    /// Permanently mark a still-free cell unreachable (spec §4.7's "cache
    /// optimization" refinement). A no-op if the cell already holds a
    /// module or is already out of bounds.
    pub fn mark_unreachable(&mut self, coords: &[i32]) {
        if self.cell(coords) == FREE_SPACE {
            *self.coord_tensor.get_mut(coords) = OUT_OF_BOUNDS;
        }
    }

    /// Undo [`Self::clear_free_modules`].
    pub fn restore_free_modules(&mut self, cleared: &[(ModuleId, Vec<i32>)]) {
        for (id, coords) in cleared {
            *self.coord_tensor.get_mut(coords) = id.0 as i32;
        }
    }

    /// Relocate `id` to `new_coords`: clear its adjacency, free its old
    /// cell, write it into the new one, and recompute adjacency there. Does
    /// not touch properties; callers fire property updates separately (spec
    /// §4.3's `apply` contract).
    pub fn relocate_module(&mut self, id: ModuleId, new_coords: Vec<i32>) {
        let old_coords = self.registry.get(id).coords.clone();
        *self.coord_tensor.get_mut(&old_coords) = FREE_SPACE;
        self.clear_adjacencies(id);
        self.registry.get_mut(id).coords = new_coords.clone();
        self.ensure_adj_capacity(id);
        *self.coord_tensor.get_mut(&new_coords) = id.0 as i32;
        self.edge_check(id);
    }

    fn ensure_adj_capacity(&mut self, id: ModuleId) {
        if self.adj_list.len() <= id.0 {
            self.adj_list.resize(id.0 + 1, Vec::new());
        }
    }

    /// Register and place a free (movable) module. Immediate: unlike static
    /// modules, free modules take effect right away since nothing in the
    /// id-partition invariant depends on registration order among them.
    pub fn add_module(&mut self, coords: Vec<i32>, properties: ModulePropertySet) -> Result<ModuleId, LatticeError> {
        if self.cell(&coords) != FREE_SPACE {
            return Err(LatticeError::CellOccupied { coords });
        }
        let id = self.registry.register_free(coords.clone(), properties);
        self.ensure_adj_capacity(id);
        *self.coord_tensor.get_mut(&coords) = id.0 as i32;
        self.edge_check(id);
        Ok(id)
    }

    /// Queue a static (immovable) module; it is not placed until
    /// [`Self::finalize_modules`] runs, guaranteeing every static id exceeds
    /// every free id regardless of call order.
    pub fn queue_static_module(&mut self, coords: Vec<i32>, properties: ModulePropertySet) {
        self.registry.register_static(coords, properties);
    }

    /// Assign ids to every queued static module and place them on the
    /// tensor. Must be called once, after all free and static modules have
    /// been added/queued.
    pub fn finalize_modules(&mut self) -> Result<(), LatticeError> {
        let static_start = self.registry.finalize();
        for idx in static_start..self.registry.len() {
            let id = ModuleId(idx);
            let coords = self.registry.get(id).coords.clone();
            if self.cell(&coords) != FREE_SPACE {
                return Err(LatticeError::CellOccupied { coords });
            }
            self.ensure_adj_capacity(id);
            *self.coord_tensor.get_mut(&coords) = id.0 as i32;
            self.edge_check(id);
        }
        Ok(())
    }

    /// Mark a cell permanently unusable. Errors if a module already sits
    /// there.
    pub fn add_boundary(&mut self, coords: Vec<i32>) -> Result<(), LatticeError> {
        if self.cell(&coords) != FREE_SPACE {
            return Err(LatticeError::BoundaryOccupied { coords });
        }
        *self.coord_tensor.get_mut(&coords) = OUT_OF_BOUNDS;
        Ok(())
    }

    /// Recompute `id`'s adjacency edges against its current neighbors.
    pub fn edge_check(&mut self, id: ModuleId) {
        let coords = self.registry.get(id).coords.clone();
        let center = self.coord_tensor.index_from_coords(&coords);
        let max_idx = self.coord_tensor.as_slice().len() as i64 - 1;
        let mut neighbors = Vec::new();
        for &delta in &self.adj_index_offsets {
            let idx = center + delta;
            if idx < 0 || idx > max_idx {
                continue;
            }
            let v = *self.coord_tensor.get_by_index(idx);
            if v >= 0 {
                neighbors.push(ModuleId(v as usize));
            }
        }
        for neighbor in neighbors {
            self.add_edge(id, neighbor);
        }
    }

    fn add_edge(&mut self, a: ModuleId, b: ModuleId) {
        self.adj_list[a.0].push(b);
        self.adj_list[b.0].push(a);
    }

    fn clear_adjacencies(&mut self, id: ModuleId) {
        let neighbors = std::mem::take(&mut self.adj_list[id.0]);
        for neighbor in neighbors {
            self.adj_list[neighbor.0].retain(|&x| x != id);
        }
    }

    pub fn adjacency(&self, id: ModuleId) -> &[ModuleId] {
        &self.adj_list[id.0]
    }

    /// `true` iff at most `permit_missing` modules are unreachable from
    /// module 0 via the adjacency graph.
    pub fn check_connected(&self, permit_missing: usize) -> bool {
        let n = self.registry.len();
        if n == 0 {
            return true;
        }
        let mut visited = vec![false; n];
        let mut stack = vec![0usize];
        visited[0] = true;
        let mut visited_count = 0usize;
        while let Some(node) = stack.pop() {
            visited_count += 1;
            for &neighbor in &self.adj_list[node] {
                if !visited[neighbor.0] {
                    visited[neighbor.0] = true;
                    stack.push(neighbor.0);
                }
            }
        }
        visited_count + permit_missing >= n
    }

    /// Non-static, non-articulation-point modules: removable without
    /// disconnecting the rest of the lattice. Uses the recursive DFS, the
    /// authoritative variant (see [`articulation`]).
    pub fn movable_modules(&self) -> Vec<ModuleId> {
        let ap = articulation::recursive(&self.adj_list);
        self.movable_from_ap(&ap)
    }

    /// As [`Self::movable_modules`], but via the explicit-stack DFS. Debug
    /// builds assert it agrees with the recursive variant whenever the
    /// lattice is fully connected — the invariant search maintains, but not
    /// one guaranteed for arbitrary disconnected input.
    pub fn movable_modules_iterative(&self) -> Vec<ModuleId> {
        let ap = articulation::iterative(&self.adj_list);
        debug_assert!(
            !self.check_connected(0) || ap == articulation::recursive(&self.adj_list),
            "iterative and recursive articulation-point analysis disagree on a connected lattice"
        );
        self.movable_from_ap(&ap)
    }

    fn movable_from_ap(&self, ap: &[bool]) -> Vec<ModuleId> {
        (0..self.registry.static_start())
            .filter(|&id| !ap.get(id).copied().unwrap_or(false))
            .map(ModuleId)
            .collect()
    }

    /// Immutable snapshot of every free module's coordinates and properties.
    pub fn module_info(&self) -> Vec<ModuleData> {
        (0..self.registry.static_start())
            .map(|idx| self.registry.get(ModuleId(idx)).to_data())
            .collect()
    }

    /// Restore free-module placement from a snapshot taken by
    /// [`Self::module_info`]. Modules already at their target coordinate are
    /// left in place (only their properties are refreshed); the rest are
    /// matched against the remaining destinations in registry-id order.
    pub fn update_from_module_info(&mut self, info: &[ModuleData]) -> Result<(), LatticeError> {
        let mut to_move: std::collections::HashSet<usize> = (0..self.registry.static_start()).collect();
        let mut destinations: std::collections::VecDeque<(Vec<i32>, ModulePropertySet)> = std::collections::VecDeque::new();

        for data in info {
            let coords = data.coords();
            let id = self.cell(&coords);
            if id >= 0 {
                to_move.remove(&(id as usize));
                if let Some(properties) = data.properties_full() {
                    self.registry.get_mut(ModuleId(id as usize)).properties = properties.clone();
                }
            } else {
                destinations.push_back((coords, data.properties_full().cloned().unwrap_or_default()));
            }
        }

        if to_move.len() != destinations.len() {
            return Err(LatticeError::UpdateCountMismatch {
                movable: to_move.len(),
                destinations: destinations.len(),
            });
        }

        let mut to_move: Vec<usize> = to_move.into_iter().collect();
        to_move.sort_unstable();
        for idx in to_move {
            let id = ModuleId(idx);
            let old_coords = self.registry.get(id).coords.clone();
            *self.coord_tensor.get_mut(&old_coords) = FREE_SPACE;
            let (new_coords, new_properties) = destinations.pop_front().expect("count checked above");
            self.registry.get_mut(id).coords = new_coords.clone();
            self.clear_adjacencies(id);
            self.edge_check(id);
            *self.coord_tensor.get_mut(&new_coords) = id.0 as i32;
            self.registry.get_mut(id).properties = new_properties;
        }
        Ok(())
    }
}
