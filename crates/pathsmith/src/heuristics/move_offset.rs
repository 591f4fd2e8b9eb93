//! Move-aware heuristic cache (spec §4.7): reverse BFS from the goal using
//! the move catalog's own offsets instead of a fixed neighborhood.
//!
//! Grounded on `HeuristicCache.h/.cpp`'s `MoveOffsetHeuristicCache` /
//! `MoveOffsetEnqueueAdjacent`.

use std::collections::VecDeque;

use crate::flags::SearchFlags;
use crate::lattice::Lattice;
use crate::module::{ModuleData, ModuleId};
use crate::moves::{
    check::{free_space_check, free_space_check_with_help},
    MoveCatalog,
};
use crate::tensor::CoordTensor;

use super::refinements;

/// Per-coordinate lower bound on moves-to-nearest-goal, accounting for which
/// moves the catalog actually permits.
#[derive(Debug)]
pub struct MoveOffsetCache {
    depth: CoordTensor<f32>,
}

impl MoveOffsetCache {
    /// Builds the cache with every free module temporarily cleared from
    /// `lattice` (restored before returning), per spec §4.7's construction
    /// recipe. `flags` gates the "cache optimization", "distance
    /// limitation" and "help limitation" refinements (spec §4.7).
    pub fn build(lattice: &mut Lattice, catalog: &MoveCatalog, goal: &[ModuleData], flags: &SearchFlags) -> Self {
        let cleared = lattice.clear_free_modules();
        let cache = Self::build_with_lattice_cleared(lattice, catalog, goal, flags);
        lattice.restore_free_modules(&cleared);
        if flags.heuristic_cache_optimization {
            cache.apply_cache_optimization(lattice);
        }
        cache
    }

    fn build_with_lattice_cleared(lattice: &Lattice, catalog: &MoveCatalog, goal: &[ModuleData], flags: &SearchFlags) -> Self {
        let mut depth = CoordTensor::new(lattice.order(), lattice.axis_size(), f32::INFINITY, None);
        let mut queue = VecDeque::new();

        // Generous cap: no plausible predecessor lies further from every
        // static module than the lattice's own extent. With no static
        // modules at all the refinement has nothing to anchor on, so it is
        // a no-op rather than a blanket rejection.
        let dist_cap = lattice.axis_size();
        let static_cache = (flags.heuristic_cache_dist_limitations && !lattice.registry().static_modules().is_empty())
            .then(|| refinements::static_distance_cache(lattice, dist_cap));

        // No single module is excluded from this budget: the cache is a
        // global lower bound, not computed per candidate mover. The zero
        // tensor is never mutated, so repeated borrowing across BFS steps
        // never tightens the budget further than a single move's own
        // simultaneous anchor count would.
        let help_budget = flags.heuristic_cache_help_limitations.then(|| refinements::help_budget(lattice, ModuleId(usize::MAX)));
        let help_tensor = help_budget.map(|_| CoordTensor::new(lattice.order(), lattice.axis_size(), 0i32, None));

        for module in goal {
            let coords = module.coords();
            if depth.in_bounds(&coords) && *depth.get(&coords) > 0.0 {
                *depth.get_mut(&coords) = 0.0;
                queue.push_back(coords);
            }
        }

        while let Some(coords) = queue.pop_front() {
            let here = *depth.get(&coords);
            for mv in catalog.all() {
                // Predecessor: the coordinate a module at `pred` would leave
                // from to land on `coords` via `mv`.
                let pred: Vec<i32> = coords.iter().zip(&mv.final_offset).map(|(c, o)| c - o).collect();
                if !depth.in_bounds(&pred) || *depth.get(&pred) <= here + 1.0 {
                    continue;
                }
                if let Some(static_cache) = &static_cache {
                    if !refinements::within_static_distance(static_cache, &pred, dist_cap) {
                        continue;
                    }
                }
                let reachable = match (&help_tensor, help_budget) {
                    (Some(ht), Some(budget)) => free_space_check_with_help(lattice, mv, &pred, ht, budget),
                    _ => free_space_check(lattice, mv, &pred),
                };
                if reachable {
                    *depth.get_mut(&pred) = here + 1.0;
                    queue.push_back(pred);
                }
            }
        }

        Self { depth }
    }

    pub fn value(&self, coords: &[i32]) -> f32 {
        if self.depth.in_bounds(coords) {
            *self.depth.get(coords)
        } else {
            f32::INFINITY
        }
    }

    /// Mark any still-unreached cell permanently `OUT_OF_BOUNDS` in
    /// `lattice` (spec §4.7's "cache optimization" refinement): a cell no
    /// move sequence can reach under any property assignment will never
    /// again need a move-legality check.
    pub fn apply_cache_optimization(&self, lattice: &mut Lattice) {
        for index in 0..self.depth.as_slice().len() as i64 {
            let coords = self.depth.coords_from_index(index);
            if self.depth.get(&coords).is_infinite() {
                lattice.mark_unreachable(&coords);
            }
        }
    }

    pub fn depth_tensor(&self) -> &CoordTensor<f32> {
        &self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::SearchFlags;
    use crate::lattice::AdjacencyOffsets;
    use crate::module::ModulePropertySet;
    use crate::moves::template::MoveTemplate;
    use proptest::prelude::*;

    fn slide_catalog() -> MoveCatalog {
        let (cells, _, final_offset) = MoveTemplate::from_grid("slide", &["x!", "?#"]).unwrap();
        let template = MoveTemplate {
            name: "slide".to_string(),
            order: 2,
            cells,
            init_offset: vec![0, 0],
            final_offset,
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
            perm_gen: true,
        };
        MoveCatalog::from_templates(&[template])
    }

    #[test]
    fn goal_cell_has_zero_depth_and_neighbor_matches_bfs() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let catalog = slide_catalog();
        let goal = vec![ModuleData::full(vec![5, 5], ModulePropertySet::new())];

        let cache = MoveOffsetCache::build(&mut lat, &catalog, &goal, &SearchFlags::default());
        assert_eq!(cache.value(&[5, 5]), 0.0);
        assert!(cache.value(&[4, 5]).is_finite());
    }

    /// A single directed diagonal slide with symmetry expansion suppressed,
    /// so only one step vector is ever reachable.
    fn directed_slide_catalog() -> MoveCatalog {
        let (cells, _, final_offset) = MoveTemplate::from_grid("slide", &["x!", "?#"]).unwrap();
        let template = MoveTemplate {
            name: "slide".to_string(),
            order: 2,
            cells,
            init_offset: vec![0, 0],
            final_offset,
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
            perm_gen: false,
        };
        MoveCatalog::from_templates(&[template])
    }

    #[test]
    fn cache_optimization_flag_marks_unreachable_cells_out_of_bounds() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let catalog = directed_slide_catalog();
        // Only the single (1, -1) step is reachable, so (0, 0) can never
        // reach the goal at (5, 5) and must end up OUT_OF_BOUNDS.
        let goal = vec![ModuleData::full(vec![5, 5], ModulePropertySet::new())];
        let mut flags = SearchFlags::default();
        flags.heuristic_cache_dist_limitations = false;
        flags.heuristic_cache_help_limitations = false;

        flags.heuristic_cache_optimization = false;
        MoveOffsetCache::build(&mut lat, &catalog, &goal, &flags);
        assert_eq!(lat.cell_checked(&[0, 0]), crate::tensor::FREE_SPACE);

        flags.heuristic_cache_optimization = true;
        MoveOffsetCache::build(&mut lat, &catalog, &goal, &flags);
        assert_eq!(lat.cell_checked(&[0, 0]), crate::tensor::OUT_OF_BOUNDS);
    }

    proptest! {
        // With only unit axis-slides and no obstacles, the cache's reverse
        // BFS degenerates to a grid distance: the depth at c must equal the
        // Manhattan distance from c to the (single) goal cell.
        #[test]
        fn depth_matches_manhattan_distance_on_an_open_grid(x in 1i32..11, y in 1i32..11) {
            let mut lat = Lattice::new(2, 12, 2, AdjacencyOffsets::CubeFace);
            lat.add_module(vec![5, 5], ModulePropertySet::new()).unwrap();
            let catalog = slide_catalog();
            let goal = vec![ModuleData::full(vec![5, 5], ModulePropertySet::new())];

            let cache = MoveOffsetCache::build(&mut lat, &catalog, &goal, &SearchFlags::default());
            let expected = crate::heuristics::legacy::manhattan_distance(
                &[ModuleData::full(vec![x, y], ModulePropertySet::new())],
                &goal,
            );
            prop_assert_eq!(cache.value(&[x, y]), expected);
        }
    }
}
