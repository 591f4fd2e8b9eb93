//! Optional heuristic-cache refinements (spec §4.7), each independently
//! flag-gated by [`crate::flags::SearchFlags`].
//!
//! Grounded on `HeuristicCache.h`'s `CONFIG_HEURISTIC_CACHE_*` macros.

use std::collections::VecDeque;

use crate::lattice::Lattice;
use crate::tensor::CoordTensor;

/// Reverse BFS from every static module, capped at `cap` hops, using
/// cube-face adjacency. Used by the "distance limitation" refinement to
/// forbid `MoveOffset` cache construction from considering a cell no static
/// module could plausibly help reach in time.
pub fn static_distance_cache(lattice: &Lattice, cap: i32) -> CoordTensor<i32> {
    let order = lattice.order();
    let axis_size = lattice.axis_size();
    let mut dist = CoordTensor::new(order, axis_size, i32::MAX, None);
    let mut queue = VecDeque::new();

    for module in lattice.registry().static_modules() {
        let coords = module.coords.clone();
        if dist.in_bounds(&coords) {
            *dist.get_mut(&coords) = 0;
            queue.push_back(coords);
        }
    }

    let mut offsets = Vec::with_capacity(order * 2);
    for axis in 0..order {
        for &sign in &[1, -1] {
            let mut v = vec![0; order];
            v[axis] = sign;
            offsets.push(v);
        }
    }

    while let Some(coords) = queue.pop_front() {
        let here = *dist.get(&coords);
        if here >= cap {
            continue;
        }
        for offset in &offsets {
            let next: Vec<i32> = coords.iter().zip(offset).map(|(c, o)| c + o).collect();
            if dist.in_bounds(&next) && *dist.get(&next) > here + 1 {
                *dist.get_mut(&next) = here + 1;
                queue.push_back(next);
            }
        }
    }

    dist
}

/// `true` iff `coords`' static distance is within `cap` — the predicate the
/// "distance limitation" refinement uses to skip unreachable neighbors
/// during `MoveOffset` cache construction.
pub fn within_static_distance(cache: &CoordTensor<i32>, coords: &[i32], cap: i32) -> bool {
    cache.in_bounds(coords) && *cache.get(coords) <= cap
}

/// Per-goal-position help budget for `free_space_check_with_help` (the
/// "help limitation" refinement): how many other non-static modules could
/// plausibly lend an anchor at that position.
///
/// Simplification: the source counts modules that can *actually* reach the
/// position within the search horizon, which requires a reachability BFS per
/// candidate module. This counts every other free module as a potential
/// helper instead — a looser (never-smaller) budget. Since
/// `free_space_check_with_help` only ever widens what a strict check
/// accepts, an over-generous budget can make the cache slightly less tight,
/// never unsound.
pub fn help_budget(lattice: &Lattice, excluding: crate::module::ModuleId) -> i32 {
    let free_count = lattice.registry().static_start();
    let others = if excluding.0 < free_count { free_count - 1 } else { free_count };
    others as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::AdjacencyOffsets;
    use crate::module::ModulePropertySet;

    #[test]
    fn static_distance_is_zero_at_the_static_module_itself() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        lat.queue_static_module(vec![4, 4], ModulePropertySet::new());
        lat.finalize_modules().unwrap();
        let cache = static_distance_cache(&lat, 10);
        assert_eq!(*cache.get(&[4, 4]), 0);
        assert_eq!(*cache.get(&[5, 4]), 1);
    }

    #[test]
    fn distance_cap_leaves_far_cells_unreached() {
        let mut lat = Lattice::new(2, 12, 2, AdjacencyOffsets::CubeFace);
        lat.queue_static_module(vec![2, 2], ModulePropertySet::new());
        lat.finalize_modules().unwrap();
        let cache = static_distance_cache(&lat, 1);
        assert!(!within_static_distance(&cache, &[2, 2 + 5], 1));
    }

    #[test]
    fn help_budget_counts_other_free_modules() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        let a = lat.add_module(vec![1, 1], ModulePropertySet::new()).unwrap();
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        lat.add_module(vec![3, 3], ModulePropertySet::new()).unwrap();
        assert_eq!(help_budget(&lat, a), 2);
    }
}
