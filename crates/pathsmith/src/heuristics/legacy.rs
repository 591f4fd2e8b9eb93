//! Legacy/non-admissible heuristics retained for CLI parity (spec §4.7,
//! Design Notes §9's resolved Open Questions). Unlike the cache-based
//! heuristics, these operate directly over a configuration's full
//! `ModuleData` set rather than a precomputed per-cell cache.

use crate::module::ModuleData;

/// Coarse, fast, admissible-under-unit-moves lower bound: count of modules
/// whose coordinate is absent from the goal set.
pub fn sym_diff(current: &[ModuleData], goal: &[ModuleData]) -> f32 {
    let goal_coords: Vec<Vec<i32>> = goal.iter().map(ModuleData::coords).collect();
    current.iter().filter(|m| !goal_coords.contains(&m.coords())).count() as f32
}

/// Net-displacement heuristic, divided by 2 (an empirically tuned constant
/// per the source system, not re-derived here). Not admissible: the engine
/// forces `consistent_heuristic_validator = false` whenever this is
/// selected.
///
/// `current`/`goal` are paired up positionally (index `i` of one against
/// index `i` of the other, not nearest-match), and their per-axis
/// coordinate differences are accumulated across every pair *before* taking
/// an absolute value — a net-displacement norm, not a sum of per-module
/// distances. Matches `Configuration::ManhattanDistance`.
pub fn manhattan_distance(current: &[ModuleData], goal: &[ModuleData]) -> f32 {
    let order = current
        .first()
        .or(goal.first())
        .map(|m| m.coords().len())
        .unwrap_or(0);
    let mut diff = vec![0i32; order];
    for (c, g) in current.iter().zip(goal) {
        for (d, (cx, gx)) in diff.iter_mut().zip(c.coords().iter().zip(g.coords().iter())) {
            *d += cx - gx;
        }
    }
    diff.iter().map(|v| v.abs()).sum::<i32>() as f32 / 2.0
}

/// Sum of per-pair Chebyshev distances, without the final division the
/// admissible `ChebyshevHeuristicCache` applies. Distinct from
/// [`crate::heuristics::chebyshev::ChebyshevCache`]; retained under the
/// source system's own name for CLI parity. Not obviously admissible.
///
/// `current`/`goal` are paired up positionally, matching
/// `Configuration::ChebyshevDistance`.
pub fn chebyshev_distance_legacy(current: &[ModuleData], goal: &[ModuleData]) -> f32 {
    current.iter().zip(goal).map(|(c, g)| chebyshev(&c.coords(), &g.coords()) as f32).sum()
}

fn chebyshev(a: &[i32], b: &[i32]) -> i32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModulePropertySet;

    fn at(coords: Vec<i32>) -> ModuleData {
        ModuleData::full(coords, ModulePropertySet::new())
    }

    #[test]
    fn sym_diff_counts_mismatched_coordinates() {
        let current = vec![at(vec![0, 0]), at(vec![1, 1])];
        let goal = vec![at(vec![0, 0]), at(vec![2, 2])];
        assert_eq!(sym_diff(&current, &goal), 1.0);
    }

    #[test]
    fn sym_diff_is_zero_when_configurations_match() {
        let current = vec![at(vec![0, 0]), at(vec![1, 1])];
        assert_eq!(sym_diff(&current, &current.clone()), 0.0);
    }

    #[test]
    fn manhattan_and_chebyshev_agree_on_axis_aligned_single_module() {
        let current = vec![at(vec![0, 0])];
        let goal = vec![at(vec![3, 0])];
        assert_eq!(manhattan_distance(&current, &goal), 1.5);
        assert_eq!(chebyshev_distance_legacy(&current, &goal), 3.0);
    }

    #[test]
    fn manhattan_distance_pairs_positionally_not_by_nearest_match() {
        // Index 0 against index 0, index 1 against index 1: (0,0)->(5,0) and
        // (5,0)->(0,0), net displacement per axis is (5-5, 0-0) = (0, 0), not
        // the 10 a nearest-match sum would give.
        let current = vec![at(vec![0, 0]), at(vec![5, 0])];
        let goal = vec![at(vec![5, 0]), at(vec![0, 0])];
        assert_eq!(manhattan_distance(&current, &goal), 0.0);
    }

    #[test]
    fn manhattan_distance_accumulates_signed_diffs_before_abs() {
        // (0,0)->(3,0) and (3,0)->(0,0): signed per-axis sum is (3-3, 0-0) =
        // (0, 0), not the 6 a per-pair-then-abs sum would give.
        let current = vec![at(vec![0, 0]), at(vec![3, 0])];
        let goal = vec![at(vec![3, 0]), at(vec![0, 0])];
        assert_eq!(manhattan_distance(&current, &goal), 0.0);
    }

    #[test]
    fn chebyshev_distance_legacy_pairs_positionally() {
        let current = vec![at(vec![0, 0]), at(vec![5, 5])];
        let goal = vec![at(vec![1, 0]), at(vec![5, 7])];
        assert_eq!(chebyshev_distance_legacy(&current, &goal), 1.0 + 2.0);
    }
}
