//! A* search over the configuration space (spec §4.6's `AStar`/`BDAStar`).
//! Grounded on `ConfigurationSpace.cpp`'s `AStar`/`BDAStar` and
//! `CompareConfiguration`/`CompareBDConfiguration` (lower `f = g + h` pops
//! first; ties broken toward the deeper, i.e. higher-`g`, configuration).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::SearchError;
use crate::flags::{ProgressSink, SearchFlags};
use crate::heuristics::Heuristic;
use crate::lattice::Lattice;
use crate::module::ModuleData;
use crate::moves::{MoveCatalog, PropertyFunctionRegistry};

use super::arena::{Arena, ConfigId, Origin};
use super::bfs::SearchOutcome;
use super::engine::{expand, matches_goal};
use super::visited::{VisitedEntry, VisitedSet};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapKey {
    f: f32,
    g: i32,
}

impl Eq for HeapKey {}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // `BinaryHeap` pops the greatest element; invert the `f` comparison
        // so the smallest `f` pops first, and break ties toward higher `g`.
        match other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal) {
            Ordering::Equal => self.g.cmp(&other.g),
            ord => ord,
        }
    }
}

/// Single-frontier A* from `start` to `goal` using `heuristic`.
pub fn a_star(
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    heuristic: &Heuristic,
    start: Vec<ModuleData>,
    goal: &[ModuleData],
    sink: &mut impl ProgressSink,
) -> Result<SearchOutcome, SearchError> {
    if matches_goal(&start, goal) {
        return Ok(SearchOutcome { path: vec![start], expanded: 0 });
    }

    let consistent = flags.consistent_heuristic_validator && heuristic.kind().is_admissible();
    let free_total = lattice.registry().static_start().max(1);

    let mut arena = Arena::new();
    let mut visited = VisitedSet::new();

    let h0 = heuristic.estimate(&start, flags.parallel_moves, free_total);
    let root = arena.alloc(start.clone(), None, 0, Origin::Start);
    visited.insert(&start, VisitedEntry { config: root, depth: 0, origin: Origin::Start });

    let mut heap = BinaryHeap::new();
    heap.push((HeapKey { f: h0, g: 0 }, root));
    let mut expanded = 0usize;
    let mut last_depth = 0usize;
    let mut running_max = f32::NEG_INFINITY;

    while let Some((key, current)) = heap.pop() {
        let (state, depth) = {
            let node = arena.get(current);
            (node.state.clone(), node.depth)
        };
        // A cheaper path to this configuration was found after this entry was
        // pushed; the visited set now points at a different, better node.
        if visited.lookup(&state).map(|e| e.depth) != Some(depth) {
            continue;
        }

        if matches_goal(&state, goal) {
            sink.expansion_snapshot(true, expanded, 0);
            return Ok(SearchOutcome { path: arena.path_to_root(current), expanded });
        }

        if depth as usize != last_depth {
            last_depth = depth as usize;
            sink.depth_changed(last_depth, None);
        }

        if consistent {
            if key.f < running_max {
                return Err(SearchError::Inconsistent { at_depth: depth as usize });
            }
            running_max = running_max.max(key.f);
        }

        for next_state in expand(lattice, catalog, funcs, flags, &state) {
            let next_depth = depth + 1;
            if let Some(existing) = visited.lookup(&next_state) {
                if existing.depth <= next_depth {
                    continue;
                }
            }
            let h = heuristic.estimate(&next_state, flags.parallel_moves, free_total);
            let id = arena.alloc(next_state.clone(), Some(current), next_depth, Origin::Start);
            visited.insert(&next_state, VisitedEntry { config: id, depth: next_depth, origin: Origin::Start });
            heap.push((HeapKey { f: next_depth as f32 + h, g: next_depth }, id));
        }

        expanded += 1;
        sink.expansion_snapshot(false, expanded, heap.len());
    }

    Err(SearchError::Exhausted { expanded })
}

/// Bidirectional A*: a start-anchored frontier (using `heuristic_to_goal`)
/// and a goal-anchored frontier (using `heuristic_to_start`) expand
/// alternately, favoring whichever open set's best `f` is lower. A meeting
/// is recorded whenever a popped configuration is already visited from the
/// other side; the search keeps going until the cheapest possible remaining
/// path on either frontier can no longer beat the best meeting found, then
/// splices the two half-paths together.
#[allow(clippy::too_many_arguments)]
pub fn bidirectional_a_star(
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    heuristic_to_goal: &Heuristic,
    heuristic_to_start: &Heuristic,
    start: Vec<ModuleData>,
    goal: Vec<ModuleData>,
    sink: &mut impl ProgressSink,
) -> Result<SearchOutcome, SearchError> {
    if matches_goal(&start, &goal) {
        return Ok(SearchOutcome { path: vec![start], expanded: 0 });
    }

    let free_total = lattice.registry().static_start().max(1);

    let mut arena = Arena::new();
    let mut visited_start = VisitedSet::new();
    let mut visited_end = VisitedSet::new();

    let start_root = arena.alloc(start.clone(), None, 0, Origin::Start);
    let end_root = arena.alloc(goal.clone(), None, 0, Origin::End);
    visited_start.insert(&start, VisitedEntry { config: start_root, depth: 0, origin: Origin::Start });
    visited_end.insert(&goal, VisitedEntry { config: end_root, depth: 0, origin: Origin::End });

    let h0 = heuristic_to_goal.estimate(&start, flags.parallel_moves, free_total);
    let he0 = heuristic_to_start.estimate(&goal, flags.parallel_moves, free_total);
    let mut open_start = BinaryHeap::new();
    let mut open_end = BinaryHeap::new();
    open_start.push((HeapKey { f: h0, g: 0 }, start_root));
    open_end.push((HeapKey { f: he0, g: 0 }, end_root));

    let mut expanded = 0usize;
    let mut best: Option<(f32, ConfigId, ConfigId)> = None;

    loop {
        if open_start.is_empty() && open_end.is_empty() {
            break;
        }
        let start_top_f = open_start.peek().map(|(k, _)| k.f);
        let end_top_f = open_end.peek().map(|(k, _)| k.f);

        if let Some((best_cost, _, _)) = best {
            let lower_bound = match (start_top_f, end_top_f) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => f32::INFINITY,
            };
            if lower_bound >= best_cost {
                break;
            }
        }

        let expand_start_side = match (start_top_f, end_top_f) {
            (Some(a), Some(b)) => a <= b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => unreachable!("checked above"),
        };

        if expand_start_side {
            let (key, current) = match open_start.pop() {
                Some(entry) => entry,
                None => break,
            };
            let (state, depth) = {
                let node = arena.get(current);
                (node.state.clone(), node.depth)
            };
            if visited_start.lookup(&state).map(|e| e.depth) != Some(depth) {
                continue;
            }

            if let Some(other) = visited_end.lookup(&state) {
                let total = depth as f32 + other.depth as f32;
                if best.map_or(true, |(b, _, _)| total < b) {
                    best = Some((total, current, other.config));
                }
            }

            for next_state in expand(lattice, catalog, funcs, flags, &state) {
                let next_depth = depth + 1;
                if let Some(existing) = visited_start.lookup(&next_state) {
                    if existing.depth <= next_depth {
                        continue;
                    }
                }
                let h = heuristic_to_goal.estimate(&next_state, flags.parallel_moves, free_total);
                let id = arena.alloc(next_state.clone(), Some(current), next_depth, Origin::Start);
                visited_start.insert(&next_state, VisitedEntry { config: id, depth: next_depth, origin: Origin::Start });
                open_start.push((HeapKey { f: next_depth as f32 + h, g: next_depth }, id));
            }
            expanded += 1;
        } else {
            let (key, current) = match open_end.pop() {
                Some(entry) => entry,
                None => break,
            };
            let (state, depth) = {
                let node = arena.get(current);
                (node.state.clone(), node.depth)
            };
            if visited_end.lookup(&state).map(|e| e.depth) != Some(depth) {
                continue;
            }

            if let Some(other) = visited_start.lookup(&state) {
                let total = depth as f32 + other.depth as f32;
                if best.map_or(true, |(b, _, _)| total < b) {
                    best = Some((total, other.config, current));
                }
            }

            for next_state in expand(lattice, catalog, funcs, flags, &state) {
                let next_depth = depth + 1;
                if let Some(existing) = visited_end.lookup(&next_state) {
                    if existing.depth <= next_depth {
                        continue;
                    }
                }
                let h = heuristic_to_start.estimate(&next_state, flags.parallel_moves, free_total);
                let id = arena.alloc(next_state.clone(), Some(current), next_depth, Origin::End);
                visited_end.insert(&next_state, VisitedEntry { config: id, depth: next_depth, origin: Origin::End });
                open_end.push((HeapKey { f: next_depth as f32 + h, g: next_depth }, id));
            }
            expanded += 1;
        }

        sink.expansion_snapshot(best.is_some(), expanded, open_start.len() + open_end.len());
    }

    match best {
        Some((_, start_side, end_side)) => Ok(SearchOutcome {
            path: splice(&arena, start_side, end_side),
            expanded,
        }),
        None => Err(SearchError::Exhausted { expanded }),
    }
}

/// Join a start-origin node and an end-origin node known to hold the same
/// configuration into one start→goal path.
fn splice(arena: &Arena, start_side: ConfigId, end_side: ConfigId) -> Vec<Vec<ModuleData>> {
    let mut forward = arena.path_to_root(start_side);
    let mut backward = arena.path_to_root(end_side);
    backward.reverse();
    backward.remove(0); // duplicate meeting configuration
    forward.extend(backward);
    forward
}
