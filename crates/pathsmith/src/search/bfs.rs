//! Breadth-first search over the configuration space (spec §4.5's `BFS`,
//! §4.6's `BiDirectionalBFS`). Grounded on `ConfigurationSpace.cpp`'s `BFS`/
//! `BiDirectionalBFS`: a single FIFO queue carrying both frontiers, tagged by
//! origin, stopping the moment the two meet.

use std::collections::VecDeque;

use crate::error::SearchError;
use crate::flags::{ProgressSink, SearchFlags};
use crate::lattice::Lattice;
use crate::module::ModuleData;
use crate::moves::{MoveCatalog, PropertyFunctionRegistry};

use super::arena::{Arena, ConfigId, Origin};
use super::engine::{expand, matches_goal};
use super::visited::{VisitedEntry, VisitedSet};

/// An oldest-first path of configurations from start to goal, plus how many
/// configurations were expanded before it was found.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub path: Vec<Vec<ModuleData>>,
    pub expanded: usize,
}

/// Single-frontier BFS from `start` until `goal` is reached.
pub fn bfs(
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    start: Vec<ModuleData>,
    goal: &[ModuleData],
    sink: &mut impl ProgressSink,
) -> Result<SearchOutcome, SearchError> {
    if matches_goal(&start, goal) {
        return Ok(SearchOutcome { path: vec![start], expanded: 0 });
    }

    let mut arena = Arena::new();
    let mut visited = VisitedSet::new();

    let root = arena.alloc(start.clone(), None, 0, Origin::Start);
    visited.insert(&start, VisitedEntry { config: root, depth: 0, origin: Origin::Start });

    let mut queue = VecDeque::new();
    queue.push_back(root);
    let mut expanded = 0usize;
    let mut last_depth = 0usize;

    while let Some(current) = queue.pop_front() {
        let (state, depth) = {
            let node = arena.get(current);
            (node.state.clone(), node.depth)
        };
        if depth as usize != last_depth {
            last_depth = depth as usize;
            sink.depth_changed(last_depth, None);
        }

        for next_state in expand(lattice, catalog, funcs, flags, &state) {
            if visited.lookup(&next_state).is_some() {
                continue;
            }
            let next_depth = depth + 1;
            let id = arena.alloc(next_state.clone(), Some(current), next_depth, Origin::Start);
            visited.insert(&next_state, VisitedEntry { config: id, depth: next_depth, origin: Origin::Start });

            if matches_goal(&next_state, goal) {
                sink.expansion_snapshot(true, expanded + 1, queue.len());
                return Ok(SearchOutcome { path: arena.path_to_root(id), expanded: expanded + 1 });
            }
            queue.push_back(id);
        }

        expanded += 1;
        sink.expansion_snapshot(false, expanded, queue.len());
    }

    Err(SearchError::Exhausted { expanded })
}

/// Two simultaneous BFS frontiers (start-origin, end-origin) sharing one
/// visited set and one FIFO queue, stopping as soon as a configuration
/// reached from one origin is found already visited from the other.
pub fn bidirectional_bfs(
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    start: Vec<ModuleData>,
    goal: Vec<ModuleData>,
    sink: &mut impl ProgressSink,
) -> Result<SearchOutcome, SearchError> {
    if matches_goal(&start, &goal) {
        return Ok(SearchOutcome { path: vec![start], expanded: 0 });
    }

    let mut arena = Arena::new();
    let mut visited = VisitedSet::new();

    let start_root = arena.alloc(start.clone(), None, 0, Origin::Start);
    let end_root = arena.alloc(goal.clone(), None, 0, Origin::End);
    visited.insert(&start, VisitedEntry { config: start_root, depth: 0, origin: Origin::Start });
    visited.insert(&goal, VisitedEntry { config: end_root, depth: 0, origin: Origin::End });

    let mut queue = VecDeque::new();
    queue.push_back(start_root);
    queue.push_back(end_root);
    let mut expanded = 0usize;
    let mut last_depth = 0usize;

    while let Some(current) = queue.pop_front() {
        let (state, depth, origin) = {
            let node = arena.get(current);
            (node.state.clone(), node.depth, node.origin)
        };
        if depth as usize != last_depth {
            last_depth = depth as usize;
            sink.depth_changed(last_depth, None);
        }

        for next_state in expand(lattice, catalog, funcs, flags, &state) {
            if let Some(existing) = visited.lookup(&next_state) {
                if existing.origin != origin {
                    sink.expansion_snapshot(true, expanded + 1, queue.len());
                    let path = splice(&arena, current, origin, next_state, existing.config);
                    return Ok(SearchOutcome { path, expanded: expanded + 1 });
                }
                continue;
            }
            let next_depth = depth + 1;
            let id = arena.alloc(next_state.clone(), Some(current), next_depth, origin);
            visited.insert(&next_state, VisitedEntry { config: id, depth: next_depth, origin });
            queue.push_back(id);
        }

        expanded += 1;
        sink.expansion_snapshot(false, expanded, queue.len());
    }

    Err(SearchError::Exhausted { expanded })
}

/// Join the start-origin chain ending at `current` (extended by one step to
/// `next_state`) with the end-origin chain reaching the same configuration
/// via `existing`, into one start→goal path.
fn splice(arena: &Arena, current: ConfigId, origin: Origin, next_state: Vec<ModuleData>, existing: ConfigId) -> Vec<Vec<ModuleData>> {
    let mut this_chain = arena.path_to_root(current);
    this_chain.push(next_state);
    let mut other_chain = arena.path_to_root(existing);

    match origin {
        Origin::Start => {
            // this_chain: start..next_state. other_chain: goal..existing(==next_state).
            other_chain.reverse();
            other_chain.remove(0); // drop the duplicate meeting configuration
            this_chain.extend(other_chain);
            this_chain
        }
        Origin::End => {
            // this_chain: goal..next_state. other_chain: start..existing(==next_state).
            this_chain.reverse();
            this_chain.remove(0);
            other_chain.extend(this_chain);
            other_chain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::NullSink;
    use crate::lattice::AdjacencyOffsets;
    use crate::module::ModulePropertySet;
    use crate::moves::template::{CellRequirement, MoveTemplate};

    /// An unconditional unit slide (no anchor requirement), so an isolated
    /// free module can move into any empty neighboring cell. Symmetry
    /// expansion turns the single east-slide definition into all four
    /// axis-aligned directions.
    fn slide_catalog() -> MoveCatalog {
        let template = MoveTemplate {
            name: "slide".to_string(),
            order: 2,
            cells: vec![(vec![1, 0], CellRequirement::Empty)],
            init_offset: vec![0, 0],
            final_offset: vec![1, 0],
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
            perm_gen: true,
        };
        MoveCatalog::from_templates(&[template])
    }

    #[test]
    fn bfs_finds_a_one_step_slide() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let catalog = slide_catalog();
        let funcs = PropertyFunctionRegistry::new();
        let flags = SearchFlags::default();
        let start = lat.module_info();
        let goal = vec![ModuleData::full(vec![3, 2], ModulePropertySet::new())];

        let mut sink = NullSink;
        let outcome = bfs(&mut lat, &catalog, &funcs, &flags, start, &goal, &mut sink).unwrap();
        assert_eq!(outcome.path.last().unwrap(), &goal);
    }

    #[test]
    fn bidirectional_bfs_finds_the_same_goal() {
        let mut lat = Lattice::new(2, 8, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let catalog = slide_catalog();
        let funcs = PropertyFunctionRegistry::new();
        let flags = SearchFlags::default();
        let start = lat.module_info();
        let goal = vec![ModuleData::full(vec![4, 2], ModulePropertySet::new())];

        let mut sink = NullSink;
        let outcome = bidirectional_bfs(&mut lat, &catalog, &funcs, &flags, start.clone(), goal.clone(), &mut sink).unwrap();
        assert_eq!(outcome.path.first().unwrap(), &start);
        assert_eq!(outcome.path.last().unwrap(), &goal);
    }
}
