//! Configuration-space search (spec §4.5/§4.6): BFS, bidirectional BFS, A*,
//! bidirectional A*, path reconstruction, and a deterministic random-target
//! generator.
//!
//! Grounded on `pathfinder/search/ConfigurationSpace.h/.cpp`. The source's
//! `Configuration*`/`next` pointer graph becomes an id-indexed [`Arena`]
//! (Design Notes' guidance to avoid raw-pointer graphs and deep recursive
//! drops).

pub mod arena;
pub mod astar;
pub mod bfs;
mod engine;
pub mod random_target;
pub mod visited;

pub use arena::{Arena, ConfigId, Origin};
pub use astar::{a_star, bidirectional_a_star};
pub use bfs::{bfs, bidirectional_bfs, SearchOutcome};
pub use random_target::{generate_random_final, ReplayToken};

use crate::error::SearchError;
use crate::flags::{NullSink, ProgressSink, SearchFlags};
use crate::heuristics::Heuristic;
use crate::lattice::Lattice;
use crate::module::ModuleData;
use crate::moves::{MoveCatalog, PropertyFunctionRegistry};

/// Which search algorithm to run (spec §6.4's `--algorithm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Bfs,
    BiDirectionalBfs,
    AStar,
    BDAStar,
}

/// Run `kind` from `start` to `goal`, returning an oldest-first path of
/// configurations (spec §4.6's `FindPath`). `heuristic`/`heuristic_to_start`
/// are only consulted by the A*-family kinds; `BDAStar` requires both.
#[allow(clippy::too_many_arguments)]
pub fn find_path(
    kind: SearchKind,
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    heuristic: Option<&Heuristic>,
    heuristic_to_start: Option<&Heuristic>,
    start: Vec<ModuleData>,
    goal: Vec<ModuleData>,
) -> Result<SearchOutcome, SearchError> {
    let mut sink = NullSink;
    find_path_with_sink(kind, lattice, catalog, funcs, flags, heuristic, heuristic_to_start, start, goal, &mut sink)
}

/// As [`find_path`], reporting progress to `sink` (spec §6.4's progress
/// reporting surface).
#[allow(clippy::too_many_arguments)]
pub fn find_path_with_sink(
    kind: SearchKind,
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    heuristic: Option<&Heuristic>,
    heuristic_to_start: Option<&Heuristic>,
    start: Vec<ModuleData>,
    goal: Vec<ModuleData>,
    sink: &mut impl ProgressSink,
) -> Result<SearchOutcome, SearchError> {
    match kind {
        SearchKind::Bfs => bfs::bfs(lattice, catalog, funcs, flags, start, &goal, sink),
        SearchKind::BiDirectionalBfs => bfs::bidirectional_bfs(lattice, catalog, funcs, flags, start, goal, sink),
        SearchKind::AStar => {
            let h = heuristic.expect("A* requires a heuristic");
            astar::a_star(lattice, catalog, funcs, flags, h, start, &goal, sink)
        }
        SearchKind::BDAStar => {
            let h = heuristic.expect("bidirectional A* requires a forward heuristic");
            let hs = heuristic_to_start.expect("bidirectional A* requires a backward heuristic");
            astar::bidirectional_a_star(lattice, catalog, funcs, flags, h, hs, start, goal, sink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::AdjacencyOffsets;
    use crate::module::ModulePropertySet;
    use crate::moves::template::{CellRequirement, MoveTemplate};

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
    fn find_path_is_deterministic_across_repeated_runs() {
        let mut lat = Lattice::new(2, 12, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let catalog = slide_catalog();
        let funcs = PropertyFunctionRegistry::new();
        let flags = SearchFlags::default();
        let start = lat.module_info();
        let goal = vec![ModuleData::full(vec![8, 2], ModulePropertySet::new())];

        let a = find_path(SearchKind::Bfs, &mut lat, &catalog, &funcs, &flags, None, None, start.clone(), goal.clone()).unwrap();
        let b = find_path(SearchKind::Bfs, &mut lat, &catalog, &funcs, &flags, None, None, start, goal).unwrap();
        assert_eq!(a.path.len(), b.path.len());
        assert_eq!(a.expanded, b.expanded);
    }

    #[test]
    fn parallel_moves_halves_the_path_length_of_two_independent_slides() {
        let mut lat = Lattice::new(2, 16, 2, AdjacencyOffsets::CubeFace);
        lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        lat.add_module(vec![10, 10], ModulePropertySet::new()).unwrap();
        let catalog = slide_catalog();
        let funcs = PropertyFunctionRegistry::new();
        let start = lat.module_info();
        let goal = vec![
            ModuleData::full(vec![3, 2], ModulePropertySet::new()),
            ModuleData::full(vec![11, 10], ModulePropertySet::new()),
        ];

        let serial_flags = SearchFlags::default();
        let serial = find_path(SearchKind::Bfs, &mut lat, &catalog, &funcs, &serial_flags, None, None, start.clone(), goal.clone()).unwrap();

        let parallel_flags = SearchFlags { parallel_moves: true, ..SearchFlags::default() };
        let parallel = find_path(SearchKind::Bfs, &mut lat, &catalog, &funcs, &parallel_flags, None, None, start, goal).unwrap();

        assert_eq!(serial.path.len(), 3, "two independent unit slides take 2 serial moves");
        assert_eq!(parallel.path.len(), 2, "both slides collapse into a single parallel step");
    }
}
