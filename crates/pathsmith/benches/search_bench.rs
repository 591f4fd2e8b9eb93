//! Criterion microbenches for BFS/A* over a small lattice with an
//! unconditional unit-slide move, mirroring the fixture in
//! `search::bfs`'s own tests.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pathsmith::flags::{NullSink, SearchFlags};
use pathsmith::heuristics::{Heuristic, HeuristicKind};
use pathsmith::lattice::{AdjacencyOffsets, Lattice};
use pathsmith::module::{ModuleData, ModulePropertySet};
use pathsmith::moves::template::{CellRequirement, MoveTemplate};
use pathsmith::moves::{MoveCatalog, PropertyFunctionRegistry};
use pathsmith::search::{a_star, bfs};

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

fn setup(start: [i32; 2], goal: [i32; 2]) -> (Lattice, MoveCatalog, PropertyFunctionRegistry, Vec<ModuleData>, Vec<ModuleData>) {
    let mut lat = Lattice::new(2, 24, 2, AdjacencyOffsets::CubeFace);
    lat.add_module(start.to_vec(), ModulePropertySet::new()).unwrap();
    let catalog = slide_catalog();
    let funcs = PropertyFunctionRegistry::new();
    let start_state = lat.module_info();
    let goal_state = vec![ModuleData::full(goal.to_vec(), ModulePropertySet::new())];
    (lat, catalog, funcs, start_state, goal_state)
}

fn bench_bfs(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_bfs");
    group.bench_function(BenchmarkId::new("bfs", "10-step-slide"), |b| {
        b.iter_batched(
            || setup([2, 2], [12, 2]),
            |(mut lat, catalog, funcs, start, goal)| {
                let flags = SearchFlags::default();
                let mut sink = NullSink;
                bfs(&mut lat, &catalog, &funcs, &flags, start, &goal, &mut sink).unwrap()
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_a_star(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_astar");
    group.bench_function(BenchmarkId::new("a_star_mrsh1", "10-step-slide"), |b| {
        b.iter_batched(
            || {
                let (mut lat, catalog, funcs, start, goal) = setup([2, 2], [12, 2]);
                let heuristic = Heuristic::build(HeuristicKind::Mrsh1, &mut lat, &catalog, &goal, &SearchFlags::default());
                (lat, catalog, funcs, heuristic, start, goal)
            },
            |(mut lat, catalog, funcs, heuristic, start, goal)| {
                let flags = SearchFlags::default();
                let mut sink = NullSink;
                a_star(&mut lat, &catalog, &funcs, &flags, &heuristic, start, &goal, &mut sink).unwrap()
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_bfs, bench_a_star);
criterion_main!(benches);
