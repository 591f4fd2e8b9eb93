//! Criterion microbenches for heuristic cache construction and per-state
//! estimate lookups.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pathsmith::flags::SearchFlags;
use pathsmith::heuristics::{Heuristic, HeuristicKind};
use pathsmith::lattice::{AdjacencyOffsets, Lattice};
use pathsmith::module::{ModuleData, ModulePropertySet};
use pathsmith::moves::template::{CellRequirement, MoveTemplate};
use pathsmith::moves::MoveCatalog;

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

fn setup_lattice(axis_size: i32) -> Lattice {
    let mut lat = Lattice::new(2, axis_size, 2, AdjacencyOffsets::CubeFace);
    lat.add_module(vec![axis_size / 2, axis_size / 2], ModulePropertySet::new()).unwrap();
    lat
}

fn bench_cache_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_cache_build");
    let catalog = slide_catalog();
    let goal = vec![ModuleData::full(vec![2, 2], ModulePropertySet::new())];

    let flags = SearchFlags::default();
    group.bench_function(BenchmarkId::new("mrsh1", "axis32"), |b| {
        b.iter_batched(
            || setup_lattice(32),
            |mut lat| Heuristic::build(HeuristicKind::Mrsh1, &mut lat, &catalog, &goal, &flags),
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("true_chebyshev", "axis32"), |b| {
        b.iter_batched(
            || setup_lattice(32),
            |mut lat| Heuristic::build(HeuristicKind::TrueChebyshevDistance, &mut lat, &catalog, &goal, &flags),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("heuristic_estimate");
    let catalog = slide_catalog();
    let goal = vec![ModuleData::full(vec![2, 2], ModulePropertySet::new())];
    let mut lat = setup_lattice(32);
    let heuristic = Heuristic::build(HeuristicKind::Mrsh1, &mut lat, &catalog, &goal, &SearchFlags::default());
    let current = vec![ModuleData::full(vec![20, 20], ModulePropertySet::new())];

    group.bench_function(BenchmarkId::new("mrsh1", "single_module"), |b| {
        b.iter(|| heuristic.estimate(&current, false, 1))
    });
    group.finish();
}

criterion_group!(benches, bench_cache_construction, bench_estimate);
criterion_main!(benches);
