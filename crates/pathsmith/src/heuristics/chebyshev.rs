//! Chebyshev-distance heuristic cache (spec §4.7): BFS outward from every
//! goal coordinate using the 3^order - 1 axis-±1 neighborhood.
//!
//! Grounded on `HeuristicCache.h/.cpp`'s `ChebyshevHeuristicCache` /
//! `ChebyshevEnqueueAdjacent`.

use std::collections::VecDeque;

use crate::module::ModuleData;
use crate::tensor::CoordTensor;

/// Per-coordinate lower bound on moves-to-nearest-goal, ignoring the move
/// catalog entirely (every axis-adjacent cell, including diagonals, counts
/// as one step).
#[derive(Debug)]
pub struct ChebyshevCache {
    depth: CoordTensor<f32>,
}

fn neighbor_offsets(order: usize) -> Vec<Vec<i32>> {
    let mut offsets = vec![vec![]];
    for _ in 0..order {
        let mut next = Vec::with_capacity(offsets.len() * 3);
        for prefix in &offsets {
            for d in [-1, 0, 1] {
                let mut v = prefix.clone();
                v.push(d);
                next.push(v);
            }
        }
        offsets = next;
    }
    offsets.into_iter().filter(|v| v.iter().any(|&d| d != 0)).collect()
}

impl ChebyshevCache {
    /// `axis_size` must match the lattice's padded tensor size so the cache
    /// can be indexed with the same coordinates.
    pub fn build(order: usize, axis_size: i32, goal: &[ModuleData]) -> Self {
        let mut depth = CoordTensor::new(order, axis_size, f32::INFINITY, None);
        let offsets = neighbor_offsets(order);
        let mut queue = VecDeque::new();

        for module in goal {
            let coords = module.coords();
            if depth.in_bounds(&coords) && *depth.get(&coords) > 0.0 {
                *depth.get_mut(&coords) = 0.0;
                queue.push_back(coords);
            }
        }

        while let Some(coords) = queue.pop_front() {
            let here = *depth.get(&coords);
            for offset in &offsets {
                let next: Vec<i32> = coords.iter().zip(offset).map(|(c, o)| c + o).collect();
                if !depth.in_bounds(&next) {
                    continue;
                }
                if *depth.get(&next) > here + 1.0 {
                    *depth.get_mut(&next) = here + 1.0;
                    queue.push_back(next);
                }
            }
        }

        Self { depth }
    }

    /// `+inf` if `coords` cannot reach any goal cell under this neighborhood.
    pub fn value(&self, coords: &[i32]) -> f32 {
        if self.depth.in_bounds(coords) {
            *self.depth.get(coords)
        } else {
            f32::INFINITY
        }
    }
}
