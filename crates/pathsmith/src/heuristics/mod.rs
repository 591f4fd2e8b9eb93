//! Heuristic caches and legacy heuristics (spec §4.7). Grounded on
//! `pathfinder/search/HeuristicCache.h/.cpp`.

pub mod chebyshev;
pub mod legacy;
pub mod move_offset;
pub mod move_offset_property;
pub mod refinements;

pub use chebyshev::ChebyshevCache;
pub use move_offset::MoveOffsetCache;
pub use move_offset_property::MoveOffsetPropertyCache;

use crate::flags::SearchFlags;
use crate::module::ModuleData;
use crate::moves::MoveCatalog;

/// Every heuristic kind selectable from the CLI (spec §6.4's `--heuristic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicKind {
    /// Raw MoveOffset cache sum, undivided (admissible).
    Mrsh1,
    SymDiff,
    ManhattanDistance,
    /// `TrueChebyshevDistance`: the admissible Chebyshev cache variant.
    TrueChebyshevDistance,
    /// Legacy, undivided Chebyshev sum; not obviously admissible.
    ChebyshevDistanceLegacy,
}

impl HeuristicKind {
    /// `true` for heuristics the engine knows are admissible; used to force
    /// `consistent_heuristic_validator` off for the rest regardless of the
    /// caller's flag (Design Notes §9's resolved Open Question).
    pub fn is_admissible(self) -> bool {
        matches!(self, Self::Mrsh1 | Self::SymDiff | Self::TrueChebyshevDistance)
    }
}

/// Precomputed state behind whichever heuristic the caller selected.
pub enum Heuristic {
    Mrsh1 { cache: MoveOffsetCache },
    SymDiff { goal: Vec<ModuleData> },
    ManhattanDistance { goal: Vec<ModuleData> },
    TrueChebyshevDistance { cache: ChebyshevCache, max_move_distance: i32 },
    ChebyshevDistanceLegacy { goal: Vec<ModuleData> },
}

impl Heuristic {
    pub fn kind(&self) -> HeuristicKind {
        match self {
            Self::Mrsh1 { .. } => HeuristicKind::Mrsh1,
            Self::SymDiff { .. } => HeuristicKind::SymDiff,
            Self::ManhattanDistance { .. } => HeuristicKind::ManhattanDistance,
            Self::TrueChebyshevDistance { .. } => HeuristicKind::TrueChebyshevDistance,
            Self::ChebyshevDistanceLegacy { .. } => HeuristicKind::ChebyshevDistanceLegacy,
        }
    }

    pub fn build(
        kind: HeuristicKind,
        lattice: &mut crate::lattice::Lattice,
        catalog: &MoveCatalog,
        goal: &[ModuleData],
        flags: &SearchFlags,
    ) -> Self {
        let max_move_distance = catalog.max_distance().max(1);
        match kind {
            HeuristicKind::Mrsh1 => Self::Mrsh1 {
                cache: MoveOffsetCache::build(lattice, catalog, goal, flags),
            },
            HeuristicKind::SymDiff => Self::SymDiff { goal: goal.to_vec() },
            HeuristicKind::ManhattanDistance => Self::ManhattanDistance { goal: goal.to_vec() },
            HeuristicKind::TrueChebyshevDistance => Self::TrueChebyshevDistance {
                cache: ChebyshevCache::build(lattice.order(), lattice.axis_size(), goal),
                max_move_distance,
            },
            HeuristicKind::ChebyshevDistanceLegacy => Self::ChebyshevDistanceLegacy { goal: goal.to_vec() },
        }
    }

    /// Heuristic estimate of remaining moves for `current`. Divided by the
    /// number of free modules when `parallel_moves` is enabled, per spec
    /// §4.6's "Cost with parallel moves" note — the best case relocates
    /// every free module in a single parallel step.
    pub fn estimate(&self, current: &[ModuleData], parallel_moves: bool, free_module_count: usize) -> f32 {
        let raw = match self {
            Self::Mrsh1 { cache } => current.iter().map(|m| cache.value(&m.coords())).sum(),
            Self::SymDiff { goal } => legacy::sym_diff(current, goal),
            Self::ManhattanDistance { goal } => legacy::manhattan_distance(current, goal),
            Self::TrueChebyshevDistance { cache, max_move_distance } => {
                let sum: f32 = current.iter().map(|m| cache.value(&m.coords())).sum();
                sum / *max_move_distance as f32
            }
            Self::ChebyshevDistanceLegacy { goal } => legacy::chebyshev_distance_legacy(current, goal),
        };
        if parallel_moves && free_module_count > 1 {
            raw / free_module_count as f32
        } else {
            raw
        }
    }
}
