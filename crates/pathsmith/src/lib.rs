//! Reconfiguration path planner for modular-robot lattices: a coordinate
//! tensor, module/property model, lattice adjacency graph, move catalog, and
//! the searches that plan a sequence of moves from one configuration to
//! another.
//!
//! Grounded throughout on `examples/original_source/pathfinder` (a C++
//! `hmcguire0583/Mod_Robots`-derived system); see `DESIGN.md` for the
//! per-module grounding ledger.

pub mod error;
pub mod flags;
pub mod heuristics;
pub mod io;
pub mod lattice;
pub mod module;
pub mod moves;
pub mod search;
pub mod tensor;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
