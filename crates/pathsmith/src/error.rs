//! Error taxonomy for the planner.
//!
//! Each fallible subsystem gets its own hand-rolled error enum with a manual
//! `Display` impl, rather than a single catch-all error type. Programmer
//! errors (out-of-range tensor access, use-before-init) still panic; these
//! types only cover the kinds listed in spec §7.

use std::fmt;

/// Errors raised by [`crate::lattice::Lattice`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatticeError {
    /// `add_module` targeted a cell that was not `FREE_SPACE`.
    CellOccupied { coords: Vec<i32> },
    /// `add_boundary` targeted a cell already holding a module.
    BoundaryOccupied { coords: Vec<i32> },
    /// `update_from_module_info` was given a set whose non-static module
    /// count disagrees with the lattice's own count. The call is a no-op;
    /// this error signals state corruption to the caller.
    UpdateCountMismatch { movable: usize, destinations: usize },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOccupied { coords } => {
                write!(f, "cannot add module at {coords:?}: cell is not free")
            }
            Self::BoundaryOccupied { coords } => {
                write!(f, "cannot add boundary at {coords:?}: cell is occupied")
            }
            Self::UpdateCountMismatch {
                movable,
                destinations,
            } => write!(
                f,
                "lattice update aborted: {movable} movable module(s) but {destinations} destination(s)"
            ),
        }
    }
}

impl std::error::Error for LatticeError {}

/// Errors raised while parsing or applying move templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// A move grid did not contain exactly one `?` (initial position).
    MissingInitial { name: String },
    /// A move grid did not contain exactly one `!` (final position).
    MissingFinal { name: String },
    /// A move grid contained more than one `?` or `!`.
    DuplicateMarker { name: String, marker: char },
    /// A referenced property-check/update function name is not registered.
    UnknownFunction { name: String },
    /// The compact 64-bit `ModuleData` encoding was requested for a module
    /// configuration it cannot represent (order > 3, axis size > 256, or
    /// more than one property).
    CompactEncodingUnsupported { reason: String },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInitial { name } => {
                write!(f, "move '{name}': grid has no '?' (initial position)")
            }
            Self::MissingFinal { name } => {
                write!(f, "move '{name}': grid has no '!' (final position)")
            }
            Self::DuplicateMarker { name, marker } => {
                write!(f, "move '{name}': grid has more than one '{marker}'")
            }
            Self::UnknownFunction { name } => {
                write!(f, "no property function registered under '{name}'")
            }
            Self::CompactEncodingUnsupported { reason } => {
                write!(f, "compact module encoding unsupported: {reason}")
            }
        }
    }
}

impl std::error::Error for MoveError {}

/// Errors raised while loading scenario/move JSON or `.scen` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// The file could not be read.
    Io { path: String, reason: String },
    /// The file's contents could not be parsed as JSON (or as a valid
    /// `.scen` block structure).
    Malformed { path: String, reason: String },
    /// A module coordinate fell outside the configured lattice bounds.
    OutOfRange { coords: Vec<i32> },
    /// Two modules were placed at the same coordinate.
    DuplicatePosition { coords: Vec<i32> },
    /// `adjacencyMode` named something other than "Cube Face"/"Cube Edge".
    UnknownAdjacencyMode { mode: String },
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "{path}: {reason}"),
            Self::Malformed { path, reason } => write!(f, "{path}: malformed: {reason}"),
            Self::OutOfRange { coords } => write!(f, "module at {coords:?} is out of bounds"),
            Self::DuplicatePosition { coords } => {
                write!(f, "duplicate module position {coords:?}")
            }
            Self::UnknownAdjacencyMode { mode } => {
                write!(f, "unknown adjacency mode '{mode}'")
            }
        }
    }
}

impl std::error::Error for ScenarioError {}

/// Errors raised by the configuration-space search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The frontier emptied before the goal was reached.
    Exhausted { expanded: usize },
    /// The running max of `g + h` strictly decreased while
    /// `consistent_heuristic_validator` was enabled.
    Inconsistent { at_depth: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { expanded } => {
                write!(f, "search exhausted after expanding {expanded} configuration(s)")
            }
            Self::Inconsistent { at_depth } => {
                write!(f, "heuristic inconsistency detected at depth {at_depth}")
            }
        }
    }
}

impl std::error::Error for SearchError {}
