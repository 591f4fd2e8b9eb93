//! Process-wide feature flags (spec §6.5), collected into an ordinary value
//! rather than global `static`s, per the Design Notes' guidance to pass
//! singleton-flavored state by reference through the search APIs.

/// Feature flags threaded through `Engine`/search entry points.
///
/// Every field defaults the way the source system's macros defaulted, so a
/// caller that only overrides the one or two flags it cares about still gets
/// the documented baseline behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFlags {
    /// Enable the parallel multi-module move engine (§4.4). Off by default:
    /// serial single-module expansion is cheaper for most inputs.
    pub parallel_moves: bool,
    /// Permanently mark cells unreachable-under-any-property as
    /// `OUT_OF_BOUNDS` once a heuristic cache proves it.
    pub heuristic_cache_optimization: bool,
    /// Cap `MoveOffset` cache construction using a static-distance cache.
    pub heuristic_cache_dist_limitations: bool,
    /// Use a per-goal "help budget" during `free_space_check_with_help`.
    pub heuristic_cache_help_limitations: bool,
    /// Track the running max of `g + h` and raise
    /// [`crate::error::SearchError::Inconsistent`] if it ever decreases.
    pub consistent_heuristic_validator: bool,
    /// Emit a JSON trace of search progress (host-defined consumer).
    pub output_json: bool,
    /// Use the legacy axis-by-axis edge check instead of the offset-delta one.
    pub old_edgecheck: bool,
    /// Use rhombic-dodecahedron edge checking instead of cube-face.
    pub rd_edgecheck: bool,
    /// Export the generated final state alongside the search result.
    pub generate_final_state: bool,
    /// Print the resolved move path to the progress sink.
    pub print_path: bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self {
            parallel_moves: false,
            heuristic_cache_optimization: true,
            heuristic_cache_dist_limitations: true,
            heuristic_cache_help_limitations: true,
            consistent_heuristic_validator: true,
            output_json: false,
            old_edgecheck: false,
            rd_edgecheck: false,
            generate_final_state: false,
            print_path: false,
        }
    }
}

/// Optional progress sink invoked unconditionally by the search loop; hosts
/// decide whether (and how) to surface the events (Design Notes §9).
pub trait ProgressSink {
    /// Called whenever the search's current frontier depth increases.
    fn depth_changed(&mut self, depth: usize, estimated_total: Option<usize>) {
        let _ = (depth, estimated_total);
    }
    /// Called after each configuration is expanded.
    fn expansion_snapshot(&mut self, found: bool, expanded: usize, unexpanded: usize) {
        let _ = (found, expanded, unexpanded);
    }
}

/// A [`ProgressSink`] that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {}
