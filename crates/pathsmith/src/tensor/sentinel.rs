//! Sentinel values for `CoordTensor<i32>` used as a cell-occupancy tensor.

/// Cell is inside the boundary padding or otherwise forbidden.
pub const OUT_OF_BOUNDS: i32 = -2;

/// Cell holds no module.
pub const FREE_SPACE: i32 = -1;

/// Transient marker used only by the parallel-move checker (§4.4): a cell
/// that has been claimed by an in-progress parallel assignment but has no
/// anchor backing it yet.
pub const OCCUPIED_NO_ANCHOR: i32 = i32::MAX;
