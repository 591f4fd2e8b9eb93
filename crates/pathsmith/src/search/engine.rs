//! Shared expansion logic used by every search entry point (spec §4.5/§4.6):
//! enumerate every configuration one move (or, with `parallel_moves`, one
//! parallel step) away from a state, restoring `lattice` to that state
//! first and leaving it there afterward.

use crate::flags::SearchFlags;
use crate::lattice::Lattice;
use crate::module::ModuleData;
use crate::moves::check::move_check;
use crate::moves::{apply, parallel_steps, unapply, MoveCatalog, PropertyFunctionRegistry};

use super::visited::canonicalize;

pub fn expand(
    lattice: &mut Lattice,
    catalog: &MoveCatalog,
    funcs: &PropertyFunctionRegistry,
    flags: &SearchFlags,
    state: &[ModuleData],
) -> Vec<Vec<ModuleData>> {
    lattice.update_from_module_info(state).expect("state was produced by this lattice");
    let mut out = Vec::new();

    if flags.parallel_moves {
        let free = lattice.movable_modules();
        for step in parallel_steps(lattice, catalog, &free) {
            for &(id, move_idx) in &step.assignment {
                apply(lattice, funcs, catalog.get(move_idx), id).expect("parallel step already passed free_space_check");
            }
            out.push(lattice.module_info());
            for &(id, move_idx) in step.assignment.iter().rev() {
                unapply(lattice, funcs, catalog.get(move_idx), id).expect("inverse of a move just applied");
            }
        }
    } else {
        for id in lattice.movable_modules() {
            for mv in catalog.all() {
                if move_check(lattice, funcs, mv, id).unwrap_or(false) {
                    apply(lattice, funcs, mv, id).expect("move_check just passed");
                    out.push(lattice.module_info());
                    unapply(lattice, funcs, mv, id).expect("inverse of a move just applied");
                }
            }
        }
    }

    out
}

/// `true` iff two configurations are the same up to module enumeration order.
pub fn matches_goal(state: &[ModuleData], goal: &[ModuleData]) -> bool {
    canonicalize(state) == canonicalize(goal)
}
