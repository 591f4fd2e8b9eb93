//! Move legality checks and application (spec §4.3's move contract).
//!
//! Grounded on `MoveManager.cpp`'s `MoveCheck`/`FreeSpaceCheck`/
//! `FreeSpaceCheckHelpLimit`/`MoveModule`/`UnMoveModule` family: same
//! three-tier weakening (strict check, free-space check, help-limited free-
//! space check) and the same "clear, write sentinel, relocate, re-edge-check,
//! fire property updates" application order.

use crate::lattice::Lattice;
use crate::module::ModuleId;
use crate::tensor::{CoordTensor, FREE_SPACE, OUT_OF_BOUNDS};
use crate::error::MoveError;

use super::registry::PropertyFunctionRegistry;
use super::symmetry::ConcreteMove;
use super::template::CellRequirement;

fn add(a: &[i32], b: &[i32]) -> Vec<i32> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

fn negate(v: &[i32]) -> Vec<i32> {
    v.iter().map(|x| -x).collect()
}

/// Strict legality at `id`'s current position: every offset/anchor
/// constraint satisfied AND every property predicate passes.
pub fn move_check(lattice: &Lattice, funcs: &PropertyFunctionRegistry, mv: &ConcreteMove, id: ModuleId) -> Result<bool, MoveError> {
    let coords = lattice.registry().get(id).coords.clone();
    for (offset, req) in &mv.cells {
        let cell = lattice.cell_checked(&add(&coords, offset));
        let ok = match req {
            CellRequirement::Empty => cell == FREE_SPACE,
            CellRequirement::Anchor => cell >= 0,
        };
        if !ok {
            return Ok(false);
        }
    }

    for clause in &mv.property_checks {
        let target_coords = match &clause.module_offset {
            Some(offset) => add(&coords, offset),
            None => coords.clone(),
        };
        let cell = lattice.cell_checked(&target_coords);
        if cell < 0 {
            return Ok(false);
        }
        let properties = &lattice.registry().get(ModuleId(cell as usize)).properties;
        if !funcs.check(properties, clause)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Weaker than [`move_check`]: "must be empty" slots accept any
/// non-positive sentinel (free space or out-of-bounds both count as "no
/// anchor to worry about"), anchor slots accept anything but out-of-bounds.
/// No property predicates are evaluated — this is used by heuristic caches
/// reasoning about hypothetical occupancy, not the actual lattice.
pub fn free_space_check(lattice: &Lattice, mv: &ConcreteMove, coords: &[i32]) -> bool {
    mv.cells.iter().all(|(offset, req)| {
        let cell = lattice.cell_checked(&add(coords, offset));
        match req {
            CellRequirement::Empty => cell <= FREE_SPACE,
            CellRequirement::Anchor => cell != OUT_OF_BOUNDS,
        }
    })
}

/// As [`free_space_check`], but an anchor slot that is actually empty still
/// passes if `help_tensor` at that cell is below `help_budget`, up to
/// `help_budget` such borrowed anchors per call.
pub fn free_space_check_with_help(
    lattice: &Lattice,
    mv: &ConcreteMove,
    coords: &[i32],
    help_tensor: &CoordTensor<i32>,
    help_budget: i32,
) -> bool {
    let mut borrowed = 0;
    for (offset, req) in &mv.cells {
        let target = add(coords, offset);
        let cell = lattice.cell_checked(&target);
        match req {
            CellRequirement::Empty => {
                if cell > FREE_SPACE {
                    return false;
                }
            }
            CellRequirement::Anchor => {
                if cell == OUT_OF_BOUNDS {
                    return false;
                }
                if cell <= FREE_SPACE {
                    if borrowed >= help_budget {
                        return false;
                    }
                    let help_here = if help_tensor.in_bounds(&target) { *help_tensor.get(&target) } else { i32::MAX };
                    if help_here >= help_budget {
                        return false;
                    }
                    borrowed += 1;
                }
            }
        }
    }
    true
}

/// Apply `mv` to `id`: relocate it by `mv.final_offset` and fire property
/// updates in catalog order.
pub fn apply(lattice: &mut Lattice, funcs: &PropertyFunctionRegistry, mv: &ConcreteMove, id: ModuleId) -> Result<(), MoveError> {
    do_move(lattice, funcs, mv, id, false)
}

/// Exact inverse of [`apply`]: relocate by `-mv.final_offset` and fire
/// property updates in reverse order, so that `apply; unapply` restores
/// byte-identical lattice state (spec §4.3).
pub fn unapply(lattice: &mut Lattice, funcs: &PropertyFunctionRegistry, mv: &ConcreteMove, id: ModuleId) -> Result<(), MoveError> {
    do_move(lattice, funcs, mv, id, true)
}

fn do_move(lattice: &mut Lattice, funcs: &PropertyFunctionRegistry, mv: &ConcreteMove, id: ModuleId, reverse: bool) -> Result<(), MoveError> {
    let origin = lattice.registry().get(id).coords.clone();
    let delta = if reverse { negate(&mv.final_offset) } else { mv.final_offset.clone() };
    let new_coords = add(&origin, &delta);
    lattice.relocate_module(id, new_coords);

    if !lattice.ignore_properties() {
        if reverse {
            for clause in mv.property_updates.iter().rev() {
                apply_update(lattice, funcs, &origin, clause)?;
            }
        } else {
            for clause in &mv.property_updates {
                apply_update(lattice, funcs, &origin, clause)?;
            }
        }
    }

    if lattice.registry().get(id).properties.iter().any(|p| p.is_dynamic()) {
        lattice.registry_mut().get_mut(id).properties.on_move(&delta);
    }

    Ok(())
}

fn apply_update(
    lattice: &mut Lattice,
    funcs: &PropertyFunctionRegistry,
    origin: &[i32],
    clause: &crate::moves::template::PropertyClause,
) -> Result<(), MoveError> {
    let target_coords = match &clause.module_offset {
        Some(offset) => add(origin, offset),
        None => origin.to_vec(),
    };
    let cell = lattice.cell_checked(&target_coords);
    if cell < 0 {
        return Ok(());
    }
    let target_id = ModuleId(cell as usize);
    let mut properties = lattice.registry().get(target_id).properties.clone();
    funcs.update(&mut properties, clause)?;
    lattice.registry_mut().get_mut(target_id).properties = properties;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::AdjacencyOffsets;
    use crate::module::ModulePropertySet;
    use crate::moves::symmetry::ConcreteMove;

    fn unit_slide_east() -> ConcreteMove {
        // mover at (0,0); (1,0) must be empty; final offset (1,0).
        ConcreteMove {
            name: "slide_east".to_string(),
            cells: vec![(vec![1, 0], CellRequirement::Empty)],
            final_offset: vec![1, 0],
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
        }
    }

    #[test]
    fn move_check_passes_when_target_cell_is_free() {
        let mut lat = Lattice::new(2, 6, 2, AdjacencyOffsets::CubeFace);
        let id = lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let funcs = PropertyFunctionRegistry::new();
        let mv = unit_slide_east();
        assert!(move_check(&lat, &funcs, &mv, id).unwrap());
    }

    #[test]
    fn move_check_fails_when_target_cell_is_occupied() {
        let mut lat = Lattice::new(2, 6, 2, AdjacencyOffsets::CubeFace);
        let id = lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        lat.add_module(vec![3, 2], ModulePropertySet::new()).unwrap();
        let funcs = PropertyFunctionRegistry::new();
        let mv = unit_slide_east();
        assert!(!move_check(&lat, &funcs, &mv, id).unwrap());
    }

    #[test]
    fn apply_then_unapply_restores_coordinates_and_adjacency() {
        let mut lat = Lattice::new(2, 6, 2, AdjacencyOffsets::CubeFace);
        let id = lat.add_module(vec![2, 2], ModulePropertySet::new()).unwrap();
        let funcs = PropertyFunctionRegistry::new();
        let mv = unit_slide_east();

        let before = lat.module_info();
        apply(&mut lat, &funcs, &mv, id).unwrap();
        assert_eq!(lat.registry().get(id).coords, vec![3, 2]);
        unapply(&mut lat, &funcs, &mv, id).unwrap();
        assert_eq!(lat.registry().get(id).coords, vec![2, 2]);
        assert_eq!(lat.module_info(), before);
    }

    #[test]
    fn free_space_check_treats_out_of_bounds_as_not_empty_for_anchors() {
        let lat = Lattice::new(2, 4, 1, AdjacencyOffsets::CubeFace);
        let mv = ConcreteMove {
            name: "pivot".to_string(),
            cells: vec![(vec![0, 1], CellRequirement::Anchor)],
            final_offset: vec![1, 0],
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
        };
        // one row above the top boundary row is still out-of-bounds padding
        assert!(!free_space_check(&lat, &mv, &[0, 0]));
    }
}
