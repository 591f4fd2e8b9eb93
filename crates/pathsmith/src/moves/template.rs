//! Parsing of move templates from a grid-of-strings description (spec §4.3,
//! §6.2). Grounded on `pathfinder/moves/MoveManager.h`'s `Move::State` enum
//! and `Move2d::InitMove`/`Move3d::InitMove` (not shown in full here, but the
//! character set and the single-`?`/single-`!` requirement are load-bearing
//! across both dimensionalities, so this parser is dimension-generic).

use crate::error::MoveError;

/// What a move template requires of one relative cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRequirement {
    /// `x`: the cell must be empty (FREE_SPACE).
    Empty,
    /// `#`: the cell must be occupied by any module (an anchor).
    Anchor,
}

/// One property predicate or update attached to a move, addressed relative
/// to the moving module (spec §6.2's `propertyChecks`/`propertyUpdates`).
#[derive(Debug, Clone)]
pub struct PropertyClause {
    pub function: String,
    /// Offset of the module whose properties this clause examines/updates;
    /// `None` means the moving module itself.
    pub module_offset: Option<Vec<i32>>,
    pub property: Option<String>,
    pub args: serde_json::Value,
    /// Which entries of `args` (or, if `args` itself isn't an array, index
    /// `0` standing for `args` as a whole) are axis-valued and must be
    /// rotated along with the move's own offsets.
    pub rotate_args: Vec<usize>,
    /// As `rotate_args`, for reflection.
    pub reflect_args: Vec<usize>,
    pub invert_reflection: bool,
    pub reflect_on_normal_rotation: bool,
}

/// An animation tag plus the offset it annotates, carried through symmetry
/// expansion for the visualizer (spec §6.3). The axis embedded in `kind` is
/// renumbered under rotation/reflection the same way coordinate offsets are;
/// see `symmetry::rotate_anim_tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimSegment {
    pub kind: String,
    pub offset: Vec<i32>,
    /// Axis indices the tag's direction refers to (e.g. the slide axis),
    /// renumbered by rotation the same way `offset`'s components are. A
    /// generalization of the source's hardcoded 32-variant `AnimType` enum
    /// plus its `AnimReflectionMap` table: rather than enumerate every
    /// rotated/reflected tag name, the tag keeps one name and carries the
    /// axes it depends on, so rotation/reflection only ever has to touch
    /// integers, not swap strings against a lookup table. Reflection does
    /// not change which axes are referenced, only `offset`'s signs.
    pub axes: Vec<usize>,
}

/// A parsed, not-yet-expanded move definition.
#[derive(Debug, Clone)]
pub struct MoveTemplate {
    pub name: String,
    pub order: usize,
    /// Every checked cell relative to the moving module's current position,
    /// excluding the `?`/`!` markers themselves.
    pub cells: Vec<(Vec<i32>, CellRequirement)>,
    pub init_offset: Vec<i32>,
    pub final_offset: Vec<i32>,
    pub property_checks: Vec<PropertyClause>,
    pub property_updates: Vec<PropertyClause>,
    pub anim_sequence: Vec<AnimSegment>,
    /// `false` suppresses symmetry expansion for inherently directional moves.
    pub perm_gen: bool,
}

impl MoveTemplate {
    /// Parse `def`, a grid of same-length rows (2D) or a grid-of-grids (3D,
    /// one 2D layer per outer row), where position encodes the coordinate
    /// offset relative to the grid's own `?` cell and characters are one of
    /// `' '`, `'x'`, `'#'`, `'?'`, `'!'`.
    pub fn from_grid(name: &str, rows: &[&str]) -> Result<(Vec<(Vec<i32>, CellRequirement)>, Vec<i32>, Vec<i32>), MoveError> {
        let mut cells = Vec::new();
        let mut init_offset = None;
        let mut final_offset = None;

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let offset = vec![x as i32, y as i32];
                match ch {
                    ' ' => {}
                    'x' => cells.push((offset, CellRequirement::Empty)),
                    '#' => cells.push((offset, CellRequirement::Anchor)),
                    '?' => {
                        if init_offset.replace(offset).is_some() {
                            return Err(MoveError::DuplicateMarker {
                                name: name.to_string(),
                                marker: '?',
                            });
                        }
                    }
                    '!' => {
                        if final_offset.replace(offset).is_some() {
                            return Err(MoveError::DuplicateMarker {
                                name: name.to_string(),
                                marker: '!',
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        let init_offset = init_offset.ok_or_else(|| MoveError::MissingInitial { name: name.to_string() })?;
        let final_offset = final_offset.ok_or_else(|| MoveError::MissingFinal { name: name.to_string() })?;

        // Re-anchor every offset (including init/final) to the `?` cell so
        // templates are position-independent, matching the source's
        // convention that all move offsets are relative to the moving module.
        let cells = cells
            .into_iter()
            .map(|(offset, req)| (sub(&offset, &init_offset), req))
            .collect();
        let final_offset = sub(&final_offset, &init_offset);
        let init_offset = vec![0; init_offset.len()];

        Ok((cells, init_offset, final_offset))
    }
}

fn sub(a: &[i32], b: &[i32]) -> Vec<i32> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_slide() {
        let (cells, init, fin) = MoveTemplate::from_grid("slide", &["x!", "?#"]).unwrap();
        assert_eq!(init, vec![0, 0]);
        assert_eq!(fin, vec![1, -1]);
        assert!(cells.contains(&(vec![1, 0], CellRequirement::Empty)));
        assert!(cells.contains(&(vec![0, 0], CellRequirement::Anchor)));
    }

    #[test]
    fn rejects_missing_initial() {
        let err = MoveTemplate::from_grid("bad", &["x!"]).unwrap_err();
        assert!(matches!(err, MoveError::MissingInitial { .. }));
    }

    #[test]
    fn rejects_duplicate_final() {
        let err = MoveTemplate::from_grid("bad", &["?!!"]).unwrap_err();
        assert!(matches!(err, MoveError::DuplicateMarker { marker: '!', .. }));
    }
}
