//! Move JSON loading (spec §6.2): parses a move-definition file into the C5
//! move catalog's input templates. Grounded on `template.rs`'s `from_grid`
//! for the 2D character grid; this module adds the 3D layered-grid form the
//! wire format also allows and wires `propertyChecks`/`propertyUpdates`/
//! `animSeq` into [`MoveTemplate`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MoveError, ScenarioError};
use crate::moves::template::{AnimSegment, CellRequirement, MoveTemplate, PropertyClause};

#[derive(Debug, Deserialize)]
struct MoveFile {
    moves: Vec<RawMove>,
}

#[derive(Debug, Deserialize)]
struct RawMove {
    name: String,
    order: usize,
    def: serde_json::Value,
    #[serde(rename = "animSeq", default)]
    anim_seq: Vec<(String, Vec<i32>)>,
    #[serde(rename = "permGen", default = "default_true")]
    perm_gen: bool,
    #[serde(rename = "propertyChecks", default)]
    property_checks: Vec<RawClause>,
    #[serde(rename = "propertyUpdates", default)]
    property_updates: Vec<RawClause>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawClause {
    function: String,
    module: Option<Vec<i32>>,
    property: Option<String>,
    #[serde(default)]
    args: serde_json::Value,
    #[serde(rename = "rotateArgs", default)]
    rotate_args: serde_json::Value,
    #[serde(rename = "reflectArgs", default)]
    reflect_args: serde_json::Value,
    #[serde(rename = "inverseReflection", default)]
    invert_reflection: bool,
    #[serde(rename = "reflectOnNormalRotation", default)]
    reflect_on_normal_rotation: bool,
}

/// Load every move template defined in the move file at `path`.
pub fn load_move_file(path: &Path) -> Result<Vec<MoveTemplate>, ScenarioError> {
    let label = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| ScenarioError::Io {
        path: label.clone(),
        reason: e.to_string(),
    })?;
    load_move_file_str(&text, &label)
}

fn load_move_file_str(text: &str, label: &str) -> Result<Vec<MoveTemplate>, ScenarioError> {
    let file: MoveFile = serde_json::from_str(text).map_err(|e| ScenarioError::Malformed {
        path: label.to_string(),
        reason: e.to_string(),
    })?;

    file.moves
        .into_iter()
        .map(|raw| build_template(raw, label))
        .collect()
}

fn build_template(raw: RawMove, label: &str) -> Result<MoveTemplate, ScenarioError> {
    let malformed = |reason: String| ScenarioError::Malformed {
        path: label.to_string(),
        reason,
    };
    let move_error = |e: MoveError| malformed(e.to_string());

    let (cells, init_offset, final_offset) = match raw.order {
        2 => {
            let rows: Vec<String> = serde_json::from_value(raw.def.clone()).map_err(|_| {
                malformed(format!("move '{}': order-2 def must be an array of strings", raw.name))
            })?;
            let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
            MoveTemplate::from_grid(&raw.name, &rows).map_err(move_error)?
        }
        3 => {
            let layers: Vec<Vec<String>> = serde_json::from_value(raw.def.clone()).map_err(|_| {
                malformed(format!("move '{}': order-3 def must be an array of arrays of strings", raw.name))
            })?;
            parse_grid_3d(&raw.name, &layers).map_err(move_error)?
        }
        other => return Err(malformed(format!("move '{}': unsupported order {other}", raw.name))),
    };
    let _ = init_offset;

    let property_checks = raw.property_checks.into_iter().map(parse_clause).collect();
    let property_updates = raw.property_updates.into_iter().map(parse_clause).collect();
    let anim_sequence = raw
        .anim_seq
        .into_iter()
        .map(|(kind, offset)| {
            let axes = offset.iter().enumerate().filter(|(_, &c)| c != 0).map(|(i, _)| i).collect();
            AnimSegment { kind, offset, axes }
        })
        .collect();

    Ok(MoveTemplate {
        name: raw.name,
        order: raw.order,
        cells,
        init_offset: vec![0; raw.order],
        final_offset,
        property_checks,
        property_updates,
        anim_sequence,
        perm_gen: raw.perm_gen,
    })
}

fn parse_clause(raw: RawClause) -> PropertyClause {
    PropertyClause {
        function: raw.function,
        module_offset: raw.module,
        property: raw.property,
        args: raw.args,
        rotate_args: flexible_indices(&raw.rotate_args),
        reflect_args: flexible_indices(&raw.reflect_args),
        invert_reflection: raw.invert_reflection,
        reflect_on_normal_rotation: raw.reflect_on_normal_rotation,
    }
}

/// `rotateArgs`/`reflectArgs` accept either a plain bool (`true` meaning
/// "`args` itself, or its sole entry, is axis-valued") or an explicit list of
/// `args` indices to transform, matching `MoveManager.cpp`'s
/// `allArgsRotate`/`rotateArgIndices` split.
fn flexible_indices(value: &serde_json::Value) -> Vec<usize> {
    match value {
        serde_json::Value::Bool(true) => vec![0],
        serde_json::Value::Bool(false) => Vec::new(),
        serde_json::Value::Array(a) => a.iter().filter_map(|v| v.as_u64()).map(|i| i as usize).collect(),
        _ => Vec::new(),
    }
}

/// As [`MoveTemplate::from_grid`], but over a stack of 2D layers (outer index
/// = z), for order-3 templates. `?`/`!` must appear in exactly one layer.
fn parse_grid_3d(name: &str, layers: &[Vec<String>]) -> Result<(Vec<(Vec<i32>, CellRequirement)>, Vec<i32>, Vec<i32>), MoveError> {
    let mut cells = Vec::new();
    let mut init_offset = None;
    let mut final_offset = None;

    for (z, layer) in layers.iter().enumerate() {
        for (y, row) in layer.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let offset = vec![x as i32, y as i32, z as i32];
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
    }

    let init_offset = init_offset.ok_or_else(|| MoveError::MissingInitial { name: name.to_string() })?;
    let final_offset = final_offset.ok_or_else(|| MoveError::MissingFinal { name: name.to_string() })?;

    let cells = cells.into_iter().map(|(offset, req)| (sub3(&offset, &init_offset), req)).collect();
    let final_offset = sub3(&final_offset, &init_offset);
    Ok((cells, vec![0, 0, 0], final_offset))
}

fn sub3(a: &[i32], b: &[i32]) -> Vec<i32> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_2d_slide_with_perm_gen_default() {
        let json = r#"{
            "moves": [{"name": "slide", "order": 2, "def": ["x!", "?#"]}]
        }"#;
        let templates = load_move_file_str(json, "<test>").unwrap();
        assert_eq!(templates.len(), 1);
        assert!(templates[0].perm_gen);
        assert_eq!(templates[0].final_offset, vec![1, -1]);
    }

    #[test]
    fn loads_a_3d_pivot() {
        let json = r#"{
            "moves": [{
                "name": "pivot3d", "order": 3, "permGen": false,
                "def": [["? ", " #"], ["!x", "  "]]
            }]
        }"#;
        let templates = load_move_file_str(json, "<test>").unwrap();
        assert_eq!(templates.len(), 1);
        assert!(!templates[0].perm_gen);
        assert_eq!(templates[0].final_offset, vec![0, 0, 1]);
    }

    #[test]
    fn property_clauses_carry_rotate_flag_from_axis_list() {
        let json = r#"{
            "moves": [{
                "name": "slide", "order": 2, "def": ["x!", "?#"],
                "propertyChecks": [{"function": "colorEquals", "args": [1,2,3], "rotateArgs": [0,1]}]
            }]
        }"#;
        let templates = load_move_file_str(json, "<test>").unwrap();
        assert_eq!(templates[0].property_checks[0].rotate_args, vec![0, 1]);
    }

    #[test]
    fn rejects_unsupported_order() {
        let json = r#"{"moves": [{"name": "bad", "order": 4, "def": []}]}"#;
        let err = load_move_file_str(json, "<test>").unwrap_err();
        assert!(matches!(err, ScenarioError::Malformed { .. }));
    }
}
