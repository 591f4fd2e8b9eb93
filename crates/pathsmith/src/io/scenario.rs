//! Scenario JSON loading (spec §6.1): a `Lattice` plus the initial free-module
//! snapshot, deserialized with `serde`/`serde_json` per `io::load_scenario`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ScenarioError;
use crate::lattice::{AdjacencyOffsets, Lattice};
use crate::module::{ColorProperty, ModuleData, ModuleProperty, ModulePropertySet, OrientationProperty};

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    order: usize,
    modules: Vec<ScenarioModule>,
    #[serde(rename = "adjacencyMode")]
    adjacency_mode: Option<String>,
    #[serde(rename = "adjacencyOffsets")]
    adjacency_offsets: Option<Vec<Vec<i32>>>,
    #[serde(default)]
    boundaries: Vec<Vec<i32>>,
    #[serde(rename = "tensorPadding")]
    tensor_padding: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ScenarioModule {
    position: Vec<i32>,
    #[serde(rename = "static", default)]
    is_static: bool,
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

/// A scenario ready to search over: the lattice it describes, and the
/// free-module snapshot at load time.
pub struct LoadedScenario {
    pub lattice: Lattice,
    pub modules: Vec<ModuleData>,
}

/// Load and build a lattice from a scenario JSON file at `path`.
pub fn load_scenario(path: &Path) -> Result<LoadedScenario, ScenarioError> {
    let label = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| ScenarioError::Io {
        path: label.clone(),
        reason: e.to_string(),
    })?;
    load_scenario_str(&text, &label)
}

fn load_scenario_str(text: &str, label: &str) -> Result<LoadedScenario, ScenarioError> {
    let file: ScenarioFile = serde_json::from_str(text).map_err(|e| ScenarioError::Malformed {
        path: label.to_string(),
        reason: e.to_string(),
    })?;

    let mut seen_positions = HashSet::new();
    for m in &file.modules {
        if m.position.len() != file.order {
            return Err(ScenarioError::Malformed {
                path: label.to_string(),
                reason: format!("module position {:?} does not have order {}", m.position, file.order),
            });
        }
        if !seen_positions.insert(m.position.clone()) {
            return Err(ScenarioError::DuplicatePosition { coords: m.position.clone() });
        }
    }

    let adjacency = match (&file.adjacency_offsets, file.adjacency_mode.as_deref()) {
        (Some(offsets), _) => AdjacencyOffsets::Custom(offsets.clone()),
        (None, None | Some("Cube Face")) => AdjacencyOffsets::CubeFace,
        (None, Some("Cube Edge")) => AdjacencyOffsets::RhombicDodecahedron,
        (None, Some(other)) => return Err(ScenarioError::UnknownAdjacencyMode { mode: other.to_string() }),
    };

    let max_connection_distance = adjacency
        .offsets(file.order)
        .iter()
        .flat_map(|o| o.iter().map(|&c| c.abs()))
        .max()
        .unwrap_or(1)
        .max(1);

    // Every module's coordinates must fit inside the tensor, not just the
    // static ones; sizing off static extents alone would leave a free module
    // placed further out permanently unreachable.
    let max_coord = file.modules.iter().flat_map(|m| m.position.iter().copied()).max().unwrap_or(0);
    let usable_axis_size = max_coord + 1;
    let boundary_size = file.tensor_padding.unwrap_or(max_connection_distance);

    let mut lattice = Lattice::new(file.order, usable_axis_size, boundary_size, adjacency);

    for coords in &file.boundaries {
        let shifted = shift(coords, boundary_size);
        lattice.add_boundary(shifted).map_err(|_| ScenarioError::OutOfRange { coords: coords.clone() })?;
    }

    // Free modules register immediately; statics queue and are placed
    // together by `finalize_modules`, guaranteeing the id-partition
    // invariant regardless of the order they appear in the file.
    for m in file.modules.iter().filter(|m| !m.is_static) {
        let props = parse_properties(&m.properties, label)?;
        let shifted = shift(&m.position, boundary_size);
        lattice
            .add_module(shifted, props)
            .map_err(|_| ScenarioError::OutOfRange { coords: m.position.clone() })?;
    }
    for m in file.modules.iter().filter(|m| m.is_static) {
        let props = parse_properties(&m.properties, label)?;
        let shifted = shift(&m.position, boundary_size);
        lattice.queue_static_module(shifted, props);
    }
    lattice.finalize_modules().map_err(|e| ScenarioError::Malformed {
        path: label.to_string(),
        reason: e.to_string(),
    })?;

    let modules = lattice.module_info();
    Ok(LoadedScenario { lattice, modules })
}

fn shift(coords: &[i32], boundary: i32) -> Vec<i32> {
    coords.iter().map(|&c| c + boundary).collect()
}

fn parse_properties(raw: &BTreeMap<String, serde_json::Value>, label: &str) -> Result<ModulePropertySet, ScenarioError> {
    let mut props = ModulePropertySet::new();
    for (name, value) in raw {
        match name.as_str() {
            "colorProperty" => {
                let rgb = parse_color(value.get("color").unwrap_or(value), label)?;
                props.insert(ModuleProperty::Color(ColorProperty::new(rgb)));
            }
            "orientationProperty" => {
                let axis = value.get("axis").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
                let negative = value.get("negative").and_then(|v| v.as_bool()).unwrap_or(false);
                props.insert(ModuleProperty::Orientation(OrientationProperty::new(axis, negative)));
            }
            other => {
                return Err(ScenarioError::Malformed {
                    path: label.to_string(),
                    reason: format!("unknown property '{other}'"),
                });
            }
        }
    }
    Ok(props)
}

fn parse_color(value: &serde_json::Value, label: &str) -> Result<[u8; 3], ScenarioError> {
    if let Some(hex) = value.as_str() {
        if let Some(stripped) = hex.strip_prefix('#') {
            let packed = u32::from_str_radix(stripped, 16).map_err(|_| ScenarioError::Malformed {
                path: label.to_string(),
                reason: format!("invalid hex color '{hex}'"),
            })?;
            return Ok(unpack_rgb(packed));
        }
        return named_color(hex).ok_or_else(|| ScenarioError::Malformed {
            path: label.to_string(),
            reason: format!("unknown color name '{hex}'"),
        });
    }
    if let Some(arr) = value.as_array() {
        if arr.len() == 3 {
            let mut out = [0u8; 3];
            for (slot, v) in out.iter_mut().zip(arr) {
                *slot = v.as_u64().ok_or_else(|| ScenarioError::Malformed {
                    path: label.to_string(),
                    reason: "color component is not an integer".to_string(),
                })? as u8;
            }
            return Ok(out);
        }
    }
    if let Some(packed) = value.as_u64() {
        return Ok(unpack_rgb(packed as u32));
    }
    Err(ScenarioError::Malformed {
        path: label.to_string(),
        reason: format!("unrecognized color value {value}"),
    })
}

fn unpack_rgb(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}

fn named_color(name: &str) -> Option<[u8; 3]> {
    Some(match name.to_ascii_lowercase().as_str() {
        "red" => [255, 0, 0],
        "green" => [0, 255, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "cyan" => [0, 255, 255],
        "magenta" => [255, 0, 255],
        "white" => [255, 255, 255],
        "black" => [0, 0, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        _ => return None,
    })
}
