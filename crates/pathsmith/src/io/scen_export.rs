//! `.scen` export/import (spec §6.3): the visualizer's text format, four
//! blank-line-separated blocks (visual groups, modules, then one block per
//! path step). No teacher counterpart; grounded in the wire format spec.md
//! §6.3 describes, using the teacher's plain hand-written parser style
//! (`error.rs`'s `ScenarioError`) rather than a grammar crate.

use crate::error::ScenarioError;
use crate::module::{ModuleData, ModuleProperty};

/// One visualizer color group: an id referenced by modules, an RGB color in
/// `[0,255]`, and a display scale in `[10,100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualGroup {
    pub id: usize,
    pub rgb: [u8; 3],
    pub scale: u8,
}

const DEFAULT_SCALE: u8 = 50;
const DEFAULT_RGB: [u8; 3] = [200, 200, 200];

/// Render `path` (oldest-first configurations, as produced by
/// [`crate::search::SearchOutcome::path`]) as a `.scen` document. Modules are
/// addressed by their index in each snapshot, which is stable across a path
/// produced by this crate's search since every snapshot comes from
/// `Lattice::module_info()` (id order, never re-sorted).
pub fn export_scen(path: &[Vec<ModuleData>]) -> String {
    let empty = Vec::new();
    let initial = path.first().unwrap_or(&empty);

    let mut groups: Vec<[u8; 3]> = Vec::new();
    let mut group_of = Vec::with_capacity(initial.len());
    for m in initial {
        let rgb = color_of(m).unwrap_or(DEFAULT_RGB);
        let id = groups.iter().position(|&g| g == rgb).unwrap_or_else(|| {
            groups.push(rgb);
            groups.len() - 1
        });
        group_of.push(id);
    }

    let mut out = String::new();
    for (id, rgb) in groups.iter().enumerate() {
        out.push_str(&format!("{},{},{},{},{}\n", id, rgb[0], rgb[1], rgb[2], DEFAULT_SCALE));
    }
    out.push('\n');

    for (id, m) in initial.iter().enumerate() {
        let (x, y, z) = xyz(m);
        out.push_str(&format!("{},{},{},{},{}\n", id, group_of[id], x, y, z));
    }

    for window in path.windows(2) {
        out.push('\n');
        let (prev, next) = (&window[0], &window[1]);
        for (id, (a, b)) in prev.iter().zip(next).enumerate() {
            let (ax, ay, az) = xyz(a);
            let (bx, by, bz) = xyz(b);
            let (dx, dy, dz) = (bx - ax, by - ay, bz - az);
            if dx == 0 && dy == 0 && dz == 0 {
                continue;
            }
            out.push_str(&format!("{},{},{},{},{}\n", id, anchor_code(dx, dy, dz), dx, dy, dz));
        }
    }

    out
}

fn color_of(m: &ModuleData) -> Option<[u8; 3]> {
    match m.properties_full()?.find("color")? {
        ModuleProperty::Color(c) => Some(c.rgb),
        _ => None,
    }
}

fn xyz(m: &ModuleData) -> (i32, i32, i32) {
    let c = m.coords();
    (c.first().copied().unwrap_or(0), c.get(1).copied().unwrap_or(0), c.get(2).copied().unwrap_or(0))
}

/// Sign encodes sliding (negative) vs pivot (positive); since a raw
/// coordinate delta alone cannot distinguish the two, every derived move is
/// reported as a slide. Magnitude `1..=6` names the axis/direction of a
/// single-axis unit step; any other delta (diagonal or multi-cell) is the
/// generic-slide code `0`.
fn anchor_code(dx: i32, dy: i32, dz: i32) -> i32 {
    match (dx, dy, dz) {
        (1, 0, 0) => -1,
        (-1, 0, 0) => -2,
        (0, 1, 0) => -3,
        (0, -1, 0) => -4,
        (0, 0, 1) => -5,
        (0, 0, -1) => -6,
        _ => 0,
    }
}

/// A parsed `.scen` document: the modules block and the move deltas of each
/// subsequent block, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScen {
    pub groups: Vec<VisualGroup>,
    pub modules: Vec<(usize, i32, i32, i32)>,
    pub steps: Vec<Vec<(usize, i32, i32, i32)>>,
}

impl ParsedScen {
    /// Apply every step's deltas cumulatively to the modules block, returning
    /// each module's final `(x, y, z)` in module-id order.
    pub fn final_positions(&self) -> Vec<(i32, i32, i32)> {
        let mut positions: Vec<(i32, i32, i32)> = self.modules.iter().map(|&(_, x, y, z)| (x, y, z)).collect();
        for step in &self.steps {
            for &(id, dx, dy, dz) in step {
                let (x, y, z) = positions[id];
                positions[id] = (x + dx, y + dy, z + dz);
            }
        }
        positions
    }
}

pub fn parse_scen(text: &str) -> Result<ParsedScen, ScenarioError> {
    let malformed = |reason: String| ScenarioError::Malformed {
        path: "<scen>".to_string(),
        reason,
    };

    let mut blocks = text.split("\n\n").map(str::trim_end);
    let group_block = blocks.next().unwrap_or("");
    let module_block = blocks.next().ok_or_else(|| malformed("missing modules block".to_string()))?;

    let mut groups = Vec::new();
    for line in group_block.lines().filter(|l| !l.is_empty()) {
        let fields = split_fields(line, 5, &malformed)?;
        groups.push(VisualGroup {
            id: fields[0] as usize,
            rgb: [fields[1] as u8, fields[2] as u8, fields[3] as u8],
            scale: fields[4] as u8,
        });
    }

    let mut modules = Vec::new();
    for line in module_block.lines().filter(|l| !l.is_empty()) {
        let fields = split_fields(line, 5, &malformed)?;
        modules.push((fields[0] as usize, fields[2], fields[3], fields[4]));
    }

    let mut steps = Vec::new();
    for block in blocks {
        let mut step = Vec::new();
        for line in block.lines().filter(|l| !l.is_empty()) {
            let fields = split_fields(line, 5, &malformed)?;
            step.push((fields[0] as usize, fields[2], fields[3], fields[4]));
        }
        if !step.is_empty() {
            steps.push(step);
        }
    }

    Ok(ParsedScen { groups, modules, steps })
}

fn split_fields(line: &str, expected: usize, malformed: &impl Fn(String) -> ScenarioError) -> Result<Vec<i32>, ScenarioError> {
    let fields: Result<Vec<i32>, _> = line.split(',').map(|f| f.trim().parse::<i32>()).collect();
    let fields = fields.map_err(|e| malformed(format!("bad field in '{line}': {e}")))?;
    if fields.len() != expected {
        return Err(malformed(format!("line '{line}' has {} fields, expected {expected}", fields.len())));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModulePropertySet;

    fn at(coords: Vec<i32>) -> ModuleData {
        ModuleData::full(coords, ModulePropertySet::new())
    }

    #[test]
    fn exports_and_reparses_a_two_step_path() {
        let path = vec![
            vec![at(vec![0, 0])],
            vec![at(vec![1, 0])],
            vec![at(vec![1, 1])],
        ];
        let text = export_scen(&path);
        let parsed = parse_scen(&text).unwrap();
        assert_eq!(parsed.modules, vec![(0, 0, 0, 0)]);
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(parsed.final_positions(), vec![(1, 1, 0)]);
    }

    #[test]
    fn initial_positions_match_the_first_path_entry() {
        let path = vec![vec![at(vec![2, 3]), at(vec![5, 5])]];
        let text = export_scen(&path);
        let parsed = parse_scen(&text).unwrap();
        assert_eq!(parsed.modules, vec![(0, 2, 3, 0), (1, 5, 5, 0)]);
        assert!(parsed.steps.is_empty());
    }

    #[test]
    fn rejects_malformed_lines() {
        let err = parse_scen("0,1,2\n\nnot,a,number,at,all").unwrap_err();
        assert!(matches!(err, ScenarioError::Malformed { .. }));
    }
}
