//! Rotation/reflection closure over a parsed move template (spec §4.3).
//!
//! Grounded on `MoveManager.h`'s `GenerateMoves` family plus the spec's own
//! restatement of the symmetry rule, since the .cpp's generation loop is
//! entangled with the original's per-`AnimType` reflection table; this
//! reimplements the rule directly over offset vectors instead.

use crate::moves::template::{AnimSegment, CellRequirement, MoveTemplate, PropertyClause};

/// One move after symmetry expansion: fully concrete offsets, ready for
/// legality checking and application.
#[derive(Debug, Clone)]
pub struct ConcreteMove {
    pub name: String,
    pub cells: Vec<(Vec<i32>, CellRequirement)>,
    pub final_offset: Vec<i32>,
    pub property_checks: Vec<PropertyClause>,
    pub property_updates: Vec<PropertyClause>,
    pub anim_sequence: Vec<AnimSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generator {
    Swap(usize, usize),
    Negate(usize),
}

impl ConcreteMove {
    fn from_template(t: &MoveTemplate) -> Self {
        Self {
            name: t.name.clone(),
            cells: t.cells.clone(),
            final_offset: t.final_offset.clone(),
            property_checks: t.property_checks.clone(),
            property_updates: t.property_updates.clone(),
            anim_sequence: t.anim_sequence.clone(),
        }
    }

    fn apply_generator(&self, gen: Generator) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|(offset, req)| (transform_offset(offset, gen), *req))
            .collect();
        let final_offset = transform_offset(&self.final_offset, gen);
        let property_checks = self.property_checks.iter().map(|c| transform_clause(c, gen)).collect();
        let property_updates = self.property_updates.iter().map(|c| transform_clause(c, gen)).collect();
        let anim_sequence = self.anim_sequence.iter().map(|a| transform_anim(a, gen)).collect();
        Self {
            name: self.name.clone(),
            cells,
            final_offset,
            property_checks,
            property_updates,
            anim_sequence,
        }
    }

    /// Structural-equality key used for symmetry-expansion dedup: the
    /// unordered set of (offset, requirement) cells plus the final offset.
    fn canonical_key(&self) -> (Vec<(Vec<i32>, u8)>, Vec<i32>) {
        let mut cells: Vec<(Vec<i32>, u8)> = self
            .cells
            .iter()
            .map(|(o, r)| (o.clone(), matches!(r, CellRequirement::Anchor) as u8))
            .collect();
        cells.sort();
        (cells, self.final_offset.clone())
    }
}

fn transform_offset(offset: &[i32], gen: Generator) -> Vec<i32> {
    let mut out = offset.to_vec();
    match gen {
        Generator::Swap(i, j) => out.swap(i, j),
        Generator::Negate(i) => out[i] = -out[i],
    }
    out
}

fn transform_clause(clause: &PropertyClause, gen: Generator) -> PropertyClause {
    let mut out = clause.clone();
    out.module_offset = out.module_offset.map(|o| transform_offset(&o, gen));
    let indices: &[usize] = match gen {
        Generator::Swap(..) => &clause.rotate_args,
        Generator::Negate(..) => &clause.reflect_args,
    };
    out.args = transform_args(&clause.args, indices, gen, clause.reflect_on_normal_rotation, clause.invert_reflection);
    out
}

/// Transform the `args` entries named by `indices` (index `0` standing for
/// `args` itself when it isn't an array). Grounded on `MoveManager.cpp`'s
/// `MovePropertyCheck::Rotate`/`Reflect`.
fn transform_args(
    args: &serde_json::Value,
    indices: &[usize],
    gen: Generator,
    reflect_on_normal_rotation: bool,
    invert_reflection: bool,
) -> serde_json::Value {
    if indices.is_empty() {
        return args.clone();
    }
    if let serde_json::Value::Array(array) = args {
        let mut out = array.clone();
        for &i in indices {
            if let Some(entry) = array.get(i) {
                out[i] = transform_arg_value(entry, gen, reflect_on_normal_rotation, invert_reflection);
            }
        }
        return serde_json::Value::Array(out);
    }
    if indices.contains(&0) {
        transform_arg_value(args, gen, reflect_on_normal_rotation, invert_reflection)
    } else {
        args.clone()
    }
}

/// Transform one axis-valued argument: a coordinate-shaped array (components
/// swapped/negated like `transform_offset`), a bare axis index (remapped
/// under rotation; left alone under reflection, since which axis something
/// faces does not flip under a mirror), or an `{"axis": _, "negative": _}`
/// orientation spec (axis remapped the same way as a bare index, `negative`
/// flipped when the reflected axis matches).
fn transform_arg_value(
    value: &serde_json::Value,
    gen: Generator,
    reflect_on_normal_rotation: bool,
    invert_reflection: bool,
) -> serde_json::Value {
    match value {
        serde_json::Value::Array(components) => {
            let ints: Option<Vec<i64>> = components.iter().map(serde_json::Value::as_i64).collect();
            let Some(mut ints) = ints else { return value.clone() };
            match gen {
                Generator::Swap(a, b) => {
                    if reflect_on_normal_rotation {
                        for (k, v) in ints.iter_mut().enumerate() {
                            if k != a && k != b {
                                *v = -*v;
                            }
                        }
                    }
                    ints.swap(a, b);
                }
                Generator::Negate(axis) => {
                    if invert_reflection {
                        for (k, v) in ints.iter_mut().enumerate() {
                            if k != axis {
                                *v = -*v;
                            }
                        }
                    } else if let Some(v) = ints.get_mut(axis) {
                        *v = -*v;
                    }
                }
            }
            serde_json::Value::Array(ints.into_iter().map(serde_json::Value::from).collect())
        }
        serde_json::Value::Number(n) => match (gen, n.as_u64()) {
            (Generator::Swap(a, b), Some(axis)) => {
                let axis = axis as usize;
                let remapped = if axis == a { b } else if axis == b { a } else { axis };
                serde_json::json!(remapped)
            }
            _ => value.clone(),
        },
        serde_json::Value::Object(map) => {
            let mut out = map.clone();
            if let Some(axis) = out.get("axis").and_then(serde_json::Value::as_u64) {
                let axis = axis as usize;
                match gen {
                    Generator::Swap(a, b) => {
                        let remapped = if axis == a { b } else if axis == b { a } else { axis };
                        out.insert("axis".to_string(), serde_json::json!(remapped));
                    }
                    Generator::Negate(reflected) if reflected == axis => {
                        let negative = out.get("negative").and_then(serde_json::Value::as_bool).unwrap_or(false);
                        out.insert("negative".to_string(), serde_json::json!(!negative));
                    }
                    Generator::Negate(_) => {}
                }
            }
            serde_json::Value::Object(out)
        }
        other => other.clone(),
    }
}

fn transform_anim(seg: &AnimSegment, gen: Generator) -> AnimSegment {
    let offset = transform_offset(&seg.offset, gen);
    let axes = match gen {
        Generator::Swap(i, j) => seg
            .axes
            .iter()
            .map(|&a| if a == i { j } else if a == j { i } else { a })
            .collect(),
        Generator::Negate(_) => seg.axes.clone(),
    };
    AnimSegment {
        kind: seg.kind.clone(),
        offset,
        axes,
    }
}

/// Expand `template` into the closure of its images under axis rotation and
/// axis reflection, deduplicated by structural equality. `perm_gen = false`
/// short-circuits to just the template itself.
pub fn expand(template: &MoveTemplate) -> Vec<ConcreteMove> {
    let base = ConcreteMove::from_template(template);
    if !template.perm_gen {
        return vec![base];
    }

    let order = template.order;
    let mut generators = Vec::new();
    for i in 0..order {
        for j in (i + 1)..order {
            generators.push(Generator::Swap(i, j));
        }
    }
    for i in 0..order {
        generators.push(Generator::Negate(i));
    }

    let mut set = vec![base];
    let mut seen: Vec<_> = vec![set[0].canonical_key()];

    for gen in generators {
        let mut additions = Vec::new();
        for existing in &set {
            let image = existing.apply_generator(gen);
            let key = image.canonical_key();
            if !seen.contains(&key) {
                seen.push(key);
                additions.push(image);
            }
        }
        set.extend(additions);
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::template::MoveTemplate;

    fn slide_template() -> MoveTemplate {
        let (cells, init_offset, final_offset) = MoveTemplate::from_grid("slide", &["x!", "?#"]).unwrap();
        MoveTemplate {
            name: "slide".to_string(),
            order: 2,
            cells,
            init_offset,
            final_offset,
            property_checks: Vec::new(),
            property_updates: Vec::new(),
            anim_sequence: Vec::new(),
            perm_gen: true,
        }
    }

    #[test]
    fn perm_gen_false_yields_single_move() {
        let mut t = slide_template();
        t.perm_gen = false;
        assert_eq!(expand(&t).len(), 1);
    }

    #[test]
    fn order_two_slide_expands_to_eight_images() {
        // 4 rotations x 2 reflections worth of distinct directed slides over
        // a template with no inherent symmetry of its own.
        let expanded = expand(&slide_template());
        assert!(expanded.len() > 1, "expected more than the identity image");
        let mut keys: Vec<_> = expanded.iter().map(|m| m.canonical_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), expanded.len(), "expansion must be duplicate-free");
    }

    #[test]
    fn rotate_swaps_axis_valued_scalar_arg() {
        let clause = PropertyClause {
            function: "orientationFacesAxis".to_string(),
            module_offset: Some(vec![1, 0]),
            property: None,
            args: serde_json::json!(0),
            rotate_args: vec![0],
            reflect_args: Vec::new(),
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        };
        let rotated = transform_clause(&clause, Generator::Swap(0, 1));
        assert_eq!(rotated.module_offset, Some(vec![0, 1]));
        assert_eq!(rotated.args, serde_json::json!(1));
    }

    #[test]
    fn reflect_leaves_axis_valued_scalar_arg_unchanged() {
        let clause = PropertyClause {
            function: "orientationFacesAxis".to_string(),
            module_offset: Some(vec![1, 0]),
            property: None,
            args: serde_json::json!(0),
            rotate_args: Vec::new(),
            reflect_args: vec![0],
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        };
        let reflected = transform_clause(&clause, Generator::Negate(0));
        assert_eq!(reflected.module_offset, Some(vec![-1, 0]));
        assert_eq!(reflected.args, serde_json::json!(0));
    }

    #[test]
    fn args_not_named_by_rotate_or_reflect_are_left_untouched() {
        let clause = PropertyClause {
            function: "colorEquals".to_string(),
            module_offset: None,
            property: None,
            args: serde_json::json!([10, 20, 30]),
            rotate_args: Vec::new(),
            reflect_args: Vec::new(),
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        };
        let transformed = transform_clause(&clause, Generator::Swap(0, 1));
        assert_eq!(transformed.args, serde_json::json!([10, 20, 30]));
    }

    #[test]
    fn rotate_swaps_vector_arg_components_at_named_index() {
        let clause = PropertyClause {
            function: "directionEquals".to_string(),
            module_offset: None,
            property: None,
            args: serde_json::json!([[1, 0, 0]]),
            rotate_args: vec![0],
            reflect_args: Vec::new(),
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        };
        let rotated = transform_clause(&clause, Generator::Swap(0, 1));
        assert_eq!(rotated.args, serde_json::json!([[0, 1, 0]]));
    }

    #[test]
    fn reflect_negates_object_axis_args_negative_flag_on_match() {
        let clause = PropertyClause {
            function: "setOrientation".to_string(),
            module_offset: None,
            property: None,
            args: serde_json::json!({"axis": 0, "negative": false}),
            rotate_args: Vec::new(),
            reflect_args: vec![0],
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        };
        let reflected = transform_clause(&clause, Generator::Negate(0));
        assert_eq!(reflected.args, serde_json::json!({"axis": 0, "negative": true}));

        let other_axis = transform_clause(&clause, Generator::Negate(1));
        assert_eq!(other_axis.args, serde_json::json!({"axis": 0, "negative": false}));
    }

    #[test]
    fn expansion_is_closed_under_its_own_generators() {
        let expanded = expand(&slide_template());
        let order = 2;
        let mut gens = Vec::new();
        for i in 0..order {
            for j in (i + 1)..order {
                gens.push(Generator::Swap(i, j));
            }
        }
        for i in 0..order {
            gens.push(Generator::Negate(i));
        }
        let keys: Vec<_> = expanded.iter().map(|m| m.canonical_key()).collect();
        for m in &expanded {
            for &gen in &gens {
                let image_key = m.apply_generator(gen).canonical_key();
                assert!(keys.contains(&image_key), "closure missing image under {gen:?}");
            }
        }
    }
}
