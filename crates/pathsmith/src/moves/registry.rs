//! Named property-check/property-update functions referenced by move
//! templates (spec §6.2's `propertyChecks`/`propertyUpdates`).
//!
//! Grounded on `ModuleManager.h`'s `MovePropertyCheck`/`MovePropertyUpdate`
//! function-pointer members, simplified per Design Notes §9: the source
//! resolves these at runtime via `boost::dll`-loaded shared libraries; here
//! they are a fixed, named set of closures registered at startup, matching
//! the "compile-time enum" simplification already applied to module
//! properties themselves (`module::properties`).

use std::collections::BTreeMap;

use crate::error::MoveError;
use crate::module::{ColorProperty, ModuleProperty, ModulePropertySet, OrientationProperty};

use super::template::PropertyClause;

type CheckFn = Box<dyn Fn(&ModulePropertySet, &PropertyClause) -> bool + Send + Sync>;
type UpdateFn = Box<dyn Fn(&mut ModulePropertySet, &PropertyClause) + Send + Sync>;

/// Registry of named property-check and property-update functions.
pub struct PropertyFunctionRegistry {
    checks: BTreeMap<String, CheckFn>,
    updates: BTreeMap<String, UpdateFn>,
}

impl PropertyFunctionRegistry {
    /// Empty registry, no builtins.
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
            updates: BTreeMap::new(),
        }
    }

    pub fn register_check(&mut self, name: impl Into<String>, f: CheckFn) {
        self.checks.insert(name.into(), f);
    }

    pub fn register_update(&mut self, name: impl Into<String>, f: UpdateFn) {
        self.updates.insert(name.into(), f);
    }

    pub fn check(&self, properties: &ModulePropertySet, clause: &PropertyClause) -> Result<bool, MoveError> {
        let f = self
            .checks
            .get(&clause.function)
            .ok_or_else(|| MoveError::UnknownFunction { name: clause.function.clone() })?;
        Ok(f(properties, clause))
    }

    pub fn update(&self, properties: &mut ModulePropertySet, clause: &PropertyClause) -> Result<(), MoveError> {
        let f = self
            .updates
            .get(&clause.function)
            .ok_or_else(|| MoveError::UnknownFunction { name: clause.function.clone() })?;
        f(properties, clause);
        Ok(())
    }

    /// Registry preloaded with the color/orientation functions every
    /// scenario's built-in properties can reasonably need.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();

        reg.register_check(
            "colorEquals",
            Box::new(|props, clause| match (props.find("color"), clause.args.as_array()) {
                (Some(ModuleProperty::Color(c)), Some(rgb)) if rgb.len() == 3 => rgb
                    .iter()
                    .filter_map(|v| v.as_u64())
                    .zip(c.rgb)
                    .all(|(expected, actual)| expected as u8 == actual),
                _ => false,
            }),
        );
        reg.register_update(
            "setColor",
            Box::new(|props, clause| {
                if let Some(rgb) = clause.args.as_array().filter(|a| a.len() == 3) {
                    let mut components = rgb.iter().filter_map(|v| v.as_u64());
                    if let (Some(r), Some(g), Some(b)) = (components.next(), components.next(), components.next()) {
                        props.insert(ModuleProperty::Color(ColorProperty::new([r as u8, g as u8, b as u8])));
                    }
                }
            }),
        );
        reg.register_check(
            "orientationFacesAxis",
            Box::new(|props, clause| match props.find("orientation") {
                Some(ModuleProperty::Orientation(o)) => clause.args.as_u64() == Some(o.axis as u64),
                _ => false,
            }),
        );
        reg.register_update(
            "setOrientation",
            Box::new(|props, clause| {
                if let Some(axis) = clause.args.get("axis").and_then(|v| v.as_u64()) {
                    let negative = clause.args.get("negative").and_then(|v| v.as_bool()).unwrap_or(false);
                    props.insert(ModuleProperty::Orientation(OrientationProperty::new(axis as usize, negative)));
                }
            }),
        );

        reg
    }
}

impl Default for PropertyFunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for PropertyFunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyFunctionRegistry")
            .field("checks", &self.checks.keys().collect::<Vec<_>>())
            .field("updates", &self.updates.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(function: &str, args: serde_json::Value) -> PropertyClause {
        PropertyClause {
            function: function.to_string(),
            module_offset: None,
            property: None,
            args,
            rotate_args: Vec::new(),
            reflect_args: Vec::new(),
            invert_reflection: false,
            reflect_on_normal_rotation: false,
        }
    }

    #[test]
    fn unknown_function_is_an_error() {
        let reg = PropertyFunctionRegistry::new();
        let props = ModulePropertySet::new();
        let err = reg.check(&props, &clause("nope", serde_json::Value::Null)).unwrap_err();
        assert!(matches!(err, MoveError::UnknownFunction { .. }));
    }

    #[test]
    fn set_and_check_color_round_trip() {
        let reg = PropertyFunctionRegistry::with_builtins();
        let mut props = ModulePropertySet::new();
        reg.update(&mut props, &clause("setColor", serde_json::json!([10, 20, 30]))).unwrap();
        assert!(reg.check(&props, &clause("colorEquals", serde_json::json!([10, 20, 30]))).unwrap());
        assert!(!reg.check(&props, &clause("colorEquals", serde_json::json!([1, 2, 3]))).unwrap());
    }
}
