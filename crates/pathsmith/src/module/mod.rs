//! Module identity, properties, and the registry that assigns ids (spec
//! §4.2). Grounded on `pathfinder/modules/ModuleManager.h/.cpp` and
//! `ModuleProperties.h/.cpp`: the id-partition invariant (non-static ids
//! precede static ids) and the property operation set (copy, equality, hash,
//! rotate, reflect, integer encoding) are carried over; the runtime
//! `.so`-loaded property plugin system is not (see [`properties`]).

pub mod properties;
mod registry;

use std::hash::{Hash, Hasher};

pub use properties::{ColorProperty, ModuleProperty, MoveCountProperty, OrientationProperty, PropertyOps};
pub use registry::{ModuleId, ModuleRegistry};

use crate::error::MoveError;

/// Unordered bag of a module's properties, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulePropertySet {
    properties: Vec<ModuleProperty>,
}

impl ModulePropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, property: ModuleProperty) {
        if let Some(slot) = self.properties.iter_mut().find(|p| p.key() == property.key()) {
            *slot = property;
        } else {
            self.properties.push(property);
        }
    }

    pub fn find(&self, key: &str) -> Option<&ModuleProperty> {
        self.properties.iter().find(|p| p.key() == key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleProperty> {
        self.properties.iter()
    }

    /// Rotate every property's spatial component (§4.4 symmetry expansion).
    pub fn rotate(&mut self, a: usize, b: usize) {
        for p in &mut self.properties {
            p.rotate(a, b);
        }
    }

    /// Reflect every property's spatial component across `axis`.
    pub fn reflect(&mut self, axis: usize) {
        for p in &mut self.properties {
            p.reflect(axis);
        }
    }

    /// Fire dynamic-property update callbacks for a module that just moved
    /// by `offset`.
    pub fn on_move(&mut self, offset: &[i32]) {
        for p in &mut self.properties {
            if p.is_dynamic() {
                p.on_move(offset);
            }
        }
    }

    /// Encode the single contained property into the compact `ModuleData`
    /// layout's high 40 bits. Fails if there is more than one property or
    /// the lone property cannot be integer-encoded.
    pub fn as_compact_int(&self) -> Result<u64, MoveError> {
        match self.properties.len() {
            0 => Ok(0),
            1 => self.properties[0].as_int().ok_or_else(|| MoveError::CompactEncodingUnsupported {
                reason: format!("property '{}' has no integer encoding", self.properties[0].key()),
            }),
            n => Err(MoveError::CompactEncodingUnsupported {
                reason: format!("{n} properties present, compact encoding supports at most one"),
            }),
        }
    }
}

impl Hash for ModulePropertySet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-insensitive: combine individual hashes with XOR rather than
        // feeding the sequence straight into `state`.
        let combined = self
            .properties
            .iter()
            .map(|p| {
                let mut h = std::collections::hash_map::DefaultHasher::new();
                p.hash(&mut h);
                h.finish()
            })
            .fold(0u64, |acc, h| acc ^ h);
        combined.hash(state);
    }
}

/// Immutable snapshot of one module's coordinates and properties, as stored
/// in a [`crate::search::Configuration`] (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleData {
    /// Coordinates and properties stored by value.
    Full { coords: Vec<i32>, properties: ModulePropertySet },
    /// Coordinates packed into the low 24 bits (3x8-bit) and a single
    /// property's integer encoding into the high 40 bits. Only representable
    /// when order <= 3, every axis <= 256, and at most one property.
    Compact { packed: u64 },
}

impl ModuleData {
    pub fn full(coords: Vec<i32>, properties: ModulePropertySet) -> Self {
        Self::Full { coords, properties }
    }

    /// Build the compact encoding, or an error naming why it does not apply.
    pub fn compact(coords: &[i32], properties: &ModulePropertySet) -> Result<Self, MoveError> {
        if coords.len() > 3 {
            return Err(MoveError::CompactEncodingUnsupported {
                reason: format!("order {} exceeds the compact layout's limit of 3", coords.len()),
            });
        }
        let mut packed: u64 = 0;
        for (i, &c) in coords.iter().enumerate() {
            if !(0..=255).contains(&c) {
                return Err(MoveError::CompactEncodingUnsupported {
                    reason: format!("coordinate {c} at axis {i} falls outside [0, 255]"),
                });
            }
            packed |= (c as u64) << (i * 8);
        }
        let property_bits = properties.as_compact_int()?;
        packed |= property_bits << 24;
        Ok(Self::Compact { packed })
    }

    /// Coordinates this snapshot was taken at. For the compact layout this
    /// always yields 3 components (the layout's fixed coordinate width),
    /// even if the originating module's order was smaller.
    pub fn coords(&self) -> Vec<i32> {
        match self {
            Self::Full { coords, .. } => coords.clone(),
            Self::Compact { packed } => (0..3).map(|i| ((packed >> (i * 8)) & 0xFF) as i32).collect(),
        }
    }

    /// The property bundle, if this snapshot uses the full layout. The
    /// compact layout's packed property bits have no general decode back
    /// into a [`ModuleProperty`] without the registry that produced them
    /// (mirroring the source system's own reliance on a construction-time
    /// lookup cache), so callers that need properties from a compact
    /// snapshot must keep that context themselves.
    pub fn properties_full(&self) -> Option<&ModulePropertySet> {
        match self {
            Self::Full { properties, .. } => Some(properties),
            Self::Compact { .. } => None,
        }
    }
}

/// A physical module: stable id, current coordinates, static/free flag, and
/// its property bundle.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub coords: Vec<i32>,
    pub is_static: bool,
    pub properties: ModulePropertySet,
}

impl Module {
    pub fn new(id: ModuleId, coords: Vec<i32>, is_static: bool, properties: ModulePropertySet) -> Self {
        Self {
            id,
            coords,
            is_static,
            properties,
        }
    }

    pub fn to_data(&self) -> ModuleData {
        ModuleData::full(self.coords.clone(), self.properties.clone())
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "module {} at {:?}", self.id.0, self.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_set_hash_is_order_insensitive() {
        let mut a = ModulePropertySet::new();
        a.insert(ModuleProperty::Color(ColorProperty::new([1, 2, 3])));
        a.insert(ModuleProperty::Orientation(OrientationProperty::new(0, false)));

        let mut b = ModulePropertySet::new();
        b.insert(ModuleProperty::Orientation(OrientationProperty::new(0, false)));
        b.insert(ModuleProperty::Color(ColorProperty::new([1, 2, 3])));

        assert_eq!(a, b);
        let mut ha = std::collections::hash_map::DefaultHasher::new();
        let mut hb = std::collections::hash_map::DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn orientation_rotates_and_reflects() {
        let mut p = OrientationProperty::new(0, false);
        p.rotate(0, 2);
        assert_eq!(p.axis, 2);
        p.reflect(2);
        assert!(p.negative);
        p.reflect(0);
        assert!(p.negative, "reflecting an axis the property doesn't face should be a no-op");
    }

    #[test]
    fn compact_encoding_round_trips_within_limits() {
        let mut props = ModulePropertySet::new();
        props.insert(ModuleProperty::Color(ColorProperty::new([10, 20, 30])));
        let data = ModuleData::compact(&[1, 2, 3], &props).expect("within compact limits");
        match data {
            ModuleData::Compact { packed } => {
                assert_eq!(packed & 0xFF, 1);
                assert_eq!((packed >> 8) & 0xFF, 2);
                assert_eq!((packed >> 16) & 0xFF, 3);
            }
            _ => panic!("expected compact encoding"),
        }
    }

    #[test]
    fn compact_encoding_rejects_multiple_properties() {
        let mut props = ModulePropertySet::new();
        props.insert(ModuleProperty::Color(ColorProperty::new([1, 2, 3])));
        props.insert(ModuleProperty::Orientation(OrientationProperty::new(0, false)));
        assert!(ModuleData::compact(&[0, 0, 0], &props).is_err());
    }

    #[test]
    fn registry_partitions_static_after_free() {
        let mut reg = ModuleRegistry::new();
        let free_id = reg.register_free(vec![0, 0], ModulePropertySet::new());
        reg.register_static(vec![1, 1], ModulePropertySet::new());
        let static_start = reg.finalize();
        assert_eq!(static_start, 1);
        assert_eq!(free_id.0, 0);
        assert!(!reg.get(free_id).is_static);
        assert!(reg.static_modules().iter().all(|m| m.is_static));
        assert!(reg.free_modules().iter().all(|m| !m.is_static));
    }

    #[test]
    fn move_count_property_increments_commutatively() {
        let mut a = MoveCountProperty::default();
        let mut b = MoveCountProperty::default();
        a.on_move(&[1, 0]);
        a.on_move(&[0, 1]);
        b.on_move(&[0, 1]);
        b.on_move(&[1, 0]);
        assert_eq!(a, b);
    }
}
