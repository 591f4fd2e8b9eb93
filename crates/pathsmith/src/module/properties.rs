//! Module properties (spec §4.2): a closed set of built-in kinds plus an
//! extension point for user-defined ones, replacing the source system's
//! runtime `.so` loading (Design Notes §9 — REDESIGN FLAGS) with a sealed
//! enum and a `PropertyOps` trait object variant resolved at compile time.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Operations every property kind — built-in or user-defined — must support.
///
/// `on_move` is called once per applied move with the move's coordinate
/// offset; implementations must be commutative (the observable result must
/// not depend on the order updates are applied in), since `apply`/`unapply`
/// fire updates in the same order regardless of move direction.
pub trait PropertyOps: fmt::Debug + 'static {
    /// Stable name used to look this property up within a module.
    fn key(&self) -> &str;

    /// Narrowing hook for [`ModuleProperty`]'s `PartialEq` impl.
    fn as_any(&self) -> &dyn std::any::Any;

    fn dyn_eq(&self, other: &dyn PropertyOps) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);

    fn clone_box(&self) -> Box<dyn PropertyOps>;

    /// Swap the `a`/`b` axes of whatever this property encodes spatially.
    /// No-op for properties with no spatial component.
    fn rotate(&mut self, a: usize, b: usize) {
        let _ = (a, b);
    }

    /// Negate the `axis` component of whatever this property encodes
    /// spatially. No-op for properties with no spatial component.
    fn reflect(&mut self, axis: usize) {
        let _ = axis;
    }

    /// Encode into at most 40 bits for the compact `ModuleData` layout.
    /// `None` if this property cannot be represented that way.
    fn as_int(&self) -> Option<u64> {
        None
    }

    /// `true` if [`Self::on_move`] does anything.
    fn is_dynamic(&self) -> bool {
        false
    }

    /// React to a module move. `offset` is the coordinate delta applied to
    /// the owning module (already sign-flipped if the move is a reversal).
    fn on_move(&mut self, offset: &[i32]) {
        let _ = offset;
    }
}

/// RGB tag. Static: moves and symmetry transforms leave it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorProperty {
    pub rgb: [u8; 3],
}

impl ColorProperty {
    pub const KEY: &'static str = "color";

    pub fn new(rgb: [u8; 3]) -> Self {
        Self { rgb }
    }
}

impl PropertyOps for ColorProperty {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyOps) -> bool {
        other.as_any().downcast_ref::<ColorProperty>().is_some_and(|o| *o == *self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.rgb.hash(&mut state);
    }

    fn clone_box(&self) -> Box<dyn PropertyOps> {
        Box::new(*self)
    }

    fn as_int(&self) -> Option<u64> {
        Some(u64::from(self.rgb[0]) << 16 | u64::from(self.rgb[1]) << 8 | u64::from(self.rgb[2]))
    }
}

/// One of the six signed-axis unit directions a module can face, per a
/// single principal axis. Transforms under the same rotation/reflection
/// tables used to expand move templates (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientationProperty {
    /// Index of the axis this module faces along.
    pub axis: usize,
    /// `true` if facing the negative direction of `axis`.
    pub negative: bool,
}

impl OrientationProperty {
    pub const KEY: &'static str = "orientation";

    pub fn new(axis: usize, negative: bool) -> Self {
        Self { axis, negative }
    }
}

impl PropertyOps for OrientationProperty {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyOps) -> bool {
        other.as_any().downcast_ref::<OrientationProperty>().is_some_and(|o| *o == *self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn clone_box(&self) -> Box<dyn PropertyOps> {
        Box::new(*self)
    }

    fn rotate(&mut self, a: usize, b: usize) {
        if self.axis == a {
            self.axis = b;
        } else if self.axis == b {
            self.axis = a;
        }
    }

    fn reflect(&mut self, axis: usize) {
        if self.axis == axis {
            self.negative = !self.negative;
        }
    }

    fn as_int(&self) -> Option<u64> {
        Some((self.axis as u64) << 1 | u64::from(self.negative))
    }
}

/// Dynamic counter incremented once per move the owning module makes.
/// Addition commutes, so it is safe under the apply/unapply ordering
/// restriction documented on [`PropertyOps::on_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveCountProperty {
    pub count: u32,
}

impl MoveCountProperty {
    pub const KEY: &'static str = "move_count";
}

impl PropertyOps for MoveCountProperty {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyOps) -> bool {
        other.as_any().downcast_ref::<MoveCountProperty>().is_some_and(|o| *o == *self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.count.hash(&mut state);
    }

    fn clone_box(&self) -> Box<dyn PropertyOps> {
        Box::new(*self)
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn on_move(&mut self, _offset: &[i32]) {
        self.count = self.count.wrapping_add(1);
    }
}

/// A single named property attached to a module: one of the built-in kinds,
/// or an arbitrary [`PropertyOps`] implementation for user extension.
#[derive(Debug)]
pub enum ModuleProperty {
    Color(ColorProperty),
    Orientation(OrientationProperty),
    MoveCount(MoveCountProperty),
    Custom(Box<dyn PropertyOps>),
}

impl ModuleProperty {
    fn ops(&self) -> &dyn PropertyOps {
        match self {
            Self::Color(p) => p,
            Self::Orientation(p) => p,
            Self::MoveCount(p) => p,
            Self::Custom(p) => p.as_ref(),
        }
    }

    fn ops_mut(&mut self) -> &mut dyn PropertyOps {
        match self {
            Self::Color(p) => p,
            Self::Orientation(p) => p,
            Self::MoveCount(p) => p,
            Self::Custom(p) => p.as_mut(),
        }
    }

    pub fn key(&self) -> &str {
        self.ops().key()
    }

    pub fn rotate(&mut self, a: usize, b: usize) {
        self.ops_mut().rotate(a, b);
    }

    pub fn reflect(&mut self, axis: usize) {
        self.ops_mut().reflect(axis);
    }

    pub fn as_int(&self) -> Option<u64> {
        self.ops().as_int()
    }

    pub fn is_dynamic(&self) -> bool {
        self.ops().is_dynamic()
    }

    pub fn on_move(&mut self, offset: &[i32]) {
        self.ops_mut().on_move(offset);
    }
}

impl Clone for ModuleProperty {
    fn clone(&self) -> Self {
        match self {
            Self::Color(p) => Self::Color(*p),
            Self::Orientation(p) => Self::Orientation(*p),
            Self::MoveCount(p) => Self::MoveCount(*p),
            Self::Custom(p) => Self::Custom(p.clone_box()),
        }
    }
}

impl PartialEq for ModuleProperty {
    fn eq(&self, other: &Self) -> bool {
        self.ops().dyn_eq(other.ops())
    }
}

impl Eq for ModuleProperty {}

impl Hash for ModuleProperty {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
        self.ops().dyn_hash(state);
    }
}
