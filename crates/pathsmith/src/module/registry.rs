//! Id assignment and central module storage (spec §4.2), replacing the
//! source system's `ModuleIdManager` static-class singleton with an
//! ordinary owned struct threaded through [`crate::lattice::Lattice`].

use super::{Module, ModulePropertySet};

/// Stable identifier for a [`Module`]. Doubles as an index into
/// [`ModuleRegistry::modules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub usize);

/// Owns every module and enforces the id-partition invariant: non-static ids
/// occupy `[0, static_start)`, static ids occupy `[static_start, len)`.
///
/// Static modules are registered via [`Self::register_static`] but not
/// assigned an id until [`Self::finalize`] is called, mirroring the source
/// system's deferred registration (`ModuleIdManager::DeferredRegistration`):
/// this guarantees every free module's id is smaller than every static
/// module's id regardless of call order.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
    pending_static: Vec<(Vec<i32>, ModulePropertySet)>,
    static_start: Option<usize>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a free (movable) module immediately. Must not be called
    /// after [`Self::finalize`].
    pub fn register_free(&mut self, coords: Vec<i32>, properties: ModulePropertySet) -> ModuleId {
        assert!(self.static_start.is_none(), "cannot register free modules after finalize()");
        let id = ModuleId(self.modules.len());
        self.modules.push(Module::new(id, coords, false, properties));
        id
    }

    /// Queue a static (immovable) module for registration at
    /// [`Self::finalize`] time.
    pub fn register_static(&mut self, coords: Vec<i32>, properties: ModulePropertySet) {
        assert!(self.static_start.is_none(), "cannot queue static modules after finalize()");
        self.pending_static.push((coords, properties));
    }

    /// Assign ids to every queued static module, fixing the partition point.
    /// Idempotent: a second call is a no-op.
    pub fn finalize(&mut self) -> usize {
        match self.static_start {
            Some(start) => start,
            None => {
                let start = self.modules.len();
                for (coords, properties) in self.pending_static.drain(..) {
                    let id = ModuleId(self.modules.len());
                    self.modules.push(Module::new(id, coords, true, properties));
                }
                self.static_start = Some(start);
                start
            }
        }
    }

    pub fn static_start(&self) -> usize {
        self.static_start.unwrap_or(self.modules.len())
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn free_modules(&self) -> &[Module] {
        &self.modules[..self.static_start()]
    }

    pub fn static_modules(&self) -> &[Module] {
        &self.modules[self.static_start()..]
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0]
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
