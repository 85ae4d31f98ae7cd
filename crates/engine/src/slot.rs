//! Owned builder storage and the lifecycle state machine
//!
//! Every owning builder handle has exactly one [`Slot`] behind an
//! `Rc<Shared<..>>`; views hold a `Weak` to it. The slot keeps the
//! blueprint itself behind its own `Rc` so that frozen copies can share one
//! allocation. Any write to the blueprint goes through [`Slot::blueprint_mut`],
//! which clones the blueprint first if another handle still shares it.
//!
//! # Invariants
//!
//! - `state` is never [`State::View`]; views have no slot of their own.
//! - `flags.is_built() ⇒ flags.is_preprocessed()`.
//! - `snapshot` is `Some` only while it equals the current blueprint, and
//!   only for Mutable slots that are built.
//! - A failed `preprocess`/`build` leaves `flags` as they were before the call.
//! - `Shared::status` equals the slot's state and flags whenever the slot is
//!   not mutably borrowed.

use std::cell::{BorrowError, BorrowMutError, Cell, Ref, RefCell, RefMut};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use genericbuilder_core::{
    Blueprint, BuilderError, BuilderResult, DerivedCache, LifecycleFlags, SetterContract, State, Status,
};
use tracing::{debug, trace};

/// A slot and a copy of its status that reads without borrowing the slot
pub(crate) struct Shared<B> {
    status: Cell<Status>,
    slot: RefCell<Slot<B>>,
}

impl<B> Shared<B> {
    pub(crate) fn new(slot: Slot<B>) -> Self {
        Shared {
            status: Cell::new(Status {
                state: slot.state,
                flags: slot.flags,
            }),
            slot: RefCell::new(slot),
        }
    }

    /// Last published status; valid even while the slot is borrowed
    pub(crate) fn status(&self) -> Status {
        self.status.get()
    }

    pub(crate) fn try_borrow(&self) -> Result<Ref<'_, Slot<B>>, BorrowError> {
        self.slot.try_borrow()
    }

    pub(crate) fn try_borrow_mut(&self) -> Result<SlotMut<'_, B>, BorrowMutError> {
        let slot = self.slot.try_borrow_mut()?;
        Ok(SlotMut {
            slot,
            status: &self.status,
        })
    }
}

/// Mutable slot borrow; publishes the slot's status when released
pub(crate) struct SlotMut<'a, B> {
    slot: RefMut<'a, Slot<B>>,
    status: &'a Cell<Status>,
}

impl<B> Deref for SlotMut<'_, B> {
    type Target = Slot<B>;

    fn deref(&self) -> &Slot<B> {
        &self.slot
    }
}

impl<B> DerefMut for SlotMut<'_, B> {
    fn deref_mut(&mut self) -> &mut Slot<B> {
        &mut self.slot
    }
}

impl<B> Drop for SlotMut<'_, B> {
    fn drop(&mut self) {
        self.status.set(Status {
            state: self.slot.state,
            flags: self.slot.flags,
        });
    }
}

pub(crate) struct Slot<B> {
    pub(crate) state: State,
    pub(crate) blueprint: Rc<B>,
    pub(crate) flags: LifecycleFlags,
    pub(crate) cache: DerivedCache,
    /// Lazily created frozen duplicate of `blueprint` (the frozen-copy cache)
    pub(crate) snapshot: Option<Rc<B>>,
}

impl<B: Blueprint> Slot<B> {
    pub(crate) fn new(blueprint: B) -> Self {
        Slot {
            state: State::Mutable,
            blueprint: Rc::new(blueprint),
            flags: LifecycleFlags::new(),
            cache: DerivedCache::new(),
            snapshot: None,
        }
    }

    /// Independent slot in `state` backed by `blueprint`
    ///
    /// The cache travels with the copy: its entries were computed from the
    /// same parameters. The snapshot never does.
    pub(crate) fn derive(&self, state: State, blueprint: Rc<B>) -> Self {
        Slot {
            state,
            blueprint,
            flags: self.flags,
            cache: self.cache.clone(),
            snapshot: None,
        }
    }

    /// Deep duplicate of the blueprint in a new allocation
    pub(crate) fn duplicate_blueprint(&self) -> Rc<B> {
        Rc::new(B::clone(&self.blueprint))
    }

    /// Copy-on-write access to the blueprint
    pub(crate) fn blueprint_mut(&mut self) -> &mut B {
        if Rc::strong_count(&self.blueprint) > 1 {
            trace!(target: "genericbuilder::copy", kind = B::KIND, "unsharing blueprint before write");
        }
        Rc::make_mut(&mut self.blueprint)
    }

    pub(crate) fn invalidate_snapshot(&mut self) {
        if self.snapshot.take().is_some() {
            trace!(target: "genericbuilder::copy", kind = B::KIND, "frozen snapshot invalidated");
        }
    }

    /// Refuse a mutation the current state does not allow
    pub(crate) fn check_settable(&self, target: &str, contract: SetterContract) -> BuilderResult<()> {
        match self.state {
            State::Immutable => Err(BuilderError::immutable(B::KIND, format!("set '{}'", target))),
            State::Frozen if !contract.is_always_settable() => {
                debug!(target: "genericbuilder::lifecycle", kind = B::KIND, attribute = target, "rejected write to frozen builder");
                Err(BuilderError::frozen(B::KIND, target))
            }
            _ => Ok(()),
        }
    }

    /// Apply a setter's invalidation after a successful write
    pub(crate) fn apply_contract(&mut self, contract: SetterContract) {
        self.invalidate_snapshot();
        if contract.invalidates_preprocessing() {
            self.flags.invalidate_preprocessing();
            self.cache.clear();
        } else if contract.invalidates_build() {
            self.flags.invalidate_build();
        }
    }

    /// Preprocess if needed
    ///
    /// Immutable slots are only reachable here when already preprocessed;
    /// otherwise this reports `Immutable`.
    pub(crate) fn ensure_preprocessed(&mut self) -> BuilderResult<()> {
        if self.flags.is_preprocessed() {
            return Ok(());
        }
        if !self.state.is_mutable() {
            return Err(BuilderError::immutable(B::KIND, "preprocess"));
        }

        self.blueprint.validate()?;
        self.blueprint_mut().preprocess()?;
        self.flags.mark_preprocessed();
        self.cache.clear();
        self.invalidate_snapshot();
        debug!(target: "genericbuilder::lifecycle", kind = B::KIND, state = %self.state, "preprocessed");
        Ok(())
    }

    /// Explicit `preprocess()`: requires Mutable mutability
    pub(crate) fn preprocess(&mut self) -> BuilderResult<()> {
        if !self.state.is_mutable() {
            return Err(BuilderError::immutable(B::KIND, "preprocess"));
        }
        self.ensure_preprocessed()
    }

    /// Explicit `build()`: frozen slots build at most once
    pub(crate) fn build(&mut self) -> BuilderResult<()> {
        if !self.state.is_mutable() {
            return Err(BuilderError::immutable(B::KIND, "build"));
        }
        if self.state == State::Frozen && self.flags.is_built() {
            trace!(target: "genericbuilder::lifecycle", kind = B::KIND, "frozen builder already built");
            return Ok(());
        }

        let before = self.flags;
        self.ensure_preprocessed()?;
        self.cache.clear();
        if let Err(e) = self.blueprint_mut().build() {
            self.flags = before;
            debug!(target: "genericbuilder::lifecycle", kind = B::KIND, error = %e, "build failed");
            return Err(e);
        }
        self.flags.mark_built();
        self.invalidate_snapshot();
        debug!(target: "genericbuilder::lifecycle", kind = B::KIND, state = %self.state, "built");
        Ok(())
    }

    /// Drop derived outputs and mark unbuilt
    pub(crate) fn clear(&mut self) -> BuilderResult<()> {
        match self.state {
            State::Immutable => return Err(BuilderError::immutable(B::KIND, "clear")),
            State::Frozen => return Err(BuilderError::frozen(B::KIND, "clear()")),
            _ => {}
        }
        self.blueprint_mut().clear();
        self.cache.clear();
        self.flags.invalidate_build();
        self.invalidate_snapshot();
        debug!(target: "genericbuilder::lifecycle", kind = B::KIND, "cleared");
        Ok(())
    }

    /// The frozen-copy cache: create on first use, reuse until invalidated
    pub(crate) fn snapshot(&mut self) -> Rc<B> {
        if let Some(snapshot) = &self.snapshot {
            trace!(target: "genericbuilder::copy", kind = B::KIND, "reusing frozen snapshot");
            return Rc::clone(snapshot);
        }
        let snapshot = self.duplicate_blueprint();
        self.snapshot = Some(Rc::clone(&snapshot));
        debug!(target: "genericbuilder::copy", kind = B::KIND, "created frozen snapshot");
        snapshot
    }
}
