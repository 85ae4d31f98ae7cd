//! Copies and views
//!
//! | source            | `copy()`         | `copy_frozen()`                 |
//! |-------------------|------------------|---------------------------------|
//! | Mutable, unbuilt  | mutable copy     | `NotBuilt`                      |
//! | Mutable, built    | mutable copy     | frozen copy of cached snapshot  |
//! | Frozen            | frozen copy      | deep duplicate                  |
//! | Immutable         | mutable copy     | deep duplicate (requires built) |
//! | View              | frozen copy      | delegated to the target         |
//!
//! Frozen copies taken from an unchanged mutable builder share one snapshot
//! allocation. Every write, preprocess or build on the source drops its
//! snapshot, so the next frozen copy duplicates again. Copies that share
//! storage unshare it on their own first write.

use std::rc::Rc;

use genericbuilder_core::{Blueprint, BuilderError, BuilderResult, State};
use tracing::debug;

use crate::builder::{Body, Builder};

impl<B: Blueprint> Builder<B> {
    /// Frozen copy if frozen (views included), mutable copy otherwise
    pub fn copy(&self) -> BuilderResult<Self> {
        if self.is_frozen() {
            self.copy_frozen()
        } else {
            self.copy_mutable()
        }
    }

    /// Independent, mutable deep copy
    ///
    /// Flags and cached derived values travel with the copy.
    pub fn copy_mutable(&self) -> BuilderResult<Self> {
        let slot = self.resolve()?;
        let s = Self::borrow(&slot, "copy_mutable")?;
        debug!(target: "genericbuilder::copy", kind = B::KIND, from = %s.state, "mutable copy");
        Ok(Self::from_slot(s.derive(State::Mutable, s.duplicate_blueprint())))
    }

    /// Alias of [`copy_mutable`](Self::copy_mutable)
    pub fn copy_unfrozen(&self) -> BuilderResult<Self> {
        self.copy_mutable()
    }

    /// Independent, frozen copy
    ///
    /// # Errors
    ///
    /// `NotBuilt` unless the builder is frozen or built.
    pub fn copy_frozen(&self) -> BuilderResult<Self> {
        let slot = match &self.body {
            Body::Owned(slot) => Rc::clone(slot),
            Body::View(_) => {
                let target = Builder {
                    body: Body::Owned(self.resolve()?),
                };
                return target.copy_frozen();
            }
        };

        let mut s = Self::borrow_mut(&slot, "copy_frozen")?;
        let state = s.state;
        let blueprint = match state {
            State::Frozen => s.duplicate_blueprint(),
            _ if !s.flags.is_built() => {
                return Err(BuilderError::not_built(B::KIND, "copy_frozen()"));
            }
            State::Mutable => s.snapshot(),
            _ => s.duplicate_blueprint(),
        };
        debug!(target: "genericbuilder::copy", kind = B::KIND, from = %state, "frozen copy");
        Ok(Self::from_slot(s.derive(State::Frozen, blueprint)))
    }

    /// Zero-copy frozen alias of this builder's storage
    ///
    /// Reads always reflect the owner's current state, even after the owner
    /// is mutated and rebuilt. Once the owner is dropped, reads fail with
    /// `DetachedView`.
    pub fn frozen_view(&self) -> BuilderResult<Self> {
        let slot = self.resolve()?;
        debug!(target: "genericbuilder::copy", kind = B::KIND, "frozen view");
        Ok(Builder {
            body: Body::View(Rc::downgrade(&slot)),
        })
    }

    /// Independent, immutable copy with normalized parameters
    pub fn copy_immutable(&self) -> BuilderResult<Self> {
        let slot = self.resolve()?;
        let mut s = Self::borrow_mut(&slot, "copy_immutable")?;
        s.ensure_preprocessed()?;
        debug!(target: "genericbuilder::copy", kind = B::KIND, from = %s.state, "immutable copy");
        Ok(Self::from_slot(s.derive(State::Immutable, s.duplicate_blueprint())))
    }

    /// Mutable copy, built; immutable again if the source was immutable
    pub fn copy_rebuilt(&self) -> BuilderResult<Self> {
        let was_immutable = {
            let slot = self.resolve()?;
            let s = Self::borrow(&slot, "copy_rebuilt")?;
            s.state == State::Immutable
        };
        let mut copy = self.copy_mutable()?;
        copy.build()?;
        if was_immutable {
            copy.make_immutable()?;
        }
        Ok(copy)
    }

    /// Whether both handles read the same blueprint allocation
    ///
    /// True for a view and its target, and for frozen copies taken from the
    /// same snapshot. False if either handle is a detached view.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        let (Ok(a), Ok(b)) = (self.resolve(), other.resolve()) else {
            return false;
        };
        if Rc::ptr_eq(&a, &b) {
            return true;
        }
        let shared = match (a.try_borrow(), b.try_borrow()) {
            (Ok(a), Ok(b)) => Rc::ptr_eq(&a.blueprint, &b.blueprint),
            _ => false,
        };
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genericbuilder_core::{Attribute, GetterContract, Schema, SetterContract};

    #[derive(Clone, Debug, Default)]
    struct Table {
        rows: usize,
        note: String,
        cells: Vec<u32>,
    }

    const ROWS: Attribute<Table, usize> = Attribute::settable("rows", |t| t.rows, |t, v| t.rows = v);
    const NOTE: Attribute<Table, String> = Attribute::settable_with(
        "note",
        |t| t.note.clone(),
        |t, v| t.note = v,
        SetterContract::ALWAYS_SETTABLE,
    );
    const CELLS: Attribute<Table, Vec<u32>> =
        Attribute::read_only_with("cells", |t| t.cells.clone(), GetterContract::RequiresBuilt);

    impl Blueprint for Table {
        const KIND: &'static str = "table";

        fn build(&mut self) -> BuilderResult<()> {
            self.cells = (0..self.rows as u32).collect();
            Ok(())
        }

        fn schema() -> Schema<Self> {
            Schema::new().attribute(ROWS).attribute(NOTE)
        }
    }

    fn built(rows: usize) -> Builder<Table> {
        let mut b = Builder::new(Table::default());
        b.set(&ROWS, rows).unwrap();
        b.build().unwrap();
        b
    }

    fn has_snapshot(b: &Builder<Table>) -> bool {
        let slot = b.resolve().unwrap();
        let has = slot.try_borrow().unwrap().snapshot.is_some();
        has
    }

    #[test]
    fn test_copy_frozen_requires_built() {
        let b = Builder::new(Table::default());
        assert!(b.copy_frozen().unwrap_err().is_not_built());
    }

    #[test]
    fn test_copy_frozen_shares_snapshot() {
        let b = built(3);
        let f1 = b.copy_frozen().unwrap();
        let f2 = b.copy_frozen().unwrap();
        assert!(f1.is_frozen());
        assert!(f1.is_built());
        assert!(f1.shares_storage_with(&f2));
        assert!(!f1.shares_storage_with(&b));
        assert!(has_snapshot(&b));
    }

    #[test]
    fn test_mutation_drops_snapshot() {
        let mut b = built(3);
        let f1 = b.copy_frozen().unwrap();
        b.set(&ROWS, 5).unwrap();
        assert!(!has_snapshot(&b));
        b.build().unwrap();

        let f2 = b.copy_frozen().unwrap();
        assert!(!f1.shares_storage_with(&f2));
        assert_eq!(f1.get(&CELLS).unwrap().len(), 3);
        assert_eq!(f2.get(&CELLS).unwrap().len(), 5);
    }

    #[test]
    fn test_always_settable_write_drops_snapshot() {
        let mut b = built(2);
        let f1 = b.copy_frozen().unwrap();
        b.set(&NOTE, "changed".into()).unwrap();
        assert!(b.is_built());
        let f2 = b.copy_frozen().unwrap();
        assert!(!f1.shares_storage_with(&f2));
        assert_eq!(f1.get(&NOTE).unwrap(), "");
        assert_eq!(f2.get(&NOTE).unwrap(), "changed");
    }

    #[test]
    fn test_copy_frozen_of_frozen_duplicates() {
        let b = built(2);
        let f = b.copy_frozen().unwrap();
        let ff = f.copy_frozen().unwrap();
        assert!(ff.is_frozen());
        assert!(!ff.shares_storage_with(&f));
        assert!(!has_snapshot(&ff));
    }

    #[test]
    fn test_frozen_copy_write_unshares() {
        let b = built(2);
        let mut f1 = b.copy_frozen().unwrap();
        let f2 = b.copy_frozen().unwrap();
        f1.set(&NOTE, "mine".into()).unwrap();
        assert!(!f1.shares_storage_with(&f2));
        assert_eq!(f2.get(&NOTE).unwrap(), "");
    }

    #[test]
    fn test_shares_storage_with_across_handles() {
        let b = built(2);
        let f1 = b.copy_frozen().unwrap();
        let f2 = b.copy_frozen().unwrap();
        assert!(b.shares_storage_with(&b));
        assert!(f1.inspect(|_| f1.shares_storage_with(&f2)).unwrap());

        let v = f1.frozen_view().unwrap();
        assert!(v.shares_storage_with(&f2));
        drop(f1);
        assert!(!v.shares_storage_with(&f2));
    }

    #[test]
    fn test_copy_dispatch() {
        let b = built(2);
        assert_eq!(b.copy().unwrap().state(), State::Mutable);
        let f = b.copy_frozen().unwrap();
        assert_eq!(f.copy().unwrap().state(), State::Frozen);
        let v = b.frozen_view().unwrap();
        assert_eq!(v.copy().unwrap().state(), State::Frozen);
    }

    #[test]
    fn test_copy_mutable_is_independent() {
        let b = built(2);
        let mut c = b.copy_mutable().unwrap();
        assert!(c.is_built());
        assert!(!c.shares_storage_with(&b));
        c.set(&ROWS, 7).unwrap();
        assert!(!c.is_built());
        assert!(b.is_built());
        assert_eq!(b.get(&ROWS).unwrap(), 2);
    }

    #[test]
    fn test_view_tracks_owner() {
        let mut b = built(2);
        let v = b.frozen_view().unwrap();
        assert!(v.is_view());
        assert!(v.is_frozen());
        assert!(!v.is_mutable());
        assert!(v.shares_storage_with(&b));

        b.set(&ROWS, 4).unwrap();
        b.build().unwrap();
        assert_eq!(v.get(&CELLS).unwrap().len(), 4);
    }

    #[test]
    fn test_view_refuses_writes() {
        let b = built(2);
        let mut v = b.frozen_view().unwrap();
        assert!(matches!(v.set(&NOTE, "x".into()), Err(BuilderError::Frozen { .. })));
        assert!(matches!(v.clear(), Err(BuilderError::Frozen { .. })));
        assert!(matches!(v.unfreeze(), Err(BuilderError::Frozen { .. })));
        assert!(v.build().is_ok());
    }

    #[test]
    fn test_view_build_of_unbuilt_target() {
        let b = Builder::new(Table::default());
        let mut v = b.frozen_view().unwrap();
        assert!(matches!(v.build(), Err(BuilderError::Frozen { .. })));
        assert!(v.copy_frozen().unwrap_err().is_not_built());
    }

    #[test]
    fn test_view_copy_frozen_uses_target_snapshot() {
        let b = built(3);
        let v = b.frozen_view().unwrap();
        let f1 = v.copy_frozen().unwrap();
        let f2 = b.copy_frozen().unwrap();
        assert!(f1.shares_storage_with(&f2));
        assert!(!f1.is_view());
    }

    #[test]
    fn test_detached_view() {
        let b = built(2);
        let v = b.frozen_view().unwrap();
        drop(b);
        assert!(matches!(v.get(&ROWS), Err(BuilderError::DetachedView { .. })));
        assert!(matches!(v.copy_frozen(), Err(BuilderError::DetachedView { .. })));
        assert!(matches!(v.frozen_view(), Err(BuilderError::DetachedView { .. })));
        assert!(!v.is_built());
        assert!(v.status().is_err());
    }

    #[test]
    fn test_copy_immutable() {
        let b = built(2);
        let i = b.copy_immutable().unwrap();
        assert_eq!(i.state(), State::Immutable);
        assert!(i.is_preprocessed());
        assert_eq!(i.get(&CELLS).unwrap(), vec![0, 1]);

        // copy() of an immutable builder is a mutable copy
        let m = i.copy().unwrap();
        assert_eq!(m.state(), State::Mutable);

        let f = i.copy_frozen().unwrap();
        assert!(f.is_frozen());
        assert!(!f.shares_storage_with(&i));
    }

    #[test]
    fn test_copy_frozen_of_unbuilt_immutable() {
        let b = Builder::new(Table::default());
        let i = b.copy_immutable().unwrap();
        assert!(i.copy_frozen().unwrap_err().is_not_built());
    }

    #[test]
    fn test_copy_rebuilt() {
        let b = Builder::new(Table { rows: 3, ..Table::default() });
        let i = b.copy_immutable().unwrap();
        let r = i.copy_rebuilt().unwrap();
        assert_eq!(r.state(), State::Immutable);
        assert!(r.is_built());
        assert_eq!(r.get(&CELLS).unwrap().len(), 3);

        let m = b.copy_rebuilt().unwrap();
        assert_eq!(m.state(), State::Mutable);
        assert!(m.is_built());
        assert!(!b.is_built());
    }
}
