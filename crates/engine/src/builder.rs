//! The builder handle
//!
//! [`Builder<B>`] wraps a [`Blueprint`] and enforces its lifecycle:
//!
//! - every setter checks mutability, then the frozen state, and invalidates
//!   preprocessing/build as its contract says;
//! - getters preprocess on demand, refuse to read built outputs of an
//!   unbuilt builder, or memoize through the derived cache;
//! - `preprocess()` and `build()` move the builder through its flags and
//!   never leave a partial transition behind.
//!
//! Copying and views live in the `copy` module.
//!
//! # Threading
//!
//! A builder is single-threaded: its state lives in `Rc<RefCell<..>>` and
//! the handle is neither `Send` nor `Sync`. Wrap it in your own
//! synchronization if it has to cross threads. Reentrant access (reading a
//! builder from inside a closure that is already inspecting it) is reported
//! as [`BuilderError::Reentrant`] instead of panicking.

use std::cell::Ref;
use std::fmt;
use std::rc::{Rc, Weak};

use genericbuilder_core::{
    Attribute, Blueprint, BuilderError, BuilderResult, GetterContract, LifecycleFlags, Mutator,
    PropertyMap, SetterContract, State, Status,
};
use serde_json::Value;
use tracing::warn;

use crate::slot::{Shared, Slot, SlotMut};

pub(crate) type SlotRef<B> = Rc<Shared<B>>;

pub(crate) enum Body<B> {
    /// Handle owns its slot
    Owned(SlotRef<B>),
    /// Handle aliases another builder's slot
    View(Weak<Shared<B>>),
}

/// Lifecycle-managed handle around a blueprint
///
/// # Example
///
/// ```
/// use genericbuilder_engine::{Attribute, Blueprint, Builder, BuilderResult, GetterContract, Schema};
///
/// #[derive(Clone, Default)]
/// struct Ramp {
///     size: usize,
///     values: Vec<f64>,
/// }
///
/// const SIZE: Attribute<Ramp, usize> = Attribute::settable("size", |r| r.size, |r, v| r.size = v);
/// const VALUES: Attribute<Ramp, Vec<f64>> =
///     Attribute::read_only_with("values", |r| r.values.clone(), GetterContract::RequiresBuilt);
///
/// impl Blueprint for Ramp {
///     fn build(&mut self) -> BuilderResult<()> {
///         self.values = (0..self.size).map(|i| i as f64).collect();
///         Ok(())
///     }
///
///     fn schema() -> Schema<Self> {
///         Schema::new().attribute(SIZE)
///     }
/// }
///
/// let mut ramp = Builder::new(Ramp::default());
/// ramp.set(&SIZE, 3)?;
/// assert!(ramp.get(&VALUES).is_err());
///
/// ramp.build()?;
/// assert_eq!(ramp.get(&VALUES)?, vec![0.0, 1.0, 2.0]);
/// # Ok::<(), genericbuilder_engine::BuilderError>(())
/// ```
pub struct Builder<B: Blueprint> {
    pub(crate) body: Body<B>,
}

impl<B: Blueprint> Builder<B> {
    // ========== Construction ==========

    /// Mutable, unpreprocessed, unbuilt builder around `blueprint`
    pub fn new(blueprint: B) -> Self {
        Self::from_slot(Slot::new(blueprint))
    }

    /// Builder configured from a property map
    ///
    /// Keys that no attribute recognises are ignored.
    pub fn from_properties(blueprint: B, mut properties: PropertyMap) -> BuilderResult<Self> {
        let mut builder = Self::new(blueprint);
        builder.set_properties(&mut properties)?;
        Ok(builder)
    }

    pub(crate) fn from_slot(slot: Slot<B>) -> Self {
        Builder {
            body: Body::Owned(Rc::new(Shared::new(slot))),
        }
    }

    // ========== Slot access ==========

    /// The slot this handle reads: its own, or the view target's
    pub(crate) fn resolve(&self) -> BuilderResult<SlotRef<B>> {
        match &self.body {
            Body::Owned(slot) => Ok(Rc::clone(slot)),
            Body::View(weak) => weak.upgrade().ok_or_else(|| {
                warn!(target: "genericbuilder::copy", kind = B::KIND, "read through detached view");
                BuilderError::DetachedView { kind: B::KIND }
            }),
        }
    }

    pub(crate) fn borrow<'a>(slot: &'a SlotRef<B>, operation: &str) -> BuilderResult<Ref<'a, Slot<B>>> {
        slot.try_borrow().map_err(|_| BuilderError::Reentrant {
            kind: B::KIND,
            operation: operation.to_string(),
        })
    }

    pub(crate) fn borrow_mut<'a>(slot: &'a SlotRef<B>, operation: &str) -> BuilderResult<SlotMut<'a, B>> {
        slot.try_borrow_mut().map_err(|_| BuilderError::Reentrant {
            kind: B::KIND,
            operation: operation.to_string(),
        })
    }

    /// The owned slot, refusing views with `Frozen`
    fn owned_for_write(&self, target: &str) -> BuilderResult<&SlotRef<B>> {
        match &self.body {
            Body::Owned(slot) => Ok(slot),
            Body::View(_) => Err(BuilderError::frozen(B::KIND, target)),
        }
    }

    // ========== Status ==========

    /// Builder kind (`Blueprint::KIND`)
    pub fn kind(&self) -> &'static str {
        B::KIND
    }

    /// Lifecycle state of this handle
    ///
    /// Status queries never borrow the slot, so they answer correctly from
    /// inside [`inspect`](Self::inspect) as well.
    pub fn state(&self) -> State {
        match &self.body {
            Body::Owned(slot) => slot.status().state,
            Body::View(_) => State::View,
        }
    }

    /// State and flags; views report their target's flags
    pub fn status(&self) -> BuilderResult<Status> {
        let flags = self.resolve()?.status().flags;
        Ok(Status {
            state: self.state(),
            flags,
        })
    }

    fn flags(&self) -> LifecycleFlags {
        self.status().map(|s| s.flags).unwrap_or_default()
    }

    /// Whether the handle has Mutable mutability (Mutable or Frozen)
    pub fn is_mutable(&self) -> bool {
        self.state().is_mutable()
    }

    /// Whether the handle is frozen; views always are
    pub fn is_frozen(&self) -> bool {
        self.state().is_frozen()
    }

    /// Whether the handle aliases another builder
    pub fn is_view(&self) -> bool {
        self.state().is_view()
    }

    /// Whether the parameters are normalized (false for detached views)
    pub fn is_preprocessed(&self) -> bool {
        self.flags().is_preprocessed()
    }

    /// Whether derived outputs match the parameters (false for detached views)
    pub fn is_built(&self) -> bool {
        self.flags().is_built()
    }

    // ========== Lifecycle ==========

    /// Validate and normalize the parameters if they changed
    ///
    /// Fails with `Immutable` on immutable builders. A view never
    /// preprocesses its target: it succeeds only if the target already is.
    pub fn preprocess(&mut self) -> BuilderResult<()> {
        match &self.body {
            Body::Owned(slot) => Self::borrow_mut(slot, "preprocess")?.preprocess(),
            Body::View(_) => self.view_requires(|f| f.is_preprocessed(), "preprocess()"),
        }
    }

    /// Preprocess if needed, then run the blueprint's build step
    ///
    /// Frozen builders build at most once. A view succeeds only if its
    /// target is already built.
    pub fn build(&mut self) -> BuilderResult<()> {
        match &self.body {
            Body::Owned(slot) => Self::borrow_mut(slot, "build")?.build(),
            Body::View(_) => self.view_requires(|f| f.is_built(), "build()"),
        }
    }

    fn view_requires(&self, satisfied: fn(&LifecycleFlags) -> bool, operation: &str) -> BuilderResult<()> {
        let flags = self.resolve()?.status().flags;
        if satisfied(&flags) {
            Ok(())
        } else {
            Err(BuilderError::frozen(B::KIND, operation))
        }
    }

    /// Drop derived outputs and mark the builder unbuilt
    pub fn clear(&mut self) -> BuilderResult<()> {
        let slot = self.owned_for_write("clear()")?;
        Self::borrow_mut(slot, "clear")?.clear()
    }

    /// Freeze in place; requires a built builder
    pub fn freeze(&mut self) -> BuilderResult<()> {
        let Body::Owned(slot) = &self.body else {
            return Ok(());
        };
        let mut s = Self::borrow_mut(slot, "freeze")?;
        let state = s.state;
        match state {
            State::Immutable => Err(BuilderError::immutable(B::KIND, "freeze")),
            State::Mutable if !s.flags.is_built() => Err(BuilderError::not_built(B::KIND, "freeze()")),
            _ => {
                s.state = State::Frozen;
                s.invalidate_snapshot();
                Ok(())
            }
        }
    }

    /// Unfreeze in place
    ///
    /// Storage still shared with other frozen copies is duplicated on the
    /// first write, never modified underneath them.
    pub fn unfreeze(&mut self) -> BuilderResult<()> {
        let slot = self.owned_for_write("unfreeze()")?;
        let mut s = Self::borrow_mut(slot, "unfreeze")?;
        let state = s.state;
        match state {
            State::Immutable => Err(BuilderError::immutable(B::KIND, "unfreeze")),
            _ => {
                s.state = State::Mutable;
                Ok(())
            }
        }
    }

    /// Turn this handle immutable, preprocessing first; irreversible
    pub fn make_immutable(&mut self) -> BuilderResult<()> {
        let slot = self.owned_for_write("make_immutable()")?;
        let mut s = Self::borrow_mut(slot, "make_immutable")?;
        if s.state == State::Immutable {
            return Ok(());
        }
        s.ensure_preprocessed()?;
        s.state = State::Immutable;
        s.invalidate_snapshot();
        Ok(())
    }

    // ========== Attribute access ==========

    /// Read an attribute through its getter contract
    pub fn get<T: Clone + 'static>(&self, attribute: &Attribute<B, T>) -> BuilderResult<T> {
        let slot = self.resolve()?;
        let mut s = Self::borrow_mut(&slot, attribute.name())?;
        match attribute.getter_contract() {
            GetterContract::RequiresBuilt => {
                if !s.flags.is_built() {
                    return Err(BuilderError::not_built(
                        B::KIND,
                        format!("reading '{}'", attribute.name()),
                    ));
                }
                Ok(attribute.read(&s.blueprint))
            }
            GetterContract::Preprocessed => {
                s.ensure_preprocessed()?;
                Ok(attribute.read(&s.blueprint))
            }
            GetterContract::Cached(key) => {
                s.ensure_preprocessed()?;
                let Slot { blueprint, cache, .. } = &mut *s;
                let blueprint: &B = blueprint;
                let value = cache.get_or_insert_with(key, || attribute.read(blueprint));
                Ok(T::clone(&value))
            }
        }
    }

    /// Assign an attribute through its setter contract
    ///
    /// The state is checked before anything else: an immutable builder
    /// reports `Immutable` even for a read-only attribute.
    pub fn set<T>(&mut self, attribute: &Attribute<B, T>, value: T) -> BuilderResult<()> {
        let name = attribute.name();
        let contract = attribute.setter_contract();
        let slot = self.owned_for_write(name)?;
        let mut s = Self::borrow_mut(slot, name)?;
        s.check_settable(name, contract)?;
        let setter = attribute.setter().ok_or_else(|| BuilderError::ReadOnly {
            kind: B::KIND,
            attribute: name.to_string(),
        })?;
        setter(s.blueprint_mut(), value);
        s.apply_contract(contract);
        Ok(())
    }

    /// Assign an attribute and return the builder, for call chains
    pub fn with<T>(mut self, attribute: &Attribute<B, T>, value: T) -> BuilderResult<Self> {
        self.set(attribute, value)?;
        Ok(self)
    }

    /// Run a setter function with `args` under its contract
    pub fn call<A>(&mut self, mutator: &Mutator<B, A>, args: A) -> BuilderResult<()> {
        self.modify(mutator.name(), mutator.setter_contract(), |blueprint| {
            mutator.apply(blueprint, args)
        })
    }

    /// Run a setter function and return the builder, for call chains
    pub fn with_call<A>(mut self, mutator: &Mutator<B, A>, args: A) -> BuilderResult<Self> {
        self.call(mutator, args)?;
        Ok(self)
    }

    /// Mutate the blueprint with a closure under `contract`
    ///
    /// `name` identifies the write in errors and log events. The closure
    /// only runs if the state allows the write; afterwards the contract's
    /// invalidation applies as for any setter.
    pub fn modify<R>(
        &mut self,
        name: &str,
        contract: SetterContract,
        f: impl FnOnce(&mut B) -> R,
    ) -> BuilderResult<R> {
        let slot = self.owned_for_write(name)?;
        let mut s = Self::borrow_mut(slot, name)?;
        s.check_settable(name, contract)?;
        let out = f(s.blueprint_mut());
        s.apply_contract(contract);
        Ok(out)
    }

    /// Borrow the blueprint with normalized parameters
    ///
    /// The closure may query this builder's status and take copies of it;
    /// attribute reads from inside it fail with `Reentrant`.
    pub fn inspect<R>(&self, f: impl FnOnce(&B) -> R) -> BuilderResult<R> {
        let slot = self.resolve()?;
        Self::borrow_mut(&slot, "inspect")?.ensure_preprocessed()?;
        let s = Self::borrow(&slot, "inspect")?;
        Ok(f(&s.blueprint))
    }

    /// Borrow the blueprint of a built builder
    pub fn inspect_built<R>(&self, f: impl FnOnce(&B) -> R) -> BuilderResult<R> {
        let slot = self.resolve()?;
        let s = Self::borrow(&slot, "inspect_built")?;
        if !s.flags.is_built() {
            return Err(BuilderError::not_built(B::KIND, "inspect_built()"));
        }
        Ok(f(&s.blueprint))
    }

    // ========== Bulk properties ==========

    /// Every settable attribute's value, derived-to-base
    ///
    /// A derived attribute shadows a base attribute of the same name. The
    /// map is accepted unchanged by [`set_properties`](Self::set_properties).
    pub fn get_properties(&self) -> BuilderResult<PropertyMap> {
        let slot = self.resolve()?;
        let mut s = Self::borrow_mut(&slot, "get_properties")?;
        s.ensure_preprocessed()?;
        let mut properties = PropertyMap::new();
        for property in B::schema().iter() {
            if !properties.contains_key(property.name()) {
                properties.insert(property.name().to_string(), property.read_value(&s.blueprint)?);
            }
        }
        Ok(properties)
    }

    /// Apply and remove every recognised key of `properties`
    ///
    /// Unknown keys are left in the map. Application stops at the first
    /// refused or malformed value, which stays in the map with every key
    /// after it; keys applied before it stay applied.
    pub fn set_properties(&mut self, properties: &mut PropertyMap) -> BuilderResult<()> {
        let slot = self.owned_for_write("set_properties()")?;
        let mut s = Self::borrow_mut(slot, "set_properties")?;
        for property in B::schema().iter() {
            let Some(value) = properties.get(property.name()) else {
                continue;
            };
            let contract = property.setter_contract();
            s.check_settable(property.name(), contract)?;
            property.write_value(s.blueprint_mut(), value.clone())?;
            s.apply_contract(contract);
            properties.remove(property.name());
        }
        Ok(())
    }

    /// Read one settable attribute by name, inherited ones included
    pub fn get_property(&self, name: &str) -> BuilderResult<Option<Value>> {
        let schema = B::schema();
        let Some(property) = schema.get(name) else {
            return Ok(None);
        };
        let slot = self.resolve()?;
        let mut s = Self::borrow_mut(&slot, name)?;
        s.ensure_preprocessed()?;
        property.read_value(&s.blueprint).map(Some)
    }

    /// Assign one settable attribute by name; returns whether it exists
    pub fn set_property(&mut self, name: &str, value: Value) -> BuilderResult<bool> {
        let mut properties = PropertyMap::new();
        properties.insert(name.to_string(), value);
        self.set_properties(&mut properties)?;
        Ok(properties.is_empty())
    }
}

impl<B: Blueprint + Default> Default for Builder<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<B: Blueprint> fmt::Debug for Builder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.flags();
        f.debug_struct("Builder")
            .field("kind", &B::KIND)
            .field("state", &self.state())
            .field("preprocessed", &flags.is_preprocessed())
            .field("built", &flags.is_built())
            .finish()
    }
}
