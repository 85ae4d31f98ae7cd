//! Typed attribute descriptors
//!
//! An [`Attribute<B, T>`] names one accessor pair of a blueprint `B` together
//! with the contracts the engine enforces around it. Descriptors are plain
//! data built with `const fn`s, so they are normally declared as constants
//! next to the blueprint:
//!
//! ```
//! use genericbuilder_core::{Attribute, GetterContract, SetterContract};
//!
//! #[derive(Clone)]
//! struct Tone {
//!     pitch: f64,
//!     label: String,
//!     samples: Vec<f64>,
//! }
//!
//! const PITCH: Attribute<Tone, f64> =
//!     Attribute::settable("pitch", |t| t.pitch, |t, v| t.pitch = v);
//! const LABEL: Attribute<Tone, String> = Attribute::settable_with(
//!     "label",
//!     |t| t.label.clone(),
//!     |t, v| t.label = v,
//!     SetterContract::ALWAYS_SETTABLE,
//! );
//! const SAMPLES: Attribute<Tone, Vec<f64>> =
//!     Attribute::read_only_with("samples", |t| t.samples.clone(), GetterContract::RequiresBuilt);
//!
//! assert!(PITCH.is_settable());
//! assert!(LABEL.setter_contract().is_always_settable());
//! assert!(!SAMPLES.is_settable());
//! ```
//!
//! Contracts go through the `_with` constructors. The chained modifiers
//! (`always_settable()`, `requires_built()`, `cached()`) are for descriptors
//! that already exist; a closure passed straight into a chain cannot infer
//! its parameter types.

use std::fmt;

use crate::contract::{GetterContract, SetterContract};

/// Raw getter of an attribute
pub type Getter<B, T> = fn(&B) -> T;

/// Raw setter of an attribute
pub type Setter<B, T> = fn(&mut B, T);

/// Descriptor of one blueprint attribute and its contracts
pub struct Attribute<B, T> {
    name: &'static str,
    getter: Getter<B, T>,
    setter: Option<Setter<B, T>>,
    get_contract: GetterContract,
    set_contract: SetterContract,
}

impl<B, T> Attribute<B, T> {
    /// Attribute with a getter only (typically a derived value)
    pub const fn read_only(name: &'static str, getter: Getter<B, T>) -> Self {
        Attribute {
            name,
            getter,
            setter: None,
            get_contract: GetterContract::Preprocessed,
            set_contract: SetterContract::PARAMETER,
        }
    }

    /// Attribute with a getter and a setter, using the parameter contracts
    pub const fn settable(name: &'static str, getter: Getter<B, T>, setter: Setter<B, T>) -> Self {
        Attribute {
            name,
            getter,
            setter: Some(setter),
            get_contract: GetterContract::Preprocessed,
            set_contract: SetterContract::PARAMETER,
        }
    }

    /// Read-only attribute with an explicit getter contract
    pub const fn read_only_with(
        name: &'static str,
        getter: Getter<B, T>,
        get_contract: GetterContract,
    ) -> Self {
        Attribute {
            name,
            getter,
            setter: None,
            get_contract,
            set_contract: SetterContract::PARAMETER,
        }
    }

    /// Settable attribute with an explicit setter contract
    pub const fn settable_with(
        name: &'static str,
        getter: Getter<B, T>,
        setter: Setter<B, T>,
        set_contract: SetterContract,
    ) -> Self {
        Attribute {
            name,
            getter,
            setter: Some(setter),
            get_contract: GetterContract::Preprocessed,
            set_contract,
        }
    }

    /// Replace the setter contract
    pub const fn with_setter_contract(self, contract: SetterContract) -> Self {
        Attribute {
            set_contract: contract,
            ..self
        }
    }

    /// Replace the getter contract
    pub const fn with_getter_contract(self, contract: GetterContract) -> Self {
        Attribute {
            get_contract: contract,
            ..self
        }
    }

    /// Exempt the setter from the frozen-state block
    ///
    /// The setter must not touch anything `build()` produced: frozen copies
    /// share storage and rely on that.
    pub const fn always_settable(self) -> Self {
        self.with_setter_contract(SetterContract::ALWAYS_SETTABLE)
    }

    /// Only readable once the builder is built
    pub const fn requires_built(self) -> Self {
        self.with_getter_contract(GetterContract::RequiresBuilt)
    }

    /// Memoize reads under `key` until preprocessing is invalidated
    pub const fn cached(self, key: &'static str) -> Self {
        self.with_getter_contract(GetterContract::Cached(key))
    }

    /// Attribute name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Getter contract
    #[inline]
    pub fn getter_contract(&self) -> GetterContract {
        self.get_contract
    }

    /// Setter contract (meaningless for read-only attributes)
    #[inline]
    pub fn setter_contract(&self) -> SetterContract {
        self.set_contract
    }

    /// Whether a setter was declared
    #[inline]
    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    /// Run the raw getter, bypassing every contract
    #[inline]
    pub fn read(&self, blueprint: &B) -> T {
        (self.getter)(blueprint)
    }

    /// The raw setter, if any
    #[inline]
    pub fn setter(&self) -> Option<Setter<B, T>> {
        self.setter
    }
}

impl<B, T> Clone for Attribute<B, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, T> Copy for Attribute<B, T> {}

impl<B, T> fmt::Debug for Attribute<B, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("settable", &self.setter.is_some())
            .field("getter_contract", &self.get_contract)
            .field("setter_contract", &self.set_contract)
            .finish()
    }
}
