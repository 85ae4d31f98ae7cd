//! genericbuilder - lifecycle-managed builder objects
//!
//! A builder wraps a [`Blueprint`]: user-defined parameters plus the outputs
//! derived from them. The [`Builder`] handle keeps the two consistent:
//! changing a parameter marks the builder unbuilt, reading a built-only
//! output of an unbuilt builder is an error, and frozen or immutable
//! builders refuse changes.
//!
//! # Quick Start
//!
//! ```
//! use genericbuilder::{Attribute, Blueprint, Builder, BuilderResult, GetterContract, Schema};
//!
//! #[derive(Clone, Default)]
//! struct Rates {
//!     size: usize,
//!     rate: f64,
//!     array: Vec<f64>,
//! }
//!
//! const SIZE: Attribute<Rates, usize> = Attribute::settable("size", |r| r.size, |r, v| r.size = v);
//! const RATE: Attribute<Rates, f64> = Attribute::settable("rate", |r| r.rate, |r, v| r.rate = v);
//! const ARRAY: Attribute<Rates, Vec<f64>> =
//!     Attribute::read_only_with("array", |r| r.array.clone(), GetterContract::RequiresBuilt);
//!
//! impl Blueprint for Rates {
//!     const KIND: &'static str = "rates";
//!
//!     fn build(&mut self) -> BuilderResult<()> {
//!         self.array = vec![self.rate; self.size];
//!         Ok(())
//!     }
//!
//!     fn schema() -> Schema<Self> {
//!         Schema::new().attribute(SIZE).attribute(RATE)
//!     }
//! }
//!
//! let mut rates = Builder::new(Rates::default());
//! rates.set(&SIZE, 3)?;
//! rates.set(&RATE, 0.5)?;
//! rates.build()?;
//!
//! // Frozen copies stay put while the original moves on
//! let frozen = rates.copy_frozen()?;
//! rates.set(&SIZE, 10)?;
//! assert!(!rates.is_built());
//! assert_eq!(frozen.get(&ARRAY)?, vec![0.5; 3]);
//! # Ok::<(), genericbuilder::BuilderError>(())
//! ```
//!
//! # Architecture
//!
//! - `genericbuilder-core`: errors, states, contracts, attribute
//!   descriptors, the derived cache and property maps
//! - `genericbuilder-engine`: the `Builder` handle, copies and views, and
//!   the `builder_attributes!` macro

pub use genericbuilder_core::{
    properties_from_json, properties_from_toml, Attribute, Blueprint, BuilderError, BuilderResult,
    Apply, DerivedCache, GetterContract, Getter, LifecycleFlags, Mutator, Property, PropertyMap,
    Schema, Setter, SetterContract, State, Status, ValidationError,
};
pub use genericbuilder_engine::{builder_attributes, Builder};
