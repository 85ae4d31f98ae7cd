//! Core types and traits for genericbuilder
//!
//! This crate defines the foundational types used by the builder engine:
//! - Error: `BuilderError` hierarchy and `ValidationError`
//! - State: the closed lifecycle state set and preprocessing/build flags
//! - Contract: setter and getter contracts enforced around attributes
//! - Attribute: typed attribute descriptors
//! - Mutator: multi-argument setter functions
//! - Schema: type-erased settable attributes for bulk property access
//! - Cache: generation-tagged derived-value cache
//! - Traits: the `Blueprint` collaborator contract
//! - Properties: property maps and their TOML/JSON sources

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod cache;
pub mod contract;
pub mod error;
pub mod mutator;
pub mod properties;
pub mod schema;
pub mod state;
pub mod traits;

pub use attribute::{Attribute, Getter, Setter};
pub use cache::DerivedCache;
pub use contract::{GetterContract, SetterContract};
pub use error::{BuilderError, BuilderResult, ValidationError};
pub use mutator::{Apply, Mutator};
pub use properties::{properties_from_json, properties_from_toml, PropertyMap};
pub use schema::{Property, Schema};
pub use state::{LifecycleFlags, State, Status};
pub use traits::Blueprint;
