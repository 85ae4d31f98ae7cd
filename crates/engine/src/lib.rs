//! Builder engine for genericbuilder
//!
//! This crate turns a `Blueprint` into a lifecycle-managed `Builder`:
//! - Slot: owned storage and the lifecycle state machine
//! - Builder: status, preprocess/build/clear, contract-enforced attribute access
//! - Copy: mutable, frozen and immutable copies, frozen views, snapshot sharing
//! - Hook: the `builder_attributes!` declaration macro
//!
//! Builders are single-threaded (`!Send`, `!Sync`).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
mod copy;
pub mod hook;
mod slot;

pub use builder::Builder;
pub use genericbuilder_core::{
    properties_from_json, properties_from_toml, Attribute, Blueprint, BuilderError, BuilderResult,
    DerivedCache, GetterContract, LifecycleFlags, Mutator, Property, PropertyMap, Schema,
    SetterContract, State, Status, ValidationError,
};
