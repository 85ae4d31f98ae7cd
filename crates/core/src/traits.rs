//! Core trait for builder blueprints
//!
//! A blueprint is the concrete, user-defined part of a builder: its raw
//! parameters, their normalized form, and whatever `build()` derives from
//! them (rate arrays, spike trains, current traces, ...). The engine wraps a
//! blueprint in a `Builder` handle that owns the lifecycle; the blueprint
//! only supplies the steps.
//!
//! # Contract
//!
//! - `validate()` runs first during preprocessing and rejects invalid
//!   parameter combinations.
//! - `preprocess()` normalizes raw parameters into internal form. A derived
//!   blueprint that embeds a base must call the base's `preprocess()` itself,
//!   base first, so inherited state is normalized the same way.
//! - `build()` produces the derived outputs. It may assume preprocessing has
//!   completed for the current parameters.
//! - `Clone` is the deep copy used by every copy operation. Attributes that
//!   are safe to share (immutable, side-effect free resources) are declared
//!   by storing them behind `Rc`/`Arc`, so cloning shares them instead of
//!   duplicating them.
//! - No step may mutate data reachable from another builder.

use crate::error::{BuilderResult, ValidationError};
use crate::schema::Schema;

/// The collaborator contract of a concrete builder
///
/// # Example
///
/// ```
/// use genericbuilder_core::{Attribute, Blueprint, BuilderResult, Schema, ValidationError};
///
/// #[derive(Clone, Default)]
/// struct Ramp {
///     size: usize,
///     values: Vec<f64>,
/// }
///
/// const SIZE: Attribute<Ramp, usize> = Attribute::settable("size", |r| r.size, |r, v| r.size = v);
///
/// impl Blueprint for Ramp {
///     const KIND: &'static str = "ramp";
///
///     fn validate(&self) -> Result<(), ValidationError> {
///         if self.size == 0 {
///             return Err(ValidationError::new("size", "must be positive"));
///         }
///         Ok(())
///     }
///
///     fn build(&mut self) -> BuilderResult<()> {
///         self.values = (0..self.size).map(|i| i as f64).collect();
///         Ok(())
///     }
///
///     fn schema() -> Schema<Self> {
///         Schema::new().attribute(SIZE)
///     }
/// }
/// ```
pub trait Blueprint: Clone + 'static {
    /// Builder kind, used in error messages and log fields
    const KIND: &'static str = "generic";

    /// Reject invalid parameter combinations
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Normalize raw parameters into internal form
    fn preprocess(&mut self) -> BuilderResult<()> {
        Ok(())
    }

    /// Produce the derived outputs from normalized parameters
    fn build(&mut self) -> BuilderResult<()>;

    /// Release derived outputs (called by `Builder::clear`)
    fn clear(&mut self) {}

    /// Settable attributes, derived-to-base
    fn schema() -> Schema<Self> {
        Schema::new()
    }
}
