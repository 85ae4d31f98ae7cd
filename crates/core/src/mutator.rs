//! Setter functions
//!
//! A [`Mutator<B, A>`] is a named write that takes arbitrary arguments `A`
//! (a tuple for several values) instead of a single attribute value. The
//! engine wraps it in the same setter contract an attribute setter gets:
//!
//! ```
//! use genericbuilder_core::{Mutator, SetterContract};
//!
//! #[derive(Clone)]
//! struct Grid {
//!     rows: usize,
//!     cols: usize,
//!     title: String,
//! }
//!
//! const RESIZE: Mutator<Grid, (usize, usize)> = Mutator::new("resize", |g, (rows, cols)| {
//!     g.rows = rows;
//!     g.cols = cols;
//! });
//! const RETITLE: Mutator<Grid, String> =
//!     Mutator::with_contract("retitle", |g, title| g.title = title, SetterContract::ALWAYS_SETTABLE);
//!
//! let mut grid = Grid { rows: 1, cols: 1, title: String::new() };
//! RESIZE.apply(&mut grid, (3, 4));
//! assert_eq!(grid.rows * grid.cols, 12);
//! assert!(RETITLE.setter_contract().is_always_settable());
//! ```

use std::fmt;

use crate::contract::SetterContract;

/// Raw body of a setter function
pub type Apply<B, A> = fn(&mut B, A);

/// Descriptor of a multi-argument write and its setter contract
pub struct Mutator<B, A> {
    name: &'static str,
    apply: Apply<B, A>,
    contract: SetterContract,
}

impl<B, A> Mutator<B, A> {
    /// Setter function with the parameter contract
    pub const fn new(name: &'static str, apply: Apply<B, A>) -> Self {
        Mutator {
            name,
            apply,
            contract: SetterContract::PARAMETER,
        }
    }

    /// Setter function with an explicit contract
    pub const fn with_contract(name: &'static str, apply: Apply<B, A>, contract: SetterContract) -> Self {
        Mutator { name, apply, contract }
    }

    /// Name used in errors and log events
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Contract the engine enforces around the call
    #[inline]
    pub fn setter_contract(&self) -> SetterContract {
        self.contract
    }

    /// Run the raw body, bypassing every contract
    #[inline]
    pub fn apply(&self, blueprint: &mut B, args: A) {
        (self.apply)(blueprint, args)
    }
}

impl<B, A> Clone for Mutator<B, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, A> Copy for Mutator<B, A> {}

impl<B, A> fmt::Debug for Mutator<B, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("name", &self.name)
            .field("setter_contract", &self.contract)
            .finish()
    }
}
