//! Lifecycle states and status flags
//!
//! A builder is always in exactly one [`State`]. The legal transitions are:
//!
//! ```text
//!              freeze() (requires built)
//!   Mutable  ───────────────────────────▶  Frozen
//!      ▲  ◀─────────────────────────────     │
//!      │            unfreeze()               │
//!      │                                     │
//!      └──── make_immutable() ──▶ Immutable ◀┘
//!
//!   frozen_view() on any owner ──▶ View (aliases the owner, never owns state)
//! ```
//!
//! Orthogonal to the state, [`LifecycleFlags`] track whether the parameters
//! have been preprocessed and whether derived outputs are built. The flag
//! setters keep `built ⇒ preprocessed` true at all times.

use std::fmt;

/// The closed set of lifecycle states a builder handle can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Parameters may be changed; building and preprocessing are allowed
    Mutable,
    /// Derived outputs are fixed; only always-settable attributes may change
    Frozen,
    /// Terminal: the handle never changes its own state again
    Immutable,
    /// Non-owning frozen alias of another builder
    View,
}

impl State {
    /// Whether the handle has Mutable mutability (Mutable or Frozen)
    pub fn is_mutable(self) -> bool {
        matches!(self, State::Mutable | State::Frozen)
    }

    /// Whether setters other than always-settable ones are blocked
    pub fn is_frozen(self) -> bool {
        matches!(self, State::Frozen | State::View)
    }

    /// Whether the handle aliases another builder's storage
    pub fn is_view(self) -> bool {
        matches!(self, State::View)
    }

    /// Stable lowercase name, used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            State::Mutable => "mutable",
            State::Frozen => "frozen",
            State::Immutable => "immutable",
            State::View => "view",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preprocessing and build flags of one builder
///
/// # Invariants
///
/// - `built ⇒ preprocessed`: clearing `preprocessed` also clears `built`,
///   and `mark_built` is only legal after `mark_preprocessed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleFlags {
    preprocessed: bool,
    built: bool,
}

impl LifecycleFlags {
    /// Fresh flags: neither preprocessed nor built
    pub const fn new() -> Self {
        LifecycleFlags {
            preprocessed: false,
            built: false,
        }
    }

    /// Flags for a fully built builder
    pub const fn built() -> Self {
        LifecycleFlags {
            preprocessed: true,
            built: true,
        }
    }

    /// Whether the parameters are normalized
    #[inline]
    pub fn is_preprocessed(&self) -> bool {
        self.preprocessed
    }

    /// Whether derived outputs match the parameters
    #[inline]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Record a successful preprocessing run
    pub fn mark_preprocessed(&mut self) {
        self.preprocessed = true;
    }

    /// Record a successful build
    ///
    /// # Panics
    ///
    /// Debug builds assert that the flags were already preprocessed.
    pub fn mark_built(&mut self) {
        debug_assert!(self.preprocessed, "build completed on unpreprocessed flags");
        self.built = true;
    }

    /// Parameters changed: both preprocessing and build are stale
    pub fn invalidate_preprocessing(&mut self) {
        self.preprocessed = false;
        self.built = false;
    }

    /// Build inputs changed: derived outputs are stale
    pub fn invalidate_build(&mut self) {
        self.built = false;
    }
}

/// Point-in-time status of a builder handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Lifecycle state of the handle
    pub state: State,
    /// Flags of the storage the handle reads (the target's, for views)
    pub flags: LifecycleFlags,
}

impl Status {
    /// Whether the handle has Mutable mutability
    pub fn is_mutable(&self) -> bool {
        self.state.is_mutable()
    }

    /// Whether the handle is frozen (views are always frozen)
    pub fn is_frozen(&self) -> bool {
        self.state.is_frozen()
    }

    /// Whether the handle is a view
    pub fn is_view(&self) -> bool {
        self.state.is_view()
    }

    /// Whether the parameters are normalized
    pub fn is_preprocessed(&self) -> bool {
        self.flags.is_preprocessed()
    }

    /// Whether derived outputs match the parameters
    pub fn is_built(&self) -> bool {
        self.flags.is_built()
    }
}
