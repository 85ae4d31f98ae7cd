//! Attribute contracts
//!
//! Every declared attribute names a [`SetterContract`] and a
//! [`GetterContract`]. The builder engine enforces them on every access:
//!
//! | Contract            | Side   | Effect                                                   |
//! |---------------------|--------|----------------------------------------------------------|
//! | always-settable     | setter | allowed on frozen builders; must not touch derived state |
//! | requires-rebuild    | setter | marks the builder unbuilt                                |
//! | requires-preprocess | setter | marks the builder unpreprocessed (and so unbuilt)        |
//! | requires-built      | getter | `NotBuilt` unless built; never builds implicitly         |
//! | cached(name)        | getter | memoized in the derived cache until preprocessing resets |
//!
//! Setters that are not always-settable always invalidate both preprocessing
//! and the build, whatever flags they carry: a parameter change can never
//! leave a builder looking consistent. The rebuild/preprocess flags only
//! change behavior for always-settable setters, which invalidate nothing
//! unless asked to.
//!
//! Every setter first checks mutability, then the frozen state. Getters
//! without `requires-built` preprocess on demand before reading.

/// What a setter is allowed to do and what it invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SetterContract {
    always_settable: bool,
    requires_rebuild: bool,
    requires_preprocessing: bool,
}

impl SetterContract {
    /// Default for parameters: blocked when frozen, invalidates everything
    pub const PARAMETER: SetterContract = SetterContract {
        always_settable: false,
        requires_rebuild: true,
        requires_preprocessing: true,
    };

    /// Settable on frozen builders; invalidates nothing
    pub const ALWAYS_SETTABLE: SetterContract = SetterContract {
        always_settable: true,
        requires_rebuild: false,
        requires_preprocessing: false,
    };

    /// Build a contract from its three switches
    pub const fn new(
        always_settable: bool,
        requires_rebuild: bool,
        requires_preprocessing: bool,
    ) -> Self {
        SetterContract {
            always_settable,
            requires_rebuild,
            requires_preprocessing,
        }
    }

    /// Whether the setter bypasses the frozen-state block
    #[inline]
    pub const fn is_always_settable(&self) -> bool {
        self.always_settable
    }

    /// Whether a successful assignment marks the builder unbuilt
    pub const fn invalidates_build(&self) -> bool {
        !self.always_settable || self.requires_rebuild || self.requires_preprocessing
    }

    /// Whether a successful assignment marks the builder unpreprocessed
    pub const fn invalidates_preprocessing(&self) -> bool {
        !self.always_settable || self.requires_preprocessing
    }
}

impl Default for SetterContract {
    fn default() -> Self {
        SetterContract::PARAMETER
    }
}

/// How a getter relates to the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GetterContract {
    /// Preprocess on demand, then read (normalized parameters)
    #[default]
    Preprocessed,
    /// Fail with `NotBuilt` unless the builder is built
    RequiresBuilt,
    /// Preprocess on demand, then memoize under this name
    Cached(&'static str),
}

impl GetterContract {
    /// Whether reading needs normalized parameters first
    pub const fn needs_preprocessing(&self) -> bool {
        matches!(self, GetterContract::Preprocessed | GetterContract::Cached(_))
    }

    /// Cache slot name for memoized getters
    pub const fn cache_key(&self) -> Option<&'static str> {
        match *self {
            GetterContract::Cached(key) => Some(key),
            _ => None,
        }
    }
}
