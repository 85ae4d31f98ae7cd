//! Shared builders for integration tests
//!
//! - `RateSpec`: a constant-rate array builder (size, base rate in Hz,
//!   free-form label) whose build step expands the per-millisecond rate
//!   into an array.
//! - `SpikeSpec`: a spike-index builder composed over `RateSpec`; it
//!   inherits the rate attributes and adds a threshold.
//! - `FixedRateSpec`: a `RateSpec` whose size can be read but no longer set.
//!
//! Both carry a shared `Tally` behind an `Rc`, so every copy counts into
//! the same preprocess/build tallies.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use genericbuilder::{
    builder_attributes, Attribute, Blueprint, Builder, BuilderResult, GetterContract, Mutator, Schema,
    SetterContract, ValidationError,
};

/// Largest rate array `RateSpec::build` accepts
pub const RATE_CAPACITY: usize = 1 << 16;

/// Install a test subscriber so lifecycle events show up with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Counts lifecycle steps across every copy of a blueprint
#[derive(Debug, Default)]
pub struct Tally {
    pub preprocess_runs: Cell<usize>,
    pub build_runs: Cell<usize>,
    pub total_evals: Cell<usize>,
}

impl Tally {
    pub fn preprocesses(&self) -> usize {
        self.preprocess_runs.get()
    }

    pub fn builds(&self) -> usize {
        self.build_runs.get()
    }

    pub fn total_evals(&self) -> usize {
        self.total_evals.get()
    }
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

// ============================================================================
// RateSpec
// ============================================================================

#[derive(Clone, Debug)]
pub struct RateSpec {
    pub size: usize,
    pub base_rate: f64,
    pub label: String,
    pub tally: Rc<Tally>,
    pub rate_per_ms: f64,
    pub rate_array: Vec<f64>,
}

impl Default for RateSpec {
    fn default() -> Self {
        RateSpec {
            size: 4,
            base_rate: 1000.0,
            label: String::new(),
            tally: Rc::new(Tally::default()),
            rate_per_ms: 0.0,
            rate_array: Vec::new(),
        }
    }
}

pub const SIZE: Attribute<RateSpec, usize> = Attribute::settable("size", |r| r.size, |r, v| r.size = v);
pub const BASE_RATE: Attribute<RateSpec, f64> =
    Attribute::settable("base_rate", |r| r.base_rate, |r, v| r.base_rate = v);
pub const LABEL: Attribute<RateSpec, String> = Attribute::settable_with(
    "label",
    |r| r.label.clone(),
    |r, v| r.label = v,
    SetterContract::ALWAYS_SETTABLE,
);
pub const RATE_PER_MS: Attribute<RateSpec, f64> = Attribute::read_only("rate_per_ms", |r| r.rate_per_ms);
pub const RATE_ARRAY: Attribute<RateSpec, Vec<f64>> =
    Attribute::read_only_with("rate_array", |r| r.rate_array.clone(), GetterContract::RequiresBuilt);
pub const TOTAL_RATE: Attribute<RateSpec, f64> = Attribute::read_only_with(
    "total_rate",
    |r| {
        bump(&r.tally.total_evals);
        r.rate_per_ms * r.size as f64
    },
    GetterContract::Cached("total_rate"),
);

/// Set size and base rate in one write
pub const RESHAPE: Mutator<RateSpec, (usize, f64)> = Mutator::new("reshape", |r, (size, base_rate)| {
    r.size = size;
    r.base_rate = base_rate;
});

/// Label from a stem and a run number; allowed on frozen builders
pub const TAG_RUN: Mutator<RateSpec, (String, u32)> = Mutator::with_contract(
    "tag_run",
    |r, (stem, run)| r.label = format!("{stem}#{run}"),
    SetterContract::ALWAYS_SETTABLE,
);

builder_attributes! {
    /// Named accessors for rate builders
    pub trait RateAttributes for RateSpec {
        size: usize = SIZE => set_size, with_size;
        base_rate: f64 = BASE_RATE => set_base_rate, with_base_rate;
        label: String = LABEL => set_label, with_label;
        rate_per_ms: f64 = RATE_PER_MS;
        rate_array: Vec<f64> = RATE_ARRAY;
        total_rate: f64 = TOTAL_RATE;
    }
}

impl Blueprint for RateSpec {
    const KIND: &'static str = "rate";

    fn validate(&self) -> Result<(), ValidationError> {
        if self.size == 0 {
            return Err(ValidationError::new("size", "must be positive"));
        }
        if self.base_rate.is_nan() || self.base_rate < 0.0 {
            return Err(ValidationError::new("base_rate", "must be a non-negative number"));
        }
        Ok(())
    }

    fn preprocess(&mut self) -> BuilderResult<()> {
        bump(&self.tally.preprocess_runs);
        self.rate_per_ms = self.base_rate / 1000.0;
        Ok(())
    }

    fn build(&mut self) -> BuilderResult<()> {
        if self.size > RATE_CAPACITY {
            return Err(ValidationError::new("size", "exceeds rate array capacity").into());
        }
        bump(&self.tally.build_runs);
        self.rate_array = vec![self.rate_per_ms; self.size];
        Ok(())
    }

    fn clear(&mut self) {
        self.rate_array = Vec::new();
    }

    fn schema() -> Schema<Self> {
        RateSpec::declared_schema()
    }
}

pub fn rate_builder() -> Builder<RateSpec> {
    Builder::new(RateSpec::default())
}

pub fn built_rate(size: usize, base_rate: f64) -> Builder<RateSpec> {
    let mut rate = rate_builder()
        .with_size(size)
        .and_then(|r| r.with_base_rate(base_rate))
        .unwrap();
    rate.build().unwrap();
    rate
}

// ============================================================================
// SpikeSpec
// ============================================================================

/// Spike indices: steps where the accumulated rate crosses the threshold
#[derive(Clone, Debug)]
pub struct SpikeSpec {
    pub rate: RateSpec,
    pub threshold: f64,
    pub label: String,
    pub spikes: Vec<usize>,
}

impl Default for SpikeSpec {
    fn default() -> Self {
        SpikeSpec {
            rate: RateSpec::default(),
            threshold: 2.0,
            label: String::new(),
            spikes: Vec::new(),
        }
    }
}

pub const THRESHOLD: Attribute<SpikeSpec, f64> =
    Attribute::settable("threshold", |s| s.threshold, |s, v| s.threshold = v);
pub const SPIKE_LABEL: Attribute<SpikeSpec, String> = Attribute::settable_with(
    "label",
    |s| s.label.clone(),
    |s, v| s.label = v,
    SetterContract::ALWAYS_SETTABLE,
);
pub const SPIKES: Attribute<SpikeSpec, Vec<usize>> =
    Attribute::read_only_with("spikes", |s| s.spikes.clone(), GetterContract::RequiresBuilt);
pub const SPIKE_RATE_PER_MS: Attribute<SpikeSpec, f64> =
    Attribute::read_only("rate_per_ms", |s| s.rate.rate_per_ms);

builder_attributes! {
    /// Named accessors for spike builders
    pub trait SpikeAttributes for SpikeSpec {
        threshold: f64 = THRESHOLD => set_threshold, with_threshold;
        spike_label: String = SPIKE_LABEL => set_spike_label, with_spike_label;
        spikes: Vec<usize> = SPIKES;
        spike_rate_per_ms: f64 = SPIKE_RATE_PER_MS;
    }
}

impl Blueprint for SpikeSpec {
    const KIND: &'static str = "spike";

    fn validate(&self) -> Result<(), ValidationError> {
        self.rate.validate()?;
        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(ValidationError::new("threshold", "must be positive"));
        }
        Ok(())
    }

    fn preprocess(&mut self) -> BuilderResult<()> {
        self.rate.preprocess()
    }

    fn build(&mut self) -> BuilderResult<()> {
        self.rate.build()?;
        let mut accumulated = 0.0;
        let mut spikes = Vec::new();
        for (step, rate) in self.rate.rate_array.iter().enumerate() {
            accumulated += rate;
            if accumulated >= self.threshold {
                spikes.push(step);
                accumulated -= self.threshold;
            }
        }
        self.spikes = spikes;
        Ok(())
    }

    fn clear(&mut self) {
        self.rate.clear();
        self.spikes = Vec::new();
    }

    fn schema() -> Schema<Self> {
        SpikeSpec::declared_schema().inherit(|s| &s.rate, |s| &mut s.rate)
    }
}

pub fn spike_builder() -> Builder<SpikeSpec> {
    Builder::new(SpikeSpec::default())
}

// ============================================================================
// FixedRateSpec
// ============================================================================

/// Rate builder with a fixed size
#[derive(Clone, Debug)]
pub struct FixedRateSpec {
    pub rate: RateSpec,
}

impl Default for FixedRateSpec {
    fn default() -> Self {
        FixedRateSpec {
            rate: RateSpec {
                size: 8,
                ..RateSpec::default()
            },
        }
    }
}

pub const FIXED_SIZE: Attribute<FixedRateSpec, usize> = Attribute::read_only("size", |f| f.rate.size);
pub const FIXED_RATE_ARRAY: Attribute<FixedRateSpec, Vec<f64>> =
    Attribute::read_only_with("rate_array", |f| f.rate.rate_array.clone(), GetterContract::RequiresBuilt);

builder_attributes! {
    /// Named accessors for fixed-size rate builders
    pub trait FixedRateAttributes for FixedRateSpec {
        fixed_size: usize = FIXED_SIZE;
        fixed_rate_array: Vec<f64> = FIXED_RATE_ARRAY;
    }
}

impl Blueprint for FixedRateSpec {
    const KIND: &'static str = "fixed_rate";

    fn validate(&self) -> Result<(), ValidationError> {
        self.rate.validate()
    }

    fn preprocess(&mut self) -> BuilderResult<()> {
        self.rate.preprocess()
    }

    fn build(&mut self) -> BuilderResult<()> {
        self.rate.build()
    }

    fn clear(&mut self) {
        self.rate.clear();
    }

    fn schema() -> Schema<Self> {
        FixedRateSpec::declared_schema()
            .inherit(|f| &f.rate, |f| &mut f.rate)
            .unsettable("size")
    }
}

pub fn fixed_rate_builder() -> Builder<FixedRateSpec> {
    Builder::new(FixedRateSpec::default())
}
