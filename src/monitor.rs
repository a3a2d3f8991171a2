//! Sampling session over a live PerfData region.
//!
//! A session owns everything that must survive between ticks: the counter
//! index, the resolved label bindings, and the interval baselines. Each tick
//! re-reads the prologue and rebuilds the index when the runtime has
//! structurally modified the region since the last build.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::config::SamplingConfig;
use crate::core::{GcmonError, Result};
use crate::perf::{CounterIndex, PerfValue, Prologue};
use crate::sample::{is_standard_label, GcSnapshot, MetricComputer, SampleRegistry};

/// Output of one sampling tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// 1-based tick number within the session.
    pub tick: u64,
    pub gc: GcSnapshot,
    /// Configured extra counters by label; `None` when unpublished.
    pub extras: BTreeMap<String, Option<PerfValue>>,
}

/// One monitoring session.
#[derive(Debug, Default)]
pub struct Session {
    index: Option<CounterIndex>,
    registry: SampleRegistry,
    computer: MetricComputer,
    extras: Vec<String>,
    ticks: u64,
    rebuilds: u64,
}

impl Session {
    /// A session sampling the standard GC counters.
    pub fn new() -> Self {
        let mut registry = SampleRegistry::new();
        MetricComputer::register_counters(&mut registry);
        Self {
            registry,
            ..Self::default()
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Result<Self> {
        let mut session = Self::new();
        for (label, counter) in &config.extra_counters {
            session.add_counter(label, counter)?;
        }
        Ok(session)
    }

    /// Sample `counter` under `label` in addition to the standard set.
    ///
    /// Takes effect at the next index rebuild, so call it before the first tick.
    /// Labels of the standard set are refused.
    pub fn add_counter(&mut self, label: &str, counter: &str) -> Result<()> {
        if is_standard_label(label) {
            return Err(GcmonError::config(format!(
                "label '{label}' is reserved for a standard GC statistic"
            )));
        }
        self.registry.register(label, counter);
        if !self.extras.iter().any(|l| l == label) {
            self.extras.push(label.to_string());
        }
        Ok(())
    }

    /// Make sure the index matches the region's current structure.
    ///
    /// Returns `true` when the index was (re)built.
    pub fn refresh(&mut self, buf: &[u8]) -> Result<bool> {
        let prologue = Prologue::read(buf)?;
        if !prologue.accessible {
            return Err(GcmonError::RegionNotReady);
        }

        if let Some(index) = &self.index {
            if !index.is_stale(&prologue) {
                return Ok(false);
            }
            tracing::info!(
                previous = index.mod_time_stamp(),
                current = prologue.mod_time_stamp,
                "PerfData region modified, rebuilding counter index"
            );
        }

        // A failed rebuild leaves no index behind.
        self.index = None;
        let index = CounterIndex::from_buffer(buf)?;
        let resolved = self.registry.resolve_all(&index);
        tracing::debug!(
            counters = index.len(),
            resolved,
            unresolved = self.registry.len() - resolved,
            "Counter index ready"
        );
        self.index = Some(index);
        self.rebuilds += 1;
        Ok(true)
    }

    /// Run one tick against the current bytes of the region.
    pub fn tick(&mut self, buf: &[u8]) -> Result<Sample> {
        self.refresh(buf)?;

        let view = self.registry.view(buf);
        let gc = self.computer.tick(&view);
        let extras = self
            .extras
            .iter()
            .map(|label| (label.clone(), view.get(label)))
            .collect();

        self.ticks += 1;
        Ok(Sample {
            tick: self.ticks,
            gc,
            extras,
        })
    }

    pub fn index(&self) -> Option<&CounterIndex> {
        self.index.as_ref()
    }

    pub fn registry(&self) -> &SampleRegistry {
        &self.registry
    }

    pub fn computer(&self) -> &MetricComputer {
        &self.computer
    }

    pub fn extra_labels(&self) -> &[String] {
        &self.extras
    }

    /// Number of index builds so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
