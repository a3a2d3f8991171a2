//! jstat-style garbage collection statistics.
//!
//! Raw sizes are published in bytes and times in high-resolution ticks;
//! everything here is reported in KB and seconds. Zero denominators yield
//! `0.0`, unresolved counters yield `None`.

use serde::Serialize;

use super::registry::{SampleRegistry, SampleView};

pub const TICKS: &str = "TICKS";
pub const FREQUENCY: &str = "FREQ";

/// Label → counter name for everything [`MetricComputer`] reads.
pub const STANDARD_COUNTERS: &[(&str, &str)] = &[
    (TICKS, "sun.os.hrt.ticks"),
    (FREQUENCY, "sun.os.hrt.frequency"),
    ("S0C", "sun.gc.generation.0.space.1.capacity"),
    ("S1C", "sun.gc.generation.0.space.2.capacity"),
    ("S0U", "sun.gc.generation.0.space.1.used"),
    ("S1U", "sun.gc.generation.0.space.2.used"),
    ("EC", "sun.gc.generation.0.space.0.capacity"),
    ("EU", "sun.gc.generation.0.space.0.used"),
    ("OC", "sun.gc.generation.1.space.0.capacity"),
    ("OU", "sun.gc.generation.1.space.0.used"),
    ("PC", "sun.gc.generation.2.space.0.capacity"),
    ("PU", "sun.gc.generation.2.space.0.used"),
    ("MC", "sun.gc.metaspace.capacity"),
    ("MU", "sun.gc.metaspace.used"),
    ("NGCMN", "sun.gc.generation.0.minCapacity"),
    ("NGCMX", "sun.gc.generation.0.maxCapacity"),
    ("NGC", "sun.gc.generation.0.capacity"),
    ("OGCMN", "sun.gc.generation.1.minCapacity"),
    ("OGCMX", "sun.gc.generation.1.maxCapacity"),
    ("OGC", "sun.gc.generation.1.capacity"),
    ("PGCMN", "sun.gc.generation.2.minCapacity"),
    ("PGCMX", "sun.gc.generation.2.maxCapacity"),
    ("PGC", "sun.gc.generation.2.capacity"),
    ("YGC", "sun.gc.collector.0.invocations"),
    ("FGC", "sun.gc.collector.1.invocations"),
    ("YGCT", "sun.gc.collector.0.time"),
    ("FGCT", "sun.gc.collector.1.time"),
];

/// True when `label` is one of the labels [`MetricComputer`] reads, which
/// extra counters must not rebind.
pub fn is_standard_label(label: &str) -> bool {
    STANDARD_COUNTERS.iter().any(|&(standard, _)| standard == label)
}

/// Bytes to kilobytes.
#[inline]
pub fn to_kb(bytes: f64) -> f64 {
    bytes / 1024.0
}

#[inline]
pub fn free(capacity: f64, used: f64) -> f64 {
    capacity - used
}

/// Percentage of `capacity` in use; `0.0` for an empty space.
pub fn occupancy_percent(capacity: f64, used: f64) -> f64 {
    if capacity == 0.0 {
        return 0.0;
    }
    (1.0 - ((capacity - used) / capacity)) * 100.0
}

/// Percentage of `capacity` still free; `0.0` for an empty space.
pub fn free_percent(capacity: f64, used: f64) -> f64 {
    if capacity == 0.0 {
        return 0.0;
    }
    ((capacity - used) / capacity) * 100.0
}

/// Tick count to seconds; `0.0` while the frequency is unknown.
pub fn ticks_to_seconds(ticks: f64, frequency: f64) -> f64 {
    if frequency == 0.0 {
        return 0.0;
    }
    ticks / frequency
}

/// Mean time per invocation; `0.0` before the first collection.
#[allow(clippy::cast_precision_loss)]
pub fn average_time(total: f64, invocations: i64) -> f64 {
    if invocations > 0 {
        total / invocations as f64
    } else {
        0.0
    }
}

/// `part` as a percentage of `whole`; `0.0` when `whole` is not positive.
pub fn share_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        (1.0 - ((whole - part) / whole)) * 100.0
    } else {
        0.0
    }
}

/// A heap space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    Survivor0,
    Survivor1,
    Eden,
    Old,
    /// Permanent generation (JDK 7 and earlier).
    Perm,
    Metaspace,
}

impl Space {
    pub const ALL: [Space; 6] = [
        Space::Survivor0,
        Space::Survivor1,
        Space::Eden,
        Space::Old,
        Space::Perm,
        Space::Metaspace,
    ];

    pub const fn capacity_label(self) -> &'static str {
        match self {
            Space::Survivor0 => "S0C",
            Space::Survivor1 => "S1C",
            Space::Eden => "EC",
            Space::Old => "OC",
            Space::Perm => "PC",
            Space::Metaspace => "MC",
        }
    }

    pub const fn used_label(self) -> &'static str {
        match self {
            Space::Survivor0 => "S0U",
            Space::Survivor1 => "S1U",
            Space::Eden => "EU",
            Space::Old => "OU",
            Space::Perm => "PU",
            Space::Metaspace => "MU",
        }
    }

    /// Column prefix used for derived values (`S0F`, `S0P`, ...).
    pub const fn short_name(self) -> &'static str {
        match self {
            Space::Survivor0 => "S0",
            Space::Survivor1 => "S1",
            Space::Eden => "E",
            Space::Old => "O",
            Space::Perm => "P",
            Space::Metaspace => "M",
        }
    }
}

/// A generation's capacity bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    Young,
    Old,
    Perm,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::Young, Generation::Old, Generation::Perm];

    /// Labels of the (minimum, maximum, current) capacity counters.
    pub const fn labels(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Generation::Young => ("NGCMN", "NGCMX", "NGC"),
            Generation::Old => ("OGCMN", "OGCMX", "OGC"),
            Generation::Perm => ("PGCMN", "PGCMX", "PGC"),
        }
    }
}

/// A garbage collector as published by the runtime (`sun.gc.collector.N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collector {
    /// Collector 0, the young generation collector.
    Young,
    /// Collector 1, the full (old generation) collector.
    Full,
}

impl Collector {
    pub const ALL: [Collector; 2] = [Collector::Young, Collector::Full];

    pub const fn invocations_label(self) -> &'static str {
        match self {
            Collector::Young => "YGC",
            Collector::Full => "FGC",
        }
    }

    pub const fn time_label(self) -> &'static str {
        match self {
            Collector::Young => "YGCT",
            Collector::Full => "FGCT",
        }
    }
}

/// Cumulative collector times seen on the previous tick.
///
/// Starts at zero, so the first interval covers everything since the
/// monitored process started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SampleState {
    young_time: f64,
    full_time: f64,
}

impl SampleState {
    pub fn previous(&self, collector: Collector) -> f64 {
        match collector {
            Collector::Young => self.young_time,
            Collector::Full => self.full_time,
        }
    }

    /// Record `current` as the new baseline and return the delta from the old one.
    fn advance(&mut self, collector: Collector, current: f64) -> f64 {
        let slot = match collector {
            Collector::Young => &mut self.young_time,
            Collector::Full => &mut self.full_time,
        };
        let delta = current - *slot;
        *slot = current;
        delta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpaceStats {
    pub capacity_kb: Option<f64>,
    pub used_kb: Option<f64>,
    pub free_kb: Option<f64>,
    pub utilization: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    pub min_kb: Option<f64>,
    pub max_kb: Option<f64>,
    pub capacity_kb: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CollectorStats {
    pub invocations: Option<i64>,
    /// Cumulative seconds.
    pub time: Option<f64>,
    pub average_time: Option<f64>,
    /// Seconds spent since the previous tick.
    pub interval_time: Option<f64>,
    /// Share of total GC time.
    pub time_percent: Option<f64>,
}

/// Every statistic for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GcSnapshot {
    /// Seconds since the monitored process started.
    pub timestamp: Option<f64>,
    pub survivor0: SpaceStats,
    pub survivor1: SpaceStats,
    pub eden: SpaceStats,
    pub old: SpaceStats,
    pub perm: SpaceStats,
    pub metaspace: SpaceStats,
    pub young_gen: GenerationStats,
    pub old_gen: GenerationStats,
    pub perm_gen: GenerationStats,
    pub young_gc: CollectorStats,
    pub full_gc: CollectorStats,
    pub total_gc_time: Option<f64>,
    /// Share of elapsed time spent in GC.
    pub gc_time_percent: Option<f64>,
}

impl GcSnapshot {
    pub fn space(&self, space: Space) -> &SpaceStats {
        match space {
            Space::Survivor0 => &self.survivor0,
            Space::Survivor1 => &self.survivor1,
            Space::Eden => &self.eden,
            Space::Old => &self.old,
            Space::Perm => &self.perm,
            Space::Metaspace => &self.metaspace,
        }
    }

    fn space_mut(&mut self, space: Space) -> &mut SpaceStats {
        match space {
            Space::Survivor0 => &mut self.survivor0,
            Space::Survivor1 => &mut self.survivor1,
            Space::Eden => &mut self.eden,
            Space::Old => &mut self.old,
            Space::Perm => &mut self.perm,
            Space::Metaspace => &mut self.metaspace,
        }
    }

    pub fn generation(&self, generation: Generation) -> &GenerationStats {
        match generation {
            Generation::Young => &self.young_gen,
            Generation::Old => &self.old_gen,
            Generation::Perm => &self.perm_gen,
        }
    }

    fn generation_mut(&mut self, generation: Generation) -> &mut GenerationStats {
        match generation {
            Generation::Young => &mut self.young_gen,
            Generation::Old => &mut self.old_gen,
            Generation::Perm => &mut self.perm_gen,
        }
    }

    pub fn collector(&self, collector: Collector) -> &CollectorStats {
        match collector {
            Collector::Young => &self.young_gc,
            Collector::Full => &self.full_gc,
        }
    }

    fn collector_mut(&mut self, collector: Collector) -> &mut CollectorStats {
        match collector {
            Collector::Young => &mut self.young_gc,
            Collector::Full => &mut self.full_gc,
        }
    }
}

/// Derives GC statistics from the standard counters.
///
/// One computer per monitoring session: it owns the previous-tick baseline
/// used by [`MetricComputer::interval_time`].
#[derive(Debug, Clone, Default)]
pub struct MetricComputer {
    state: SampleState,
}

impl MetricComputer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a saved baseline.
    pub fn with_state(state: SampleState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SampleState {
        &self.state
    }

    /// Bind every label in [`STANDARD_COUNTERS`].
    pub fn register_counters(registry: &mut SampleRegistry) {
        for (label, counter) in STANDARD_COUNTERS {
            registry.register(label, counter);
        }
    }

    fn kb(view: &SampleView<'_>, label: &str) -> Option<f64> {
        view.get_f64(label).map(to_kb)
    }

    fn seconds(view: &SampleView<'_>, label: &str) -> Option<f64> {
        let ticks = view.get_f64(label)?;
        let frequency = view.get_f64(FREQUENCY)?;
        Some(ticks_to_seconds(ticks, frequency))
    }

    /// Seconds since the monitored process started.
    pub fn timestamp(&self, view: &SampleView<'_>) -> Option<f64> {
        Self::seconds(view, TICKS)
    }

    pub fn capacity_kb(&self, view: &SampleView<'_>, space: Space) -> Option<f64> {
        Self::kb(view, space.capacity_label())
    }

    pub fn used_kb(&self, view: &SampleView<'_>, space: Space) -> Option<f64> {
        Self::kb(view, space.used_label())
    }

    pub fn free_kb(&self, view: &SampleView<'_>, space: Space) -> Option<f64> {
        Some(free(self.capacity_kb(view, space)?, self.used_kb(view, space)?))
    }

    /// Percentage of the space in use.
    pub fn utilization(&self, view: &SampleView<'_>, space: Space) -> Option<f64> {
        Some(occupancy_percent(
            self.capacity_kb(view, space)?,
            self.used_kb(view, space)?,
        ))
    }

    pub fn generation(&self, view: &SampleView<'_>, generation: Generation) -> GenerationStats {
        let (min, max, current) = generation.labels();
        GenerationStats {
            min_kb: Self::kb(view, min),
            max_kb: Self::kb(view, max),
            capacity_kb: Self::kb(view, current),
        }
    }

    pub fn invocations(&self, view: &SampleView<'_>, collector: Collector) -> Option<i64> {
        view.get_i64(collector.invocations_label())
    }

    /// Cumulative seconds spent in `collector`.
    pub fn collector_time(&self, view: &SampleView<'_>, collector: Collector) -> Option<f64> {
        Self::seconds(view, collector.time_label())
    }

    pub fn average_time(&self, view: &SampleView<'_>, collector: Collector) -> Option<f64> {
        Some(average_time(
            self.collector_time(view, collector)?,
            self.invocations(view, collector)?,
        ))
    }

    /// Seconds spent in `collector` since the previous call for it.
    ///
    /// Leaves the baseline untouched when the time counter is unresolved.
    pub fn interval_time(&mut self, view: &SampleView<'_>, collector: Collector) -> Option<f64> {
        let current = self.collector_time(view, collector)?;
        Some(self.state.advance(collector, current))
    }

    /// Cumulative seconds across the collectors that are published.
    pub fn total_gc_time(&self, view: &SampleView<'_>) -> Option<f64> {
        Collector::ALL
            .iter()
            .filter_map(|&c| self.collector_time(view, c))
            .fold(None, |sum, t| Some(sum.unwrap_or(0.0) + t))
    }

    /// `collector`'s share of total GC time.
    pub fn collector_time_percent(&self, view: &SampleView<'_>, collector: Collector) -> Option<f64> {
        Some(share_percent(
            self.collector_time(view, collector)?,
            self.total_gc_time(view)?,
        ))
    }

    /// Share of elapsed time spent in GC.
    pub fn gc_time_percent(&self, view: &SampleView<'_>) -> Option<f64> {
        Some(share_percent(self.total_gc_time(view)?, self.timestamp(view)?))
    }

    /// Compute every statistic and advance the interval baselines once.
    pub fn tick(&mut self, view: &SampleView<'_>) -> GcSnapshot {
        let mut snapshot = GcSnapshot {
            timestamp: self.timestamp(view),
            total_gc_time: self.total_gc_time(view),
            gc_time_percent: self.gc_time_percent(view),
            ..GcSnapshot::default()
        };

        for space in Space::ALL {
            *snapshot.space_mut(space) = SpaceStats {
                capacity_kb: self.capacity_kb(view, space),
                used_kb: self.used_kb(view, space),
                free_kb: self.free_kb(view, space),
                utilization: self.utilization(view, space),
            };
        }

        for generation in Generation::ALL {
            *snapshot.generation_mut(generation) = self.generation(view, generation);
        }

        for collector in Collector::ALL {
            let stats = CollectorStats {
                invocations: self.invocations(view, collector),
                time: self.collector_time(view, collector),
                average_time: self.average_time(view, collector),
                interval_time: self.interval_time(view, collector),
                time_percent: self.collector_time_percent(view, collector),
            };
            *snapshot.collector_mut(collector) = stats;
        }

        snapshot
    }
}
