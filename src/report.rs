//! Row formatting for sampled statistics.

use crate::core::{GcmonError, ReportMode, Result};
use crate::monitor::Sample;
use crate::perf::{CounterIndex, PerfValue};
use crate::sample::{Collector, Generation, Space};

const MIN_WIDTH: usize = 8;

#[derive(Debug, Clone)]
enum Column {
    Timestamp,
    Capacity(Space),
    Used(Space),
    Free(Space),
    Utilization(Space),
    GenerationMin(Generation),
    GenerationMax(Generation),
    GenerationCapacity(Generation),
    Invocations(Collector),
    Time(Collector),
    AverageTime(Collector),
    IntervalTime(Collector),
    TimePercent(Collector),
    TotalTime,
    GcPercent,
    Extra(String),
}

impl Column {
    fn header(&self) -> String {
        match self {
            Column::Timestamp => "Timestamp".to_string(),
            Column::Capacity(space) => space.capacity_label().to_string(),
            Column::Used(space) => space.used_label().to_string(),
            Column::Free(space) => format!("{}F", space.short_name()),
            Column::Utilization(space) => format!("{}P", space.short_name()),
            Column::GenerationMin(generation) => generation.labels().0.to_string(),
            Column::GenerationMax(generation) => generation.labels().1.to_string(),
            Column::GenerationCapacity(generation) => generation.labels().2.to_string(),
            Column::Invocations(collector) => collector.invocations_label().to_string(),
            Column::Time(collector) => collector.time_label().to_string(),
            Column::AverageTime(collector) => format!("{}avg", collector.time_label()),
            Column::IntervalTime(collector) => format!("{}int", collector.time_label()),
            Column::TimePercent(collector) => format!("{}%", collector.time_label()),
            Column::TotalTime => "GCT".to_string(),
            Column::GcPercent => "GCT%".to_string(),
            Column::Extra(label) => label.clone(),
        }
    }

    fn cell(&self, sample: &Sample) -> String {
        let gc = &sample.gc;
        match self {
            Column::Timestamp => fixed(gc.timestamp, 1),
            Column::Capacity(space) => fixed(gc.space(*space).capacity_kb, 1),
            Column::Used(space) => fixed(gc.space(*space).used_kb, 1),
            Column::Free(space) => fixed(gc.space(*space).free_kb, 1),
            Column::Utilization(space) => fixed(gc.space(*space).utilization, 2),
            Column::GenerationMin(generation) => fixed(gc.generation(*generation).min_kb, 1),
            Column::GenerationMax(generation) => fixed(gc.generation(*generation).max_kb, 1),
            Column::GenerationCapacity(generation) => fixed(gc.generation(*generation).capacity_kb, 1),
            Column::Invocations(collector) => gc
                .collector(*collector)
                .invocations
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            Column::Time(collector) => fixed(gc.collector(*collector).time, 3),
            Column::AverageTime(collector) => fixed(gc.collector(*collector).average_time, 3),
            Column::IntervalTime(collector) => fixed(gc.collector(*collector).interval_time, 3),
            Column::TimePercent(collector) => fixed(gc.collector(*collector).time_percent, 2),
            Column::TotalTime => fixed(gc.total_gc_time, 3),
            Column::GcPercent => fixed(gc.gc_time_percent, 2),
            Column::Extra(label) => match sample.extras.get(label) {
                Some(Some(value)) => value.to_string(),
                _ => "-".to_string(),
            },
        }
    }
}

fn fixed(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

/// Spaces worth a column: perm and metaspace only when the runtime
/// publishes them.
fn published_spaces(first: &Sample) -> impl Iterator<Item = Space> + '_ {
    Space::ALL.into_iter().filter(move |&space| {
        !matches!(space, Space::Perm | Space::Metaspace) || first.gc.space(space).capacity_kb.is_some()
    })
}

fn published_generations(first: &Sample) -> impl Iterator<Item = Generation> + '_ {
    Generation::ALL
        .into_iter()
        .filter(move |&generation| generation != Generation::Perm || first.gc.perm_gen.capacity_kb.is_some())
}

fn columns_for(mode: ReportMode, first: &Sample) -> Vec<Column> {
    let mut columns = vec![Column::Timestamp];
    match mode {
        ReportMode::Gc => {
            for space in published_spaces(first) {
                columns.extend([Column::Capacity(space), Column::Used(space)]);
            }
            for collector in Collector::ALL {
                columns.extend([Column::Invocations(collector), Column::Time(collector)]);
            }
            columns.extend([Column::TotalTime, Column::GcPercent]);
        },
        ReportMode::Capacity => {
            for generation in published_generations(first) {
                columns.extend([
                    Column::GenerationMin(generation),
                    Column::GenerationMax(generation),
                    Column::GenerationCapacity(generation),
                ]);
            }
            columns.extend(published_spaces(first).map(Column::Capacity));
            columns.extend(Collector::ALL.map(Column::Invocations));
        },
        ReportMode::Util => {
            for space in published_spaces(first) {
                columns.extend([Column::Free(space), Column::Utilization(space)]);
            }
            for collector in Collector::ALL {
                columns.extend([Column::Invocations(collector), Column::Time(collector)]);
            }
            columns.push(Column::TotalTime);
        },
        ReportMode::Time => {
            for collector in Collector::ALL {
                columns.extend([
                    Column::Invocations(collector),
                    Column::Time(collector),
                    Column::AverageTime(collector),
                    Column::IntervalTime(collector),
                    Column::TimePercent(collector),
                ]);
            }
            columns.extend([Column::TotalTime, Column::GcPercent]);
        },
    }
    columns.extend(first.extras.keys().cloned().map(Column::Extra));
    columns
}

/// jstat style table writer.
#[derive(Debug, Clone)]
pub struct TableReport {
    columns: Vec<Column>,
    widths: Vec<usize>,
    header_every: usize,
    rows: usize,
}

impl TableReport {
    /// Choose columns for `mode` from the first sample.
    pub fn new(first: &Sample, mode: ReportMode, header_every: usize) -> Self {
        let columns = columns_for(mode, first);
        let widths = columns
            .iter()
            .map(|c| c.header().len().max(MIN_WIDTH))
            .collect();
        Self {
            columns,
            widths,
            header_every,
            rows: 0,
        }
    }

    pub fn header(&self) -> String {
        self.columns
            .iter()
            .zip(&self.widths)
            .map(|(column, &width)| format!("{:>width$}", column.header()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn row(&self, sample: &Sample) -> String {
        self.columns
            .iter()
            .zip(&self.widths)
            .map(|(column, &width)| format!("{:>width$}", column.cell(sample)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lines to print for `sample`, with a header when one is due.
    pub fn render(&mut self, sample: &Sample) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        let header_due = self.rows == 0 || (self.header_every > 0 && self.rows % self.header_every == 0);
        if header_due {
            lines.push(self.header());
        }
        lines.push(self.row(sample));
        self.rows += 1;
        lines
    }
}

/// One JSON object per sample.
pub fn json_line(sample: &Sample) -> Result<String> {
    Ok(serde_json::to_string(sample)?)
}

/// Dump every counter with its type information and current value.
pub fn counter_listing(index: &CounterIndex, buf: &[u8]) -> Vec<String> {
    index
        .iter()
        .map(|(name, handle)| {
            let value = handle
                .read(buf)
                .map_or_else(|| "<unreadable>".to_string(), |v: PerfValue| v.to_string());
            format!(
                "{name}={value} [{} {} {}]",
                handle.kind.display_name().unwrap_or("illegal"),
                handle.units.map_or("?", |u| u.as_str()),
                handle.variability.map_or("?", |v| v.as_str()),
            )
        })
        .collect()
}

/// `name=value` for a single counter.
pub fn counter_value(index: &CounterIndex, buf: &[u8], name: &str) -> Result<String> {
    let value = index
        .lookup(name)
        .and_then(|handle| handle.read(buf))
        .ok_or_else(|| GcmonError::UnknownCounter(name.to_string()))?;
    Ok(format!("{name}={value}"))
}
