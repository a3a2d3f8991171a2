//! Sampling: label bindings and the GC statistics derived from them.

pub mod gc;
pub mod registry;

pub use gc::{is_standard_label, Collector, GcSnapshot, Generation, MetricComputer, SampleState, Space};
pub use registry::{LabelBinding, SampleRegistry, SampleView};
