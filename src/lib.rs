//! gcmon - read-only GC statistics from a HotSpot JVM's PerfData region.
//!
//! A HotSpot JVM publishes its instrumentation counters in a shared memory
//! file (`hsperfdata_<user>/<pid>`). gcmon maps that file read-only, walks
//! its self-describing records, and derives jstat-style garbage collection
//! statistics each sampling interval without attaching to the process.
//!
//! # Architecture
//!
//! - `perf`: prologue and record layout, value decoding, the counter index
//! - `sample`: label bindings and the GC metric computer
//! - `monitor`: a sampling session that survives index rebuilds
//! - `source`: locating and mapping hsperfdata files
//! - `report`: table and JSON output
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use gcmon_lib::monitor::Session;
//! use gcmon_lib::source::{MappedPerfData, PerfSource};
//!
//! fn main() -> gcmon_lib::Result<()> {
//!     let source = MappedPerfData::open("/tmp/hsperfdata_me/1234".as_ref())?;
//!     let mut session = Session::new();
//!     let sample = session.tick(source.bytes())?;
//!     println!("{:?}", sample.gc.gc_time_percent);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod cli;
pub mod core;
pub mod monitor;
pub mod perf;
pub mod report;
pub mod sample;
pub mod source;

// Re-export core types for convenience
pub use crate::core::{Config, GcmonError, Result};
pub use crate::monitor::{Sample, Session};
