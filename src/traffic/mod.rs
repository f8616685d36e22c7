//! Traffic generation for the fat-tree harness.
//!
//! Background flows draw their sizes from an empirical CDF and arrive as a
//! Poisson process; incast bursts fan many senders into one receiver.

mod cdf;
mod workload;

pub use cdf::{CdfError, FlowSizeCdf};
pub use workload::{start_traffic, InjectFlow, TrafficOpts, TrafficState};
