//! Library side of the `claims-mapper` binary: configuration, logging,
//! the suggest-and-review pipeline, and plain-text reports.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod types;
