pub mod config;
pub mod domain;
pub mod telemetry;
pub mod uplink_worker;

pub use domain::*;
