mod envelope;
mod error;
mod sink_record;
mod sink_writer;
mod uplink_service;

pub use envelope::*;
pub use error::*;
pub use sink_record::*;
pub use sink_writer::*;
pub use uplink_service::*;
