pub mod channel_table;
pub mod codec;
pub mod derived;
mod error;
pub mod record;
pub mod tlv_decoder;

pub use channel_table::{ChannelSpec, ChannelTable, Field, FieldValue, Transform, EM500_SMT};
pub use error::{PayloadError, Result};
pub use record::{DecodeErrorKind, DecodedRecord};
pub use tlv_decoder::TlvDecoder;

/// Trait for decoding binary sensor payloads into a decoded record
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PayloadDecoder: Send + Sync {
    /// Decode `bytes` received on `port`.
    ///
    /// Returns `None` when the port belongs to a different payload format.
    /// Malformed payloads still return a record, with `error` set.
    fn decode(&self, bytes: &[u8], port: Option<u8>) -> Option<DecodedRecord>;
}
