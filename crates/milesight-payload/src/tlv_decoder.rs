use crate::channel_table::{ChannelTable, EM500_SMT};
use crate::record::{DecodeErrorKind, DecodedRecord};
use crate::{PayloadDecoder, PayloadError};
use tracing::{debug, warn};

/// Header bytes in front of every channel record: channel id, channel type.
const HEADER_SIZE: usize = 2;

/// Table-driven decoder for channel-tagged sensor payloads.
///
/// Records are consumed front to back. Data widths come from the channel table,
/// so the first record the table does not know ends the scan: there is no way to
/// find where the next record starts.
#[derive(Debug, Clone, Copy)]
pub struct TlvDecoder {
    table: ChannelTable,
}

impl TlvDecoder {
    pub fn new(table: ChannelTable) -> Self {
        Self { table }
    }

    pub fn em500_smt() -> Self {
        Self::new(EM500_SMT)
    }

    /// Walk every record in `bytes`, stopping at the first one that cannot be
    /// decoded.
    pub fn scan(&self, bytes: &[u8]) -> DecodedRecord {
        let mut record = DecodedRecord::default();
        let mut offset = 0;

        while offset < bytes.len() {
            if bytes.len() - offset < HEADER_SIZE {
                debug!(
                    byte_position = offset,
                    remaining = bytes.len() - offset,
                    "payload ends inside a channel header"
                );
                record.error = true;
                break;
            }

            let channel_id = bytes[offset];
            let channel_type = bytes[offset + 1];
            offset += HEADER_SIZE;

            let Some(entry) = self.table.lookup(channel_id, channel_type) else {
                if channel_id == self.table.system_channel {
                    record.fail(
                        DecodeErrorKind::UnknownChannelType,
                        channel_id,
                        Some(channel_type),
                        Some(offset),
                    );
                } else {
                    record.fail(DecodeErrorKind::UnknownChannelId, channel_id, None, None);
                }
                debug!(
                    channel_id,
                    channel_type,
                    byte_position = offset,
                    "unknown channel, stopping scan"
                );
                break;
            };

            let Some(data) = bytes.get(offset..offset + entry.width) else {
                debug!(
                    channel_id,
                    channel_type,
                    byte_position = offset,
                    expected = entry.width,
                    actual = bytes.len() - offset,
                    "channel data runs past end of payload"
                );
                record.fail(
                    DecodeErrorKind::TruncatedRecord,
                    channel_id,
                    Some(channel_type),
                    Some(offset),
                );
                break;
            };

            let assigned = entry
                .transform
                .apply(data)
                .and_then(|value| record.assign(entry.field, value));

            if let Err(e) = assigned {
                warn!(
                    channel_id,
                    channel_type,
                    field = entry.field.name(),
                    transform = entry.transform.name(),
                    error = %e,
                    "channel table entry could not be applied"
                );
                let kind = match e {
                    PayloadError::InsufficientData { .. } => DecodeErrorKind::TruncatedRecord,
                    PayloadError::FieldMismatch { .. } => DecodeErrorKind::InvalidRecord,
                };
                record.fail(kind, channel_id, Some(channel_type), Some(offset));
                break;
            }

            offset += entry.width;
        }

        record
    }
}

impl Default for TlvDecoder {
    fn default() -> Self {
        Self::em500_smt()
    }
}

impl PayloadDecoder for TlvDecoder {
    fn decode(&self, bytes: &[u8], port: Option<u8>) -> Option<DecodedRecord> {
        if !self.table.accepts_port(port) {
            debug!(
                port = ?port,
                accepted_port = self.table.accepted_port,
                "port not handled by decoder"
            );
            return None;
        }
        Some(self.scan(bytes))
    }
}
