use super::{SinkRecord, Uplink, UplinkResult};
use milesight_payload::derived::enrich;
use milesight_payload::PayloadDecoder;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn, Span};

/// What became of one uplink document.
#[derive(Debug, Clone, PartialEq)]
pub enum UplinkOutcome {
    /// Decoded and reshaped for the sink.
    Record(SinkRecord),
    /// The uplink's port belongs to another payload format.
    Skipped { port: Option<u8> },
    /// The document could not be turned into a record.
    Failed { error: String },
}

impl UplinkOutcome {
    /// JSON line for the sink, `None` for skipped uplinks.
    pub fn to_output(&self) -> Option<Value> {
        match self {
            UplinkOutcome::Record(record) => Some(record.to_json()),
            UplinkOutcome::Skipped { .. } => None,
            UplinkOutcome::Failed { error } => Some(json!({ "error": error })),
        }
    }
}

/// Domain service that turns uplink documents into sink records
///
/// Flow:
/// 1. Parse the uplink document
/// 2. Extract and base64-decode `frm_payload`
/// 3. Decode the payload for the uplink's port
/// 4. Add derived metrics
/// 5. Merge with device identity and radio metrics
pub struct UplinkService {
    decoder: Arc<dyn PayloadDecoder>,
}

impl UplinkService {
    pub fn new(decoder: Arc<dyn PayloadDecoder>) -> Self {
        Self { decoder }
    }

    /// Process one uplink document. Malformed documents come back as
    /// [`UplinkOutcome::Failed`] rather than an error.
    #[instrument(skip_all, fields(device_id = tracing::field::Empty, port = tracing::field::Empty))]
    pub fn process_uplink(&self, document: &[u8]) -> UplinkOutcome {
        match self.try_process(document) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "rejecting uplink document");
                UplinkOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn try_process(&self, document: &[u8]) -> UplinkResult<UplinkOutcome> {
        let uplink = Uplink::from_json(document)?;

        let span = Span::current();
        span.record("device_id", uplink.end_device_ids.device_id.as_str());
        if let Some(port) = uplink.port() {
            span.record("port", port);
        }

        let payload = uplink.payload()?;
        debug!(payload_size = payload.len(), "decoding uplink payload");

        let Some(record) = self.decoder.decode(&payload, uplink.port()) else {
            debug!("uplink port not handled, skipping");
            return Ok(UplinkOutcome::Skipped {
                port: uplink.port(),
            });
        };

        if record.error {
            warn!(
                error_type = record.error_type.map(tracing::field::display),
                channel_id = record.channel_id,
                channel_type = record.channel_type,
                byte_position = record.byte_position,
                "payload decoded with errors"
            );
        }

        let record = enrich(record);
        let sink_record = SinkRecord::from_uplink(&uplink, &record);

        debug!(
            value_count = sink_record.values().len(),
            "successfully converted uplink"
        );

        Ok(UplinkOutcome::Record(sink_record))
    }
}
