use crate::channel_table::{Field, FieldValue};
use crate::{PayloadError, Result};
use serde::Serialize;
use std::fmt;

/// Why a scan stopped before the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecodeErrorKind {
    #[serde(rename = "unknown channel type")]
    UnknownChannelType,
    #[serde(rename = "unknown channel id")]
    UnknownChannelId,
    #[serde(rename = "truncated record")]
    TruncatedRecord,
    #[serde(rename = "invalid record")]
    InvalidRecord,
}

impl DecodeErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeErrorKind::UnknownChannelType => "unknown channel type",
            DecodeErrorKind::UnknownChannelId => "unknown channel id",
            DecodeErrorKind::TruncatedRecord => "truncated record",
            DecodeErrorKind::InvalidRecord => "invalid record",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one decode pass.
///
/// Only fields carried by the payload are set. `error` reports whether the scan
/// stopped early; when it did, the diagnostic fields say where and why, and the
/// measurement fields hold whatever was decoded before that point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conductivity: Option<i16>,

    #[serde(rename = "FormatVersion", skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u8>,
    #[serde(rename = "HardwareVersion", skip_serializing_if = "Option::is_none")]
    pub hardware_version: Option<f64>,
    #[serde(rename = "SoftwareVersion", skip_serializing_if = "Option::is_none")]
    pub software_version: Option<f64>,
    #[serde(rename = "Class", skip_serializing_if = "Option::is_none")]
    pub class: Option<u8>,
    #[serde(rename = "SerialNumber", skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<u8>,

    #[serde(rename = "Error")]
    pub error: bool,
    #[serde(rename = "ErrorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<DecodeErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_position: Option<usize>,

    /// Dewpoint in °C, set by [`crate::derived::enrich`].
    #[serde(rename = "tDewC", skip_serializing_if = "Option::is_none")]
    pub dewpoint: Option<f64>,
    /// Heat index in °C; `Some(None)` when the index is undefined for the
    /// conditions (serialized as `null`).
    #[serde(rename = "tHeatIndexC", skip_serializing_if = "Option::is_none")]
    pub heat_index: Option<Option<f64>>,
}

impl DecodedRecord {
    /// Store a decoded channel value in its field. Later records for the same
    /// field overwrite earlier ones.
    pub fn assign(&mut self, field: Field, value: FieldValue) -> Result<()> {
        match (field, value) {
            (Field::Battery, FieldValue::Byte(v)) => self.battery = Some(v),
            (Field::Temperature, FieldValue::Float(v)) => self.temperature = Some(v),
            (Field::Humidity, FieldValue::Float(v)) => self.humidity = Some(v),
            (Field::Conductivity, FieldValue::Integer(v)) => self.conductivity = Some(v),
            (Field::FormatVersion, FieldValue::Byte(v)) => self.format_version = Some(v),
            (Field::HardwareVersion, FieldValue::Float(v)) => self.hardware_version = Some(v),
            (Field::SoftwareVersion, FieldValue::Float(v)) => self.software_version = Some(v),
            (Field::Restart, FieldValue::Byte(v)) => self.restart = Some(v),
            (Field::Shutdown, FieldValue::Byte(v)) => self.shutdown = Some(v),
            (Field::Class, FieldValue::Byte(v)) => self.class = Some(v),
            (Field::SerialNumber, FieldValue::Text(v)) => self.serial_number = Some(v),
            (field, value) => {
                return Err(PayloadError::FieldMismatch {
                    field: field.name(),
                    value: value.kind(),
                })
            }
        }
        Ok(())
    }

    /// Mark the scan as failed at `byte_position`.
    pub(crate) fn fail(
        &mut self,
        kind: DecodeErrorKind,
        channel_id: u8,
        channel_type: Option<u8>,
        byte_position: Option<usize>,
    ) {
        self.error = true;
        self.error_type = Some(kind);
        self.channel_id = Some(channel_id);
        self.channel_type = channel_type;
        self.byte_position = byte_position;
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serialize is derived over plain data; it cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Byte(_) => "byte",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_serializes_error_only() {
        let record = DecodedRecord::default();
        assert_eq!(record.to_json(), json!({"Error": false}));
    }

    #[test]
    fn test_error_kind_display_matches_serialized_name() {
        for kind in [
            DecodeErrorKind::UnknownChannelType,
            DecodeErrorKind::UnknownChannelId,
            DecodeErrorKind::TruncatedRecord,
            DecodeErrorKind::InvalidRecord,
        ] {
            assert_eq!(json!(kind.to_string()), serde_json::to_value(kind).unwrap());
        }
        assert_eq!(DecodeErrorKind::TruncatedRecord.to_string(), "truncated record");
    }

    #[test]
    fn test_assign_and_serialize_names() {
        let mut record = DecodedRecord::default();
        record.assign(Field::Battery, FieldValue::Byte(98)).unwrap();
        record
            .assign(Field::SoftwareVersion, FieldValue::Float(1.5))
            .unwrap();
        record
            .assign(Field::SerialNumber, FieldValue::Text("01-02".to_string()))
            .unwrap();
        record.assign(Field::Restart, FieldValue::Byte(1)).unwrap();

        assert_eq!(
            record.to_json(),
            json!({
                "battery": 98,
                "SoftwareVersion": 1.5,
                "SerialNumber": "01-02",
                "restart": 1,
                "Error": false
            })
        );
    }

    #[test]
    fn test_assign_mismatched_value() {
        let mut record = DecodedRecord::default();
        let result = record.assign(Field::Temperature, FieldValue::Byte(1));
        assert_eq!(
            result,
            Err(PayloadError::FieldMismatch {
                field: "temperature",
                value: "byte"
            })
        );
        assert_eq!(record.temperature, None);
    }

    #[test]
    fn test_error_fields_serialize() {
        let mut record = DecodedRecord::default();
        record.fail(DecodeErrorKind::UnknownChannelType, 0xFF, Some(0x42), Some(2));
        assert_eq!(
            record.to_json(),
            json!({
                "Error": true,
                "ErrorType": "unknown channel type",
                "channel_id": 255,
                "channel_type": 66,
                "byte_position": 2
            })
        );
    }

    #[test]
    fn test_undefined_heat_index_serializes_null() {
        let record = DecodedRecord {
            heat_index: Some(None),
            ..Default::default()
        };
        assert_eq!(record.to_json(), json!({"Error": false, "tHeatIndexC": null}));
    }
}
