use super::Uplink;
use chrono::{DateTime, SecondsFormat, Utc};
use milesight_payload::derived::heat_index_or_temperature;
use milesight_payload::DecodedRecord;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved value key carrying the observation time for every other value.
pub const TIME_KEY: &str = "time";

#[derive(Debug, Clone, PartialEq)]
pub enum SinkValue {
    Time(DateTime<Utc>),
    Integer(i64),
    Float(f64),
}

impl From<DateTime<Utc>> for SinkValue {
    fn from(value: DateTime<Utc>) -> Self {
        SinkValue::Time(value)
    }
}

impl From<f64> for SinkValue {
    fn from(value: f64) -> Self {
        SinkValue::Float(value)
    }
}

macro_rules! integer_sink_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for SinkValue {
            fn from(value: $ty) -> Self {
                SinkValue::Integer(i64::from(value))
            }
        })*
    };
}

integer_sink_value!(u8, i16, u32);

impl From<&SinkValue> for Value {
    /// Non-finite floats become `null`.
    fn from(value: &SinkValue) -> Self {
        match value {
            SinkValue::Time(time) => {
                Value::String(time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            SinkValue::Integer(value) => Value::from(*value),
            SinkValue::Float(value) => Value::from(*value),
        }
    }
}

/// One observation for a time-series sink: numeric values plus string tags
/// used for indexed lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRecord {
    values: BTreeMap<String, SinkValue>,
    tags: BTreeMap<String, String>,
}

impl SinkRecord {
    pub fn new(values: BTreeMap<String, SinkValue>, tags: BTreeMap<String, String>) -> Self {
        Self { values, tags }
    }

    /// Merge a decoded (and enriched) record with the uplink's metadata.
    pub fn from_uplink(uplink: &Uplink, record: &DecodedRecord) -> Self {
        let rx = uplink.first_rx();
        let lora = uplink.lora_data_rate();

        let values = [
            (TIME_KEY, Some(SinkValue::from(uplink.received_at))),
            ("temperature", record.temperature.map(SinkValue::from)),
            ("humidity", record.humidity.map(SinkValue::from)),
            ("conductivity", record.conductivity.map(SinkValue::from)),
            ("battery", record.battery.map(SinkValue::from)),
            ("tDewpoint", record.dewpoint.map(SinkValue::from)),
            (
                "tHeatIndex",
                heat_index_or_temperature(record.heat_index.flatten(), record.temperature)
                    .map(SinkValue::from),
            ),
            (
                "decode_error",
                record.error.then_some(SinkValue::Integer(1)),
            ),
            ("uplinkCount", uplink.uplink_message.f_cnt.map(SinkValue::from)),
            ("rssi", rx.and_then(|rx| rx.rssi).map(SinkValue::from)),
            ("snr", rx.and_then(|rx| rx.snr).map(SinkValue::from)),
            ("bandwidth", lora.and_then(|l| l.bandwidth).map(SinkValue::from)),
            (
                "spreading_factor",
                lora.and_then(|l| l.spreading_factor).map(SinkValue::from),
            ),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect();

        let tags = [
            ("device_id", Some(&uplink.end_device_ids.device_id)),
            ("dev_eui", uplink.end_device_ids.dev_eui.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value.clone())))
        .collect();

        Self::new(values, tags)
    }

    pub fn values(&self) -> &BTreeMap<String, SinkValue> {
        &self.values
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn value(&self, key: &str) -> Option<&SinkValue> {
        self.values.get(key)
    }

    /// Output document: `{"values": {...}, "tags": {...}}`.
    pub fn to_json(&self) -> Value {
        let values: Map<String, Value> = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect();
        let tags: Map<String, Value> = self
            .tags
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        Value::Object(Map::from_iter([
            ("values".to_string(), Value::Object(values)),
            ("tags".to_string(), Value::Object(tags)),
        ]))
    }
}
