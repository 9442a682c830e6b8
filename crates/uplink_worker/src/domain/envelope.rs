//! The Things Stack v3 uplink document, reduced to the parts the worker reads.

use super::{UplinkError, UplinkResult};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Uplink {
    pub end_device_ids: EndDeviceIds,
    pub received_at: DateTime<Utc>,
    pub uplink_message: UplinkMessage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndDeviceIds {
    pub device_id: String,
    #[serde(default)]
    pub dev_eui: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UplinkMessage {
    #[serde(default)]
    pub f_port: Option<u8>,
    #[serde(default)]
    pub f_cnt: Option<u32>,
    /// Base64 application payload.
    #[serde(default)]
    pub frm_payload: Option<String>,
    #[serde(default)]
    pub rx_metadata: Vec<RxMetadata>,
    #[serde(default)]
    pub settings: Option<TxSettings>,
}

/// Radio metrics reported by one receiving gateway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RxMetadata {
    #[serde(default)]
    pub rssi: Option<f64>,
    #[serde(default)]
    pub snr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxSettings {
    #[serde(default)]
    pub data_rate: Option<DataRate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataRate {
    #[serde(default)]
    pub lora: Option<LoraDataRate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoraDataRate {
    #[serde(default)]
    pub bandwidth: Option<u32>,
    #[serde(default)]
    pub spreading_factor: Option<u8>,
}

impl Uplink {
    /// Parse one uplink document. The bytes need not be valid UTF-8; anything
    /// that is not is reported as an invalid document.
    pub fn from_json(document: impl AsRef<[u8]>) -> UplinkResult<Self> {
        Ok(serde_json::from_slice(document.as_ref())?)
    }

    /// Raw application payload bytes.
    pub fn payload(&self) -> UplinkResult<Vec<u8>> {
        let encoded = self
            .uplink_message
            .frm_payload
            .as_deref()
            .ok_or(UplinkError::MissingFrmPayload)?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    pub fn port(&self) -> Option<u8> {
        self.uplink_message.f_port
    }

    /// Metrics of the first gateway that heard the uplink.
    pub fn first_rx(&self) -> Option<&RxMetadata> {
        self.uplink_message.rx_metadata.first()
    }

    pub fn lora_data_rate(&self) -> Option<&LoraDataRate> {
        self.uplink_message
            .settings
            .as_ref()
            .and_then(|settings| settings.data_rate.as_ref())
            .and_then(|data_rate| data_rate.lora.as_ref())
    }
}
