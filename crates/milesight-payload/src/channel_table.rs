//! Channel vocabulary for the Milesight/Ursalink sensor family.
//!
//! Each record on the wire is `[channel-id] [channel-type] [data]` where the data
//! width is implied by the (id, type) pair and never sent. The table below is the
//! only place that knows those widths; the decoder is driven entirely by it.
//!
//! ```text
//! 01: battery      -> 0x01 0x75 [1 byte]   Unit: %
//! 03: temperature  -> 0x03 0x67 [2 bytes]  Unit: °C
//! 04: humidity     -> 0x04 0x68 [1 byte]   Unit: %RH
//! 05: conductivity -> 0x05 0x7F [2 bytes]  Unit: µS/cm
//! FF: system info  -> 0xFF [type] [1-8 bytes]
//! ```

use crate::codec::{read_hex_bytes, read_i16_le, read_version};
use crate::{PayloadError, Result};

/// LoRaWAN FPort the sensors report measurements on.
pub const MEASUREMENT_PORT: u8 = 85;

/// Channel id that multiplexes device/system information by channel type.
pub const SYSTEM_CHANNEL: u8 = 0xFF;

pub const CHANNEL_BATTERY: u8 = 0x01;
pub const CHANNEL_TEMPERATURE: u8 = 0x03;
pub const CHANNEL_HUMIDITY: u8 = 0x04;
pub const CHANNEL_CONDUCTIVITY: u8 = 0x05;

pub const TYPE_BATTERY: u8 = 0x75;
pub const TYPE_TEMPERATURE: u8 = 0x67;
pub const TYPE_HUMIDITY: u8 = 0x68;
pub const TYPE_CONDUCTIVITY: u8 = 0x7F;

pub const TYPE_FORMAT_VERSION: u8 = 0x01;
pub const TYPE_HARDWARE_VERSION: u8 = 0x09;
pub const TYPE_SOFTWARE_VERSION: u8 = 0x0A;
pub const TYPE_RESTART: u8 = 0x0B;
pub const TYPE_SHUTDOWN: u8 = 0x0C;
pub const TYPE_CLASS: u8 = 0x0F;
pub const TYPE_SERIAL_NUMBER: u8 = 0x16;

/// Field of the decoded record a channel writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Battery,
    Temperature,
    Humidity,
    Conductivity,
    FormatVersion,
    HardwareVersion,
    SoftwareVersion,
    Restart,
    Shutdown,
    Class,
    SerialNumber,
}

impl Field {
    /// Name the field carries in serialized output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Battery => "battery",
            Field::Temperature => "temperature",
            Field::Humidity => "humidity",
            Field::Conductivity => "conductivity",
            Field::FormatVersion => "FormatVersion",
            Field::HardwareVersion => "HardwareVersion",
            Field::SoftwareVersion => "SoftwareVersion",
            Field::Restart => "restart",
            Field::Shutdown => "shutdown",
            Field::Class => "Class",
            Field::SerialNumber => "SerialNumber",
        }
    }
}

/// How the data bytes of a channel become a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// The single data byte as is.
    Raw,
    /// Signed little-endian 16-bit integer divided by the given scale.
    ScaledI16Le(f64),
    /// The single data byte divided by the given scale.
    ScaledU8(f64),
    /// Signed little-endian 16-bit integer, unscaled.
    I16Le,
    /// Big-endian BCD `major.minor` version.
    BcdVersion,
    /// Presence marker: the record sets 1, its data byte is ignored.
    Flag,
    /// Hyphen-joined hex string.
    HexString,
}

impl Transform {
    pub fn name(self) -> &'static str {
        match self {
            Transform::Raw => "raw",
            Transform::ScaledI16Le(_) => "scaled_i16_le",
            Transform::ScaledU8(_) => "scaled_u8",
            Transform::I16Le => "i16_le",
            Transform::BcdVersion => "bcd_version",
            Transform::Flag => "flag",
            Transform::HexString => "hex_string",
        }
    }

    /// Decode `data`, which must hold at least the channel width.
    pub fn apply(self, data: &[u8]) -> Result<FieldValue> {
        let first = || {
            data.first().copied().ok_or(PayloadError::InsufficientData {
                expected: 1,
                actual: 0,
            })
        };

        let value = match self {
            Transform::Raw => FieldValue::Byte(first()?),
            Transform::ScaledI16Le(scale) => {
                FieldValue::Float(f64::from(read_i16_le(data)?) / scale)
            }
            Transform::ScaledU8(scale) => FieldValue::Float(f64::from(first()?) / scale),
            Transform::I16Le => FieldValue::Integer(read_i16_le(data)?),
            Transform::BcdVersion => FieldValue::Float(read_version(data)?),
            Transform::Flag => {
                first()?;
                FieldValue::Byte(1)
            }
            Transform::HexString => FieldValue::Text(read_hex_bytes(data)),
        };
        Ok(value)
    }
}

/// A decoded channel value before it lands in the record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Byte(u8),
    Integer(i16),
    Float(f64),
    Text(String),
}

/// One row of the channel table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub channel_id: u8,
    pub channel_type: u8,
    /// Data bytes following the two header bytes.
    pub width: usize,
    pub field: Field,
    pub transform: Transform,
}

impl ChannelSpec {
    const fn new(
        channel_id: u8,
        channel_type: u8,
        width: usize,
        field: Field,
        transform: Transform,
    ) -> Self {
        Self {
            channel_id,
            channel_type,
            width,
            field,
            transform,
        }
    }
}

/// Everything the decoder needs to know about one payload family.
#[derive(Debug, Clone, Copy)]
pub struct ChannelTable {
    /// Uplinks declaring any other port are not for this decoder.
    pub accepted_port: u8,
    /// Channel id whose unknown types are reported as "unknown channel type".
    pub system_channel: u8,
    pub channels: &'static [ChannelSpec],
}

impl ChannelTable {
    pub fn lookup(&self, channel_id: u8, channel_type: u8) -> Option<&ChannelSpec> {
        self.channels
            .iter()
            .find(|entry| entry.channel_id == channel_id && entry.channel_type == channel_type)
    }

    pub fn accepts_port(&self, port: Option<u8>) -> bool {
        port.map_or(true, |port| port == self.accepted_port)
    }
}

const EM500_CHANNELS: &[ChannelSpec] = &[
    ChannelSpec::new(CHANNEL_BATTERY, TYPE_BATTERY, 1, Field::Battery, Transform::Raw),
    ChannelSpec::new(
        CHANNEL_TEMPERATURE,
        TYPE_TEMPERATURE,
        2,
        Field::Temperature,
        Transform::ScaledI16Le(10.0),
    ),
    ChannelSpec::new(
        CHANNEL_HUMIDITY,
        TYPE_HUMIDITY,
        1,
        Field::Humidity,
        Transform::ScaledU8(2.0),
    ),
    ChannelSpec::new(
        CHANNEL_CONDUCTIVITY,
        TYPE_CONDUCTIVITY,
        2,
        Field::Conductivity,
        Transform::I16Le,
    ),
    ChannelSpec::new(
        SYSTEM_CHANNEL,
        TYPE_FORMAT_VERSION,
        1,
        Field::FormatVersion,
        Transform::Raw,
    ),
    ChannelSpec::new(
        SYSTEM_CHANNEL,
        TYPE_HARDWARE_VERSION,
        2,
        Field::HardwareVersion,
        Transform::BcdVersion,
    ),
    ChannelSpec::new(
        SYSTEM_CHANNEL,
        TYPE_SOFTWARE_VERSION,
        2,
        Field::SoftwareVersion,
        Transform::BcdVersion,
    ),
    ChannelSpec::new(SYSTEM_CHANNEL, TYPE_RESTART, 1, Field::Restart, Transform::Flag),
    ChannelSpec::new(SYSTEM_CHANNEL, TYPE_SHUTDOWN, 1, Field::Shutdown, Transform::Flag),
    ChannelSpec::new(SYSTEM_CHANNEL, TYPE_CLASS, 1, Field::Class, Transform::Raw),
    ChannelSpec::new(
        SYSTEM_CHANNEL,
        TYPE_SERIAL_NUMBER,
        8,
        Field::SerialNumber,
        Transform::HexString,
    ),
];

/// EM500-SMT soil sensor (and the EM300-TH subset of the same vocabulary).
pub const EM500_SMT: ChannelTable = ChannelTable {
    accepted_port: MEASUREMENT_PORT,
    system_channel: SYSTEM_CHANNEL,
    channels: EM500_CHANNELS,
};
