use thiserror::Error;

#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("invalid uplink document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("No frm_payload in uplink_message")]
    MissingFrmPayload,

    #[error("invalid frm_payload encoding: {0}")]
    InvalidPayloadEncoding(#[from] base64::DecodeError),

    #[error("sink write failed: {0}")]
    SinkWrite(#[from] std::io::Error),
}

pub type UplinkResult<T> = Result<T, UplinkError>;
