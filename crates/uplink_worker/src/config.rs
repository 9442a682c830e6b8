use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// File of newline-delimited uplink documents; stdin when unset
    #[serde(default)]
    pub input_path: Option<String>,

    /// Write `{"error": ...}` lines for rejected uplinks
    #[serde(default = "default_emit_errors")]
    pub emit_errors: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_emit_errors() -> bool {
    true
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("UPLINK"))
            .build()?
            .try_deserialize()
    }
}
