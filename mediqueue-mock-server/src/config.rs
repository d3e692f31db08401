use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whether to bind to all interfaces (0.0.0.0) or just localhost
    #[serde(default)]
    pub bind_all: bool,

    /// Seconds between two patients being called in
    #[serde(default = "default_advance_interval_secs")]
    pub advance_interval_secs: u64,

    /// Used for the wait estimate and the doctor's average
    #[serde(default = "default_minutes_per_patient")]
    pub minutes_per_patient: u32,

    /// The one doctor whose queue is simulated
    #[serde(default = "default_doctor_id")]
    pub doctor_id: String,
}

fn default_port() -> u16 {
    5000
}

fn default_advance_interval_secs() -> u64 {
    30
}

fn default_minutes_per_patient() -> u32 {
    15
}

fn default_doctor_id() -> String {
    "doc-1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_all: false,
            advance_interval_secs: default_advance_interval_secs(),
            minutes_per_patient: default_minutes_per_patient(),
            doctor_id: default_doctor_id(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or use defaults if it does not exist
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;

        if config.advance_interval_secs == 0 {
            anyhow::bail!("advance_interval_secs must be greater than zero");
        }

        Ok(config)
    }

    pub fn bind_host(&self) -> [u8; 4] {
        if self.bind_all { [0, 0, 0, 0] } else { [127, 0, 0, 1] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.advance_interval_secs, 30);
        assert_eq!(config.doctor_id, "doc-1");
        assert_eq!(config.bind_host(), [127, 0, 0, 1]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("definitely-not-here.toml").unwrap();
        assert_eq!(config.port, 5000);
    }
}
