//! Loader configuration
//!
//! Read from `nes260.toml` (or `--config`). Every field is optional;
//! command-line options override what the file says.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use nes260_hal::UartConfig;
use serde::Deserialize;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "nes260.toml";

/// Default image chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default time to wait for the load confirmation line
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub serial: SerialSection,
    pub loader: LoaderSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSection {
    /// Port name, e.g. `/dev/ttyUSB1` or `COM4`
    pub port: Option<String>,
    pub baudrate: u32,
}

impl Default for SerialSection {
    fn default() -> Self {
        Self {
            port: None,
            baudrate: UartConfig::default().baudrate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderSection {
    /// Image bytes per serial write
    pub chunk_size: usize,
    /// How long `load` waits for the board to confirm
    pub ack_timeout_ms: u64,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
        }
    }
}

impl HostConfig {
    /// Parse and validate a TOML document
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: HostConfig = toml::from_str(text).context("invalid config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`; a missing default file yields the defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.serial.baudrate == 0 {
            bail!("[serial] baudrate must be greater than 0");
        }
        if self.loader.chunk_size == 0 {
            bail!("[loader] chunk_size must be greater than 0");
        }
        Ok(())
    }

    /// Line settings for the serial port
    pub fn uart(&self) -> UartConfig {
        UartConfig::with_baudrate(self.serial.baudrate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = HostConfig::parse("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.serial.baudrate, 230_400);
        assert_eq!(config.loader.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_full_document() {
        let config = HostConfig::parse(
            r#"
            [serial]
            port = "/dev/ttyUSB1"
            baudrate = 115200

            [loader]
            chunk_size = 256
            ack_timeout_ms = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB1"));
        assert_eq!(config.uart().baudrate, 115_200);
        assert_eq!(config.loader.chunk_size, 256);
        assert_eq!(config.loader.ack_timeout_ms, 1000);
    }

    #[test]
    fn test_rejects_zero_chunk() {
        let err = HostConfig::parse("[loader]\nchunk_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_rejects_unknown_key() {
        assert!(HostConfig::parse("[serial]\nspeed = 9600\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\nport = \"COM4\"").unwrap();

        let config = HostConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.serial.port.as_deref(), Some("COM4"));
        assert_eq!(config.serial.baudrate, 230_400);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(HostConfig::load(Some(&path)).is_err());
    }
}
