//! TOML job file parsing
//!
//! Parses job files in TOML format:
//!
//! ```toml
//! [job]
//! bus = 0
//! slave_address = "0x50"
//! int_addr_length = 2
//! firmware = "eeprom.bin"
//! start_address = 0x0000
//! chunk_size = 64
//! baudrate = 400000
//! verify = true
//! ```
//!
//! A relative `firmware` path is resolved against the job file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::WriteJobBuilder;
use crate::error::ConfigError;

/// TOML job file structure
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlJobFile {
    job: TomlJob,
}

/// Job table in TOML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlJob {
    bus: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    slave_address: Option<u32>,
    int_addr_length: Option<u8>,
    firmware: Option<PathBuf>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    start_address: Option<u32>,
    start_chunk: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_opt_hex_u32")]
    chunk_size: Option<u32>,
    baudrate: Option<u32>,
    verify: Option<bool>,
    write_cycle_us: Option<u32>,
}

/// Deserialize an optional u32 that can be hex (0x...) or decimal
fn deserialize_opt_hex_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_number(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
pub(crate) fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex '{}': {}", s, e))
    } else {
        s.parse::<u32>()
            .map_err(|e| format!("invalid number '{}': {}", s, e))
    }
}

impl WriteJobBuilder {
    /// Parse a job from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlJobFile =
            ::toml::from_str(content).map_err(|e| ConfigError::JobFile(e.to_string()))?;
        let job = file.job;

        Ok(Self {
            bus_id: job.bus,
            target_address: job.slave_address,
            address_width: job.int_addr_length,
            firmware: job.firmware,
            start_address: job.start_address,
            start_chunk: job.start_chunk,
            chunk_size: job.chunk_size.map(|c| c as usize),
            baudrate: job.baudrate,
            verify: job.verify,
            write_cycle_us: job.write_cycle_us,
        })
    }

    /// Load a job from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::JobFile(format!("{}: {}", path.display(), e)))?;
        let mut builder = Self::from_toml_str(&content)?;

        if let Some(dir) = path.parent() {
            builder.firmware = builder
                .firmware
                .take()
                .map(|fw| if fw.is_relative() { dir.join(fw) } else { fw });
        }

        log::debug!("Loaded job file {}", path.display());
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i2c::AddressWidth;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("4096").unwrap(), 4096);
        assert_eq!(parse_number("0x1000").unwrap(), 4096);
        assert_eq!(parse_number("0X50").unwrap(), 0x50);
        assert!(parse_number("0xZZ").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[job]
bus = 1
slave_address = "0x51"
int_addr_length = 3
firmware = "/tmp/fw.bin"
start_address = 0x1000
chunk_size = 64
baudrate = 100000
verify = true
"#;
        let job = WriteJobBuilder::from_toml_str(toml).unwrap().build().unwrap();
        assert_eq!(job.bus_id, 1);
        assert_eq!(job.target.get(), 0x51);
        assert_eq!(job.address_width, AddressWidth::ThreeByte);
        assert_eq!(job.firmware, PathBuf::from("/tmp/fw.bin"));
        assert_eq!(job.start_address, 0x1000);
        assert_eq!(job.chunk_size, 64);
        assert_eq!(job.baudrate, 100_000);
        assert!(job.verify);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
[job]
slave_adress = 0x50
"#;
        assert!(matches!(
            WriteJobBuilder::from_toml_str(toml),
            Err(ConfigError::JobFile(_))
        ));
    }

    #[test]
    fn test_relative_firmware_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        fs::write(&path, "[job]\nslave_address = 0x50\nfirmware = \"fw.bin\"\n").unwrap();

        let builder = WriteJobBuilder::from_toml_file(&path).unwrap();
        assert_eq!(builder.firmware_path(), Some(dir.path().join("fw.bin").as_path()));
    }
}
