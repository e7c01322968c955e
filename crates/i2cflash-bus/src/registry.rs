//! Programmer registry and initialization
//!
//! This module handles opening programmers by name and creating BusHandles.

use std::collections::HashMap;

use i2cflash_core::error::{ConfigError, WriteError};
use i2cflash_core::programmer::ProgrammerInfo;

use crate::handle::BusHandle;

/// Parsed programmer parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerParams {
    /// Programmer name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl ProgrammerParams {
    /// Parameters as (key, value) pairs, in the form adapter crates take
    #[allow(dead_code)] // Used in feature-gated code
    fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a programmer string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```
/// use i2cflash_bus::parse_programmer_params;
///
/// let params = parse_programmer_params("ch341a:index=1").unwrap();
/// assert_eq!(params.name, "ch341a");
/// assert_eq!(params.params.get("index"), Some(&"1".to_string()));
/// ```
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, ConfigError> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(ConfigError::InvalidParameter(format!(
                    "'{}' (expected key=value)",
                    opt
                )));
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// Open an I2C programmer and create a BusHandle
///
/// This is the main entry point for the CLI. It handles:
/// 1. Parsing the programmer string
/// 2. Opening the appropriate adapter for `bus_id`
/// 3. Wrapping it in a BusHandle
///
/// Nothing is sent on the bus here; the bus clock is set later by the
/// write job.
///
/// # Arguments
/// * `programmer` - Programmer string (e.g., "ch341a" or "linux_i2c:dev=/dev/i2c-3")
/// * `bus_id` - Bus to open
///
/// # Errors
/// `Configuration(UnknownProgrammer)` for a name not compiled in, and
/// `ConnectionUnavailable` when the adapter cannot be found or opened.
pub fn open_bus(programmer: &str, bus_id: u8) -> Result<BusHandle, WriteError> {
    let params = parse_programmer_params(programmer)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params, bus_id),

        #[cfg(feature = "ch341a")]
        "ch341a" | "ch341a_i2c" => open_ch341a(&params, bus_id),

        #[cfg(feature = "linux-i2c")]
        "linux_i2c" | "linux-i2c" | "i2c-dev" => open_linux_i2c(&params, bus_id),

        _ => Err(ConfigError::UnknownProgrammer(params.name).into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &ProgrammerParams, bus_id: u8) -> Result<BusHandle, WriteError> {
    use i2cflash_dummy::{DummyConfig, DummyEeprom};

    let mut config = DummyConfig::default();
    for (key, value) in params.options() {
        match key {
            "address" => {
                let hex = value.trim_start_matches("0x").trim_start_matches("0X");
                config.target_address = u8::from_str_radix(hex, 16).map_err(|_| {
                    ConfigError::InvalidParameter(format!("dummy address '{}'", value))
                })?;
            }
            "size" => {
                config.size = value.parse().map_err(|_| {
                    ConfigError::InvalidParameter(format!("dummy size '{}'", value))
                })?;
            }
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    log::info!(
        "Using dummy EEPROM at 0x{:02X} ({} bytes)",
        config.target_address,
        config.size
    );
    Ok(BusHandle::new(
        Box::new(DummyEeprom::new(config)),
        "dummy",
        bus_id,
    ))
}

#[cfg(feature = "ch341a")]
fn open_ch341a(params: &ProgrammerParams, bus_id: u8) -> Result<BusHandle, WriteError> {
    use i2cflash_ch341a::Ch341a;

    // Each CH341A has one bus; without index= the bus id picks the adapter
    let index = match params.params.get("index") {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidParameter(format!("ch341a index '{}'", v)))?,
        None => bus_id as usize,
    };

    log::info!("Opening CH341A programmer #{}...", index);

    let master = Ch341a::open_nth(index).map_err(|e| {
        WriteError::ConnectionUnavailable(format!(
            "{}\nMake sure the device is connected and you have permissions.",
            e
        ))
    })?;

    Ok(BusHandle::new(Box::new(master), "ch341a", bus_id))
}

#[cfg(feature = "linux-i2c")]
fn open_linux_i2c(params: &ProgrammerParams, bus_id: u8) -> Result<BusHandle, WriteError> {
    use i2cflash_linux_i2c::{parse_options, LinuxI2c};

    log::info!("Opening Linux I2C programmer...");

    let config = parse_options(&params.options(), bus_id).map_err(|e| {
        ConfigError::InvalidParameter(format!("linux_i2c: {}", e))
    })?;

    let master = LinuxI2c::open(&config).map_err(|e| {
        WriteError::ConnectionUnavailable(format!(
            "{}\n\
             Make sure the device exists and you have read/write permissions.\n\
             You may need to: sudo modprobe i2c-dev; sudo usermod -aG i2c $USER",
            e
        ))
    })?;

    Ok(BusHandle::new(Box::new(master), "linux_i2c", bus_id))
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory EEPROM emulator for testing (address=<hex>,size=<bytes>)",
    });

    #[cfg(feature = "ch341a")]
    programmers.push(ProgrammerInfo {
        name: "ch341a",
        aliases: &["ch341a_i2c"],
        description: "CH341A USB I2C adapter (VID:1a86 PID:5512) (index=<n>)",
    });

    #[cfg(feature = "linux-i2c")]
    programmers.push(ProgrammerInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2c-dev"],
        description: "Linux i2c-dev bus (/dev/i2c-<bus> or dev=<path>)",
    });

    programmers
}

/// Comma-separated names of the compiled-in programmers
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    if programmers.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_params() {
        let params = parse_programmer_params("linux_i2c:dev=/dev/i2c-3").unwrap();
        assert_eq!(params.name, "linux_i2c");
        assert_eq!(params.params.get("dev").map(String::as_str), Some("/dev/i2c-3"));

        let params = parse_programmer_params("dummy").unwrap();
        assert_eq!(params.name, "dummy");
        assert!(params.params.is_empty());
    }

    #[test]
    fn test_parse_programmer_params_bad_format() {
        assert!(matches!(
            parse_programmer_params("ch341a:index"),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unknown_programmer() {
        let err = open_bus("buspirate", 0).err().unwrap();
        assert!(matches!(
            err,
            WriteError::Configuration(ConfigError::UnknownProgrammer(ref name)) if name == "buspirate"
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_and_run_job() {
        use i2cflash_core::job::WriteJobBuilder;
        use i2cflash_core::programmer::I2cMaster;
        use i2cflash_core::writer::{run_job, NoProgress};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fw.bin");
        std::fs::write(&path, vec![0x5A; 200]).unwrap();

        let job = WriteJobBuilder::new()
            .target_address(0x51)
            .firmware(&path)
            .verify(true)
            .write_cycle_us(0)
            .build()
            .unwrap();

        let mut bus = open_bus("dummy:address=0x51", job.bus_id).unwrap();
        assert_eq!(bus.programmer(), "dummy");
        assert!(bus.max_write_len() >= job.chunk_size);

        let stats = run_job(&mut bus, &job, &mut NoProgress).unwrap();
        assert_eq!(stats.chunks_written, 2);
        assert!(stats.verified);
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_dummy_bad_option() {
        assert!(matches!(
            open_bus("dummy:size=big", 0).err().unwrap(),
            WriteError::Configuration(ConfigError::InvalidParameter(_))
        ));
    }

    #[cfg(feature = "linux-i2c")]
    #[test]
    fn test_missing_device_is_connection_unavailable() {
        assert!(matches!(
            open_bus("linux_i2c:dev=/dev/i2c-does-not-exist", 0).err().unwrap(),
            WriteError::ConnectionUnavailable(_)
        ));
    }

    #[cfg(feature = "linux-i2c")]
    #[test]
    fn test_linux_i2c_empty_dev_option() {
        assert!(matches!(
            open_bus("linux_i2c:dev=", 0).err().unwrap(),
            WriteError::Configuration(ConfigError::InvalidParameter(_))
        ));
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_available_programmers_lists_dummy() {
        assert!(available_programmers().iter().any(|p| p.name == "dummy"));
        assert!(programmer_names_short().contains("dummy"));
    }
}
