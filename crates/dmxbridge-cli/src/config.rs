//! Settings file and the validated run configuration derived from it.

use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use dmxbridge_core::protocols::artnet::layout::MAX_PORT_ADDRESS;
use dmxbridge_core::sync::text::layout::{
    DEFAULT_FIELD_SEPARATOR, DEFAULT_FIELD_TERMINATOR, DEFAULT_LINE_TERMINATOR,
};
use dmxbridge_core::sync::{DEFAULT_BREAK_GAP, DEFAULT_PATTERN_INTERVAL};
use dmxbridge_core::{IngestionMode, LineFormat};
use serde::{Deserialize, Serialize};

use crate::CliError;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const AUTO: &str = "auto";

/// Persisted settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Local egress IPv4 address, or `auto` to let the OS route.
    pub interface: String,
    pub target_ip: String,
    pub universe: u16,
    /// Log progress at info level (otherwise warnings only).
    pub log: bool,
    pub serial: SerialSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Port name, or `auto` for the first port found.
    pub port: String,
    pub baud: u32,
    pub mode: IngestionMode,
    pub read_timeout_ms: u64,
    pub line_terminator: String,
    pub field_terminator: char,
    pub field_separator: char,
    pub break_gap_us: u64,
    pub pattern_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interface: AUTO.to_string(),
            target_ip: "2.0.2.1".to_string(),
            universe: 0,
            log: true,
            serial: SerialSettings::default(),
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: AUTO.to_string(),
            baud: 250_000,
            mode: IngestionMode::Binary,
            read_timeout_ms: 1000,
            line_terminator: (DEFAULT_LINE_TERMINATOR as char).to_string(),
            field_terminator: DEFAULT_FIELD_TERMINATOR,
            field_separator: DEFAULT_FIELD_SEPARATOR,
            break_gap_us: DEFAULT_BREAK_GAP.as_micros() as u64,
            pattern_interval_ms: DEFAULT_PATTERN_INTERVAL.as_millis() as u64,
        }
    }
}

impl Settings {
    /// Load `path`, writing a default file first when it does not exist.
    pub fn load_or_create(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let settings = Settings::default();
            settings.save(path)?;
            tracing::debug!(path = %path.display(), "wrote default settings");
            return Ok(settings);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("JSON serialization failed")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }
}

/// Where channel data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Serial { port: String },
    Replay { path: PathBuf },
    None,
}

/// Fully validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: IngestionMode,
    pub input: InputSource,
    pub baud: u32,
    pub read_timeout: Duration,
    pub local: Option<Ipv4Addr>,
    pub target: Ipv4Addr,
    pub universe: u16,
    pub line_terminator: u8,
    pub line_format: LineFormat,
    pub break_gap: Duration,
    pub pattern_interval: Duration,
}

impl RunConfig {
    /// Validate settings; `replay` replaces the serial port when given.
    pub fn from_settings(settings: &Settings, replay: Option<PathBuf>) -> Result<Self, CliError> {
        let target = parse_ipv4(&settings.target_ip).ok_or_else(|| {
            CliError::new(
                format!("invalid target address '{}'", settings.target_ip),
                Some("use an IPv4 address such as 2.0.2.1 or 10.255.255.255".to_string()),
            )
        })?;
        let local = if settings.interface.eq_ignore_ascii_case(AUTO) {
            None
        } else {
            Some(parse_ipv4(&settings.interface).ok_or_else(|| {
                CliError::new(
                    format!("invalid interface address '{}'", settings.interface),
                    Some("use the interface's IPv4 address or 'auto'".to_string()),
                )
            })?)
        };
        if settings.universe > MAX_PORT_ADDRESS {
            return Err(CliError::new(
                format!("universe {} out of range", settings.universe),
                Some(format!("Art-Net universes are 0..={MAX_PORT_ADDRESS}")),
            ));
        }

        let serial = &settings.serial;
        let line_terminator = single_byte(&serial.line_terminator).ok_or_else(|| {
            CliError::new(
                format!("invalid line terminator {:?}", serial.line_terminator),
                Some("use a single ASCII character such as \"\\n\"".to_string()),
            )
        })?;
        if serial.field_terminator == serial.field_separator {
            return Err(CliError::new(
                "field terminator and separator must differ",
                Some("the defaults are ';' and ','".to_string()),
            ));
        }
        if serial.read_timeout_ms == 0 {
            return Err(CliError::new(
                "read timeout must be positive",
                Some("the default is 1000 ms".to_string()),
            ));
        }

        let input = match (serial.mode, replay) {
            (IngestionMode::Random, _) => InputSource::None,
            (_, Some(path)) => InputSource::Replay { path },
            (_, None) => InputSource::Serial {
                port: serial.port.clone(),
            },
        };

        Ok(Self {
            mode: serial.mode,
            input,
            baud: serial.baud,
            read_timeout: Duration::from_millis(serial.read_timeout_ms),
            local,
            target,
            universe: settings.universe,
            line_terminator,
            line_format: LineFormat {
                field_terminator: serial.field_terminator,
                field_separator: serial.field_separator,
            },
            break_gap: Duration::from_micros(serial.break_gap_us),
            pattern_interval: Duration::from_millis(serial.pattern_interval_ms),
        })
    }
}

fn parse_ipv4(value: &str) -> Option<Ipv4Addr> {
    value.trim().parse().ok()
}

fn single_byte(value: &str) -> Option<u8> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Some(*byte),
        _ => None,
    }
}
