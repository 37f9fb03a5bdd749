//! Opening the configured input. Port settings follow the encoding: binary
//! DMX is 8N2, the text encoding is plain 8N1.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use dmxbridge_core::{IngestionMode, IoByteSource, IoLineSource, Synchronizer};
use serialport::{DataBits, Parity, SerialPort, StopBits};

use crate::CliError;
use crate::config::{AUTO, InputSource, RunConfig};

pub fn open_synchronizer(config: &RunConfig) -> Result<Synchronizer, CliError> {
    if config.mode == IngestionMode::Random {
        return Ok(Synchronizer::random(config.pattern_interval));
    }
    match &config.input {
        InputSource::Serial { port } => {
            let port = open_port(port, config.baud, config.mode, config.read_timeout)?;
            Ok(build(config, port, config.break_gap))
        }
        InputSource::Replay { path } => {
            let file = open_replay(path)?;
            // A capture file carries no arrival timing to measure breaks on.
            Ok(build(config, BufReader::new(file), Duration::MAX))
        }
        InputSource::None => Err(CliError::new(
            format!("mode '{}' needs an input", config.mode),
            Some("use --port or --input".to_string()),
        )),
    }
}

fn build<R: std::io::Read + Send + 'static>(
    config: &RunConfig,
    reader: R,
    break_gap: Duration,
) -> Synchronizer {
    match config.mode {
        IngestionMode::Text => Synchronizer::text(
            IoLineSource::new(reader, config.line_terminator),
            config.line_format,
        ),
        _ => Synchronizer::binary_with_break_gap(IoByteSource::new(reader), break_gap),
    }
}

fn open_port(
    name: &str,
    baud: u32,
    mode: IngestionMode,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, CliError> {
    let name = if name.eq_ignore_ascii_case(AUTO) {
        auto_select()?
    } else {
        name.to_string()
    };
    let stop_bits = match mode {
        IngestionMode::Binary => StopBits::Two,
        _ => StopBits::One,
    };
    let port = serialport::new(&name, baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(stop_bits)
        .timeout(timeout)
        .open()
        .map_err(|err| {
            CliError::new(
                format!("cannot open serial port {name}: {err}"),
                Some("check --port, or replay a capture with --input".to_string()),
            )
        })?;
    tracing::info!(port = %name, baud, ?stop_bits, "serial port opened");
    Ok(port)
}

fn auto_select() -> Result<String, CliError> {
    let ports = serialport::available_ports().map_err(|err| {
        CliError::new(
            format!("cannot list serial ports: {err}"),
            Some("pass the port name with --port".to_string()),
        )
    })?;
    ports
        .into_iter()
        .next()
        .map(|info| info.port_name)
        .ok_or_else(|| {
            CliError::new(
                "no serial ports found",
                Some("connect the interface or replay a capture with --input".to_string()),
            )
        })
}

fn open_replay(path: &Path) -> Result<File, CliError> {
    if !path.is_file() {
        return Err(CliError::new(
            format!("input file not found: {}", path.display()),
            Some("pass a capture of raw serial data".to_string()),
        ));
    }
    File::open(path).map_err(|err| {
        CliError::new(
            format!("cannot open input {}: {err}", path.display()),
            None,
        )
    })
}
