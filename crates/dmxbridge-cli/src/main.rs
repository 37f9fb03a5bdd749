use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dmxbridge_core::protocols::artnet::ArtNetSender;
use dmxbridge_core::{
    Bridge, Counters, Dispatcher, IngestionMode, Report, SharedFrame, TracingSink, make_report,
    now_rfc3339,
};

mod config;
mod logging;
mod serial;

use config::{DEFAULT_SETTINGS_FILE, RunConfig, Settings};
use logging::{LogFormat, LogLevel, init_logging};

const BUILD_COMMIT: &str = env!("DMXBRIDGE_BUILD_COMMIT");

#[derive(Parser, Debug)]
#[command(name = "dmxbridge")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DMXBRIDGE_BUILD_COMMIT"),
    " ",
    env!("DMXBRIDGE_BUILD_DATE"),
    ")"
))]
#[command(
    about = "Forward DMX channel data from a serial link to Art-Net.",
    long_about = None,
    after_help = "Examples:\n  dmxbridge run --port /dev/ttyUSB0 --target 2.255.255.255\n  dmxbridge run --mode text --port COM3 --universe 1\n  dmxbridge run --mode text --input capture.txt --stdout"
)]
struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Log output format (stderr)
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr); defaults to info, or warn when the
    /// settings file disables logging
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bridge until the input ends or Ctrl+C.
    Run(RunArgs),
    /// Print the effective settings as JSON.
    Settings(OverrideArgs),
}

#[derive(Args, Debug, Default)]
struct OverrideArgs {
    /// Ingestion mode: binary, text or random
    #[arg(long)]
    mode: Option<IngestionMode>,

    /// Serial port name, or "auto"
    #[arg(long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Destination IPv4 address (node or broadcast)
    #[arg(long)]
    target: Option<String>,

    /// Local egress IPv4 address, or "auto"
    #[arg(long)]
    interface: Option<String>,

    /// Art-Net universe (port address)
    #[arg(long)]
    universe: Option<u16>,

    /// Inter-byte silence treated as a break, in microseconds (binary mode)
    #[arg(long)]
    break_gap_us: Option<u64>,

    /// Serial read timeout in milliseconds
    #[arg(long)]
    read_timeout_ms: Option<u64>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    overrides: OverrideArgs,

    /// Replay a capture file instead of reading a serial port
    #[arg(short = 'i', long, conflicts_with = "port")]
    input: Option<PathBuf>,

    /// Log frame counters every N seconds
    #[arg(long, value_name = "SECS")]
    stats_interval: Option<u64>,

    /// Send one all-zero frame before exiting
    #[arg(long)]
    blackout_on_exit: bool,

    /// Write a JSON run report to this path on exit
    #[arg(short = 'o', long)]
    report: Option<PathBuf>,

    /// Write the JSON run report to stdout on exit
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => cmd_run(&cli.config, cli.log_format, cli.log_level, args),
        Commands::Settings(overrides) => cmd_settings(&cli.config, &overrides),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn load_settings(path: &PathBuf, overrides: &OverrideArgs) -> Result<Settings, CliError> {
    let mut settings = Settings::load_or_create(path).map_err(|err| {
        CliError::new(
            format!("{err:#}"),
            Some("fix or delete the settings file to regenerate defaults".to_string()),
        )
    })?;
    apply_overrides(&mut settings, overrides);
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, overrides: &OverrideArgs) {
    if let Some(mode) = overrides.mode {
        settings.serial.mode = mode;
    }
    if let Some(port) = &overrides.port {
        settings.serial.port = port.clone();
    }
    if let Some(baud) = overrides.baud {
        settings.serial.baud = baud;
    }
    if let Some(target) = &overrides.target {
        settings.target_ip = target.clone();
    }
    if let Some(interface) = &overrides.interface {
        settings.interface = interface.clone();
    }
    if let Some(universe) = overrides.universe {
        settings.universe = universe;
    }
    if let Some(gap) = overrides.break_gap_us {
        settings.serial.break_gap_us = gap;
    }
    if let Some(timeout) = overrides.read_timeout_ms {
        settings.serial.read_timeout_ms = timeout;
    }
}

fn cmd_settings(path: &PathBuf, overrides: &OverrideArgs) -> Result<(), CliError> {
    let settings = load_settings(path, overrides)?;
    RunConfig::from_settings(&settings, None)?;
    let json = serde_json::to_string_pretty(&settings).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

fn cmd_run(
    path: &PathBuf,
    log_format: LogFormat,
    log_level: Option<LogLevel>,
    args: RunArgs,
) -> Result<(), CliError> {
    let settings = load_settings(path, &args.overrides)?;
    init_logging(
        log_format,
        log_level.unwrap_or_else(|| LogLevel::from_settings(settings.log)),
    );

    let config = RunConfig::from_settings(&settings, args.input.clone())?;

    let sender = ArtNetSender::open(config.local, config.target).map_err(|err| {
        CliError::new(
            format!("cannot open Art-Net socket: {err}"),
            Some("check --interface and --target".to_string()),
        )
    })?;
    let target = sender.target();
    tracing::info!(
        %target,
        local = %sender.local_addr().map(|addr| addr.to_string()).unwrap_or_default(),
        universe = config.universe,
        "Art-Net socket opened"
    );

    let sync = serial::open_synchronizer(&config)?;
    let shutdown = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(shutdown.clone())?;

    let counters = Arc::new(Counters::new());
    let shared = Arc::new(SharedFrame::new());
    let dispatcher = Dispatcher::new(sender, config.universe, shared, counters.clone());
    let mut bridge = Bridge::new(sync, dispatcher, counters.clone())
        .with_sink(Arc::new(TracingSink));
    if let Some(secs) = args.stats_interval {
        bridge = bridge.with_stats_interval(Duration::from_secs(secs));
    }

    let started_at = now_rfc3339();
    let reason = bridge.run(&shutdown);

    if args.blackout_on_exit {
        tracing::info!("sending blackout");
        if let Err(err) = bridge.dispatcher_mut().send_blackout() {
            tracing::warn!(error = %err, "blackout failed");
        }
    }
    drop(bridge);

    let mut report = make_report(
        config.mode,
        config.universe,
        &target.to_string(),
        started_at,
        reason,
        counters.snapshot(),
    );
    if BUILD_COMMIT != "unknown" {
        report.tool.commit = Some(BUILD_COMMIT.to_string());
    }
    write_report(&report, args.report.as_ref(), args.stdout, args.pretty)
}

fn install_ctrlc_handler(shutdown: Arc<AtomicBool>) -> Result<(), CliError> {
    ctrlc::set_handler(move || {
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(format!("signal handler setup failed: {err}"), None))
}

fn write_report(
    report: &Report,
    path: Option<&PathBuf>,
    stdout: bool,
    pretty: bool,
) -> Result<(), CliError> {
    if path.is_none() && !stdout {
        return Ok(());
    }
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("JSON serialization failed")?;

    if stdout {
        println!("{json}");
        return Ok(());
    }
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
