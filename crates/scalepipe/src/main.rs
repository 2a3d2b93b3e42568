mod config;
mod exit;
mod logging;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use scalepipe_pipeline::{CancelToken, PipelineConfig};
use scalepipe_transport::SerialLine;

use crate::config::Settings;
use crate::exit::{
    config_error, pipeline_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS,
};
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(
    name = "scalepipe",
    version,
    about = "Read multi-channel platform-scale telemetry from a serial line and publish validated snapshots"
)]
struct Cli {
    /// Config file with key=value lines (dev, baud, interval).
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Serial device path (overrides the config file).
    #[arg(long, value_name = "DEV")]
    device: Option<PathBuf>,

    /// Baud rate, one of the standard UNIX rates (overrides the config file).
    #[arg(long, value_name = "RATE")]
    baud: Option<u32>,

    /// Publish interval in seconds, 1..=60 (overrides the config file).
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

impl Cli {
    fn settings(&self) -> CliResult<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                Settings::load(path).map_err(|err| config_error("config file", err))?
            }
            None => {
                info!("no config file given, starting from defaults");
                Settings::default()
            }
        };
        if let Some(device) = &self.device {
            settings.device = device.clone();
        }
        if let Some(baud) = self.baud {
            settings.baud = baud;
        }
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        Ok(settings)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

fn run(cli: Cli) -> CliResult<i32> {
    let settings = cli.settings()?;
    let pipeline_config = PipelineConfig::new(settings.interval)
        .map_err(|err| pipeline_error("invalid settings", err))?;

    let mut line = SerialLine::open(&settings.device, settings.baud)
        .map_err(|err| transport_error("serial open failed", err))?;

    let cancel = CancelToken::new();
    install_signal_handler(cancel.clone())?;

    info!(
        device = ?settings.device,
        baud = settings.baud,
        interval = settings.interval,
        "starting scale feed"
    );

    scalepipe_pipeline::run(&mut line, pipeline_config, std::io::stdout(), &cancel)
        .map_err(|err| pipeline_error("pipeline failed", err))?;

    Ok(SUCCESS)
}

/// Route interrupt and terminate requests into the cancellation
/// token so shutdown always takes the cooperative path (stages
/// joined, line discipline restored). The `termination` feature of
/// `ctrlc` extends the handler beyond SIGINT to SIGTERM and SIGHUP.
fn install_signal_handler(cancel: CancelToken) -> CliResult<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
