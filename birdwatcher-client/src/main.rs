//! `bwpass`: forwards its arguments to the birdwatcher executable.
//!
//! `bwpass which` prints the resolved executable instead.

use birdwatcher_client::binary;
use birdwatcher_client::{BirdwatcherError, BirdwatcherResult, ClientConfig, ConfigError};
use std::ffi::OsString;
use std::process::{Command, ExitCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FORMAT_ENV: &str = "BWPASS_LOG_FORMAT";

fn main() -> ExitCode {
    init_tracing();
    let args = forwarded_args(std::env::args_os().skip(1));
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "bwpass failed");
            eprintln!("bwpass: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[OsString]) -> BirdwatcherResult<ExitCode> {
    let config = match ClientConfig::load() {
        Ok(config) => Some(config),
        Err(ConfigError::MissingConfigPath) => None,
        Err(err) => return Err(err.into()),
    };
    let explicit = config.as_ref().and_then(|c| c.binary_path.as_deref());
    let binary = binary::locate(explicit)?;

    if let [cmd] = args {
        if cmd == "which" {
            println!("{}", binary.display());
            return Ok(ExitCode::SUCCESS);
        }
    }

    tracing::debug!(binary = %binary.display(), args = ?args, "Forwarding to birdwatcher");
    let status = Command::new(&binary)
        .args(args)
        .status()
        .map_err(|err| BirdwatcherError::BinaryMissing {
            path: binary.display().to_string(),
            reason: err.to_string(),
        })?;

    let code = status.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

/// Drop `--config <path>`, which belongs to bwpass, from the forwarded arguments.
fn forwarded_args(mut args: impl Iterator<Item = OsString>) -> Vec<OsString> {
    let mut out = Vec::new();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            args.next();
            continue;
        }
        out.push(arg);
    }
    out
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .try_init();
}
