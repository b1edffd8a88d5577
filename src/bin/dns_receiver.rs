//! CLI entry point for receiving files over the DNS tunnel.
//!
//! Loops over one file transfer at a time, using clap for argument parsing
//! and a `ctrlc`-based handler for a clean shutdown between transfers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use dns_exfil::config::BaseDomain;
use dns_exfil::events::LoggingObserver;
use dns_exfil::receiver::{self, ReceiverOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Listen for DNS-tunneled files and write each one to a destination folder.
#[derive(Parser)]
#[command(name = "dns-receiver", version = VERSION, about = "Receive files over a DNS tunnel")]
struct Cli {
    /// Base domain this receiver is authoritative for
    base_host: String,

    /// Folder to write received files into
    dest_folder: PathBuf,

    /// UDP port to listen on
    #[arg(long, default_value_t = 53)]
    port: u16,

    /// Per-packet receive timeout in seconds, within one transfer; defaults
    /// to the config file's value (10s if no config file is given)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Optional TOML config file overriding defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => dns_exfil::config::TunnelConfig::load(path).context("loading config file")?,
        None => dns_exfil::config::TunnelConfig::default(),
    };

    let base = BaseDomain::new(&cli.base_host).context("invalid base host")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_handler = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::warn!("received interrupt, will stop after the current transfer completes");
        shutdown_handler.store(true, Ordering::SeqCst);
    })
    .context("installing Ctrl-C handler")?;

    let timeout = match cli.timeout_secs {
        Some(secs) => std::time::Duration::from_secs(secs),
        None => config.receiver_timeout,
    };
    let opts = ReceiverOptions {
        base,
        port: cli.port,
        dest_folder: cli.dest_folder,
        timeout,
    };

    while !shutdown.load(Ordering::SeqCst) {
        match receiver::receive_one_file(&opts, &LoggingObserver) {
            Ok(path) => log::info!("wrote {}", path.display()),
            Err(e) => log::warn!("transfer failed: {e}"),
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
