//! CLI entry point for sending a file over the DNS tunnel.
//!
//! Argument layout and verbosity flags mirror a typical `parse_args`/
//! `print_usage` pair, built here with a `clap` derive `Cli` struct and
//! `anyhow` for error-context wiring.

use std::fs::File;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dns_exfil::config::{BaseDomain, TunnelConfig};
use dns_exfil::events::LoggingObserver;
use dns_exfil::resolv;
use dns_exfil::sender::{self, SenderOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Send a file through a DNS-tunnel receiver.
#[derive(Parser)]
#[command(name = "dns-sender", version = VERSION, about = "Send a file over a DNS tunnel")]
struct Cli {
    /// Base domain the receiver is authoritative for, e.g. tunnel.example.com
    base_host: String,

    /// Filename to announce to the receiver
    dest_filename: String,

    /// Source file to send; reads stdin if omitted
    src_file: Option<PathBuf>,

    /// Upstream resolver IP; defaults to the first nameserver in /etc/resolv.conf
    #[arg(short = 'u', long, env = "DNS_SENDER_UPSTREAM")]
    upstream: Option<IpAddr>,

    /// Destination UDP port
    #[arg(long, default_value_t = 53)]
    port: u16,

    /// Optional TOML config file overriding timeout/retry defaults
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
        Some(path) => TunnelConfig::load(path).context("loading config file")?,
        None => TunnelConfig::default(),
    };

    let base = BaseDomain::new(&cli.base_host).context("invalid base host")?;

    let upstream_ip = match cli.upstream {
        Some(ip) => ip,
        None => resolv::scan_resolv_conf(std::path::Path::new(resolv::DEFAULT_RESOLV_CONF))
            .context("reading /etc/resolv.conf")?
            .context("no upstream given and no nameserver found in /etc/resolv.conf")?,
    };
    let upstream = SocketAddr::new(upstream_ip, cli.port);

    let opts = SenderOptions {
        base,
        upstream,
        dest_filename: cli.dest_filename,
        retry_budget: config.retry_budget,
        timeout: config.sender_timeout,
    };

    match cli.src_file {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            sender::send_file(file, &opts, &LoggingObserver)?;
        }
        None => {
            sender::send_file(io::stdin().lock(), &opts, &LoggingObserver)?;
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
