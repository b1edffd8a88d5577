//! Observer hooks into the transfer pipeline.
//!
//! Every call point is a pure side effect — implementations must not affect
//! control flow. [`LoggingObserver`] is the default wiring for the CLI
//! binaries, forwarding each event through the `log` facade.

use std::net::SocketAddr;

/// Six fixed call points spanning one transfer, sender or receiver side.
pub trait TunnelObserver {
    fn on_transfer_init(&self, peer: SocketAddr, filename: &str) {
        let _ = (peer, filename);
    }
    fn on_chunk_encoded(&self, filename: &str, chunk_id: u16, qname: &str) {
        let _ = (filename, chunk_id, qname);
    }
    fn on_chunk_sent(&self, peer: SocketAddr, filename: &str, chunk_id: u16, byte_len: usize) {
        let _ = (peer, filename, chunk_id, byte_len);
    }
    fn on_chunk_received(&self, peer: SocketAddr, filename: &str, chunk_id: u16, byte_len: usize) {
        let _ = (peer, filename, chunk_id, byte_len);
    }
    fn on_query_parsed(&self, filename: &str, qname: &str) {
        let _ = (filename, qname);
    }
    fn on_transfer_completed(&self, filename: &str, total_bytes: usize) {
        let _ = (filename, total_bytes);
    }
}

/// Default no-op observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl TunnelObserver for NullObserver {}

/// Forwards every event to the `log` facade at a level matched to how often
/// it fires: per-transfer events at `info`, per-chunk events at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl TunnelObserver for LoggingObserver {
    fn on_transfer_init(&self, peer: SocketAddr, filename: &str) {
        log::info!("transfer starting: {filename} with {peer}");
    }

    fn on_chunk_encoded(&self, filename: &str, chunk_id: u16, qname: &str) {
        log::debug!("{filename}: chunk {chunk_id} encoded as {qname}");
    }

    fn on_chunk_sent(&self, peer: SocketAddr, filename: &str, chunk_id: u16, byte_len: usize) {
        log::debug!("{filename}: chunk {chunk_id} sent to {peer} ({byte_len} byte packet)");
    }

    fn on_chunk_received(&self, peer: SocketAddr, filename: &str, chunk_id: u16, byte_len: usize) {
        log::debug!("{filename}: chunk {chunk_id} received from {peer} ({byte_len} decoded bytes)");
    }

    fn on_query_parsed(&self, filename: &str, qname: &str) {
        log::trace!("{filename}: query parsed, qname {qname}");
    }

    fn on_transfer_completed(&self, filename: &str, total_bytes: usize) {
        log::info!("transfer complete: {filename} ({total_bytes} bytes)");
    }
}
