//! Sender-side driver: header packet, framed data packets, terminator.
//!
//! Three phases — header, framed data, terminator — built around
//! [`crate::reliable::send_and_wait`] and [`crate::framer::Framer`].

use std::io::Read;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::BaseDomain;
use crate::error::TunnelError;
use crate::events::TunnelObserver;
use crate::framer::Framer;
use crate::reassembler;
use crate::reliable;
use crate::session;
use crate::transport::Transport;

/// Everything a send needs besides the source bytes and the observer.
pub struct SenderOptions {
    pub base: BaseDomain,
    pub upstream: SocketAddr,
    pub dest_filename: String,
    pub retry_budget: u8,
    pub timeout: Duration,
}

/// Never lets the chunk id wrap onto the reserved header id 0.
fn next_chunk_id(id: u16) -> u16 {
    match id.wrapping_add(1) {
        0 => 1,
        n => n,
    }
}

/// Streams `source` to `opts.upstream` under `opts.base`, as the file named
/// `opts.dest_filename`. Blocks until the terminator is acknowledged.
pub fn send_file<R: Read>(
    source: R,
    opts: &SenderOptions,
    observer: &dyn TunnelObserver,
) -> Result<(), TunnelError> {
    let transport = Transport::bind_ephemeral(Some(opts.timeout))?;
    observer.on_transfer_init(opts.upstream, &opts.dest_filename);

    let header_packet = session::build_header_packet(&opts.dest_filename, &opts.base)?;
    reliable::send_and_wait(
        &transport,
        opts.upstream,
        &header_packet,
        session::HEADER_CHUNK_ID,
        opts.retry_budget,
        &opts.dest_filename,
        observer,
    )?;

    let mut framer = Framer::new(source);
    let mut chunk_id: u16 = 1;

    while let Some(packet) = framer.next_packet(chunk_id, &opts.base)? {
        if let Some((_, local)) = reassembler::local_label(&packet, &opts.base)? {
            observer.on_chunk_encoded(&opts.dest_filename, chunk_id, &local);
        }

        reliable::send_and_wait(
            &transport,
            opts.upstream,
            &packet,
            chunk_id,
            opts.retry_budget,
            &opts.dest_filename,
            observer,
        )?;
        chunk_id = next_chunk_id(chunk_id);
    }

    let terminator = session::build_terminator_packet(chunk_id, &opts.base);
    reliable::send_and_wait(
        &transport,
        opts.upstream,
        &terminator,
        chunk_id,
        opts.retry_budget,
        &opts.dest_filename,
        observer,
    )?;

    observer.on_transfer_completed(&opts.dest_filename, framer.bytes_consumed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_skips_reserved_zero() {
        assert_eq!(next_chunk_id(0xFFFE), 0xFFFF);
        assert_eq!(next_chunk_id(0xFFFF), 1);
    }
}
