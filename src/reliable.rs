//! The reliable-request engine: send a packet, wait for a validated
//! acknowledgement, retry on anything short of one.
//!
//! A retry is consumed not just by a timeout but by any validation
//! failure — a failed send, a reply with the wrong id, the wrong rcode, or
//! nonzero answer/authority/additional counts is treated exactly like
//! silence.

use std::net::SocketAddr;

use crate::events::TunnelObserver;
use crate::error::TunnelError;
use crate::transport::Transport;
use crate::wire::{parse_header, ACK_RCODE};

/// Default number of send+receive attempts per chunk before giving up.
pub const DEFAULT_RETRY_BUDGET: u8 = 3;

fn is_valid_ack(reply: &[u8], expected_id: u16) -> bool {
    match parse_header(reply) {
        Ok(header) => {
            !header.is_query
                && header.id == expected_id
                && header.rcode == ACK_RCODE
                && header.answer_count_sum == 0
        }
        Err(_) => false,
    }
}

/// Sends `packet` to `upstream` and waits for a matching acknowledgement,
/// retrying up to `retry_budget` times. `expected_id` is the chunk id the
/// reply's DNS header id must echo; `filename` identifies the transfer for
/// the observer callbacks.
pub fn send_and_wait(
    transport: &Transport,
    upstream: SocketAddr,
    packet: &[u8],
    expected_id: u16,
    retry_budget: u8,
    filename: &str,
    observer: &dyn TunnelObserver,
) -> Result<(), TunnelError> {
    let mut attempts_made = 0u8;
    let mut recv_buf = [0u8; 512];

    loop {
        attempts_made += 1;

        let sent = transport.send_to(packet, upstream).is_ok();
        if sent {
            observer.on_chunk_sent(upstream, filename, expected_id, packet.len());
        }

        let ack_ok = sent
            && match transport.recv_from(&mut recv_buf) {
                Ok((n, _)) => is_valid_ack(&recv_buf[..n], expected_id),
                Err(_) => false,
            };

        if ack_ok {
            return Ok(());
        }
        if attempts_made >= retry_budget {
            return Err(TunnelError::RetriesExhausted {
                chunk_id: expected_id,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use crate::wire::build_header;
    use std::time::Duration;

    #[test]
    fn succeeds_when_receiver_acks_immediately() {
        let server = Transport::bind(0, Some(Duration::from_secs(1))).unwrap();
        let server_addr = server.local_addr().unwrap();
        let client = Transport::bind_ephemeral(Some(Duration::from_secs(1))).unwrap();

        let packet = build_header(5, true, 0).to_vec();
        let result = std::thread::scope(|scope| {
            let handle = scope.spawn(|| {
                let mut buf = [0u8; 512];
                let (_, from) = server.recv_from(&mut buf).unwrap();
                let ack = build_header(5, false, ACK_RCODE).to_vec();
                server.send_to(&ack, from).unwrap();
            });
            let r = send_and_wait(&client, server_addr, &packet, 5, 3, "f", &NullObserver);
            handle.join().unwrap();
            r
        });
        assert!(result.is_ok());
    }

    #[test]
    fn exhausts_retries_on_silence() {
        let client = Transport::bind_ephemeral(Some(Duration::from_millis(30))).unwrap();
        let nobody: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let packet = build_header(1, true, 0).to_vec();
        let result = send_and_wait(&client, nobody, &packet, 1, 2, "f", &NullObserver);
        assert!(matches!(
            result,
            Err(TunnelError::RetriesExhausted { chunk_id: 1 })
        ));
    }

    #[test]
    fn rejects_ack_with_wrong_id() {
        let server = Transport::bind(0, Some(Duration::from_secs(1))).unwrap();
        let server_addr = server.local_addr().unwrap();
        let client = Transport::bind_ephemeral(Some(Duration::from_millis(100))).unwrap();

        let packet = build_header(5, true, 0).to_vec();
        let result = std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut buf = [0u8; 512];
                let (_, from) = server.recv_from(&mut buf).unwrap();
                let wrong_ack = build_header(99, false, ACK_RCODE).to_vec();
                server.send_to(&wrong_ack, from).unwrap();
            });
            send_and_wait(&client, server_addr, &packet, 5, 1, "f", &NullObserver)
        });
        assert!(result.is_err());
    }
}
