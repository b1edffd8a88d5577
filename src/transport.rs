//! Blocking UDP transport.
//!
//! Single-threaded and synchronous, with socket-level timeouts, since the
//! reliable-request engine in [`crate::reliable`] is a simple
//! send/wait/retry loop with no concurrent exchanges in flight.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::TunnelError;

/// A bound UDP socket with a settable receive timeout.
pub struct Transport {
    socket: UdpSocket,
}

impl Transport {
    /// Binds an ephemeral local port for outbound use (sender side).
    pub fn bind_ephemeral(timeout: Option<Duration>) -> Result<Self, TunnelError> {
        let socket =
            UdpSocket::bind("0.0.0.0:0").map_err(|e| TunnelError::Socket(e.to_string()))?;
        socket
            .set_read_timeout(timeout)
            .map_err(|e| TunnelError::Socket(e.to_string()))?;
        Ok(Self { socket })
    }

    /// Binds to a fixed port to accept incoming queries (receiver side).
    pub fn bind(port: u16, timeout: Option<Duration>) -> Result<Self, TunnelError> {
        let socket = UdpSocket::bind(("0.0.0.0", port))
            .map_err(|e| TunnelError::Socket(e.to_string()))?;
        socket
            .set_read_timeout(timeout)
            .map_err(|e| TunnelError::Socket(e.to_string()))?;
        Ok(Self { socket })
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<(), TunnelError> {
        self.socket
            .set_read_timeout(timeout)
            .map_err(|e| TunnelError::Socket(e.to_string()))
    }

    pub fn clear_timeout(&self) -> Result<(), TunnelError> {
        self.set_timeout(None)
    }

    pub fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<(), TunnelError> {
        self.socket
            .send_to(buf, addr)
            .map_err(|e| TunnelError::PacketSend(e.to_string()))?;
        Ok(())
    }

    /// Blocks until a datagram arrives or the read timeout elapses.
    ///
    /// Returns [`TunnelError::Timeout`] specifically when the socket's read
    /// timeout fires with nothing pending, so callers can tell "nothing
    /// arrived in time" apart from a genuine socket failure.
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), TunnelError> {
        self.socket.recv_from(buf).map_err(|e| {
            use std::io::ErrorKind;
            match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => TunnelError::Timeout,
                _ => TunnelError::PacketReceive(e.to_string()),
            }
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TunnelError> {
        self.socket
            .local_addr()
            .map_err(|e| TunnelError::Socket(e.to_string()))
    }
}
