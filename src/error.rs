//! Error types shared by every module in the crate.

/// Errors produced by the tunnel core.
///
/// Configuration errors are returned before any socket is opened.
/// Transport/protocol errors surface only after the retry budget in
/// [`crate::reliable::send_and_wait`] is exhausted — a single timeout or a
/// mismatched acknowledgement never escapes as a `TunnelError` on its own.
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    /// Base domain fails the length or character-set checks in
    /// [`crate::config::BaseDomain::new`].
    #[error("invalid base host: {0}")]
    InvalidBaseHost(String),

    /// Destination folder (receiver) is not writable or not a directory.
    #[error("invalid destination folder: {0}")]
    InvalidDestFolder(String),

    /// Upstream resolver IP could not be parsed or located.
    #[error("invalid upstream address: {0}")]
    InvalidAddress(String),

    /// Socket creation, bind, or timeout configuration failed.
    #[error("socket error: {0}")]
    Socket(String),

    /// `sendto` failed.
    #[error("packet send failed: {0}")]
    PacketSend(String),

    /// `recvfrom` failed for a reason other than a timeout.
    #[error("packet receive failed: {0}")]
    PacketReceive(String),

    /// `recvfrom` hit the socket's read timeout with no datagram pending.
    #[error("receive timed out")]
    Timeout,

    /// `send_and_wait` exhausted its retry budget without a validated ack.
    #[error("retry budget exhausted for chunk {chunk_id}")]
    RetriesExhausted {
        /// The chunk id being acknowledged when retries ran out.
        chunk_id: u16,
    },

    /// A QNAME label length byte exceeded 63, or the packet was otherwise
    /// malformed DNS.
    #[error("malformed DNS packet: {0}")]
    MalformedPacket(String),

    /// A base-16 pair fell outside `'a'..='p'`.
    #[error("invalid payload alphabet byte: 0x{0:02x}")]
    InvalidAlphabet(u8),

    /// Underlying file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
