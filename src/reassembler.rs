//! Receiver-side parsing: pull a chunk id and payload out of a raw query,
//! filtering out anything that doesn't belong to our base domain.
//!
//! Foreign DNS traffic sharing the wire (any query whose QNAME doesn't end
//! in our base domain) is identified with a plain suffix check and
//! silently dropped rather than acknowledged.

use crate::codec;
use crate::config::BaseDomain;
use crate::error::TunnelError;
use crate::wire::{parse_header, qname_prefixed_to_dotted, HEADER_SIZE};

/// The portion of a QNAME that isn't the base domain, e.g. `"x"` for a
/// terminator query or `"nekndolopopf"`/`"report.csv"` for a data or header
/// query. Dots between data labels are preserved here — stripping them is
/// the caller's job once it knows which kind of query this is.
pub fn local_label(packet: &[u8], base: &BaseDomain) -> Result<Option<(u16, String)>, TunnelError> {
    let header = parse_header(packet)?;
    if !header.is_query || header.question_count == 0 {
        return Ok(None);
    }
    let (dotted, _) = qname_prefixed_to_dotted(&packet[HEADER_SIZE..])?;
    let suffix = base.dotted_unprefixed();

    let local = if dotted == suffix {
        ""
    } else {
        match dotted.strip_suffix(&format!(".{suffix}")) {
            Some(local) if !local.is_empty() => local,
            _ => return Ok(None), // doesn't end in our base domain: not our traffic
        }
    };
    Ok(Some((header.id, local.to_string())))
}

/// The single-label terminator query signals end of transfer.
pub fn is_terminator(local: &str) -> bool {
    local == "x"
}

/// Strips the structural dots a multi-label data payload picked up from
/// label framing, then base-16 decodes what's left.
pub fn decode_chunk_local(local: &str) -> Result<Vec<u8>, TunnelError> {
    let joined: String = local.chars().filter(|&c| c != '.').collect();
    codec::decode(joined.as_bytes())
}

/// Accumulates chunk payloads for one in-flight transfer, enforcing strict
/// in-order delivery and suppressing duplicates from a sender retrying a
/// chunk whose acknowledgement was lost.
pub struct Reassembler {
    expected_id: u16,
    data: Vec<u8>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self {
            expected_id: 1,
            data: Vec::new(),
        }
    }

    /// Feeds one chunk in. Returns `true` if it extended the output (a
    /// fresh, in-order chunk); `false` if it was a duplicate of the chunk
    /// immediately before the one currently expected, or otherwise
    /// out of sequence. Either way the caller should still acknowledge it —
    /// a duplicate means the sender never saw our first acknowledgement.
    pub fn accept_chunk(&mut self, id: u16, payload: &[u8]) -> bool {
        if id == self.expected_id {
            self.data.extend_from_slice(payload);
            self.expected_id = self.expected_id.wrapping_add(1);
            true
        } else {
            false
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new()
    }
}
