//! The three-phase transfer protocol: header packet, data packets,
//! terminator packet.
//!
//! The header and terminator packets are parsed by walking the raw
//! length-prefixed labels directly rather than through
//! [`crate::wire::qname_prefixed_to_dotted`]'s dotted-string form, because a
//! filename's second label is allowed to carry a literal `.` byte (its own
//! extension separator) and the dotted round-trip can't tell that apart
//! from a label boundary.

use crate::config::BaseDomain;
use crate::error::TunnelError;
use crate::wire::{build_header, write_question_trailer, HEADER_SIZE, MAX_LABEL_LEN};

/// The chunk id reserved for the header packet.
pub const HEADER_CHUNK_ID: u16 = 0;
/// The single-label QNAME content that marks the terminator packet.
pub const TERMINATOR_LOCAL: &str = "x";

fn push_label(out: &mut Vec<u8>, label: &str) -> Result<(), TunnelError> {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return Err(TunnelError::MalformedPacket(format!(
            "filename label '{label}' must be 1..={MAX_LABEL_LEN} bytes"
        )));
    }
    out.push(label.len() as u8);
    out.extend_from_slice(label.as_bytes());
    Ok(())
}

/// Builds the header packet announcing the destination filename, splitting
/// it into at most two wire labels on the first `.` only.
pub fn build_header_packet(filename: &str, base: &BaseDomain) -> Result<Vec<u8>, TunnelError> {
    let mut packet = build_header(HEADER_CHUNK_ID, true, 0).to_vec();
    let mut qname = Vec::new();
    match filename.split_once('.') {
        Some((first, rest)) => {
            push_label(&mut qname, first)?;
            push_label(&mut qname, rest)?;
        }
        None => push_label(&mut qname, filename)?,
    }
    qname.extend_from_slice(base.prefixed());
    packet.extend_from_slice(&qname);
    write_question_trailer(&mut packet);
    Ok(packet)
}

/// Builds the terminator packet (QNAME `x.<base domain>`).
pub fn build_terminator_packet(id: u16, base: &BaseDomain) -> Vec<u8> {
    let mut packet = build_header(id, true, 0).to_vec();
    let mut qname = Vec::new();
    push_label(&mut qname, TERMINATOR_LOCAL).expect("\"x\" always fits a label");
    qname.extend_from_slice(base.prefixed());
    packet.extend_from_slice(&qname);
    write_question_trailer(&mut packet);
    packet
}

/// Recovers the destination filename from a header packet, or `Ok(None)` if
/// `packet` isn't a header packet for `base` (wrong chunk id, or the QNAME
/// doesn't end in our base domain at all).
pub fn parse_header_packet(packet: &[u8], base: &BaseDomain) -> Result<Option<String>, TunnelError> {
    let header = crate::wire::parse_header(packet)?;
    if !header.is_query || header.id != HEADER_CHUNK_ID || header.question_count == 0 {
        return Ok(None);
    }
    let qname = &packet[HEADER_SIZE..];
    let mut pos = 0usize;
    let mut labels: Vec<Vec<u8>> = Vec::new();

    loop {
        if qname.get(pos..).is_some_and(|rest| rest.starts_with(base.prefixed())) {
            break;
        }
        let len = *qname
            .get(pos)
            .ok_or_else(|| TunnelError::MalformedPacket("header QNAME ran past buffer".into()))?
            as usize;
        if len == 0 || len > MAX_LABEL_LEN {
            return Ok(None); // doesn't end in our base domain: not our traffic
        }
        let start = pos + 1;
        let end = start + len;
        let label = qname
            .get(start..end)
            .ok_or_else(|| TunnelError::MalformedPacket("filename label ran past buffer".into()))?;
        labels.push(label.to_vec());
        pos = end;
        if labels.len() > 2 {
            return Ok(None);
        }
    }

    if labels.is_empty() {
        return Ok(None);
    }

    let filename = labels
        .into_iter()
        .map(|l| String::from_utf8_lossy(&l).into_owned())
        .collect::<Vec<_>>()
        .join(".");
    Ok(Some(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_packet_round_trips_simple_filename() {
        let base = BaseDomain::new("t.io").unwrap();
        let packet = build_header_packet("report", &base).unwrap();
        let filename = parse_header_packet(&packet, &base).unwrap().unwrap();
        assert_eq!(filename, "report");
    }

    #[test]
    fn header_packet_round_trips_filename_with_extension() {
        let base = BaseDomain::new("t.io").unwrap();
        let packet = build_header_packet("report.csv", &base).unwrap();
        let filename = parse_header_packet(&packet, &base).unwrap().unwrap();
        assert_eq!(filename, "report.csv");
    }

    #[test]
    fn header_packet_preserves_literal_dot_in_second_label() {
        let base = BaseDomain::new("t.io").unwrap();
        let packet = build_header_packet("archive.tar.gz", &base).unwrap();
        let filename = parse_header_packet(&packet, &base).unwrap().unwrap();
        assert_eq!(filename, "archive.tar.gz");
    }

    #[test]
    fn terminator_packet_has_expected_local_label() {
        let base = BaseDomain::new("t.io").unwrap();
        let packet = build_terminator_packet(42, &base);
        let header = crate::wire::parse_header(&packet).unwrap();
        assert_eq!(header.id, 42);
        let (dotted, _) =
            crate::wire::qname_prefixed_to_dotted(&packet[HEADER_SIZE..]).unwrap();
        assert_eq!(dotted, "x.t.io");
    }

    #[test]
    fn rejects_foreign_base_domain() {
        let base = BaseDomain::new("t.io").unwrap();
        let packet = build_header_packet("report", &BaseDomain::new("other.net").unwrap()).unwrap();
        assert!(parse_header_packet(&packet, &base).unwrap().is_none());
    }
}
