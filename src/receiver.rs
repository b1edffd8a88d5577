//! Receiver-side driver: accept a header packet, reassemble data packets
//! into a file, stop on the terminator.
//!
//! Grounded on `main`'s per-file outer loop and per-packet inner loop in
//! `receiver/dns_receiver.c`. The receiver acknowledges every recognized
//! query it sees — including duplicates and the terminator — since an
//! unacknowledged chunk is exactly what drives the sender's retry loop.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::BaseDomain;
use crate::error::TunnelError;
use crate::events::TunnelObserver;
use crate::reassembler::{self, Reassembler};
use crate::session;
use crate::transport::Transport;
use crate::wire;

pub struct ReceiverOptions {
    pub base: BaseDomain,
    pub port: u16,
    pub dest_folder: PathBuf,
    pub timeout: Duration,
}

/// Blocks waiting for a header packet, then reassembles one complete
/// transfer and writes it under `opts.dest_folder`. Returns the path
/// written.
///
/// If the sender goes silent mid-transfer, the session times out and this
/// returns successfully with whatever prefix of the file was reassembled
/// so far — the caller is expected to loop and wait for a new session.
pub fn receive_one_file(
    opts: &ReceiverOptions,
    observer: &dyn TunnelObserver,
) -> Result<PathBuf, TunnelError> {
    if !opts.dest_folder.is_dir() {
        return Err(TunnelError::InvalidDestFolder(format!(
            "{} is not a directory",
            opts.dest_folder.display()
        )));
    }

    let transport = Transport::bind(opts.port, None)?;
    let mut buf = [0u8; 512];

    let (filename, from) = loop {
        let (n, from) = transport.recv_from(&mut buf)?;
        let packet = &buf[..n];
        match session::parse_header_packet(packet, &opts.base) {
            Ok(Some(filename)) => {
                observer.on_query_parsed(&filename, &filename);
                transport.send_to(&wire::make_ack(packet)?, from)?;
                break (filename, from);
            }
            Ok(None) => continue, // not our traffic, or not a header packet
            Err(_) => continue,   // malformed: ignore and keep listening
        }
    };

    let dest_path = safe_dest_path(&opts.dest_folder, &filename)?;
    observer.on_transfer_init(from, &filename);

    transport.set_timeout(Some(opts.timeout))?;
    let mut reassembler = Reassembler::new();

    loop {
        let n = match transport.recv_from(&mut buf) {
            Ok((n, peer)) if peer == from => n,
            Ok(_) => continue, // traffic from a different sender mid-transfer: ignore
            Err(TunnelError::Timeout) => break, // sender went silent: abandon this session
            Err(e) => return Err(e),
        };
        let packet = &buf[..n];

        let Some((id, local)) = reassembler::local_label(packet, &opts.base)? else {
            continue;
        };
        observer.on_query_parsed(&filename, &local);
        transport.send_to(&wire::make_ack(packet)?, from)?;

        if reassembler::is_terminator(&local) {
            break;
        }

        let decoded = reassembler::decode_chunk_local(&local)?;
        if reassembler.accept_chunk(id, &decoded) {
            observer.on_chunk_received(from, &filename, id, decoded.len());
        }
    }

    let bytes = reassembler.into_bytes();
    let mut file = fs::File::create(&dest_path)?;
    file.write_all(&bytes)?;
    observer.on_transfer_completed(&filename, bytes.len());

    Ok(dest_path)
}

/// Rejects filenames that would escape `folder` (path separators, `..`).
fn safe_dest_path(folder: &Path, filename: &str) -> Result<PathBuf, TunnelError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename == "."
        || filename == ".."
    {
        return Err(TunnelError::InvalidDestFolder(format!(
            "unsafe destination filename: {filename}"
        )));
    }
    Ok(folder.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal_filenames() {
        let folder = PathBuf::from("/tmp");
        assert!(safe_dest_path(&folder, "../etc/passwd").is_err());
        assert!(safe_dest_path(&folder, "sub/dir").is_err());
        assert!(safe_dest_path(&folder, "").is_err());
    }

    #[test]
    fn accepts_plain_filename() {
        let folder = PathBuf::from("/tmp");
        assert_eq!(
            safe_dest_path(&folder, "report.csv").unwrap(),
            PathBuf::from("/tmp/report.csv")
        );
    }
}
