//! Finds a default upstream resolver when the caller doesn't name one.
//!
//! Reads `/etc/resolv.conf` and returns the address of the first
//! `nameserver` line that parses as an IPv4 address — IPv6 lines are
//! skipped rather than returned, since the transport only ever opens an
//! IPv4 socket.

use std::net::IpAddr;
use std::path::Path;

use crate::error::TunnelError;

/// Default location passed by the CLI when no `--upstream` is given.
pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// Returns the first IPv4 `nameserver` address in `path`, or `None` if the
/// file has none.
pub fn scan_resolv_conf(path: &Path) -> Result<Option<IpAddr>, TunnelError> {
    let text = std::fs::read_to_string(path)?;
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("nameserver") else {
            continue;
        };
        let Some(token) = rest.split_whitespace().next() else {
            continue;
        };
        if let Ok(IpAddr::V4(ip)) = token.parse::<IpAddr>() {
            return Ok(Some(IpAddr::V4(ip)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct ScratchFile(PathBuf);

    impl ScratchFile {
        fn new(name: &str, contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            path.push(format!("dns-exfil-resolv-test-{name}-{:?}", std::thread::current().id()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn finds_first_nameserver() {
        let f = ScratchFile::new(
            "multi",
            "# comment\nnameserver 8.8.8.8\nnameserver 1.1.1.1\noptions edns0\n",
        );
        let addr = scan_resolv_conf(&f.0).unwrap().unwrap();
        assert_eq!(addr.to_string(), "8.8.8.8");
    }

    #[test]
    fn returns_none_when_absent() {
        let f = ScratchFile::new("none", "domain example.com\noptions edns0\n");
        assert!(scan_resolv_conf(&f.0).unwrap().is_none());
    }

    #[test]
    fn skips_ipv6_lines_in_favor_of_the_first_ipv4_one() {
        let f = ScratchFile::new(
            "v6-first",
            "nameserver 2001:4860:4860::8888\nnameserver 8.8.4.4\n",
        );
        let addr = scan_resolv_conf(&f.0).unwrap().unwrap();
        assert_eq!(addr.to_string(), "8.8.4.4");
    }

    #[test]
    fn returns_none_when_only_ipv6_present() {
        let f = ScratchFile::new("v6-only", "nameserver 2001:4860:4860::8888\n");
        assert!(scan_resolv_conf(&f.0).unwrap().is_none());
    }
}
