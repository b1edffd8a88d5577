//! Loopback sender/receiver round trips: a small payload, a zero-byte
//! file, a multi-packet payload, and filenames carrying one or two
//! extension dots.

use std::net::SocketAddr;
use std::time::Duration;

use dns_exfil::config::BaseDomain;
use dns_exfil::events::NullObserver;
use dns_exfil::receiver::{self, ReceiverOptions};
use dns_exfil::sender::{self, SenderOptions};

fn roundtrip(port: u16, base_host: &str, filename: &str, payload: &[u8]) {
    let base = BaseDomain::new(base_host).unwrap();
    let dest_folder = std::env::temp_dir().join(format!("dns-exfil-roundtrip-{port}"));
    std::fs::create_dir_all(&dest_folder).unwrap();

    let receiver_opts = ReceiverOptions {
        base: base.clone(),
        port,
        dest_folder: dest_folder.clone(),
        timeout: Duration::from_secs(2),
    };

    let receiver_handle =
        std::thread::spawn(move || receiver::receive_one_file(&receiver_opts, &NullObserver));

    std::thread::sleep(Duration::from_millis(150));

    let sender_opts = SenderOptions {
        base,
        upstream: SocketAddr::from(([127, 0, 0, 1], port)),
        dest_filename: filename.to_string(),
        retry_budget: 3,
        timeout: Duration::from_secs(2),
    };
    sender::send_file(payload, &sender_opts, &NullObserver).unwrap();

    let written_path = receiver_handle.join().unwrap().unwrap();
    assert_eq!(written_path, dest_folder.join(filename));
    assert_eq!(std::fs::read(&written_path).unwrap(), payload);

    std::fs::remove_dir_all(&dest_folder).ok();
}

#[test]
fn small_payload_round_trips() {
    roundtrip(18901, "t.io", "note.txt", b"hello dns tunnel");
}

#[test]
fn empty_file_round_trips() {
    roundtrip(18902, "t.io", "empty.bin", b"");
}

#[test]
fn multi_packet_payload_round_trips() {
    let payload: Vec<u8> = (0..=255u16).map(|b| b as u8).cycle().take(2000).collect();
    roundtrip(18903, "example.com", "blob.bin", &payload);
}

#[test]
fn filename_with_extension_round_trips() {
    roundtrip(18904, "t.io", "report.csv", b"a,b,c\n1,2,3\n");
}

#[test]
fn filename_with_two_dots_preserves_literal_dot() {
    roundtrip(18905, "t.io", "archive.tar.gz", &[0xAB; 300]);
}
