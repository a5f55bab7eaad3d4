//! Drives two real `Endpoint`s over loopback UDP sockets through a
//! handshake, a small message, an MSS-boundary message, and a graceful
//! client-initiated shutdown.

use std::net::SocketAddrV4;
use std::str::FromStr;
use std::thread;

use microtcp::{Config, Endpoint, RecvOutcome, ShutdownMode, State};

fn addr(s: &str) -> SocketAddrV4 {
    SocketAddrV4::from_str(s).unwrap()
}

#[test]
fn handshake_and_small_message() {
    let client_addr = addr("127.0.0.1:21210");
    let server_addr = addr("127.0.0.1:21220");

    let server = thread::spawn(move || {
        let mut server = Endpoint::new(Config::default()).unwrap();
        server.bind(server_addr).unwrap();
        server.accept().unwrap();
        assert_eq!(server.state(), State::Established);

        let mut buf = [0u8; 4096];
        let outcome = server.recv(&mut buf, false).unwrap();
        match outcome {
            RecvOutcome::Data(n) => assert_eq!(&buf[..n], b"Hello CSD\0"),
            RecvOutcome::PeerClosed => panic!("expected data, got peer close"),
        }

        server
    });

    // Give the server a moment to bind before the client's SYN goes out.
    thread::sleep(std::time::Duration::from_millis(50));

    let mut client = Endpoint::new(Config::default()).unwrap();
    client.bind(client_addr).unwrap();
    client.connect(server_addr).unwrap();
    assert_eq!(client.state(), State::Established);

    client.send(b"Hello CSD\0").unwrap();

    let server = server.join().unwrap();

    assert_eq!(client.counters().packets_sent, server.counters().packets_received);
}

#[test]
fn mss_boundary_fragmentation() {
    let client_addr = addr("127.0.0.1:21211");
    let server_addr = addr("127.0.0.1:21221");

    let mss = 8usize;
    let payload_len = mss + 5;
    let payload: Vec<u8> = (0..payload_len as u8).collect();

    let expected = payload.clone();
    let server = thread::spawn(move || {
        let mut server = Endpoint::new(Config::new(mss)).unwrap();
        server.bind(server_addr).unwrap();
        server.accept().unwrap();

        let mut buf = vec![0u8; payload_len];
        let outcome = server.recv(&mut buf, true).unwrap();
        assert_eq!(outcome, RecvOutcome::Data(payload_len));
        assert_eq!(buf, expected);

        server.counters().packets_received
    });

    thread::sleep(std::time::Duration::from_millis(50));

    let mut client = Endpoint::new(Config::new(mss)).unwrap();
    client.bind(client_addr).unwrap();
    client.connect(server_addr).unwrap();

    let sent_before = client.counters().packets_sent;
    client.send(&payload).unwrap();
    let data_segments_sent = client.counters().packets_sent - sent_before;

    // One segment of `mss` bytes, one of the remaining 5: exactly two.
    assert_eq!(data_segments_sent, 2);

    server.join().unwrap();
}

#[test]
fn graceful_shutdown_client_initiated() {
    let client_addr = addr("127.0.0.1:21212");
    let server_addr = addr("127.0.0.1:21222");

    let server = thread::spawn(move || {
        let mut server = Endpoint::new(Config::default()).unwrap();
        server.bind(server_addr).unwrap();
        server.accept().unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(
            server.recv(&mut buf, false).unwrap(),
            RecvOutcome::Data(4)
        );

        let outcome = server.recv(&mut buf, false).unwrap();
        assert_eq!(outcome, RecvOutcome::PeerClosed);
        assert_eq!(server.state(), State::Closed);
    });

    thread::sleep(std::time::Duration::from_millis(50));

    let mut client = Endpoint::new(Config::default()).unwrap();
    client.bind(client_addr).unwrap();
    client.connect(server_addr).unwrap();
    client.send(b"ping").unwrap();

    client.shutdown(ShutdownMode::ReadWrite).unwrap();
    assert_eq!(client.state(), State::Closed);

    server.join().unwrap();
}

#[test]
fn shutdown_is_idempotent_once_closed() {
    let client_addr = addr("127.0.0.1:21213");
    let server_addr = addr("127.0.0.1:21223");

    let server = thread::spawn(move || {
        let mut server = Endpoint::new(Config::default()).unwrap();
        server.bind(server_addr).unwrap();
        server.accept().unwrap();
        let mut buf = [0u8; 64];
        let outcome = server.recv(&mut buf, false).unwrap();
        assert_eq!(outcome, RecvOutcome::PeerClosed);
    });

    thread::sleep(std::time::Duration::from_millis(50));

    let mut client = Endpoint::new(Config::default()).unwrap();
    client.bind(client_addr).unwrap();
    client.connect(server_addr).unwrap();

    client.shutdown(ShutdownMode::ReadWrite).unwrap();
    client.shutdown(ShutdownMode::ReadWrite).unwrap();
    assert_eq!(client.state(), State::Closed);

    server.join().unwrap();
}
