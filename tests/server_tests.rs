//! Tests for the TCP server
//!
//! These tests verify, over real loopback sockets:
//! - One dispatch per non-empty read, none for reads that sanitize to nothing
//! - Messages reach the consumer in order, in both dispatch modes
//! - Sessions end cleanly and the next client is served without a restart
//! - A second client waits until the first disconnects
//! - Startup failures (bind, link) are reported and nothing runs

use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};
use socket2::SockRef;
use telly::link::LinkLayer;
use telly::network::SessionState;
use telly::{Config, DispatchMode, MessageSink, Server, ServerHandle, TellyError};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_PERIOD: Duration = Duration::from_millis(200);

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config(mode: DispatchMode) -> Config {
    Config::builder()
        .bind_ip(Ipv4Addr::LOCALHOST)
        .port(0)
        .dispatch(mode)
        .queue_capacity(4)
        .build()
}

/// Start a server whose sink forwards every message to a channel
fn start_server(config: Config) -> (ServerHandle, Receiver<String>) {
    let (tx, rx) = channel::unbounded();
    let sink: Arc<dyn MessageSink> = Arc::new(move |msg: &str| {
        let _ = tx.send(msg.to_string());
    });
    let handle = Server::new(config, sink).unwrap().start().unwrap();
    (handle, rx)
}

fn connect(handle: &ServerHandle) -> TcpStream {
    let stream = TcpStream::connect(handle.local_addr()).unwrap();
    stream.set_nodelay(true).unwrap();
    stream
}

fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    let deadline = Instant::now() + RECV_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_hello_then_next_client() {
    let (handle, rx) = start_server(test_config(DispatchMode::Inline));

    let mut first = connect(&handle);
    first.write_all(b"hello").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "hello");
    drop(first);

    // No restart needed for the next client
    let mut second = connect(&handle);
    second.write_all(b"again").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "again");

    assert!(rx.recv_timeout(QUIET_PERIOD).is_err());
    assert_eq!(handle.stats().dispatched(), 2);
    assert_eq!(handle.sessions(), 2);

    drop(second);
    handle.shutdown().unwrap();
}

#[test]
fn test_messages_arrive_in_order_queued() {
    let (handle, rx) = start_server(test_config(DispatchMode::Queued));
    let mut client = connect(&handle);

    for i in 0..20 {
        let text = format!("reading {i}");
        client.write_all(text.as_bytes()).unwrap();
        assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), text);
    }

    drop(client);
    handle.shutdown().unwrap();
}

#[test]
fn test_sanitized_before_dispatch() {
    let (handle, rx) = start_server(test_config(DispatchMode::Queued));
    let mut client = connect(&handle);

    client.write_all(b"12:00:01\r\n").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "12:00:01");

    drop(client);
    handle.shutdown().unwrap();
}

#[test]
fn test_unprintable_chunk_is_not_dispatched() {
    let (handle, rx) = start_server(test_config(DispatchMode::Inline));
    let mut client = connect(&handle);

    client.write_all(b"\r\n\x01\x02").unwrap();
    assert!(rx.recv_timeout(QUIET_PERIOD).is_err());

    client.write_all(b"ok").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "ok");
    assert_eq!(handle.stats().dispatched(), 1);

    drop(client);
    handle.shutdown().unwrap();
}

#[test]
fn test_long_write_split_by_buffer_size() {
    let config = Config::builder()
        .bind_ip(Ipv4Addr::LOCALHOST)
        .port(0)
        .rx_buffer_size(8)
        .dispatch(DispatchMode::Inline)
        .build();
    let (handle, rx) = start_server(config);
    let mut client = connect(&handle);

    client.write_all(b"abcdefghij").unwrap();

    let mut joined = String::new();
    while joined.len() < 10 {
        let part = rx.recv_timeout(RECV_TIMEOUT).unwrap();
        assert!(part.len() <= 7, "message {part:?} exceeds one read");
        joined.push_str(&part);
    }
    assert_eq!(joined, "abcdefghij");

    drop(client);
    handle.shutdown().unwrap();
}

#[test]
fn test_second_client_waits_for_first() {
    let (handle, rx) = start_server(test_config(DispatchMode::Inline));

    let mut first = connect(&handle);
    first.write_all(b"first").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "first");

    // Queued by the kernel, not yet accepted
    let mut second = connect(&handle);
    second.write_all(b"second").unwrap();
    assert!(rx.recv_timeout(QUIET_PERIOD).is_err());
    assert_eq!(handle.sessions(), 1);

    drop(first);
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "second");
    assert_eq!(handle.sessions(), 2);

    drop(second);
    handle.shutdown().unwrap();
}

#[test]
fn test_state_returns_to_listening() {
    let (handle, rx) = start_server(test_config(DispatchMode::Inline));

    let mut client = connect(&handle);
    client.write_all(b"x").unwrap();
    rx.recv_timeout(RECV_TIMEOUT).unwrap();
    assert_eq!(handle.state(), SessionState::Connected);

    drop(client);
    assert!(wait_for(|| handle.state() == SessionState::Listening));

    handle.shutdown().unwrap();
}

#[test]
fn test_reset_session_then_next_client() {
    let (handle, rx) = start_server(test_config(DispatchMode::Inline));

    let mut first = connect(&handle);
    first.write_all(b"one").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "one");

    // Zero linger makes close send RST, so the server's read fails
    SockRef::from(&first).set_linger(Some(Duration::ZERO)).unwrap();
    drop(first);
    assert!(wait_for(|| handle.state() == SessionState::Listening));

    let mut second = connect(&handle);
    second.write_all(b"two").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "two");
    assert_eq!(handle.sessions(), 2);

    drop(second);
    assert!(wait_for(|| handle.state() == SessionState::Listening));
    handle.shutdown().unwrap();
}

#[test]
fn test_dead_consumer_keeps_accepting() {
    let (tx, rx) = channel::unbounded();
    let sink: Arc<dyn MessageSink> = Arc::new(move |msg: &str| {
        if msg == "boom" {
            panic!("display fault");
        }
        let _ = tx.send(msg.to_string());
    });
    let handle = Server::new(test_config(DispatchMode::Queued), sink)
        .unwrap()
        .start()
        .unwrap();

    let mut first = connect(&handle);
    first.write_all(b"boom").unwrap();
    drop(first);

    // Later sessions hit the closed queue and are dropped, but each new
    // client is still accepted
    for round in 0..3 {
        let mut client = TcpStream::connect(handle.local_addr()).unwrap();
        client.write_all(format!("after {round}").as_bytes()).unwrap();
        drop(client);
        let expected = round + 2;
        assert!(wait_for(|| handle.sessions() >= expected));
    }
    assert!(rx.recv_timeout(QUIET_PERIOD).is_err());

    handle.shutdown().unwrap();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_shutdown_ends_live_session() {
    let (handle, rx) = start_server(test_config(DispatchMode::Queued));

    let mut client = connect(&handle);
    client.write_all(b"live").unwrap();
    assert_eq!(rx.recv_timeout(RECV_TIMEOUT).unwrap(), "live");

    handle.shutdown().unwrap();

    client.set_read_timeout(Some(RECV_TIMEOUT)).unwrap();
    let mut buf = [0u8; 4];
    match client.read(&mut buf) {
        Ok(0) | Err(_) => {}
        Ok(n) => panic!("unexpected {n} bytes after shutdown"),
    }
}

#[test]
fn test_shutdown_while_idle() {
    let (handle, _rx) = start_server(test_config(DispatchMode::Inline));
    let addr = handle.local_addr();

    handle.shutdown().unwrap();

    // Listener is gone
    assert!(TcpStream::connect_timeout(&addr, Duration::from_millis(500)).is_err());
}

#[test]
fn test_bind_failure_is_fatal() {
    let occupied = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = occupied.local_addr().unwrap().port();

    let config = Config::builder()
        .bind_ip(Ipv4Addr::LOCALHOST)
        .port(port)
        .build();
    let sink: Arc<dyn MessageSink> = Arc::new(|_: &str| {});
    let result = Server::new(config, sink).unwrap().start();

    assert!(matches!(result, Err(TellyError::Bind { .. })));
}

#[test]
fn test_address_reported_after_link_up() {
    let sink: Arc<dyn MessageSink> = Arc::new(|_: &str| {});
    let server = Server::new(test_config(DispatchMode::Inline), sink).unwrap();
    assert_eq!(server.address(), "0.0.0.0");

    let handle = server.start().unwrap();
    assert_eq!(handle.address(), "192.168.1.100");
    assert_eq!(
        handle.status_line(),
        format!("IP: 192.168.1.100  Port: {}", handle.local_addr().port())
    );

    handle.shutdown().unwrap();
}

struct DeadLink;

impl LinkLayer for DeadLink {
    fn up(&self) -> telly::Result<()> {
        Err(TellyError::Link("no carrier".to_string()))
    }

    fn address(&self) -> String {
        "0.0.0.0".to_string()
    }
}

#[test]
fn test_link_failure_prevents_start() {
    let sink: Arc<dyn MessageSink> = Arc::new(|_: &str| {});
    let server = Server::with_link(test_config(DispatchMode::Inline), Arc::new(DeadLink), sink).unwrap();

    assert!(matches!(server.start(), Err(TellyError::Link(_))));
}

#[test]
fn test_invalid_config_rejected() {
    let config = Config::builder().rx_buffer_size(1).build();
    let sink: Arc<dyn MessageSink> = Arc::new(|_: &str| {});
    assert!(matches!(Server::new(config, sink), Err(TellyError::Config(_))));
}
