//! Config Tests
//!
//! Loading receiver settings from TOML files.

use std::io::Write;
use std::net::Ipv4Addr;

use telly::{Config, DispatchMode, TellyError};
use tempfile::NamedTempFile;

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
        port = 5001
        bind_ip = "127.0.0.1"
        backlog = 2
        rx_buffer_size = 256
        dispatch = "queued"
        queue_capacity = 8

        [link]
        ip = "10.1.2.3"
        gateway = "10.1.2.1"
        netmask = "255.255.0.0"
        "#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.port, 5001);
    assert_eq!(config.bind_ip, Ipv4Addr::LOCALHOST);
    assert_eq!(config.backlog, 2);
    assert_eq!(config.rx_buffer_size, 256);
    assert_eq!(config.dispatch, DispatchMode::Queued);
    assert_eq!(config.queue_capacity, 8);
    assert_eq!(config.link.ip, Ipv4Addr::new(10, 1, 2, 3));
    assert_eq!(config.link.netmask, Ipv4Addr::new(255, 255, 0, 0));
}

#[test]
fn test_empty_file_is_default() {
    let file = write_config("");
    let config = Config::load(file.path()).unwrap();
    let default = Config::default();

    assert_eq!(config.port, default.port);
    assert_eq!(config.link, default.link);
    assert_eq!(config.dispatch, default.dispatch);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("missing.toml"));
    assert!(matches!(result, Err(TellyError::Config(_))));
}

#[test]
fn test_invalid_values_rejected() {
    let file = write_config("backlog = 0");
    assert!(matches!(Config::load(file.path()), Err(TellyError::Config(_))));
}

#[test]
fn test_unknown_dispatch_mode_is_parse_error() {
    let file = write_config(r#"dispatch = "threaded""#);
    assert!(matches!(Config::load(file.path()), Err(TellyError::ConfigParse(_))));
}
