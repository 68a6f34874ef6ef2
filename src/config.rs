//! Configuration for Telly
//!
//! Centralized configuration with sensible defaults. Values can come from
//! the builder, from a TOML file, or both (file first, then overrides).

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TellyError};

/// Main configuration for a Telly receiver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Listener Configuration
    // -------------------------------------------------------------------------
    /// TCP port to listen on
    pub port: u16,

    /// Local address to bind (0.0.0.0 accepts on every interface)
    pub bind_ip: Ipv4Addr,

    /// Listen backlog. With 1, a second client waits in the kernel queue
    /// until the current session ends.
    pub backlog: i32,

    /// Receive buffer size in bytes. A single read takes at most
    /// `rx_buffer_size - 1` bytes and a sanitized message holds at most
    /// `rx_buffer_size - 1` characters.
    pub rx_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Link Configuration
    // -------------------------------------------------------------------------
    /// Static IPv4 settings for the link layer
    pub link: LinkConfig,

    // -------------------------------------------------------------------------
    // Dispatch Configuration
    // -------------------------------------------------------------------------
    /// How sanitized messages reach the consumer
    pub dispatch: DispatchMode,

    /// Bounded queue capacity for [`DispatchMode::Queued`]
    pub queue_capacity: usize,
}

/// Static addressing used when bringing the link up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

/// Delivery strategy for sanitized messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Call the consumer on the acceptor thread. A slow consumer stalls reads.
    Inline,

    /// Hand messages to a consumer thread through a bounded channel.
    Queued,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::new(192, 168, 1, 100),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_ip: Ipv4Addr::UNSPECIFIED,
            backlog: 1,
            rx_buffer_size: 128,
            link: LinkConfig::default(),
            dispatch: DispatchMode::Queued,
            queue_capacity: 32,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            TellyError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.rx_buffer_size < 2 {
            return Err(TellyError::Config(format!(
                "rx_buffer_size must be at least 2, got {}",
                self.rx_buffer_size
            )));
        }
        if self.backlog < 1 {
            return Err(TellyError::Config(format!(
                "backlog must be at least 1, got {}",
                self.backlog
            )));
        }
        if self.dispatch == DispatchMode::Queued && self.queue_capacity == 0 {
            return Err(TellyError::Config(
                "queue_capacity must be non-zero in queued mode".to_string(),
            ));
        }
        if self.link.ip.is_unspecified() {
            return Err(TellyError::Config(
                "link.ip must be a concrete address".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest number of bytes taken by a single read
    pub fn max_read_len(&self) -> usize {
        self.rx_buffer_size.saturating_sub(1)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from an existing config (e.g. one loaded from a file)
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the bind address
    pub fn bind_ip(mut self, ip: Ipv4Addr) -> Self {
        self.config.bind_ip = ip;
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the receive buffer size (in bytes)
    pub fn rx_buffer_size(mut self, size: usize) -> Self {
        self.config.rx_buffer_size = size;
        self
    }

    /// Set the static link addressing
    pub fn link(mut self, link: LinkConfig) -> Self {
        self.config.link = link;
        self
    }

    /// Set the dispatch mode
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.config.dispatch = mode;
        self
    }

    /// Set the queued dispatch capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
