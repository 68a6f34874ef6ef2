//! Write-once network address and link events

use std::net::Ipv4Addr;
use std::sync::OnceLock;

/// Reported before the link layer has an address
pub const PLACEHOLDER_ADDRESS: &str = "0.0.0.0";

/// Interface state changes reported by the link layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Started,
    Stopped,
    Connected,
    Disconnected,
    GotIp(Ipv4Addr),
}

/// Address assigned to the interface, set at most once
#[derive(Debug, Default)]
pub struct NetworkAddress {
    ip: OnceLock<Ipv4Addr>,
}

impl NetworkAddress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the configured address. Returns false if one was already set.
    pub fn set(&self, ip: Ipv4Addr) -> bool {
        match self.ip.set(ip) {
            Ok(()) => true,
            Err(rejected) => {
                tracing::warn!(
                    current = %self.get(),
                    rejected = %rejected,
                    "Network address already set, ignoring"
                );
                false
            }
        }
    }

    /// Address as text, or the placeholder before configuration
    pub fn get(&self) -> String {
        self.ip
            .get()
            .map_or_else(|| PLACEHOLDER_ADDRESS.to_string(), |ip| ip.to_string())
    }

    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ip.get().copied()
    }

    pub fn is_configured(&self) -> bool {
        self.ip.get().is_some()
    }

    /// Log a link event and record the address from `GotIp`
    pub fn handle_event(&self, event: LinkEvent) {
        match event {
            LinkEvent::Started => tracing::info!("Link started"),
            LinkEvent::Stopped => tracing::info!("Link stopped"),
            LinkEvent::Connected => tracing::info!("Link connected"),
            LinkEvent::Disconnected => tracing::warn!("Link disconnected"),
            LinkEvent::GotIp(ip) => {
                if self.set(ip) {
                    tracing::info!(address = %ip, "Got IP address");
                }
            }
        }
    }
}
