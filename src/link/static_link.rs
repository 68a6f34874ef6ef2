//! Static IPv4 link
//!
//! Host-side link layer with a fixed address and no DHCP.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::LinkConfig;
use crate::error::{Result, TellyError};
use super::{LinkEvent, LinkLayer, NetworkAddress};

/// Link configured from a [`LinkConfig`]
pub struct StaticLink {
    config: LinkConfig,
    address: NetworkAddress,
    is_up: AtomicBool,
}

impl StaticLink {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            address: NetworkAddress::new(),
            is_up: AtomicBool::new(false),
        }
    }

    pub fn is_up(&self) -> bool {
        self.is_up.load(Ordering::Acquire)
    }

    /// Reject settings that cannot describe a reachable subnet
    fn check(&self) -> Result<()> {
        let LinkConfig { ip, gateway, netmask } = self.config;

        if ip.is_unspecified() || ip.is_broadcast() {
            return Err(TellyError::Link(format!("invalid static address {ip}")));
        }

        let mask = u32::from(netmask);
        if mask.leading_ones() + mask.trailing_zeros() != 32 {
            return Err(TellyError::Link(format!("netmask {netmask} is not contiguous")));
        }

        if !gateway.is_unspecified() && !same_subnet(ip, gateway, netmask) {
            tracing::warn!(
                ip = %ip,
                gateway = %gateway,
                netmask = %netmask,
                "Gateway is outside the local subnet"
            );
        }
        Ok(())
    }
}

impl LinkLayer for StaticLink {
    fn up(&self) -> Result<()> {
        if self.is_up() {
            return Ok(());
        }

        self.check()?;
        tracing::info!(
            ip = %self.config.ip,
            gateway = %self.config.gateway,
            netmask = %self.config.netmask,
            "Configuring static link"
        );

        self.address.handle_event(LinkEvent::Started);
        self.address.handle_event(LinkEvent::Connected);
        self.address.handle_event(LinkEvent::GotIp(self.config.ip));
        self.is_up.store(true, Ordering::Release);
        Ok(())
    }

    fn address(&self) -> String {
        self.address.get()
    }
}

fn same_subnet(a: Ipv4Addr, b: Ipv4Addr, netmask: Ipv4Addr) -> bool {
    let mask = u32::from(netmask);
    u32::from(a) & mask == u32::from(b) & mask
}
