//! Listening socket setup
//!
//! std's `TcpListener::bind` picks its own backlog, so the socket is built
//! with socket2 and converted once it is listening.

use std::net::{Ipv4Addr, SocketAddr, TcpListener};

use socket2::{Domain, Protocol, Socket, Type};

use crate::error::{Result, TellyError};

/// Bind an IPv4 TCP listener with `SO_REUSEADDR` and the given backlog
pub fn bind_listener(ip: Ipv4Addr, port: u16, backlog: i32) -> Result<TcpListener> {
    let addr = SocketAddr::from((ip, port));
    let bind_err = |source: std::io::Error| TellyError::Bind { addr, source };

    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    socket.bind(&addr.into()).map_err(bind_err)?;
    socket.listen(backlog).map_err(bind_err)?;

    let listener: TcpListener = socket.into();
    tracing::debug!(address = %addr, backlog, "Listener bound");
    Ok(listener)
}
