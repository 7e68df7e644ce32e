//! Discovery of the host's outward-facing address
//!
//! Used as the virtual host `server_name` when the operator does not supply
//! one.

use std::net::{IpAddr, UdpSocket};

use tracing::{debug, warn};

/// Catch-all server name used when no address can be discovered.
pub const CATCH_ALL_SERVER_NAME: &str = "_";

/// Well-known public resolver used only to select the outbound route.
/// Connecting a UDP socket sends no packets.
const ROUTE_PROBE_TARGET: &str = "8.8.8.8:80";

/// Address of the interface the host uses for outbound traffic.
pub fn discover_public_address() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE_TARGET).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() || ip.is_loopback() {
        debug!("Outbound route resolved to unusable address {ip}");
        return None;
    }
    Some(ip)
}

/// Server name to use when none was given on the command line.
pub fn default_server_name() -> String {
    if let Some(ip) = discover_public_address() {
        ip.to_string()
    } else {
        warn!("Could not discover host address, using catch-all server name '_'");
        CATCH_ALL_SERVER_NAME.to_string()
    }
}
