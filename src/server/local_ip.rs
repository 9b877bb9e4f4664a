//! 局域网 IP 探测

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use tracing::debug;

/// 探测本机局域网 IP，失败时返回 127.0.0.1
///
/// UDP connect 只选路由，不会真正发包。
pub fn local_ip() -> IpAddr {
    match detect() {
        Ok(ip) => ip,
        Err(e) => {
            debug!(error = %e, "Local IP detection failed, falling back to loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn detect() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}
