//! Event and general sockets joined to the ptp multicast groups

use std::{
    net::{Ipv4Addr, SocketAddrV4, UdpSocket},
    os::fd::AsRawFd,
};

pub const PRIMARY_MULTICAST: Ipv4Addr = Ipv4Addr::new(224, 0, 1, 129);
pub const PDELAY_MULTICAST: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 107);

pub const EVENT_PORT: u16 = 319;
pub const GENERAL_PORT: u16 = 320;

/// Where a datagram goes, per port and destination group
pub fn target(port: u16, peer: bool) -> SocketAddrV4 {
    let group = if peer {
        PDELAY_MULTICAST
    } else {
        PRIMARY_MULTICAST
    };
    SocketAddrV4::new(group, port)
}

fn set_multicast_interface(socket: &UdpSocket, interface: Ipv4Addr) -> std::io::Result<()> {
    let addr = libc::in_addr {
        s_addr: u32::from_ne_bytes(interface.octets()),
    };

    // # Safety
    //
    // The option value is a valid in_addr of the given length for the
    // duration of the call
    let result = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::IPPROTO_IP,
            libc::IP_MULTICAST_IF,
            &addr as *const libc::in_addr as *const libc::c_void,
            std::mem::size_of::<libc::in_addr>() as libc::socklen_t,
        )
    };

    match result {
        -1 => Err(std::io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Bind `port` on all addresses and join both ptp groups on `interface`,
/// or on the interface the kernel picks when it is unspecified.
pub fn open_ptp_socket(port: u16, interface: Ipv4Addr) -> std::io::Result<UdpSocket> {
    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;

    socket.join_multicast_v4(&PRIMARY_MULTICAST, &interface)?;
    socket.join_multicast_v4(&PDELAY_MULTICAST, &interface)?;

    // ptp multicast stays on the local segment
    socket.set_multicast_ttl_v4(1)?;
    socket.set_multicast_loop_v4(true)?;
    if !interface.is_unspecified() {
        set_multicast_interface(&socket, interface)?;
    }

    socket.set_nonblocking(true)?;
    Ok(socket)
}
