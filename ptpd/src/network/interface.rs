//! Enumeration of the network interfaces of the host

use std::{ffi::CStr, net::Ipv4Addr};

/// Turn a C failure (-1 is returned) into a rust Result
fn cerr(t: libc::c_int) -> std::io::Result<libc::c_int> {
    match t {
        -1 => Err(std::io::Error::last_os_error()),
        _ => Ok(t),
    }
}

/// One address of one interface. Interfaces show up once per address family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub mac: Option<[u8; 6]>,
    pub ipv4: Option<Ipv4Addr>,
}

pub struct InterfaceIterator {
    base: *mut libc::ifaddrs,
    next: *mut libc::ifaddrs,
}

impl InterfaceIterator {
    pub fn new() -> std::io::Result<Self> {
        let mut addrs = core::mem::MaybeUninit::<*mut libc::ifaddrs>::uninit();

        // # Safety
        //
        // getifaddrs initializes the pointer when it succeeds, the list is
        // released again in drop
        unsafe {
            cerr(libc::getifaddrs(addrs.as_mut_ptr()))?;

            Ok(Self {
                base: addrs.assume_init(),
                next: addrs.assume_init(),
            })
        }
    }
}

impl Drop for InterfaceIterator {
    fn drop(&mut self) {
        unsafe { libc::freeifaddrs(self.base) };
    }
}

impl Iterator for InterfaceIterator {
    type Item = InterfaceAddress;

    fn next(&mut self) -> Option<Self::Item> {
        // # Safety
        //
        // The list stays alive until drop, every entry is either null or
        // valid
        let ifaddr = unsafe { self.next.as_ref() }?;
        self.next = ifaddr.ifa_next;

        let name = unsafe { CStr::from_ptr(ifaddr.ifa_name) }
            .to_string_lossy()
            .into_owned();

        let mut entry = InterfaceAddress {
            name,
            mac: None,
            ipv4: None,
        };

        if ifaddr.ifa_addr.is_null() {
            return Some(entry);
        }

        match unsafe { (*ifaddr.ifa_addr).sa_family } as libc::c_int {
            libc::AF_PACKET => {
                let sockaddr_ll: libc::sockaddr_ll =
                    unsafe { std::ptr::read_unaligned(ifaddr.ifa_addr as *const _) };
                let mut mac = [0; 6];
                mac.copy_from_slice(&sockaddr_ll.sll_addr[..6]);
                entry.mac = Some(mac);
            }
            libc::AF_INET => {
                let sockaddr_in: libc::sockaddr_in =
                    unsafe { std::ptr::read_unaligned(ifaddr.ifa_addr as *const _) };
                entry.ipv4 = Some(Ipv4Addr::from(sockaddr_in.sin_addr.s_addr.to_ne_bytes()));
            }
            _ => {}
        }

        Some(entry)
    }
}

/// Globally unique unicast addresses only
fn is_usable_mac(mac: &[u8; 6]) -> bool {
    mac[0] & 0x3 == 0 && mac.iter().any(|x| *x != 0)
}

/// Pick the hardware address the clock identity derives from.
///
/// With an interface address the mac of that interface is used, otherwise
/// the first usable one of any interface.
pub fn find_mac_address(interface: Option<Ipv4Addr>) -> std::io::Result<Option<[u8; 6]>> {
    let entries: Vec<_> = InterfaceIterator::new()?.collect();
    Ok(select_mac(&entries, interface))
}

fn select_mac(entries: &[InterfaceAddress], interface: Option<Ipv4Addr>) -> Option<[u8; 6]> {
    let macs = entries
        .iter()
        .filter_map(|entry| entry.mac.map(|mac| (entry.name.as_str(), mac)))
        .filter(|(_, mac)| is_usable_mac(mac));

    match interface {
        Some(address) => {
            let name = entries
                .iter()
                .find(|entry| entry.ipv4 == Some(address))?
                .name
                .as_str();
            macs.filter(|(candidate, _)| *candidate == name)
                .map(|(_, mac)| mac)
                .next()
        }
        None => macs.map(|(_, mac)| mac).next(),
    }
}
