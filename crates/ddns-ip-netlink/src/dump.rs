// Blocking rtnetlink address dump.
//
// Sends one RTM_GETADDR dump request for a single address family and
// collects the addresses assigned to one interface index.

use ddns_core::{Error, Result};
use netlink_packet_core::{
    NLM_F_DUMP, NLM_F_REQUEST, NetlinkHeader, NetlinkMessage, NetlinkPayload,
};
use netlink_packet_route::address::Nla;
use netlink_packet_route::{AddressMessage, RtnlMessage};
use netlink_sys::protocols::NETLINK_ROUTE;
use netlink_sys::{Socket, SocketAddr};
use std::ffi::CString;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ddns_core::traits::IpVersion;

const RECEIVE_BUFFER_SIZE: usize = 8192;

/// Kernel index of interface `device`
pub(crate) fn interface_index(device: &str) -> Result<u32> {
    let name = CString::new(device)
        .map_err(|_| Error::invalid_input(format!("invalid interface name {:?}", device)))?;

    // SAFETY: `name` is a valid NUL-terminated string that outlives the call.
    let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
    if index == 0 {
        return Err(Error::ip_source(format!(
            "could not get details about interface {:?}: {}",
            device,
            std::io::Error::last_os_error()
        )));
    }

    Ok(index)
}

/// Addresses of `version` assigned to interface `index`, in kernel order
pub(crate) fn interface_addresses(index: u32, version: IpVersion) -> Result<Vec<IpAddr>> {
    let mut socket = Socket::new(NETLINK_ROUTE).map_err(netlink_error)?;
    socket.bind_auto().map_err(netlink_error)?;
    socket
        .connect(&SocketAddr::new(0, 0))
        .map_err(netlink_error)?;

    let mut message = AddressMessage::default();
    message.header.family = match version {
        IpVersion::V4 => libc::AF_INET as u8,
        IpVersion::V6 => libc::AF_INET6 as u8,
    };

    let mut packet = NetlinkMessage::new(
        NetlinkHeader::default(),
        NetlinkPayload::from(RtnlMessage::GetAddress(message)),
    );
    packet.header.flags = NLM_F_REQUEST | NLM_F_DUMP;
    packet.header.sequence_number = 1;
    packet.finalize();

    let mut request = vec![0; packet.header.length as usize];
    packet.serialize(&mut request[..]);
    socket.send(&request[..], 0).map_err(netlink_error)?;

    let mut addresses = Vec::new();
    let mut buffer = vec![0; RECEIVE_BUFFER_SIZE];

    loop {
        let size = socket
            .recv(&mut &mut buffer[..], 0)
            .map_err(netlink_error)?;
        let mut offset = 0;

        while offset < size {
            let reply = NetlinkMessage::<RtnlMessage>::deserialize(&buffer[offset..size])
                .map_err(|e| Error::ip_source(format!("malformed netlink reply: {}", e)))?;

            match reply.payload {
                NetlinkPayload::Done(_) => return Ok(addresses),
                NetlinkPayload::Error(e) => {
                    return Err(Error::ip_source(format!("netlink dump failed: {:?}", e)));
                }
                NetlinkPayload::InnerMessage(RtnlMessage::NewAddress(address))
                    if address.header.index == index =>
                {
                    if let Some(ip) = address_of(&address) {
                        addresses.push(ip);
                    }
                }
                _ => {}
            }

            let length = reply.header.length as usize;
            if length == 0 {
                break;
            }
            offset += length;
        }
    }
}

// IFA_LOCAL carries the interface's own address on point-to-point links;
// IFA_ADDRESS is the peer there. Elsewhere both are equal.
fn address_of(message: &AddressMessage) -> Option<IpAddr> {
    let mut address = None;
    for nla in &message.nlas {
        match nla {
            Nla::Local(bytes) => return to_ip(bytes),
            Nla::Address(bytes) => address = to_ip(bytes),
            _ => {}
        }
    }
    address
}

fn to_ip(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

fn netlink_error(e: std::io::Error) -> Error {
    Error::ip_source(format!("netlink socket error: {}", e))
}
