//! # Networking sections and helpers
use std::fmt;

use crate::*;

/// Returns a translation of some ethertypes into a readable format.
pub fn etype_str(etype: u16) -> Option<&'static str> {
    Some(match etype {
        0x0800 => "IPv4",
        0x0806 => "ARP",
        0x8100 => "802.1Q",
        0x86dd => "IPv6",
        0x8847 => "MPLS unicast",
        0x8848 => "MPLS multicast",
        0x88a8 => "802.1Q-QinQ",
        0x88e5 => "802.1AE MACsec",
        _ => return None,
    })
}

/// Returns a translation of some IP protocols into a readable format.
pub fn protocol_str(protocol: u8) -> Option<&'static str> {
    Some(match protocol {
        1 => "ICMP",
        2 => "IGMP",
        4 => "IPIP",
        6 => "TCP",
        17 => "UDP",
        41 => "IPv6",
        47 => "GRE",
        50 => "ESP",
        51 => "AH",
        58 => "ICMPv6",
        115 => "L2TP",
        132 => "SCTP",
        _ => return None,
    })
}

/// Ethernet event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct EthEvent {
    /// Source MAC address.
    pub src: String,
    /// Destination MAC address.
    pub dst: String,
    /// Ethertype of the inner payload.
    pub etype: u16,
}

impl EventFmt for EthEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        let ethertype = match etype_str(self.etype) {
            Some(s) => format!(" {s}"),
            None => String::new(),
        };

        write!(
            f,
            "{} > {} ethertype{} ({:#06x})",
            self.src, self.dst, ethertype, self.etype
        )
    }
}

/// IPv4/IPv6 event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct IpEvent {
    /// Source address.
    pub saddr: String,
    /// Destination address.
    pub daddr: String,
    /// IP version: 4 or 6.
    pub version: u8,
    /// TTL (IPv4) or hop limit (IPv6).
    pub ttl: u8,
    /// Protocol carried in the packet (IPv4 "protocol" or IPv6 "next header").
    pub protocol: u8,
    /// Length from the IP header: total length for IPv4, payload length for
    /// IPv6.
    pub len: u16,
}

impl EventFmt for IpEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        write!(f, "{} > {} ttl {}", self.saddr, self.daddr, self.ttl)?;

        // In some rare cases the length might not be filled in the capture.
        if self.len != 0 {
            write!(f, " len {}", self.len)?;
        }

        let protocol = match protocol_str(self.protocol) {
            Some(s) => format!(" {s}"),
            None => String::new(),
        };
        write!(f, " proto{} ({})", protocol, self.protocol)
    }
}

/// TCP event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct TcpEvent {
    /// Source port.
    pub sport: u16,
    /// Destination port.
    pub dport: u16,
    /// Sequence number.
    pub seq: u32,
    /// Acknowledgment number.
    pub ack_seq: u32,
    /// TCP flags.
    pub flags: u16,
    /// Window size.
    pub window: u16,
}

impl EventFmt for TcpEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        write!(f, "tcp {} > {}", self.sport, self.dport)?;

        let mut flags = Vec::new();
        if self.flags & 1 << 0 != 0 {
            flags.push('F');
        }
        if self.flags & 1 << 1 != 0 {
            flags.push('S');
        }
        if self.flags & 1 << 2 != 0 {
            flags.push('R');
        }
        if self.flags & 1 << 3 != 0 {
            flags.push('P');
        }
        if self.flags & 1 << 4 != 0 {
            flags.push('.');
        }
        if self.flags & 1 << 5 != 0 {
            flags.push('U');
        }
        write!(f, " flags [{}]", flags.into_iter().collect::<String>())?;

        write!(f, " seq {}", self.seq)?;
        if self.flags & 1 << 4 != 0 {
            write!(f, " ack {}", self.ack_seq)?;
        }
        write!(f, " win {}", self.window)
    }
}

/// UDP event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct UdpEvent {
    /// Source port.
    pub sport: u16,
    /// Destination port.
    pub dport: u16,
    /// Length from the UDP header, header included.
    pub len: u16,
}

impl EventFmt for UdpEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        // Substract the UDP header size when reporting the length.
        write!(
            f,
            "udp {} > {} len {}",
            self.sport,
            self.dport,
            self.len.saturating_sub(8)
        )
    }
}
