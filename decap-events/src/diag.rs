use std::fmt;

use crate::*;

/// Diagnostic codes a codec can report while classifying a layer. Those are
/// never fatal: the affected layer degrades to opaque payload and the code is
/// attached to the event for observability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagCode {
    /// Buffer too short to hold the mandatory ESP header, trailer and ICV.
    EspHeaderTrunc,
    /// Buffer too short to hold an Ethernet header.
    EthHeaderTrunc,
    /// Buffer too short (or inconsistent IHL) for an IPv4 header.
    Ipv4HeaderTrunc,
    /// Buffer too short to hold an IPv6 header.
    Ipv6HeaderTrunc,
    /// Buffer too short (or inconsistent data offset) for a TCP header.
    TcpHeaderTrunc,
    /// Buffer too short to hold an UDP header.
    UdpHeaderTrunc,
}

impl fmt::Display for DiagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DiagCode::*;
        write!(
            f,
            "{}",
            match self {
                EspHeaderTrunc => "esp-header-trunc",
                EthHeaderTrunc => "eth-header-trunc",
                Ipv4HeaderTrunc => "ipv4-header-trunc",
                Ipv6HeaderTrunc => "ipv6-header-trunc",
                TcpHeaderTrunc => "tcp-header-trunc",
                UdpHeaderTrunc => "udp-header-trunc",
            }
        )
    }
}

/// Diagnostics event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct DiagEvent {
    /// Codes reported while decoding the frame, in layer order.
    pub codes: Vec<DiagCode>,
}

impl EventFmt for DiagEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        write!(f, "diag [")?;
        let mut comma = DelimWriter::new(',');
        for code in self.codes.iter() {
            comma.write(f)?;
            write!(f, "{code}")?;
        }
        write!(f, "]")
    }
}
