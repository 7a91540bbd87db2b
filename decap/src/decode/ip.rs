//! IPv4 and IPv6 codecs. Both are registered for their ethertype and for
//! their IP protocol number so IP-in-IP nesting walks the same path.

use anyhow::Result;
use events::{DiagCode, Event, IpEvent};
use pnet_packet::{ipv4::Ipv4Packet, ipv6::Ipv6Packet};

use crate::decode::codec::{Codec, Codecs, DecodeOutcome, ProtocolId};

pub(crate) struct Ipv4Codec {}

impl Ipv4Codec {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {})
    }
}

impl Codec for Ipv4Codec {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::ETHERTYPE_IPV4, ProtocolId::IPIP]
    }

    fn decode(&self, data: &[u8], _: &Codecs, event: &mut Event) -> DecodeOutcome {
        let ip = match Ipv4Packet::new(data) {
            Some(ip) => ip,
            None => {
                return DecodeOutcome::not_structured(data.len())
                    .with_diag(DiagCode::Ipv4HeaderTrunc)
            }
        };

        // IHL is in 32-bit words and includes options; it can claim more
        // bytes than were captured.
        let hlen = ip.get_header_length() as usize * 4;
        if hlen < Ipv4Packet::minimum_packet_size() || hlen > data.len() {
            return DecodeOutcome::not_structured(data.len())
                .with_diag(DiagCode::Ipv4HeaderTrunc);
        }

        let protocol = ip.get_next_level_protocol().0;
        event.ip = Some(IpEvent {
            saddr: ip.get_source().to_string(),
            daddr: ip.get_destination().to_string(),
            version: 4,
            ttl: ip.get_ttl(),
            protocol,
            len: ip.get_total_length(),
        });

        DecodeOutcome::next_layer(ProtocolId::from(protocol), hlen)
    }
}

pub(crate) struct Ipv6Codec {}

impl Ipv6Codec {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {})
    }
}

impl Codec for Ipv6Codec {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::ETHERTYPE_IPV6, ProtocolId::IPV6]
    }

    fn decode(&self, data: &[u8], _: &Codecs, event: &mut Event) -> DecodeOutcome {
        let ip = match Ipv6Packet::new(data) {
            Some(ip) => ip,
            None => {
                return DecodeOutcome::not_structured(data.len())
                    .with_diag(DiagCode::Ipv6HeaderTrunc)
            }
        };

        let protocol = ip.get_next_header().0;
        event.ip = Some(IpEvent {
            saddr: ip.get_source().to_string(),
            daddr: ip.get_destination().to_string(),
            version: 6,
            ttl: ip.get_hop_limit(),
            protocol,
            len: ip.get_payload_length(),
        });

        DecodeOutcome::next_layer(
            ProtocolId::from(protocol),
            Ipv6Packet::minimum_packet_size(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::codec::Verdict;

    fn ipv4_header(protocol: u8) -> Vec<u8> {
        #[rustfmt::skip]
        let header = vec![
            0x45, 0x00, 0x00, 0x54, // version/ihl, tos, total length 84
            0x47, 0xf7, 0x40, 0x00, // id, flags/frag off
            0x40, protocol, 0x00, 0x00, // ttl 64, protocol, checksum
            10, 0, 42, 1, // saddr
            10, 0, 42, 2, // daddr
        ];
        header
    }

    #[test]
    fn decode_ipv4() {
        let mut data = ipv4_header(50);
        data.extend_from_slice(&[0; 64]);

        let codecs = Codecs::new().unwrap();
        let mut event = Event::new();
        let outcome = Ipv4Codec::new().unwrap().decode(&data, &codecs, &mut event);

        assert_eq!(outcome.verdict, Verdict::Continue(ProtocolId::ESP));
        assert_eq!(outcome.consumed, 20);

        let ip = event.ip.unwrap();
        assert_eq!(ip.saddr, "10.0.42.1");
        assert_eq!(ip.daddr, "10.0.42.2");
        assert_eq!(ip.version, 4);
        assert_eq!(ip.ttl, 64);
        assert_eq!(ip.protocol, 50);
        assert_eq!(ip.len, 84);
    }

    #[test]
    fn decode_ipv4_bad_ihl() {
        let mut data = ipv4_header(6);
        // Claim 15 words of header with only 20 bytes captured.
        data[0] = 0x4f;

        let codecs = Codecs::new().unwrap();
        let mut event = Event::new();
        let outcome = Ipv4Codec::new().unwrap().decode(&data, &codecs, &mut event);

        assert_eq!(outcome.verdict, Verdict::NotStructured);
        assert_eq!(outcome.diag, Some(DiagCode::Ipv4HeaderTrunc));
        assert!(event.ip.is_none());
    }

    #[test]
    fn decode_ipv6() {
        #[rustfmt::skip]
        let mut data = vec![
            0x60, 0x00, 0x00, 0x00, // version, tc, flow label
            0x00, 0x40, 6, 64, // payload length 64, next header TCP, hop limit
        ];
        data.extend_from_slice(&"1111::1".parse::<std::net::Ipv6Addr>().unwrap().octets());
        data.extend_from_slice(&"1111::2".parse::<std::net::Ipv6Addr>().unwrap().octets());
        data.extend_from_slice(&[0; 64]);

        let codecs = Codecs::new().unwrap();
        let mut event = Event::new();
        let outcome = Ipv6Codec::new().unwrap().decode(&data, &codecs, &mut event);

        assert_eq!(outcome.verdict, Verdict::Continue(ProtocolId::TCP));
        assert_eq!(outcome.consumed, 40);

        let ip = event.ip.unwrap();
        assert_eq!(ip.saddr, "1111::1");
        assert_eq!(ip.daddr, "1111::2");
        assert_eq!(ip.version, 6);
        assert_eq!(ip.ttl, 64);
        assert_eq!(ip.protocol, 6);
        assert_eq!(ip.len, 64);
    }

    #[test]
    fn decode_ipv6_short() {
        let codecs = Codecs::new().unwrap();
        let mut event = Event::new();
        let outcome = Ipv6Codec::new()
            .unwrap()
            .decode(&[0x60; 39], &codecs, &mut event);

        assert_eq!(outcome.verdict, Verdict::NotStructured);
        assert_eq!(outcome.diag, Some(DiagCode::Ipv6HeaderTrunc));
    }
}
