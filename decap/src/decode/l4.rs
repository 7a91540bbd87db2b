//! TCP and UDP codecs. Both are leaves: the remaining bytes are application
//! payload and the walk stops there.

use anyhow::Result;
use events::{DiagCode, Event, TcpEvent, UdpEvent};
use pnet_packet::{tcp::TcpPacket, udp::UdpPacket};

use crate::decode::codec::{Codec, Codecs, DecodeOutcome, ProtocolId};

pub(crate) struct TcpCodec {}

impl TcpCodec {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {})
    }
}

impl Codec for TcpCodec {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::TCP]
    }

    fn decode(&self, data: &[u8], _: &Codecs, event: &mut Event) -> DecodeOutcome {
        let tcp = match TcpPacket::new(data) {
            Some(tcp) => tcp,
            None => {
                return DecodeOutcome::not_structured(data.len())
                    .with_diag(DiagCode::TcpHeaderTrunc)
            }
        };

        // Data offset is in 32-bit words and includes options.
        let hlen = tcp.get_data_offset() as usize * 4;
        if hlen < TcpPacket::minimum_packet_size() || hlen > data.len() {
            return DecodeOutcome::not_structured(data.len())
                .with_diag(DiagCode::TcpHeaderTrunc);
        }

        event.tcp = Some(TcpEvent {
            sport: tcp.get_source(),
            dport: tcp.get_destination(),
            seq: tcp.get_sequence(),
            ack_seq: tcp.get_acknowledgement(),
            flags: tcp.get_flags() as u16,
            window: tcp.get_window(),
        });

        DecodeOutcome::stop(hlen).with_payload(hlen..data.len())
    }
}

pub(crate) struct UdpCodec {}

impl UdpCodec {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {})
    }
}

impl Codec for UdpCodec {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::UDP]
    }

    fn decode(&self, data: &[u8], _: &Codecs, event: &mut Event) -> DecodeOutcome {
        let udp = match UdpPacket::new(data) {
            Some(udp) => udp,
            None => {
                return DecodeOutcome::not_structured(data.len())
                    .with_diag(DiagCode::UdpHeaderTrunc)
            }
        };

        event.udp = Some(UdpEvent {
            sport: udp.get_source(),
            dport: udp.get_destination(),
            len: udp.get_length(),
        });

        let hlen = UdpPacket::minimum_packet_size();
        DecodeOutcome::stop(hlen).with_payload(hlen..data.len())
    }
}
