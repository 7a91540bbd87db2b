//! Link layer codec. Every frame walk starts here.

use anyhow::Result;
use events::{DiagCode, EthEvent, Event};
use pnet_packet::ethernet::EthernetPacket;

use crate::decode::codec::{Codec, Codecs, DecodeOutcome, ProtocolId};

pub(crate) struct EthernetCodec {}

impl EthernetCodec {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {})
    }
}

impl Codec for EthernetCodec {
    fn name(&self) -> &'static str {
        "eth"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::ETHERNET]
    }

    fn decode(&self, data: &[u8], _: &Codecs, event: &mut Event) -> DecodeOutcome {
        let eth = match EthernetPacket::new(data) {
            Some(eth) => eth,
            None => {
                return DecodeOutcome::not_structured(data.len())
                    .with_diag(DiagCode::EthHeaderTrunc)
            }
        };

        let etype = eth.get_ethertype().0;
        event.eth = Some(EthEvent {
            src: eth.get_source().to_string(),
            dst: eth.get_destination().to_string(),
            etype,
        });

        DecodeOutcome::next_layer(ProtocolId(etype), EthernetPacket::minimum_packet_size())
    }
}
