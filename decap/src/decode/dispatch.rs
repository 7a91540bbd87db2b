//! Frame walk. Starts at the link layer and follows each codec's outcome
//! until a codec stops, fails to parse or no codec is registered for the
//! next protocol.

use events::{CommonEvent, DiagEvent, Event, TimeSpec};

use crate::decode::{
    codec::{Codecs, ProtocolId, Verdict},
    stats::CodecStats,
};

/// Capture metadata of a single frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameMeta {
    /// 1-based index of the frame in the capture.
    pub(crate) frame: u64,
    pub(crate) timestamp: TimeSpec,
    /// Bytes actually captured.
    pub(crate) caplen: u32,
    /// Bytes on the wire.
    pub(crate) origlen: u32,
}

/// Walk the layers of a single frame and build its event.
pub(crate) fn decode_frame(
    codecs: &Codecs,
    data: &[u8],
    meta: &FrameMeta,
    stats: &mut CodecStats,
) -> Event {
    let mut event = Event::new();
    event.common = Some(CommonEvent {
        frame: meta.frame,
        timestamp: meta.timestamp,
        caplen: meta.caplen,
        origlen: meta.origlen,
    });

    let mut protocol = ProtocolId::ETHERNET;
    let mut offset = 0;
    let mut diags = Vec::new();

    while offset < data.len() {
        let codec = match codecs.get(protocol) {
            Some(codec) => codec,
            None => break,
        };

        let outcome = codec.decode(&data[offset..], codecs, &mut event);
        if !outcome.skipped {
            stats.processed(codec.name());
        }
        if let Some(code) = outcome.diag {
            stats.discarded(codec.name());
            diags.push(code);
        }

        match outcome.verdict {
            Verdict::Continue(next) => {
                // Codecs report consumed <= slice length; clamp anyway so a
                // misbehaving one cannot push us out of bounds.
                offset += outcome.consumed.min(data.len() - offset);
                protocol = next;
            }
            Verdict::Stop | Verdict::NotStructured => break,
        }
    }

    if !diags.is_empty() {
        event.diag = Some(DiagEvent { codes: diags });
    }

    event
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, ByteOrder};
    use events::DiagCode;

    use super::*;
    use crate::{config::DecodeConfig, decode::codec::get_codecs};

    fn meta(caplen: u32) -> FrameMeta {
        FrameMeta {
            frame: 1,
            timestamp: TimeSpec::new(1706788801, 0),
            caplen,
            origlen: caplen,
        }
    }

    /// Ethernet + IPv4 headers carrying the given protocol.
    fn eth_ipv4(protocol: u8, payload_len: usize) -> Vec<u8> {
        #[rustfmt::skip]
        let mut data = vec![
            0x3e, 0x99, 0x12, 0x5e, 0xb9, 0xe6, // dst
            0x2a, 0xd8, 0x50, 0x85, 0x6b, 0xd4, // src
            0x08, 0x00, // IPv4
            0x45, 0x00, 0x00, 0x00, // version/ihl, tos, total length
            0x47, 0xf7, 0x40, 0x00,
            0x40, protocol, 0x00, 0x00,
            10, 0, 42, 1,
            10, 0, 42, 2,
        ];
        BigEndian::write_u16(&mut data[16..18], (20 + payload_len) as u16);
        data
    }

    /// ESP layer with the trailer bytes set as if the payload were cleartext.
    fn esp(len: usize, pad_length: u8, next: u8) -> Vec<u8> {
        let mut data = vec![0xaa; len];
        BigEndian::write_u32(&mut data[0..4], 0xdeadbeef);
        BigEndian::write_u32(&mut data[4..8], 7);
        data[len - 14] = pad_length;
        data[len - 13] = next;
        data
    }

    #[test]
    fn walk_eth_ipv4_esp_encrypted() {
        let mut data = eth_ipv4(50, 64);
        data.extend(esp(64, 255, 0));

        let codecs = get_codecs(&DecodeConfig::default()).unwrap();
        let mut stats = CodecStats::new();
        let event = decode_frame(&codecs, &data, &meta(data.len() as u32), &mut stats);

        let common = event.common.unwrap();
        assert_eq!(common.frame, 1);
        assert_eq!(common.caplen, 98);

        assert_eq!(event.eth.unwrap().etype, 0x0800);
        assert_eq!(event.ip.unwrap().protocol, 50);

        let esp = event.esp.unwrap();
        assert_eq!(esp.spi, 0xdeadbeef);
        assert_eq!(esp.sequence, 7);
        assert!(esp.trusted);
        assert_eq!(esp.payload_len, Some(42));
        assert!(event.diag.is_none());

        assert_eq!(stats.get("eth").processed, 1);
        assert_eq!(stats.get("ipv4").processed, 1);
        assert_eq!(stats.get("esp").processed, 1);
        assert_eq!(stats.get("esp").discards, 0);
    }

    #[test]
    fn walk_eth_ipv4_esp_udp() {
        // Cleartext ESP with 2 bytes of padding: the walk resumes 22 + 2
        // bytes into the buffer, where we place an 8-byte UDP header.
        let mut data = eth_ipv4(50, 32);
        let mut inner = esp(32, 2, 17);
        #[rustfmt::skip]
        inner[24..32].copy_from_slice(&[
            0x42, 0xf9, 0x17, 0xc1, // sport 17145, dport 6081
            0x00, 0x0a, 0x00, 0x00, // length 10, checksum
        ]);
        data.extend(inner);

        let codecs = get_codecs(&DecodeConfig::default()).unwrap();
        let mut stats = CodecStats::new();
        let event = decode_frame(&codecs, &data, &meta(data.len() as u32), &mut stats);

        let esp = event.esp.unwrap();
        assert_eq!(esp.next_protocol, Some(17));
        assert_eq!(esp.pad_length, Some(2));
        assert!(esp.trusted);

        let udp = event.udp.unwrap();
        assert_eq!(udp.sport, 17145);
        assert_eq!(udp.dport, 6081);

        assert_eq!(stats.get("udp").processed, 1);
    }

    #[test]
    fn walk_truncated_esp() {
        let mut data = eth_ipv4(50, 10);
        data.extend(vec![0xaa; 10]);

        let codecs = get_codecs(&DecodeConfig::default()).unwrap();
        let mut stats = CodecStats::new();
        let event = decode_frame(&codecs, &data, &meta(data.len() as u32), &mut stats);

        assert!(event.esp.is_none());
        assert_eq!(event.diag.unwrap().codes, vec![DiagCode::EspHeaderTrunc]);

        assert_eq!(stats.get("esp").processed, 1);
        assert_eq!(stats.get("esp").discards, 1);
    }

    #[test]
    fn walk_esp_disabled() {
        let mut data = eth_ipv4(50, 64);
        data.extend(esp(64, 255, 0));

        let mut config = DecodeConfig::default();
        config.esp.decoding = false;

        let codecs = get_codecs(&config).unwrap();
        let mut stats = CodecStats::new();
        let event = decode_frame(&codecs, &data, &meta(data.len() as u32), &mut stats);

        assert!(event.esp.is_none());
        assert!(event.diag.is_none());

        // A skipped codec does not account anything.
        assert_eq!(stats.get("esp").processed, 0);
        assert_eq!(stats.get("eth").processed, 1);
    }

    #[test]
    fn walk_unknown_ethertype() {
        let mut data = eth_ipv4(50, 0);
        data[12] = 0x88;
        data[13] = 0xcc; // LLDP, no codec registered

        let codecs = get_codecs(&DecodeConfig::default()).unwrap();
        let mut stats = CodecStats::new();
        let event = decode_frame(&codecs, &data, &meta(data.len() as u32), &mut stats);

        assert!(event.eth.is_some());
        assert!(event.ip.is_none());
        assert_eq!(stats.get("eth").processed, 1);
        assert_eq!(stats.get("ipv4").processed, 0);
    }
}
