//! IPsec ESP codec.
//!
//! ESP carries no in-band flag telling whether its payload is encrypted, so
//! classification is heuristic: the trailer is read as if the payload were
//! cleartext and the pad length is checked for plausibility. Implausible
//! trailers mean the payload is (most likely) encrypted and the remaining
//! bytes are handed off as an opaque trusted blob.

use anyhow::Result;
use byteorder::{BigEndian, ByteOrder};
use events::{DiagCode, EspEvent, Event, RawPayload};

use crate::{
    config::EspConfig,
    decode::codec::{Codec, Codecs, DecodeOutcome, ProtocolId},
};

/// SPI (32 bits) plus sequence number (32 bits).
const ESP_HEADER_LEN: usize = 8;
/// ICV size for the authentication algorithms we expect. Variable-length on
/// the wire but 96 bits in practice (HMAC-SHA1-96, HMAC-MD5-96).
const ESP_AUTH_DATA_LEN: usize = 12;
/// Pad length byte plus next header byte.
const ESP_TRAILER_LEN: usize = 2;

/// Smallest buffer that can hold a header, a trailer and an ICV.
const ESP_MIN_LEN: usize = ESP_HEADER_LEN + ESP_AUTH_DATA_LEN + ESP_TRAILER_LEN;

pub(crate) struct EspCodec {
    /// Administrative switch. When unset ESP buffers are left alone.
    enabled: bool,
    /// Attach the opaque payload bytes to the emitted section.
    capture_payload: bool,
}

impl EspCodec {
    pub(crate) fn from_config(config: &EspConfig) -> Result<Self> {
        Ok(Self {
            enabled: config.decoding,
            capture_payload: config.capture_payload,
        })
    }

    fn payload(&self, data: &[u8], start: usize, end: usize) -> Option<RawPayload> {
        match self.capture_payload {
            true => Some(RawPayload(data[start..end].to_vec())),
            false => None,
        }
    }
}

impl Codec for EspCodec {
    fn name(&self) -> &'static str {
        "esp"
    }

    fn protocols(&self) -> &'static [ProtocolId] {
        &[ProtocolId::ESP]
    }

    fn decode(&self, data: &[u8], codecs: &Codecs, event: &mut Event) -> DecodeOutcome {
        let len = data.len();

        if !self.enabled {
            return DecodeOutcome::not_structured(len).skipped();
        }

        if len < ESP_MIN_LEN {
            return DecodeOutcome::not_structured(len).with_diag(DiagCode::EspHeaderTrunc);
        }

        let mut esp = EspEvent {
            spi: BigEndian::read_u32(&data[0..4]),
            sequence: BigEndian::read_u32(&data[4..8]),
            ..Default::default()
        };

        // Read the trailer as if the payload were cleartext. The pad length
        // and next header bytes sit right before the ICV, in the last
        // ESP_TRAILER_LEN + ESP_AUTH_DATA_LEN bytes of the buffer.
        let mut lyr_len = ESP_MIN_LEN;
        let pad_length = data[ESP_HEADER_LEN + len - lyr_len] as usize;
        let next = data[ESP_HEADER_LEN + len - lyr_len + 1];

        // Plausibility check. A pad length larger than the buffer cannot be
        // a real one; the bytes we just read are ciphertext or ICV. Same
        // when honoring the pad would claim bytes past the end of the
        // buffer.
        if pad_length >= len || lyr_len + pad_length > len {
            esp.payload_len = Some((len - ESP_MIN_LEN) as u32);
            esp.trusted = true;
            esp.payload = self.payload(data, ESP_HEADER_LEN, len - ESP_MIN_LEN + ESP_HEADER_LEN);
            event.esp = Some(esp);

            return DecodeOutcome::stop(len)
                .with_payload(ESP_HEADER_LEN..len - ESP_MIN_LEN + ESP_HEADER_LEN)
                .trusted();
        }

        // Cleartext-structured: the padding is part of this layer.
        lyr_len += pad_length;
        esp.pad_length = Some(pad_length as u8);
        esp.next_protocol = Some(next);

        if !codecs.has_codec(ProtocolId::from(next)) {
            // The trailer parsed but nothing can handle what it points to.
            // Don't pretend the classification is right.
            esp.unsure_encap = true;
            event.esp = Some(esp);

            return DecodeOutcome::stop(lyr_len).unsure_encap();
        }

        esp.payload_len = Some((len - lyr_len) as u32);
        esp.trusted = true;
        esp.payload = self.payload(data, ESP_HEADER_LEN, ESP_HEADER_LEN + len - lyr_len);
        event.esp = Some(esp);

        DecodeOutcome::next_layer(ProtocolId::from(next), lyr_len)
            .with_payload(ESP_HEADER_LEN..ESP_HEADER_LEN + len - lyr_len)
            .trusted()
    }
}
