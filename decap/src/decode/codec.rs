//! Protocol identifiers, the codec trait and the codec group all codecs are
//! registered in.

use std::{fmt, ops::Range};

use anyhow::{bail, Result};
use events::DiagCode;

use crate::{
    config::DecodeConfig,
    decode::{
        esp::EspCodec,
        ethernet::EthernetCodec,
        ip::{Ipv4Codec, Ipv6Codec},
        l4::{TcpCodec, UdpCodec},
    },
};

/// Protocol identifier a codec can be looked up by.
///
/// Ethertypes and IP protocol numbers live in a single space: IP protocol
/// numbers fit in a u8 and ethertypes are >= 0x0600 per IEEE 802.3, so the
/// two ranges never collide. Link-level pseudo identifiers are placed in the
/// gap between them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct ProtocolId(pub(crate) u16);

impl ProtocolId {
    /// Pseudo identifier for the link layer, where walking a frame starts.
    pub(crate) const ETHERNET: ProtocolId = ProtocolId(0x0100);

    pub(crate) const ETHERTYPE_IPV4: ProtocolId = ProtocolId(0x0800);
    pub(crate) const ETHERTYPE_IPV6: ProtocolId = ProtocolId(0x86dd);

    pub(crate) const IPIP: ProtocolId = ProtocolId(4);
    pub(crate) const TCP: ProtocolId = ProtocolId(6);
    pub(crate) const UDP: ProtocolId = ProtocolId(17);
    pub(crate) const IPV6: ProtocolId = ProtocolId(41);
    pub(crate) const ESP: ProtocolId = ProtocolId(50);
}

impl From<u8> for ProtocolId {
    fn from(protocol: u8) -> Self {
        ProtocolId(protocol as u16)
    }
}

// Allow using ProtocolId in log messages.
impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// How the walk proceeds after a codec ran.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Verdict {
    /// A next layer was identified; keep walking with the given protocol.
    Continue(ProtocolId),
    /// The codec terminated the walk on purpose (leaf protocol, or payload
    /// handed off as an opaque blob).
    Stop,
    /// The data did not parse as this protocol.
    NotStructured,
}

/// Everything a codec reports back about the slice it was handed.
#[derive(Debug)]
pub(crate) struct DecodeOutcome {
    pub(crate) verdict: Verdict,
    /// Bytes consumed from the front of the slice. Always <= the slice
    /// length, even when the protocol headers claim more.
    pub(crate) consumed: usize,
    /// Range of the slice holding an opaque payload no further codec will
    /// inspect.
    pub(crate) payload: Option<Range<usize>>,
    /// The payload was positively classified; later stages can skip it.
    pub(crate) trusted: bool,
    /// A next protocol was parsed but no codec is registered for it.
    pub(crate) unsure_encap: bool,
    /// The codec was administratively disabled and did not process anything.
    pub(crate) skipped: bool,
    /// Diagnostic raised while parsing, if any.
    pub(crate) diag: Option<DiagCode>,
}

impl DecodeOutcome {
    pub(crate) fn next_layer(next: ProtocolId, consumed: usize) -> Self {
        Self {
            verdict: Verdict::Continue(next),
            consumed,
            payload: None,
            trusted: false,
            unsure_encap: false,
            skipped: false,
            diag: None,
        }
    }

    pub(crate) fn stop(consumed: usize) -> Self {
        Self {
            verdict: Verdict::Stop,
            consumed,
            payload: None,
            trusted: false,
            unsure_encap: false,
            skipped: false,
            diag: None,
        }
    }

    pub(crate) fn not_structured(len: usize) -> Self {
        Self {
            verdict: Verdict::NotStructured,
            consumed: 0,
            payload: Some(0..len),
            trusted: false,
            unsure_encap: false,
            skipped: false,
            diag: None,
        }
    }

    pub(crate) fn with_payload(mut self, payload: Range<usize>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub(crate) fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    pub(crate) fn unsure_encap(mut self) -> Self {
        self.unsure_encap = true;
        self
    }

    pub(crate) fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub(crate) fn with_diag(mut self, diag: DiagCode) -> Self {
        self.diag = Some(diag);
        self
    }
}

/// Trait that must be implemented by codecs.
pub(crate) trait Codec {
    /// Unique name, used as the per-codec statistics key.
    fn name(&self) -> &'static str;

    /// Protocol identifiers this codec handles.
    fn protocols(&self) -> &'static [ProtocolId];

    /// Decode the front of `data`, filling the matching event section, and
    /// report how the walk proceeds. `codecs` gives access to the group so a
    /// codec can check whether its next protocol can be handled at all.
    fn decode(&self, data: &[u8], codecs: &Codecs, event: &mut events::Event) -> DecodeOutcome;
}

impl fmt::Debug for dyn Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codec ({})", self.name())
    }
}

/// All codecs are registered there. The following is the main API and object
/// to manipulate them.
pub(crate) struct Codecs {
    /// Set of registered codecs we can use.
    codecs: Vec<Box<dyn Codec>>,
}

impl Codecs {
    pub(crate) fn new() -> Result<Codecs> {
        Ok(Codecs { codecs: Vec::new() })
    }

    /// Register a codec.
    ///
    /// ```
    /// codecs
    ///     .register(Box::new(FirstCodec::new()?))?
    ///     .register(Box::new(SecondCodec::new()?))?;
    /// ```
    pub(crate) fn register(&mut self, codec: Box<dyn Codec>) -> Result<&mut Self> {
        // Ensure uniqueness of the handled protocols. This is important as
        // they are used as lookup keys while walking a frame.
        for id in codec.protocols() {
            if self.get(*id).is_some() {
                bail!(
                    "Could not insert codec '{}'; protocol {} already registered",
                    codec.name(),
                    id,
                );
            }
        }

        self.codecs.push(codec);
        Ok(self)
    }

    /// Get the codec handling a given protocol, if any.
    pub(crate) fn get(&self, id: ProtocolId) -> Option<&dyn Codec> {
        self.codecs
            .iter()
            .find(|c| c.protocols().contains(&id))
            .map(|c| c.as_ref())
    }

    /// Check whether a codec is registered for a given protocol.
    pub(crate) fn has_codec(&self, id: ProtocolId) -> bool {
        self.get(id).is_some()
    }
}

pub(crate) fn get_codecs(config: &DecodeConfig) -> Result<Codecs> {
    let mut group = Codecs::new()?;

    // Register all codecs here.
    group
        .register(Box::new(EthernetCodec::new()?))?
        .register(Box::new(Ipv4Codec::new()?))?
        .register(Box::new(Ipv6Codec::new()?))?
        .register(Box::new(TcpCodec::new()?))?
        .register(Box::new(UdpCodec::new()?))?
        .register(Box::new(EspCodec::from_config(&config.esp)?))?;

    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_codecs() {
        let codecs = super::get_codecs(&DecodeConfig::default());
        assert!(codecs.is_ok());

        let codecs = codecs.unwrap();
        assert!(codecs.has_codec(ProtocolId::ETHERNET));
        assert!(codecs.has_codec(ProtocolId::ESP));
        assert!(!codecs.has_codec(ProtocolId(0xff)));
    }

    #[test]
    fn register_overlap() {
        let config = DecodeConfig::default();
        let mut group = Codecs::new().unwrap();
        assert!(group
            .register(Box::new(EspCodec::from_config(&config.esp).unwrap()))
            .is_ok());
        assert!(group
            .register(Box::new(EspCodec::from_config(&config.esp).unwrap()))
            .is_err());
    }
}
