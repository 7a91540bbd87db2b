use std::fmt;

use crate::*;

/// ESP event section.
///
/// ESP gives no in-band indication of whether its payload is encrypted; the
/// classification below is the result of a heuristic, not of cryptographic
/// validation.
#[serde_with::skip_serializing_none]
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct EspEvent {
    /// Security Parameters Index.
    pub spi: u32,
    /// Sequence number.
    pub sequence: u32,
    /// Padding length read from the trailer, when the packet was classified
    /// as cleartext-structured.
    pub pad_length: Option<u8>,
    /// Next protocol from the trailer, when classified as structured.
    pub next_protocol: Option<u8>,
    /// Bytes of payload between the fixed header and the trailer region.
    pub payload_len: Option<u32>,
    /// The remaining bytes form an opaque blob no further stage inspects.
    pub trusted: bool,
    /// A next protocol was parsed but no codec is available for it.
    pub unsure_encap: bool,
    /// The opaque payload itself, when capturing it is enabled.
    pub payload: Option<RawPayload>,
}

impl EventFmt for EspEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, _: &DisplayFormat) -> fmt::Result {
        write!(f, "esp spi {:#010x} seq {}", self.spi, self.sequence)?;

        match self.next_protocol {
            Some(next) => {
                let protocol = match protocol_str(next) {
                    Some(s) => format!(" {s}"),
                    None => String::new(),
                };
                write!(f, " next{protocol} ({next})")?;
            }
            None => {
                if let Some(len) = self.payload_len {
                    write!(f, " encrypted payload {len} bytes")?;
                }
            }
        }

        if self.trusted || self.unsure_encap {
            write!(f, " [")?;
            let mut comma = DelimWriter::new(',');
            if self.trusted {
                comma.write(f)?;
                write!(f, "trusted")?;
            }
            if self.unsure_encap {
                comma.write(f)?;
                write!(f, "unsure-encap")?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}
