//! Internal representation of events. Those events can be marshaled/unmarshaled
//! to other formats to be stored or displayed. We currently support: JSON.
//!
//! As an example, a full JSON output should look like:
//!
//! {
//!     "common": {
//!         "frame": 12,
//!         "timestamp": {"sec": 1706788801, "nsec": 0},
//!         "caplen": 98,
//!         "origlen": 98
//!     },
//!     "eth": {
//!         "src": "2a:d8:50:85:6b:d4",
//!         "dst": "3e:99:12:5e:b9:e6",
//!         "etype": 2048
//!     },
//!     "ip": {
//!         "saddr": "10.0.42.1",
//!         "daddr": "10.0.42.2",
//!         "version": 4,
//!         "ttl": 64,
//!         "protocol": 50,
//!         "len": 84
//!     },
//!     "esp": {
//!         "spi": 3735928559,
//!         "sequence": 1,
//!         "trusted": true
//!     }
//! }

use anyhow::Result;

use crate::{display::*, *};

/// Full event. Internal representation.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Event {
    /// Common section.
    pub common: Option<CommonEvent>,
    /// Ethernet section.
    pub eth: Option<EthEvent>,
    /// IPv4/IPv6 section.
    pub ip: Option<IpEvent>,
    /// TCP section.
    pub tcp: Option<TcpEvent>,
    /// UDP section.
    pub udp: Option<UdpEvent>,
    /// ESP section.
    pub esp: Option<EspEvent>,
    /// Diagnostics section.
    pub diag: Option<DiagEvent>,
}

impl Event {
    pub fn new() -> Event {
        Event::default()
    }

    /// Create an Event from a json string.
    pub fn from_json(line: String) -> Result<Event> {
        Ok(serde_json::from_str(line.as_str())?)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl EventFmt for Event {
    fn event_fmt(&self, f: &mut std::fmt::Formatter, format: &DisplayFormat) -> std::fmt::Result {
        // First format the event line starting with the always-there {common}
        // section.
        if let Some(common) = &self.common {
            common.event_fmt(f, format)?;
        }

        // Separator between each following section.
        let sep = if format.multiline { "\n  " } else { " " };

        // Format the rest of the optional sections, in layer order.
        [
            self.eth.as_ref().map(|s| s as &dyn EventDisplay),
            self.ip.as_ref().map(|s| s as &dyn EventDisplay),
            self.tcp.as_ref().map(|s| s as &dyn EventDisplay),
            self.udp.as_ref().map(|s| s as &dyn EventDisplay),
            self.esp.as_ref().map(|s| s as &dyn EventDisplay),
            self.diag.as_ref().map(|s| s as &dyn EventDisplay),
        ]
        .iter()
        .try_for_each(|section| {
            if let Some(section) = section {
                write!(f, "{sep}")?;
                return section.event_fmt(f, format);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        let mut event = Event::new();
        event.common = Some(CommonEvent {
            frame: 12,
            timestamp: TimeSpec::new(1706788801, 0),
            caplen: 98,
            origlen: 98,
        });
        event.esp = Some(EspEvent {
            spi: 0xdeadbeef,
            sequence: 1,
            payload_len: Some(64),
            trusted: true,
            ..Default::default()
        });
        event
    }

    #[test]
    fn event_json_roundtrip() {
        let event = event();

        let json = serde_json::to_string(&event.to_json().unwrap()).unwrap();
        let back = Event::from_json(json).unwrap();

        let esp = back.esp.unwrap();
        assert_eq!(esp.spi, 0xdeadbeef);
        assert_eq!(esp.sequence, 1);
        assert_eq!(esp.payload_len, Some(64));
        assert!(esp.trusted);
        assert!(!esp.unsure_encap);
        assert_eq!(esp.next_protocol, None);
        assert_eq!(back.common.unwrap().frame, 12);
    }

    #[test]
    fn event_skips_none_sections() {
        let json = serde_json::to_string(&event().to_json().unwrap()).unwrap();
        assert!(!json.contains("\"tcp\""));
        assert!(!json.contains("\"next_protocol\""));
    }

    #[test]
    fn event_display() {
        let event = event();

        let single = format!("{}", event.display(&DisplayFormat::new()));
        assert!(single.contains("esp spi 0xdeadbeef seq 1"));
        assert!(single.contains("[trusted]"));
        assert!(!single.contains('\n'));

        let multi = format!("{}", event.display(&DisplayFormat::new().multiline(true)));
        assert!(multi.contains('\n'));
    }
}
