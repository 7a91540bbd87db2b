use std::fmt;

use crate::*;

/// Common event section.
#[derive(Clone, Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct CommonEvent {
    /// Index of the frame in the capture, starting at 1.
    pub frame: u64,
    /// Capture timestamp.
    pub timestamp: TimeSpec,
    /// Number of bytes available in the capture for this frame.
    pub caplen: u32,
    /// Original on-wire length of the frame.
    pub origlen: u32,
}

impl EventFmt for CommonEvent {
    fn event_fmt(&self, f: &mut fmt::Formatter, format: &DisplayFormat) -> fmt::Result {
        match format.time_format {
            TimeFormat::Timestamp => write!(
                f,
                "{} {}.{:09}",
                self.frame,
                self.timestamp.sec(),
                self.timestamp.nsec()
            )?,
            TimeFormat::UtcDate => {
                write!(f, "{} {}", self.frame, format_utc_date(self.timestamp))?
            }
        }

        if self.caplen != self.origlen {
            write!(f, " caplen {}/{}", self.caplen, self.origlen)?;
        }

        Ok(())
    }
}
