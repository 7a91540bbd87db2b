use std::io::Write;

use anyhow::Result;
use ::events::*;

/// Select the format to follow when printing events with `PrintEvent`.
pub(crate) enum PrintEventFormat {
    /// Text(format): display the events in a text representation following the
    /// rules defined in `format` (see `DisplayFormat`).
    Text(DisplayFormat),
    /// Json: display the event as JSON.
    Json,
}

/// Handles events individually and writes to a `Write`.
pub(crate) struct PrintEvent {
    writer: Box<dyn Write>,
    format: PrintEventFormat,
}

impl PrintEvent {
    pub(crate) fn new(writer: Box<dyn Write>, format: PrintEventFormat) -> Self {
        Self { writer, format }
    }

    /// Process events one by one (format & print).
    pub(crate) fn process_one(&mut self, e: &Event) -> Result<()> {
        match &self.format {
            PrintEventFormat::Text(format) => {
                let event = format!("{}", e.display(format));
                if !event.is_empty() {
                    self.writer.write_all(event.as_bytes())?;
                    self.writer
                        .write_all(if format.multiline { b"\n\n" } else { b"\n" })?;
                }
            }
            PrintEventFormat::Json => {
                let mut event = serde_json::to_vec(&e.to_json()?)?;
                event.push(b'\n');
                self.writer.write_all(&event)?;
            }
        }

        Ok(())
    }

    /// Flush underlying writers.
    pub(crate) fn flush(&mut self) -> Result<()> {
        Ok(self.writer.flush()?)
    }
}
