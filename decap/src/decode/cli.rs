//! # Decode
//!
//! Decode is the main subcommand: it reads frames from a capture file, walks
//! their protocol layers and prints one event per frame to stdout.

use std::{
    io::{self, stdout, ErrorKind},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::{
    cli::*,
    config::DecodeConfig,
    decode::{
        capture::CaptureReader,
        codec::get_codecs,
        dispatch::{decode_frame, FrameMeta},
        stats::{CodecStats, GlobalStats},
    },
    process::display::*,
};
use events::{DisplayFormat, TimeFormat, TimeSpec};

#[derive(Parser, Debug, Default)]
#[command(
    name = "decode",
    about = "Decode frames from a capture file and print one event per frame."
)]
pub(crate) struct Decode {
    #[arg(help = "Capture file to read (pcap or pcapng)")]
    pub(super) input: PathBuf,
    #[arg(long, help = "Decoding configuration file (YAML)")]
    pub(super) config: Option<PathBuf>,
    #[arg(long, help = "Format used when printing an event")]
    #[clap(value_enum, default_value_t=CliDisplayFormat::MultiLine)]
    pub(super) format: CliDisplayFormat,
    #[arg(long, help = "Print events as JSON, one per line")]
    pub(super) json: bool,
    #[arg(long, help = "Print the time as UTC")]
    pub(super) utc: bool,
    #[arg(long, help = "Do not decode ESP layers; report them as opaque payload")]
    pub(super) no_esp_decoding: bool,
    #[arg(long, help = "Attach opaque payload bytes to emitted ESP sections")]
    pub(super) capture_payload: bool,
}

impl SubCommandParserRunner for Decode {
    fn run(&mut self, _: &MainConfig) -> Result<()> {
        let mut config = match &self.config {
            Some(path) => DecodeConfig::from_file(path)?,
            None => DecodeConfig::default(),
        };

        // Command line flags win over the configuration file.
        if self.no_esp_decoding {
            config.esp.decoding = false;
        }
        if self.capture_payload {
            config.esp.capture_payload = true;
        }

        let codecs = get_codecs(&config)?;
        let mut reader = CaptureReader::open(&self.input)?;

        // Formatter & printer for events.
        let format = match self.json {
            false => PrintEventFormat::Text(
                DisplayFormat::new()
                    .multiline(self.format == CliDisplayFormat::MultiLine)
                    .time_format(if self.utc {
                        TimeFormat::UtcDate
                    } else {
                        TimeFormat::Timestamp
                    }),
            ),
            true => PrintEventFormat::Json,
        };
        let mut output = PrintEvent::new(Box::new(stdout()), format);

        let mut stats = CodecStats::new();
        let mut global = GlobalStats::new();
        let mut frame = 0;

        while let Some(next) = reader.next_frame() {
            let next = next?;
            frame += 1;

            let meta = FrameMeta {
                frame,
                timestamp: TimeSpec::from(next.timestamp),
                caplen: next.data.len() as u32,
                origlen: next.origlen,
            };

            let event = decode_frame(&codecs, &next.data, &meta, &mut stats);
            if let Err(e) = output.process_one(&event) {
                match e.downcast_ref::<io::Error>() {
                    Some(io_error) if io_error.kind() == ErrorKind::BrokenPipe => break,
                    _ => return Err(e),
                }
            }
        }
        let _ = output.flush();

        global.fold(&mut stats);
        info!("{frame} frame(s) decoded from {}", self.input.display());
        global.log_summary();

        Ok(())
    }
}
