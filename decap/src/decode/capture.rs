//! Capture file input. Both the legacy pcap format and pcapng are supported;
//! the format is sniffed from the file magic.

use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
    time::Duration,
};

use anyhow::{anyhow, bail, Result};
use pcap_file::{
    pcap::PcapReader,
    pcapng::{blocks::Block, PcapNgReader},
};

/// Pcapng section header block type.
const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];
/// Legacy pcap magics: both endiannesses, plus the nanosecond variants.
const PCAP_MAGICS: [[u8; 4]; 4] = [
    [0xa1, 0xb2, 0xc3, 0xd4],
    [0xd4, 0xc3, 0xb2, 0xa1],
    [0xa1, 0xb2, 0x3c, 0x4d],
    [0x4d, 0x3c, 0xb2, 0xa1],
];

/// A single frame read from a capture file.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) timestamp: Duration,
    /// Bytes on the wire, which can exceed what was captured.
    pub(crate) origlen: u32,
    pub(crate) data: Vec<u8>,
}

/// Reader over a capture file, abstracting the underlying format.
pub(crate) enum CaptureReader {
    Pcap(PcapReader<BufReader<File>>),
    PcapNg(PcapNgReader<BufReader<File>>),
}

impl CaptureReader {
    /// Open a capture file, sniffing its format from the magic bytes.
    pub(crate) fn open(path: &Path) -> Result<CaptureReader> {
        let mut file = File::open(path)
            .map_err(|e| anyhow!("Could not open {}: {e}", path.display()))?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)
            .map_err(|e| anyhow!("Could not read {}: {e}", path.display()))?;
        file.seek(SeekFrom::Start(0))?;

        let reader = BufReader::new(file);
        if magic == PCAPNG_MAGIC {
            Ok(CaptureReader::PcapNg(PcapNgReader::new(reader)?))
        } else if PCAP_MAGICS.contains(&magic) {
            Ok(CaptureReader::Pcap(PcapReader::new(reader)?))
        } else {
            bail!("{} is not a pcap or pcapng file", path.display());
        }
    }

    /// Read the next frame, if any. Pcapng blocks that do not carry a packet
    /// are skipped.
    pub(crate) fn next_frame(&mut self) -> Option<Result<Frame>> {
        match self {
            CaptureReader::Pcap(reader) => match reader.next_packet()? {
                Ok(packet) => Some(Ok(Frame {
                    timestamp: packet.timestamp,
                    origlen: packet.orig_len,
                    data: packet.data.into_owned(),
                })),
                Err(e) => Some(Err(e.into())),
            },
            CaptureReader::PcapNg(reader) => loop {
                match reader.next_block()? {
                    Ok(Block::EnhancedPacket(packet)) => {
                        return Some(Ok(Frame {
                            timestamp: packet.timestamp,
                            origlen: packet.original_len,
                            data: packet.data.into_owned(),
                        }))
                    }
                    // Interface descriptions, statistics, etc.
                    Ok(_) => continue,
                    Err(e) => return Some(Err(e.into())),
                }
            },
        }
    }
}
