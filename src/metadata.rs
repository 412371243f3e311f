//! ImageJ metadata.
//!
//! ImageJ keeps the description of a hyperstack in two places of the
//! first TIFF page:
//!
//! - the `ImageDescription` tag, a newline separated list of `key=value`
//!   entries starting with `ImageJ=`;
//! - the private `IJMetadata` (50839) and `IJMetadataByteCounts` (50838)
//!   tags, a binary block holding the channel labels and lookup tables.
//!
//! The binary block starts with a header made of the magic number
//! `IJIJ` followed by `(type, count)` pairs, one per kind of entry. The
//! entries themselves follow the header, and the byte count tag holds
//! the length of the header and then of every entry. All integers and
//! UTF-16 text are in the byte order of the TIFF file.
use crate::error::{FijioError, Result};
use crate::lut::LookUpTable;
use crate::util::escape_non_ascii;
use byteordered::{ByteOrdered, Endianness};
use std::fmt;
use std::io::{Cursor, Read};

/// Tag number of the ImageJ metadata block.
pub const IJ_METADATA_TAG: u16 = 50839;
/// Tag number of the byte counts of the ImageJ metadata block.
pub const IJ_METADATA_BYTE_COUNTS_TAG: u16 = 50838;

/// The ImageJ version written in the description.
pub const IMAGEJ_VERSION: &str = "1.11a";

/// Magic number of the metadata block, `IJIJ`.
const MAGIC: u32 = 0x494a_494a;
/// Entry type of channel labels, `labl`.
const LABELS: u32 = 0x6c61_626c;
/// Entry type of lookup tables, `luts`.
const LUTS: u32 = 0x6c75_7473;

/// How ImageJ displays the channels of a hyperstack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Channels are overlaid, each through its own lookup table.
    Composite,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Composite => f.write_str("composite"),
        }
    }
}

/// Fit a label list to the number of channels.
///
/// Missing labels are named after their channel index (`C1`, `C2`, ...),
/// extra labels are dropped.
///
/// # Example
///
/// ```
/// # use fijio::metadata::pad_labels;
/// let labels = pad_labels(&["Nuclei".to_string()], 3);
/// assert_eq!(labels, vec!["Nuclei", "C1", "C2"]);
/// ```
pub fn pad_labels(labels: &[String], channels: usize) -> Vec<String> {
    let mut out: Vec<String> = labels.iter().take(channels).cloned().collect();
    out.extend((out.len()..channels).map(|i| format!("C{}", i)));
    out
}

/// The ImageJ metadata of a hyperstack, as assembled by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageJMetadata {
    /// Distance between consecutive slices.
    pub spacing: f64,
    /// Unit of `spacing` and of the resolution.
    pub unit: String,
    /// Axes of the array, a subsequence of `TZCYXS`.
    pub axes: String,
    /// One lookup table per channel.
    pub luts: Vec<LookUpTable>,
    /// One label per channel.
    pub labels: Vec<String>,
    /// Display mode.
    pub mode: DisplayMode,
}

impl ImageJMetadata {
    /// Render the `ImageDescription` text of a hyperstack of the given
    /// `TZCYXS` shape.
    pub fn description(&self, shape: &[usize; 6]) -> String {
        let [frames, slices, channels, _, _, _] = *shape;
        let mut lines = vec![
            format!("ImageJ={}", IMAGEJ_VERSION),
            format!("images={}", frames * slices * channels),
        ];
        if channels > 1 {
            lines.push(format!("channels={}", channels));
        }
        if slices > 1 {
            lines.push(format!("slices={}", slices));
        }
        if frames > 1 {
            lines.push(format!("frames={}", frames));
        }
        lines.push("hyperstack=true".to_string());
        lines.push(format!("mode={}", self.mode));
        if frames > 1 {
            lines.push("loop=false".to_string());
        }
        lines.push(format!("spacing={}", self.spacing));
        lines.push(format!("unit={}", escape_non_ascii(&self.unit)));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Encode the labels and lookup tables into the `IJMetadata` block and
    /// its byte counts, with the given byte order.
    pub fn encode_tags(&self, endianness: Endianness) -> Result<(Vec<u8>, Vec<u32>)> {
        let mut header = ByteOrdered::runtime(Vec::new(), endianness);
        let mut entries: Vec<Vec<u8>> = Vec::new();
        header.write_u32(MAGIC)?;

        if !self.labels.is_empty() {
            header.write_u32(LABELS)?;
            header.write_u32(count(self.labels.len())?)?;
            for label in &self.labels {
                let mut entry = ByteOrdered::runtime(Vec::new(), endianness);
                for unit in label.encode_utf16() {
                    entry.write_u16(unit)?;
                }
                entries.push(entry.into_inner());
            }
        }
        if !self.luts.is_empty() {
            header.write_u32(LUTS)?;
            header.write_u32(count(self.luts.len())?)?;
            entries.extend(self.luts.iter().map(LookUpTable::to_bytes));
        }

        let header = header.into_inner();
        let mut byte_counts = Vec::with_capacity(entries.len() + 1);
        byte_counts.push(count(header.len())?);
        let mut data = header;
        for entry in entries {
            byte_counts.push(count(entry.len())?);
            data.extend(entry);
        }
        Ok((data, byte_counts))
    }
}

/// Decode the labels and lookup tables of an `IJMetadata` block.
///
/// The byte order is taken from the block's magic number. Entry kinds
/// other than labels and lookup tables are skipped.
pub fn decode_tags(data: &[u8], byte_counts: &[u32]) -> Result<(Vec<String>, Vec<LookUpTable>)> {
    let endianness = match data.get(..4) {
        Some(b"IJIJ") => Endianness::Big,
        Some(b"JIJI") => Endianness::Little,
        _ => return Err(invalid("missing IJIJ magic number")),
    };
    let (header_len, entry_lens) = match byte_counts.split_first() {
        Some((h, rest)) => (*h as usize, rest),
        None => return Err(invalid("empty byte counts")),
    };
    if header_len < 4 || header_len > data.len() || (header_len - 4) % 8 != 0 {
        return Err(invalid("bad header length"));
    }

    let mut header = ByteOrdered::runtime(Cursor::new(&data[4..header_len]), endianness);
    let mut kinds = Vec::new();
    for _ in 0..(header_len - 4) / 8 {
        let kind = header.read_u32()?;
        let n = header.read_u32()? as usize;
        kinds.push((kind, n));
    }

    let mut body = Cursor::new(&data[header_len..]);
    let mut lens = entry_lens.iter();
    let mut labels = Vec::new();
    let mut luts = Vec::new();
    for (kind, n) in kinds {
        for _ in 0..n {
            let len = *lens.next().ok_or_else(|| invalid("missing byte count"))? as usize;
            let remaining = body.get_ref().len() as u64 - body.position();
            if len as u64 > remaining {
                return Err(invalid("truncated entry"));
            }
            let mut entry = vec![0u8; len];
            body.read_exact(&mut entry)?;
            match kind {
                LABELS => labels.push(decode_utf16(&entry, endianness)?),
                LUTS => luts.push(LookUpTable::from_bytes(&entry)?),
                _ => {}
            }
        }
    }
    Ok((labels, luts))
}

fn decode_utf16(bytes: &[u8], endianness: Endianness) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(invalid("odd length label"));
    }
    let mut reader = ByteOrdered::runtime(bytes, endianness);
    let units = (0..bytes.len() / 2)
        .map(|_| reader.read_u16())
        .collect::<std::io::Result<Vec<u16>>>()?;
    String::from_utf16(&units).map_err(|_| invalid("label is not UTF-16"))
}

fn count(len: usize) -> Result<u32> {
    use std::convert::TryFrom;
    u32::try_from(len).map_err(|_| FijioError::DimensionTooLarge(len))
}

fn invalid(reason: &str) -> FijioError {
    FijioError::InvalidMetadata(reason.to_string())
}
