//! Reading back the ImageJ metadata of a TIFF file.
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::ifd::Value;
use tiff::decoder::Decoder;
use tiff::tags::Tag;

use crate::error::{FijioError, Result};
use crate::lut::LookUpTable;
use crate::metadata::{decode_tags, IJ_METADATA_BYTE_COUNTS_TAG, IJ_METADATA_TAG};
use crate::util::unescape_non_ascii;

/// What ImageJ would find in a TIFF file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageJFile {
    /// ImageJ version of the description.
    pub version: String,
    /// Number of planes in the hyperstack.
    pub images: usize,
    /// Number of channels.
    pub channels: usize,
    /// Number of slices.
    pub slices: usize,
    /// Number of frames.
    pub frames: usize,
    /// Whether the file is flagged as a hyperstack.
    pub hyperstack: bool,
    /// Display mode, e.g. `composite`.
    pub mode: Option<String>,
    /// Unit of the spacing and resolution.
    pub unit: Option<String>,
    /// Distance between slices.
    pub spacing: Option<f64>,
    /// Number of TIFF pages.
    pub pages: usize,
    /// Columns of the first page.
    pub width: u32,
    /// Rows of the first page.
    pub height: u32,
    /// Horizontal resolution, pixels per unit.
    pub x_resolution: Option<f64>,
    /// Vertical resolution, pixels per unit.
    pub y_resolution: Option<f64>,
    /// Channel labels.
    pub labels: Vec<String>,
    /// Channel lookup tables.
    pub luts: Vec<LookUpTable>,
}

impl ImageJFile {
    /// Read the ImageJ metadata of the TIFF file at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Self::from_reader(file)
    }

    /// Read the ImageJ metadata of a TIFF file from `source`.
    ///
    /// # Errors
    ///
    /// `InvalidMetadata` if the first page has no ImageJ description or
    /// carries a malformed metadata block. Failures of the TIFF decoder
    /// itself are reported as `Tiff`.
    pub fn from_reader<R: Read + Seek>(source: R) -> Result<Self> {
        let mut decoder = Decoder::new(source)?;
        let description = match decoder.find_tag(Tag::ImageDescription)? {
            Some(Value::Ascii(text)) => text,
            Some(_) => return Err(FijioError::InvalidMetadata("description is not text".to_string())),
            None => return Err(FijioError::InvalidMetadata("no image description".to_string())),
        };
        let mut file = Self::from_description(&description)?;

        let (width, height) = decoder.dimensions()?;
        file.width = width;
        file.height = height;
        file.x_resolution = rational(decoder.find_tag(Tag::XResolution)?);
        file.y_resolution = rational(decoder.find_tag(Tag::YResolution)?);

        let byte_counts = decoder.find_tag(Tag::Unknown(IJ_METADATA_BYTE_COUNTS_TAG))?;
        let block = decoder.find_tag(Tag::Unknown(IJ_METADATA_TAG))?;
        if let (Some(byte_counts), Some(block)) = (byte_counts, block) {
            let byte_counts = byte_counts.into_u32_vec()?;
            let block = into_bytes(block)?;
            let (labels, luts) = decode_tags(&block, &byte_counts)?;
            file.labels = labels;
            file.luts = luts;
        }

        while decoder.more_images() {
            decoder.next_image()?;
            file.pages += 1;
        }
        Ok(file)
    }

    /// Parse an ImageJ description. Fields which the text leaves out
    /// take their ImageJ defaults.
    pub fn from_description(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let version = match lines.next().and_then(|l| l.strip_prefix("ImageJ=")) {
            Some(v) => v.to_string(),
            None => {
                return Err(FijioError::InvalidMetadata(
                    "description does not start with ImageJ=".to_string(),
                ))
            }
        };

        let mut file = ImageJFile {
            version,
            images: 1,
            channels: 1,
            slices: 1,
            frames: 1,
            hyperstack: false,
            mode: None,
            unit: None,
            spacing: None,
            pages: 1,
            width: 0,
            height: 0,
            x_resolution: None,
            y_resolution: None,
            labels: Vec::new(),
            luts: Vec::new(),
        };
        for (key, value) in lines.filter_map(|l| {
            let mut parts = l.splitn(2, '=');
            Some((parts.next()?, parts.next()?))
        }) {
            match key {
                "images" => file.images = parse(key, value)?,
                "channels" => file.channels = parse(key, value)?,
                "slices" => file.slices = parse(key, value)?,
                "frames" => file.frames = parse(key, value)?,
                "hyperstack" => file.hyperstack = value == "true",
                "mode" => file.mode = Some(value.to_string()),
                "unit" => file.unit = Some(unescape_non_ascii(value)),
                "spacing" => file.spacing = Some(parse(key, value)?),
                _ => {}
            }
        }
        Ok(file)
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FijioError::InvalidMetadata(format!("bad value for {}: {}", key, value)))
}

fn rational(value: Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Rational(n, d)) if d != 0 => Some(f64::from(n) / f64::from(d)),
        _ => None,
    }
}

fn into_bytes(value: Value) -> Result<Vec<u8>> {
    match value {
        Value::List(values) => values.into_iter().map(byte).collect(),
        other => byte(other).map(|b| vec![b]),
    }
}

fn byte(value: Value) -> Result<u8> {
    let wide = match value {
        Value::Byte(b) => return Ok(b),
        Value::Unsigned(v) => u64::from(v),
        Value::UnsignedBig(v) => v,
        _ => return Err(FijioError::InvalidMetadata("metadata block is not bytes".to_string())),
    };
    u8::try_from(wide).map_err(|_| FijioError::InvalidMetadata(format!("byte out of range: {}", wide)))
}
