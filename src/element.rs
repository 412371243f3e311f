//! This module defines the element API, which maps the sample types
//! ImageJ understands onto the color types of the TIFF encoder.
//!
//! ImageJ reads 8-bit, 16-bit and 32-bit floating point grayscale pages,
//! plus 8-bit RGB pages. Double precision arrays are narrowed to 32-bit
//! floats when written.
use crate::error::{FijioError, Result};
use crate::metadata::{IJ_METADATA_BYTE_COUNTS_TAG, IJ_METADATA_TAG};
use num_traits::AsPrimitive;
use std::io::{Seek, Write};
use tiff::encoder::colortype::{ColorType, Gray16, Gray32Float, Gray8, RGB8};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::{ResolutionUnit, Tag};

/// One page of a hyperstack: a `height` by `width` plane of pixels with
/// `samples` interleaved values each.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a, T> {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Values per pixel.
    pub samples: usize,
    /// Pixel values, row major.
    pub data: &'a [T],
}

/// The tags attached to a page besides the image layout.
#[derive(Debug, Clone, Copy)]
pub struct PageTags<'a> {
    /// ImageJ description text, first page only.
    pub description: Option<&'a str>,
    /// ImageJ metadata block and its byte counts, first page only.
    pub ij_metadata: Option<(&'a [u8], &'a [u32])>,
    /// Horizontal resolution as a `(numerator, denominator)` pair.
    pub x_resolution: (u32, u32),
    /// Vertical resolution as a `(numerator, denominator)` pair.
    pub y_resolution: (u32, u32),
}

impl<'a> PageTags<'a> {
    /// The same tags without the entries reserved to the first page.
    pub fn continuation(&self) -> Self {
        PageTags {
            description: None,
            ij_metadata: None,
            ..*self
        }
    }
}

/// Interface for array elements which can be written to an ImageJ TIFF.
pub trait ImageJElement: Copy + 'static {
    /// A short name of the element type.
    const NAME: &'static str;

    /// Check that pages of this element type can hold `samples` values
    /// per pixel. Only single sample pages are accepted by default.
    fn check_samples(samples: usize) -> Result<()> {
        if samples == 1 {
            Ok(())
        } else {
            Err(FijioError::UnsupportedSamples(samples, Self::NAME))
        }
    }

    /// Encode a page of this element type as a new TIFF directory.
    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        page: Page<'_, Self>,
        tags: &PageTags<'_>,
    ) -> Result<()>;
}

impl ImageJElement for u8 {
    const NAME: &'static str = "u8";

    fn check_samples(samples: usize) -> Result<()> {
        match samples {
            1 | 3 => Ok(()),
            n => Err(FijioError::UnsupportedSamples(n, Self::NAME)),
        }
    }

    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        page: Page<'_, Self>,
        tags: &PageTags<'_>,
    ) -> Result<()> {
        match page.samples {
            1 => encode_page::<W, Gray8>(encoder, page.width, page.height, page.data, tags),
            3 => encode_page::<W, RGB8>(encoder, page.width, page.height, page.data, tags),
            n => Err(FijioError::UnsupportedSamples(n, Self::NAME)),
        }
    }
}

impl ImageJElement for u16 {
    const NAME: &'static str = "u16";

    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        page: Page<'_, Self>,
        tags: &PageTags<'_>,
    ) -> Result<()> {
        match page.samples {
            1 => encode_page::<W, Gray16>(encoder, page.width, page.height, page.data, tags),
            n => Err(FijioError::UnsupportedSamples(n, Self::NAME)),
        }
    }
}

impl ImageJElement for f32 {
    const NAME: &'static str = "f32";

    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        page: Page<'_, Self>,
        tags: &PageTags<'_>,
    ) -> Result<()> {
        match page.samples {
            1 => encode_page::<W, Gray32Float>(encoder, page.width, page.height, page.data, tags),
            n => Err(FijioError::UnsupportedSamples(n, Self::NAME)),
        }
    }
}

impl ImageJElement for f64 {
    const NAME: &'static str = "f64";

    fn write_page<W: Write + Seek>(
        encoder: &mut TiffEncoder<W>,
        page: Page<'_, Self>,
        tags: &PageTags<'_>,
    ) -> Result<()> {
        Self::check_samples(page.samples)?;
        let narrowed: Vec<f32> = page
            .data
            .iter()
            .map(|&v| AsPrimitive::<f32>::as_(v))
            .collect();
        encode_page::<W, Gray32Float>(encoder, page.width, page.height, &narrowed, tags)
    }
}

fn encode_page<W, C>(
    encoder: &mut TiffEncoder<W>,
    width: u32,
    height: u32,
    data: &[C::Inner],
    tags: &PageTags<'_>,
) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder.new_image::<C>(width, height)?;
    {
        let directory = image.encoder();
        if let Some(description) = tags.description {
            directory.write_tag(Tag::ImageDescription, description)?;
        }
        if let Some((block, byte_counts)) = tags.ij_metadata {
            directory.write_tag(Tag::Unknown(IJ_METADATA_BYTE_COUNTS_TAG), byte_counts)?;
            directory.write_tag(Tag::Unknown(IJ_METADATA_TAG), block)?;
        }
    }
    let (n, d) = tags.x_resolution;
    image.x_resolution(Rational { n, d });
    let (n, d) = tags.y_resolution;
    image.y_resolution(Rational { n, d });
    image.resolution_unit(ResolutionUnit::None);
    image.write_data(data)?;
    Ok(())
}
