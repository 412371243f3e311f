//! Utility functions to write ImageJ hyperstacks.
//!
//! An [`ImageJWriter`] holds an array together with loosely specified
//! metadata: an axes string in any order, a spacing tuple of any length,
//! and channel colors and labels which may not cover every channel.
//! Writing reconciles all of it with the array's shape, builds one lookup
//! table per channel, and encodes a multi-page TIFF file that ImageJ and
//! Fiji open as a composite hyperstack.
//!
//! # Example
//!
//! ```no_run
//! use fijio::ImageJWriter;
//! use ndarray::Array4;
//! # fn run() -> fijio::Result<()> {
//! let data = Array4::<u16>::zeros((3, 32, 64, 64));
//! let mut writer = ImageJWriter::new("cells.tif", data)
//!     .axes("CZYX")
//!     .spacing(&[2.0, 0.1625, 0.1625])
//!     .unit("micron")
//!     .colors(vec!["red", "green", "blue"])
//!     .labels(vec!["Nuclei"]);
//! writer.write()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ImageJWriter`]: ./struct.ImageJWriter.html
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteordered::Endianness;
use log::{debug, error, warn};
use ndarray::{Array, ArrayD, ArrayViewD, Dimension};
use tiff::encoder::TiffEncoder;

use crate::axes::{channel_count, imagej_shape, normalize_axes, transpose_axes, CANONICAL_AXES};
use crate::color::{pad_colors, ColorSpec};
use crate::element::{ImageJElement, Page, PageTags};
use crate::error::{FijioError, Result};
use crate::lut::LookUpTable;
use crate::metadata::{pad_labels, DisplayMode, ImageJMetadata};
use crate::spacing::{normalize_spacing, resolution, resolution_rational, slice_spacing, DEFAULT_SPACING};

/// The unit used when none is given.
pub const DEFAULT_UNIT: &str = "pixels";
/// The axes string used when none is given.
pub const DEFAULT_AXES: &str = "TCZYX";

/// Writes an array and its metadata to an ImageJ TIFF file.
///
/// Fields are stored as given and only checked when writing. Every call
/// to [`write`] or [`write_with`] normalizes a fresh copy of the stored
/// fields, so writing twice produces the same file.
///
/// [`write`]: #method.write
/// [`write_with`]: #method.write_with
#[derive(Debug, Clone)]
pub struct ImageJWriter<A> {
    path: PathBuf,
    data: ArrayD<A>,
    spacing: Vec<f64>,
    unit: String,
    axes: String,
    colors: Vec<ColorSpec>,
    labels: Vec<String>,
}

impl<A> ImageJWriter<A>
where
    A: ImageJElement,
{
    /// Prepare a writer of `data` to the file at `path`, with default
    /// metadata: spacing `(1, 1, 1)`, unit `pixels`, axes `TCZYX`, white
    /// channels and no labels.
    pub fn new<P, D>(path: P, data: Array<A, D>) -> Self
    where
        P: AsRef<Path>,
        D: Dimension,
    {
        ImageJWriter {
            path: path.as_ref().to_owned(),
            data: data.into_dyn(),
            spacing: DEFAULT_SPACING.to_vec(),
            unit: DEFAULT_UNIT.to_string(),
            axes: DEFAULT_AXES.to_string(),
            colors: vec![ColorSpec::default()],
            labels: Vec::new(),
        }
    }

    /// Set the physical size of a pixel, outermost axis first.
    pub fn spacing(mut self, spacing: &[f64]) -> Self {
        self.spacing = spacing.to_vec();
        self
    }

    /// Set the unit of the spacing.
    pub fn unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = unit.into();
        self
    }

    /// Set the axes of the array, one character per dimension out of
    /// `TZCYXS`.
    pub fn axes<S: Into<String>>(mut self, axes: S) -> Self {
        self.axes = axes.into();
        self
    }

    /// Set the channel colors.
    pub fn colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorSpec>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the channel labels.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// The path of the file to write.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The array to write, as stored.
    pub fn data(&self) -> &ArrayD<A> {
        &self.data
    }

    /// Write the file with the stored fields.
    pub fn write(&mut self) -> Result<()> {
        self.write_with(WriteOverrides::default())
    }

    /// Replace the stored fields with the given overrides, then write the
    /// file. The overrides stay in place for later writes.
    pub fn write_with(&mut self, overrides: WriteOverrides<A>) -> Result<()> {
        self.apply(overrides);
        let normalized = self.normalize()?;
        normalized.write_to(&self.path)
    }

    /// Run `f` on this writer. A failure is logged before being returned
    /// to the caller unchanged.
    pub fn scope<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        f(self).map_err(|e| {
            error!("ImageJWriter error caught: {}", e);
            e
        })
    }

    /// Reconcile the stored fields with the array's shape, without
    /// touching the file system.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the axes do not describe the array, or if the
    ///   array is empty.
    /// - `UnsupportedSamples` if the element type cannot be written with
    ///   the size of the `S` axis.
    /// - `UnknownColor` if a channel color is not in the palette.
    pub fn normalize(&self) -> Result<Normalized<'_, A>> {
        let ndim = self.data.ndim();
        let axes = normalize_axes(&self.axes, ndim);
        let data = if self.axes == CANONICAL_AXES {
            if axes.len() != ndim {
                return Err(FijioError::ShapeMismatch(format!(
                    "axes {} do not match array of shape {:?}",
                    axes,
                    self.data.shape()
                )));
            }
            self.data.view()
        } else {
            transpose_axes(self.data.view(), &self.axes, &axes)?
        };
        debug!("axes {} normalized to {}, shape {:?}", self.axes, axes, data.shape());
        if data.is_empty() {
            return Err(FijioError::ShapeMismatch(format!(
                "empty hyperstack of shape {:?}",
                data.shape()
            )));
        }
        A::check_samples(imagej_shape(&axes, data.shape())[5])?;

        let spacing = normalize_spacing(&self.spacing);
        let channels = channel_count(&axes, data.shape());
        let colors = pad_colors(&self.colors, channels);
        let labels = pad_labels(&self.labels, channels);
        debug!("{} channel(s), spacing {:?}", channels, spacing);

        let luts = colors
            .iter()
            .map(LookUpTable::from_spec)
            .collect::<Result<Vec<_>>>()?;

        let metadata = ImageJMetadata {
            spacing: slice_spacing(&spacing),
            unit: self.unit.clone(),
            axes,
            luts,
            labels,
            mode: DisplayMode::Composite,
        };
        Ok(Normalized {
            data,
            spacing,
            colors,
            metadata,
        })
    }

    fn apply(&mut self, overrides: WriteOverrides<A>) {
        let WriteOverrides {
            path,
            data,
            spacing,
            unit,
            axes,
            colors,
            labels,
        } = overrides;

        if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
            self.path = path;
        }
        // an array given as override always wins, even an empty one
        if let Some(data) = data {
            self.data = data;
        }
        if let Some(spacing) = spacing.filter(|s| !s.is_empty()) {
            self.spacing = spacing;
        }
        if let Some(unit) = unit.filter(|u| !u.is_empty()) {
            self.unit = unit;
        }
        if let Some(axes) = axes.filter(|a| !a.is_empty()) {
            self.axes = axes;
        }
        if let Some(colors) = colors.filter(|c| !c.is_empty()) {
            self.colors = colors;
        }
        if let Some(labels) = labels.filter(|l| !l.is_empty()) {
            self.labels = labels;
        }
    }
}

/// Fields replacing those of an [`ImageJWriter`] for one write.
///
/// Empty strings and lists are ignored. An array, once given, is always
/// used.
///
/// [`ImageJWriter`]: ./struct.ImageJWriter.html
#[derive(Debug, Clone)]
pub struct WriteOverrides<A> {
    path: Option<PathBuf>,
    data: Option<ArrayD<A>>,
    spacing: Option<Vec<f64>>,
    unit: Option<String>,
    axes: Option<String>,
    colors: Option<Vec<ColorSpec>>,
    labels: Option<Vec<String>>,
}

impl<A> Default for WriteOverrides<A> {
    fn default() -> Self {
        WriteOverrides {
            path: None,
            data: None,
            spacing: None,
            unit: None,
            axes: None,
            colors: None,
            labels: None,
        }
    }
}

impl<A> WriteOverrides<A> {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write to another path.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_owned());
        self
    }

    /// Write another array.
    pub fn data<D: Dimension>(mut self, data: Array<A, D>) -> Self {
        self.data = Some(data.into_dyn());
        self
    }

    /// Use another spacing.
    pub fn spacing(mut self, spacing: &[f64]) -> Self {
        self.spacing = Some(spacing.to_vec());
        self
    }

    /// Use another unit.
    pub fn unit<S: Into<String>>(mut self, unit: S) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Use another axes string.
    pub fn axes<S: Into<String>>(mut self, axes: S) -> Self {
        self.axes = Some(axes.into());
        self
    }

    /// Use other channel colors.
    pub fn colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ColorSpec>,
    {
        self.colors = Some(colors.into_iter().map(Into::into).collect());
        self
    }

    /// Use other channel labels.
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

/// The outcome of normalizing an [`ImageJWriter`]: the array in
/// canonical axis order and the metadata ready to be encoded.
///
/// [`ImageJWriter`]: ./struct.ImageJWriter.html
#[derive(Debug, Clone)]
pub struct Normalized<'a, A> {
    data: ArrayViewD<'a, A>,
    spacing: Vec<f64>,
    colors: Vec<ColorSpec>,
    metadata: ImageJMetadata,
}

impl<'a, A> Normalized<'a, A>
where
    A: ImageJElement,
{
    /// The array, with its axes in `TZCYXS` order.
    pub fn data(&self) -> &ArrayViewD<'a, A> {
        &self.data
    }

    /// The normalized spacing, innermost axis first.
    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    /// One color per channel.
    pub fn colors(&self) -> &[ColorSpec] {
        &self.colors
    }

    /// The ImageJ metadata.
    pub fn metadata(&self) -> &ImageJMetadata {
        &self.metadata
    }

    /// The number of channels.
    pub fn channels(&self) -> usize {
        self.metadata.luts.len()
    }

    /// The shape of the hyperstack in `TZCYXS` order.
    pub fn imagej_shape(&self) -> [usize; 6] {
        imagej_shape(&self.metadata.axes, self.data.shape())
    }

    /// Encode the hyperstack, creating or truncating the file at `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let shape = self.imagej_shape();
        let [_, _, _, height, width, samples] = shape;
        let page_len = height * width * samples;

        let description = self.metadata.description(&shape);
        let (block, byte_counts) = self.metadata.encode_tags(Endianness::native())?;
        let (x_resolution, y_resolution) = resolution(&self.spacing);
        let first = PageTags {
            description: Some(description.as_str()),
            ij_metadata: Some((block.as_slice(), byte_counts.as_slice())),
            x_resolution: rational_or_unit(x_resolution),
            y_resolution: rational_or_unit(y_resolution),
        };
        let rest = first.continuation();

        let width = u32::try_from(width).map_err(|_| FijioError::DimensionTooLarge(width))?;
        let height = u32::try_from(height).map_err(|_| FijioError::DimensionTooLarge(height))?;
        let values: Vec<A> = self.data.iter().copied().collect();
        debug!(
            "writing {} page(s) of {}x{} to {}",
            values.len() / page_len,
            width,
            height,
            path.display()
        );

        let mut file = BufWriter::new(File::create(path)?);
        {
            let mut encoder = TiffEncoder::new(&mut file)?;
            for (i, data) in values.chunks_exact(page_len).enumerate() {
                let page = Page {
                    width,
                    height,
                    samples,
                    data,
                };
                let tags = if i == 0 { &first } else { &rest };
                A::write_page(&mut encoder, page, tags)?;
            }
        }
        file.flush()?;
        Ok(())
    }
}

fn rational_or_unit(value: f64) -> (u32, u32) {
    match resolution_rational(value) {
        Some(r) => (r.n, r.d),
        None => {
            warn!("resolution {} cannot be stored, using 1", value);
            (1, 1)
        }
    }
}

/// Write `data`, laid out along `axes`, to an ImageJ TIFF file with
/// default metadata.
pub fn write_imagej<P, A, D>(path: P, data: Array<A, D>, axes: &str) -> Result<()>
where
    P: AsRef<Path>,
    A: ImageJElement,
    D: Dimension,
{
    ImageJWriter::new(path, data).axes(axes).write()
}
