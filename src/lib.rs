//! Write multi-dimensional arrays as ImageJ-compatible TIFF files.
//!
//! ImageJ and Fiji recognize a TIFF file as a hyperstack when its first
//! page carries an ImageJ description and, optionally, a private block of
//! metadata with channel labels and lookup tables. This crate takes an
//! [`ndarray`] array with loosely specified metadata (axes in any order,
//! partial spacing, partial color and label lists), reconciles it with the
//! array's shape, and writes the file in one call.
//!
//! # Example
//!
//! ```no_run
//! use fijio::{ImageJFile, ImageJWriter};
//! use ndarray::Array4;
//! # fn run() -> fijio::Result<()> {
//! let data = Array4::<f32>::zeros((3, 16, 128, 128));
//! ImageJWriter::new("stack.tif", data)
//!     .axes("CZYX")
//!     .colors(vec!["red", "green", "blue"])
//!     .write()?;
//!
//! let file = ImageJFile::from_file("stack.tif")?;
//! assert_eq!(file.luts.len(), 3);
//! assert_eq!(file.labels, vec!["C0", "C1", "C2"]);
//! # Ok(())
//! # }
//! ```
//!
//! [`ndarray`]: https://docs.rs/ndarray
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;

pub mod axes;
pub mod color;
pub mod element;
pub mod error;
pub mod lut;
pub mod metadata;
pub mod reader;
pub mod spacing;
pub mod writer;
mod util;

pub use crate::color::ColorSpec;
pub use crate::element::ImageJElement;
pub use crate::error::{FijioError, Result};
pub use crate::lut::LookUpTable;
pub use crate::metadata::{DisplayMode, ImageJMetadata};
pub use crate::reader::ImageJFile;
pub use crate::writer::{write_imagej, ImageJWriter, Normalized, WriteOverrides};
