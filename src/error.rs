//! Types for error handling go here.
use std::io::Error as IOError;
use tiff::TiffError;

quick_error! {
    /// Error type for all error kinds in this crate.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum FijioError {
        /// The array could not be arranged into the requested axis order.
        /// This happens when the axes string names an axis outside of
        /// `TZCYXS`, repeats an axis, or does not have one character per
        /// array dimension.
        ShapeMismatch(reason: String) {
            display("Shape mismatch: {}", reason)
        }
        /// A named color is not part of the fixed palette.
        UnknownColor(name: String) {
            display("Unknown color `{}`", name)
        }
        /// The samples axis (`S`) has a size which ImageJ cannot store
        /// for this element type.
        UnsupportedSamples(samples: usize, element: &'static str) {
            display("Unsupported number of samples per pixel for {}: {}", element, samples)
        }
        /// A dimension is too large to fit in a TIFF image directory.
        DimensionTooLarge(size: usize) {
            display("Dimension too large for a TIFF page: {}", size)
        }
        /// The ImageJ description or metadata block is malformed.
        InvalidMetadata(reason: String) {
            display("Invalid ImageJ metadata: {}", reason)
        }
        /// Error raised by the TIFF codec.
        Tiff(err: TiffError) {
            from()
            source(err)
            display("TIFF codec error: {}", err)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, FijioError>;
