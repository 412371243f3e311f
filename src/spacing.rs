//! Physical pixel size handling.
//!
//! Spacing is given outermost axis first, e.g. `(z, y, x)`. The writer
//! reduces it to three values in reversed order, `(x, y, z)`: the first
//! two become the TIFF resolution tags and the last one is stored as
//! the ImageJ `spacing` entry.
use crate::util::to_rational;

/// The spacing used when none is given.
pub const DEFAULT_SPACING: [f64; 3] = [1., 1., 1.];

/// Normalize a spacing tuple.
///
/// Shorter tuples are padded with zeros at the front up to three values.
/// Longer tuples keep only their first two values. The result is then
/// reversed.
///
/// # Example
///
/// ```
/// # use fijio::spacing::normalize_spacing;
/// assert_eq!(normalize_spacing(&[2.0, 0.5]), vec![0.5, 2.0, 0.0]);
/// assert_eq!(normalize_spacing(&[3.0, 0.2, 0.1]), vec![0.1, 0.2, 3.0]);
/// assert_eq!(normalize_spacing(&[1.0, 2.0, 3.0, 4.0]), vec![2.0, 1.0]);
/// ```
pub fn normalize_spacing(spacing: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = if spacing.len() < 3 {
        let mut padded = vec![0.; 3 - spacing.len()];
        padded.extend_from_slice(spacing);
        padded
    } else if spacing.len() > 3 {
        spacing[..2].to_vec()
    } else {
        spacing.to_vec()
    };
    out.reverse();
    out
}

/// The (x, y) resolution in pixels per unit: the reciprocal of the first
/// two components of a normalized spacing.
pub fn resolution(spacing: &[f64]) -> (f64, f64) {
    let component = |i: usize| spacing.get(i).copied().unwrap_or(0.);
    (1. / component(0), 1. / component(1))
}

/// The spacing between slices: the last component of a normalized spacing.
pub fn slice_spacing(spacing: &[f64]) -> f64 {
    spacing.last().copied().unwrap_or(0.)
}

/// A resolution value as a TIFF rational, or `None` if it cannot be
/// represented (zero spacing yields an infinite resolution).
pub fn resolution_rational(value: f64) -> Option<tiff::encoder::Rational> {
    to_rational(value).map(|(n, d)| tiff::encoder::Rational { n, d })
}
