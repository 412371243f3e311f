//! Channel colors.
//!
//! Each channel of a hyperstack is displayed through a color, given
//! either by name from a small fixed palette or as an RGB triple with
//! components in `[0, 1]`.
use crate::error::{FijioError, Result};
use rgb::RGB;
use std::fmt;

/// The named colors understood by the writer.
pub const PALETTE: [(&str, [f64; 3]); 7] = [
    ("red", [1., 0., 0.]),
    ("green", [0., 1., 0.]),
    ("blue", [0., 0., 1.]),
    ("gray", [1., 1., 1.]),
    ("yellow", [1., 1., 0.]),
    ("cyan", [0., 1., 1.]),
    ("magenta", [1., 0., 1.]),
];

/// Look up a color of the fixed palette. Names are case sensitive.
pub fn named_color(name: &str) -> Option<RGB<f64>> {
    PALETTE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, [r, g, b])| RGB::new(*r, *g, *b))
}

/// The color of one channel.
///
/// Names are kept verbatim and only checked against the palette when
/// the color is resolved, so an unknown name surfaces as an error at
/// write time.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// A color of the fixed palette, by name.
    Named(String),
    /// An explicit RGB triple, components in `[0, 1]`.
    Rgb(RGB<f64>),
}

impl ColorSpec {
    /// Obtain the RGB triple of this color.
    ///
    /// # Errors
    ///
    /// `UnknownColor` if this is a name outside of the palette.
    pub fn resolve(&self) -> Result<RGB<f64>> {
        match self {
            ColorSpec::Rgb(rgb) => Ok(*rgb),
            ColorSpec::Named(name) => {
                named_color(name).ok_or_else(|| FijioError::UnknownColor(name.clone()))
            }
        }
    }
}

/// White, `(1, 1, 1)`.
impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::Rgb(RGB::new(1., 1., 1.))
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::Named(name) => f.write_str(name),
            ColorSpec::Rgb(c) => write!(f, "({}, {}, {})", c.r, c.g, c.b),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(name: String) -> Self {
        ColorSpec::Named(name)
    }
}

impl From<RGB<f64>> for ColorSpec {
    fn from(rgb: RGB<f64>) -> Self {
        ColorSpec::Rgb(rgb)
    }
}

impl From<(f64, f64, f64)> for ColorSpec {
    fn from((r, g, b): (f64, f64, f64)) -> Self {
        ColorSpec::Rgb(RGB::new(r, g, b))
    }
}

impl From<[f64; 3]> for ColorSpec {
    fn from([r, g, b]: [f64; 3]) -> Self {
        ColorSpec::Rgb(RGB::new(r, g, b))
    }
}

/// Linear interpolation from `start` to `end` in `steps` evenly spaced
/// stops, both ends included.
pub fn gradient(start: RGB<f64>, end: RGB<f64>, steps: usize) -> Vec<RGB<f64>> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (steps - 1) as f64;
            let lerp = |a: f64, b: f64, i: f64| (a * (last - i) + b * i) / last;
            (0..steps)
                .map(|i| {
                    let i = i as f64;
                    RGB::new(
                        lerp(start.r, end.r, i),
                        lerp(start.g, end.g, i),
                        lerp(start.b, end.b, i),
                    )
                })
                .collect()
        }
    }
}

/// Fit a color list to the number of channels.
///
/// Missing entries repeat the last color given (white if none were),
/// extra entries are dropped.
pub fn pad_colors(colors: &[ColorSpec], channels: usize) -> Vec<ColorSpec> {
    let last = colors.last().cloned().unwrap_or_default();
    colors
        .iter()
        .cloned()
        .chain(std::iter::repeat(last))
        .take(channels)
        .collect()
}
