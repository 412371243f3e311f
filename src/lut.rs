//! Per-channel lookup tables.
use crate::color::{gradient, ColorSpec};
use crate::error::{FijioError, Result};
use ndarray::{Array2, ArrayView2};
use rgb::RGB;

/// Number of entries in a lookup table.
pub const LUT_SIZE: usize = 256;

/// An 8-bit lookup table mapping intensities to a display color.
///
/// The table has shape `(3, 256)`: one row per red, green and blue
/// component, one column per intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct LookUpTable(Array2<u8>);

impl LookUpTable {
    /// Build the table of a linear ramp from black to `color`.
    ///
    /// Each component is scaled to `[0, 255]` and rounded up.
    pub fn from_color(color: RGB<f64>) -> Self {
        let black = RGB::new(0., 0., 0.);
        let stops = gradient(black, color, LUT_SIZE);
        let top = (LUT_SIZE - 1) as f64;
        let table = Array2::from_shape_fn((3, LUT_SIZE), |(row, i)| {
            let stop = stops[i];
            let value = match row {
                0 => stop.r,
                1 => stop.g,
                _ => stop.b,
            };
            quantize(value * top)
        });
        LookUpTable(table)
    }

    /// Resolve a channel color and build its table.
    pub fn from_spec(color: &ColorSpec) -> Result<Self> {
        Ok(Self::from_color(color.resolve()?))
    }

    /// Rebuild a table from its serialized form (768 bytes, red row first).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Array2::from_shape_vec((3, LUT_SIZE), bytes.to_vec())
            .map(LookUpTable)
            .map_err(|_| {
                FijioError::InvalidMetadata(format!(
                    "lookup table of {} bytes, expected {}",
                    bytes.len(),
                    3 * LUT_SIZE
                ))
            })
    }

    /// The table as a `(3, 256)` array.
    pub fn as_array(&self) -> ArrayView2<u8> {
        self.0.view()
    }

    /// The display color of the given intensity.
    pub fn get(&self, intensity: u8) -> RGB<u8> {
        let i = usize::from(intensity);
        RGB::new(self.0[[0, i]], self.0[[1, i]], self.0[[2, i]])
    }

    /// Serialize the table, red row first.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().copied().collect()
    }

    /// Take the table's array, discarding the wrapper.
    pub fn into_array(self) -> Array2<u8> {
        self.0
    }
}

/// Round up to the next integer in `[0, 255]`. Values within float noise
/// of an integer are taken as that integer, so a component of 0.1 gives 7
/// at intensity 70 where a plain ceiling of the float product may give 8.
fn quantize(value: f64) -> u8 {
    let nearest = value.round();
    let value = if (value - nearest).abs() < 1e-9 {
        nearest
    } else {
        value.ceil()
    };
    value.max(0.).min(255.) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiples_are_not_rounded_up() {
        for &(component, expected) in &[(0.1, 7), (0.2, 14), (0.9, 63)] {
            let lut = LookUpTable::from_color(RGB::new(component, 0., 0.));
            assert_eq!(lut.get(70).r, expected);
        }
    }

    #[test]
    fn black_table_is_empty() {
        let lut = LookUpTable::from_color(RGB::new(0., 0., 0.));
        assert_eq!(lut.as_array().shape(), &[3, 256]);
        assert!(lut.as_array().iter().all(|v| *v == 0));
    }

    #[test]
    fn white_table_is_identity_ramp() {
        let lut = LookUpTable::from_spec(&ColorSpec::default()).unwrap();
        let ramp: Vec<u8> = (0..=255).collect();
        for row in lut.as_array().outer_iter() {
            assert_eq!(row.to_vec(), ramp);
        }
    }

    #[test]
    fn red_table_ramps_red_only() {
        let lut = LookUpTable::from_spec(&"red".into()).unwrap();
        assert_eq!(lut.get(0), RGB::new(0, 0, 0));
        assert_eq!(lut.get(128), RGB::new(128, 0, 0));
        assert_eq!(lut.get(255), RGB::new(255, 0, 0));
    }

    #[test]
    fn half_intensity_rounds_up() {
        let lut = LookUpTable::from_color(RGB::new(0.5, 0., 0.));
        assert_eq!(lut.get(1).r, 1);
        assert_eq!(lut.get(2).r, 1);
        assert_eq!(lut.get(3).r, 2);
        assert_eq!(lut.get(255).r, 128);
    }

    #[test]
    fn out_of_range_color_is_clamped() {
        let lut = LookUpTable::from_color(RGB::new(2., -1., 0.));
        assert_eq!(lut.get(255), RGB::new(255, 0, 0));
    }

    #[test]
    fn unknown_color_fails() {
        assert!(matches!(
            LookUpTable::from_spec(&"orange".into()),
            Err(FijioError::UnknownColor(_))
        ));
    }

    #[test]
    fn bytes_layout() {
        let lut = LookUpTable::from_spec(&"green".into()).unwrap();
        let bytes = lut.to_bytes();
        assert_eq!(bytes.len(), 768);
        assert_eq!(&bytes[..256], &[0u8; 256][..]);
        assert_eq!(bytes[256 + 200], 200);
        assert_eq!(LookUpTable::from_bytes(&bytes).unwrap(), lut);
        assert!(LookUpTable::from_bytes(&bytes[1..]).is_err());
        let _: Array2<u8> = lut.into_array();
    }
}
