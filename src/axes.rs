//! Axis order handling.
//!
//! ImageJ hyperstacks are always laid out in the order `TZCYXS` (time,
//! depth, channel, rows, columns, samples). Arrays handed to the writer
//! carry an axes string describing their own dimension order, which is
//! reconciled here with the canonical order before encoding.
use crate::error::{FijioError, Result};
use ndarray::{ArrayBase, Axis, IxDyn, RawData};

/// The axis order of an ImageJ hyperstack.
pub const CANONICAL_AXES: &str = "TZCYXS";

/// Resolve the axes string that the array will be written with.
///
/// When `axes` is exactly the canonical order, it is taken as a request
/// for the trailing `ndim` axes of `TZCYX` (the samples axis is only
/// kept for 6-dimensional arrays). Otherwise the result holds the axes
/// of `axes` which belong to the canonical order, in canonical order.
///
/// # Example
///
/// ```
/// # use fijio::axes::normalize_axes;
/// assert_eq!(normalize_axes("TZCYXS", 3), "CYX");
/// assert_eq!(normalize_axes("CZYX", 4), "ZCYX");
/// ```
pub fn normalize_axes(axes: &str, ndim: usize) -> String {
    if axes == CANONICAL_AXES {
        let len = CANONICAL_AXES.len();
        if ndim >= len {
            return CANONICAL_AXES.to_string();
        }
        let start = len.saturating_sub(ndim + 1);
        CANONICAL_AXES[start..len - 1].to_string()
    } else {
        CANONICAL_AXES.chars().filter(|c| axes.contains(*c)).collect()
    }
}

/// Rearrange `array`, currently in `from` order, into `to` order.
///
/// Axes of `to` which are absent from `from` are inserted with length 1.
/// This operation does not copy the array's elements, only its strides
/// are rearranged.
///
/// # Errors
///
/// Fails with `ShapeMismatch` if `from` names an axis that is not in
/// `to`, repeats an axis, or does not have one axis per dimension.
pub fn transpose_axes<S>(
    array: ArrayBase<S, IxDyn>,
    from: &str,
    to: &str,
) -> Result<ArrayBase<S, IxDyn>>
where
    S: RawData,
{
    if let Some(ax) = from.chars().find(|c| !to.contains(*c)) {
        return Err(FijioError::ShapeMismatch(format!("unknown axis {}", ax)));
    }
    let to_axes: Vec<char> = to.chars().collect();
    let from_axes: Vec<char> = from.chars().collect();
    for (axes, text) in [(&to_axes, to), (&from_axes, from)].iter() {
        if let Some(ax) = first_repeated(axes) {
            return Err(FijioError::ShapeMismatch(format!(
                "repeated axis {} in {}",
                ax, text
            )));
        }
    }
    if from_axes.len() != array.ndim() {
        return Err(FijioError::ShapeMismatch(format!(
            "axes {} do not match array of shape {:?}",
            from,
            array.shape()
        )));
    }

    let mut axes = from_axes;
    let mut array = array;
    for ax in to_axes.iter().rev() {
        if !axes.contains(ax) {
            axes.insert(0, *ax);
            array = array.insert_axis(Axis(0));
        }
    }

    let permutation: Vec<usize> = to_axes
        .iter()
        .filter_map(|ax| axes.iter().position(|c| c == ax))
        .collect();
    Ok(array.permuted_axes(permutation))
}

fn first_repeated(axes: &[char]) -> Option<char> {
    axes.iter()
        .enumerate()
        .find(|(i, c)| axes[..*i].contains(c))
        .map(|(_, c)| *c)
}

/// The number of channels: the length of the `C` axis, or 1 if the
/// array has no channel axis.
pub fn channel_count(axes: &str, shape: &[usize]) -> usize {
    axis_len(axes, shape, 'C').unwrap_or(1)
}

/// The length of the given axis, if present in both `axes` and `shape`.
pub fn axis_len(axes: &str, shape: &[usize], axis: char) -> Option<usize> {
    axes.chars()
        .position(|c| c == axis)
        .and_then(|i| shape.get(i).copied())
}

/// Expand a shape into the six canonical ImageJ dimensions, in
/// `TZCYXS` order. Absent axes have length 1.
pub fn imagej_shape(axes: &str, shape: &[usize]) -> [usize; 6] {
    let mut out = [1; 6];
    for (i, ax) in CANONICAL_AXES.chars().enumerate() {
        if let Some(len) = axis_len(axes, shape, ax) {
            out[i] = len;
        }
    }
    out
}
