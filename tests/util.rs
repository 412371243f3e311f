use std::path::PathBuf;

use ndarray::{Array, ArrayD, IxDyn};
use tempfile::{tempdir, TempDir};

/// A fresh directory and a file path inside of it. The directory is
/// removed when the returned guard is dropped.
pub fn temporary_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

/// An array whose values count up in row major order.
pub fn counting_volume(shape: &[usize]) -> ArrayD<u16> {
    let len: usize = shape.iter().product();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as u16).collect()).unwrap()
}
