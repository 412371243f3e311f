mod util;

use std::fs;

use approx::assert_abs_diff_eq;
use ndarray::{s, Array, Array3, Array4, Array5, IxDyn};
use pretty_assertions::assert_eq;
use rgb::RGB;
use tiff::decoder::{Decoder, DecodingResult};

use fijio::{write_imagej, FijioError, ImageJFile, ImageJWriter, LookUpTable, WriteOverrides};

use util::{counting_volume, temporary_path};

fn read_page_u16(path: &std::path::Path, index: usize) -> Vec<u16> {
    let mut decoder = Decoder::new(fs::File::open(path).unwrap()).unwrap();
    for _ in 0..index {
        decoder.next_image().unwrap();
    }
    match decoder.read_image().unwrap() {
        DecodingResult::U16(values) => values,
        _ => panic!("page is not 16-bit"),
    }
}

#[test]
fn multichannel_round_trip() {
    let (_dir, path) = temporary_path("multichannel.tif");
    let data = counting_volume(&[3, 32, 64, 64]);
    ImageJWriter::new(&path, data)
        .axes("CZYX")
        .colors(vec!["red", "green", "blue"])
        .write()
        .unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    assert_eq!(file.version, "1.11a");
    assert_eq!(file.images, 96);
    assert_eq!(file.pages, 96);
    assert_eq!(file.channels, 3);
    assert_eq!(file.slices, 32);
    assert_eq!(file.frames, 1);
    assert!(file.hyperstack);
    assert_eq!((file.width, file.height), (64, 64));
    assert_eq!(file.unit.as_deref(), Some("pixels"));
    assert_eq!(file.mode.as_deref(), Some("composite"));
    assert_eq!(file.spacing, Some(1.0));
    assert_eq!(file.labels, vec!["C0", "C1", "C2"]);
    assert_eq!(file.luts.len(), 3);
    assert_eq!(file.luts[0].get(255), RGB::new(255, 0, 0));
    assert_eq!(file.luts[1].get(255), RGB::new(0, 255, 0));
    assert_eq!(file.luts[2].get(255), RGB::new(0, 0, 255));
}

#[test]
fn pages_follow_imagej_order() {
    let (_dir, path) = temporary_path("order.tif");
    let data = counting_volume(&[2, 3, 4, 5]);
    write_imagej(&path, data.clone(), "CZYX").unwrap();

    // page index is z * channels + c
    let expected: Vec<u16> = data.slice(s![1, 2, .., ..]).iter().copied().collect();
    assert_eq!(read_page_u16(&path, 2 * 2 + 1), expected);
    let expected: Vec<u16> = data.slice(s![0, 1, .., ..]).iter().copied().collect();
    assert_eq!(read_page_u16(&path, 2), expected);
}

#[test]
fn labels_and_colors_are_padded() {
    let (_dir, path) = temporary_path("padded.tif");
    let data = Array4::<u8>::zeros((2, 3, 8, 8));
    ImageJWriter::new(&path, data)
        .axes("ZCYX")
        .colors(vec!["magenta"])
        .labels(vec!["Nuclei"])
        .write()
        .unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    assert_eq!(file.labels, vec!["Nuclei", "C1", "C2"]);
    let magenta = LookUpTable::from_spec(&"magenta".into()).unwrap();
    assert_eq!(file.luts, vec![magenta.clone(), magenta.clone(), magenta]);
}

#[test]
fn spacing_sets_resolution() {
    let (_dir, path) = temporary_path("spacing.tif");
    let data = Array3::<f32>::zeros((4, 16, 16));
    ImageJWriter::new(&path, data)
        .axes("ZYX")
        .spacing(&[2.0, 0.25, 0.5])
        .unit("\u{b5}m")
        .write()
        .unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    assert_eq!(file.unit.as_deref(), Some("\u{b5}m"));
    assert_eq!(file.spacing, Some(2.0));
    assert_abs_diff_eq!(file.x_resolution.unwrap(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(file.y_resolution.unwrap(), 4.0, epsilon = 1e-9);
    assert_eq!(file.slices, 4);
    assert_eq!(file.labels, vec!["C0"]);
}

#[test]
fn time_series_of_doubles() {
    let (_dir, path) = temporary_path("frames.tif");
    let data = Array::from_shape_fn((3, 2, 6, 7), |(t, c, y, x)| (t + c + y + x) as f64 * 0.5);
    ImageJWriter::new(&path, data)
        .axes("TCYX")
        .spacing(&[0.5, 0.5])
        .write()
        .unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    assert_eq!(file.frames, 3);
    assert_eq!(file.channels, 2);
    assert_eq!(file.pages, 6);
    assert_eq!(file.spacing, Some(0.0));

    let mut decoder = Decoder::new(fs::File::open(&path).unwrap()).unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::F32(values) => assert_abs_diff_eq!(values[7], 0.5),
        _ => panic!("page is not 32-bit float"),
    }
}

#[test]
fn rgb_samples() {
    let (_dir, path) = temporary_path("rgb.tif");
    let data = Array3::<u8>::from_elem((4, 5, 3), 7);
    write_imagej(&path, data, "YXS").unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    assert_eq!(file.images, 1);
    assert_eq!((file.width, file.height), (5, 4));
}

#[test]
fn unsupported_samples_keep_existing_file() {
    let (_dir, path) = temporary_path("rgb16.tif");
    write_imagej(&path, counting_volume(&[2, 8, 8]), "CYX").unwrap();
    let before = fs::read(&path).unwrap();

    let data = Array3::<u16>::zeros((4, 5, 3));
    match write_imagej(&path, data, "YXS") {
        Err(FijioError::UnsupportedSamples(3, "u16")) => {}
        other => panic!("unexpected result {:?}", other),
    }
    let after = fs::read(&path).unwrap();
    assert!(before == after);
    assert_eq!(ImageJFile::from_file(&path).unwrap().channels, 2);
}

#[test]
fn empty_channel_axis_fails_without_writing() {
    let (_dir, path) = temporary_path("empty.tif");
    let data = Array4::<u8>::zeros((2, 0, 8, 8));
    match write_imagej(&path, data, "ZCYX") {
        Err(FijioError::ShapeMismatch(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn missing_description_is_invalid_metadata() {
    let (_dir, path) = temporary_path("plain.tif");
    {
        let file = fs::File::create(&path).unwrap();
        let mut encoder = tiff::encoder::TiffEncoder::new(file).unwrap();
        encoder
            .write_image::<tiff::encoder::colortype::Gray8>(4, 2, &[0u8; 8])
            .unwrap();
    }
    match ImageJFile::from_file(&path) {
        Err(FijioError::InvalidMetadata(_)) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn write_twice_is_identical() {
    let (_dir, path) = temporary_path("twice.tif");
    let data = counting_volume(&[2, 3, 8, 8]);
    let mut writer = ImageJWriter::new(&path, data)
        .axes("CZYX")
        .spacing(&[3.0, 0.5, 0.25])
        .colors(vec!["yellow", "cyan"]);
    writer.write().unwrap();
    let first = fs::read(&path).unwrap();
    writer.write().unwrap();
    let second = fs::read(&path).unwrap();
    assert!(first == second);
}

#[test]
fn overrides_are_kept_for_later_writes() {
    let (dir, path) = temporary_path("first.tif");
    let other = dir.path().join("second.tif");
    let mut writer = ImageJWriter::new(&path, counting_volume(&[2, 8, 8])).axes("CYX");
    writer
        .write_with(
            WriteOverrides::new()
                .path(&other)
                .labels(vec!["DAPI", "GFP"])
                .unit(""),
        )
        .unwrap();
    assert!(!path.exists());
    assert_eq!(writer.path(), other.as_path());

    let file = ImageJFile::from_file(&other).unwrap();
    assert_eq!(file.labels, vec!["DAPI", "GFP"]);
    assert_eq!(file.unit.as_deref(), Some("pixels"));

    writer
        .write_with(WriteOverrides::new().data(counting_volume(&[3, 8, 8])))
        .unwrap();
    let file = ImageJFile::from_file(&other).unwrap();
    assert_eq!(file.labels, vec!["DAPI", "GFP", "C2"]);
}

#[test]
fn mismatched_axes_fail_without_writing() {
    let (_dir, path) = temporary_path("mismatch.tif");
    let data = counting_volume(&[3, 8, 8]);
    let mut writer = ImageJWriter::new(&path, data);
    let out = writer.scope(|w| w.write());
    assert!(matches!(out, Err(FijioError::ShapeMismatch(_))));
    assert!(!path.exists());
}

#[test]
fn unknown_color_fails() {
    let (_dir, path) = temporary_path("color.tif");
    let data = Array::from_elem(IxDyn(&[2, 8, 8]), 1u8);
    let mut writer = ImageJWriter::new(&path, data).axes("CYX").colors(vec!["red", "teal"]);
    match writer.write() {
        Err(FijioError::UnknownColor(name)) => assert_eq!(name, "teal"),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn five_dimensional_default_axes() {
    let (_dir, path) = temporary_path("default.tif");
    let data = Array5::<u16>::zeros((2, 3, 4, 8, 8));
    ImageJWriter::new(&path, data).write().unwrap();

    let file = ImageJFile::from_file(&path).unwrap();
    // TCZYX is reordered to TZCYX
    assert_eq!(file.frames, 2);
    assert_eq!(file.channels, 3);
    assert_eq!(file.slices, 4);
    assert_eq!(file.pages, 24);
}
