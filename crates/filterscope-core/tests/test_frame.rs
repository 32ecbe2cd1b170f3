mod common;

use std::path::Path;

use filterscope_core::error::DecodeError;
use filterscope_core::frame::{ColorLayout, Frame};
use filterscope_core::io::{decode_image, load_image};

use common::{write_garbage, write_png};

#[test]
fn test_from_raw_shape() {
    let frame = Frame::from_raw(3, 2, ColorLayout::Rgb, (0..18).collect()).unwrap();
    assert_eq!(frame.width(), 3);
    assert_eq!(frame.height(), 2);
    assert_eq!(frame.channels(), 3);
    assert_eq!(frame.pixels().dim(), (2, 3, 3));
    // Row-major, interleaved: pixel (row 1, col 0) starts at byte 9.
    assert_eq!(frame.pixel(1, 0, 0), 9);
    assert_eq!(frame.pixel(1, 0, 2), 11);
}

#[test]
fn test_from_raw_rejects_empty() {
    let err = Frame::from_raw(0, 5, ColorLayout::Gray, vec![]).unwrap_err();
    assert!(matches!(err, DecodeError::EmptyImage { width: 0, height: 5 }));
}

#[test]
fn test_from_raw_rejects_wrong_length() {
    let err = Frame::from_raw(4, 4, ColorLayout::Rgb, vec![0; 47]).unwrap_err();
    assert!(matches!(err, DecodeError::SizeMismatch { expected: 48, actual: 47, .. }));
}

#[test]
fn test_to_gray_uses_bt601_weights() {
    let frame = Frame::filled(1, 1, ColorLayout::Rgb, &[255, 0, 0]).unwrap();
    // 0.299 * 255 = 76.2
    assert_eq!(frame.to_gray().pixel(0, 0, 0), 76);

    let frame = Frame::filled(1, 1, ColorLayout::Rgb, &[10, 200, 30]).unwrap();
    // 2.99 + 117.4 + 3.42 = 123.81
    assert_eq!(frame.to_gray().pixel(0, 0, 0), 124);
}

#[test]
fn test_gray_to_rgb_replicates() {
    let gray = Frame::filled(2, 2, ColorLayout::Gray, &[77]).unwrap();
    let rgb = gray.to_rgb();
    assert_eq!(rgb.layout(), ColorLayout::Rgb);
    assert!(rgb.pixels().iter().all(|&v| v == 77));
    assert_eq!(rgb.to_gray(), gray);
}

#[test]
fn test_to_rgb_image_matches_pixels() {
    let frame = Frame::from_raw(2, 1, ColorLayout::Rgb, vec![1, 2, 3, 4, 5, 6]).unwrap();
    let img = frame.to_rgb_image();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0).0, [4, 5, 6]);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[test]
fn test_load_png_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "grad.png", 8, 4, |x, y| [x as u8 * 10, y as u8 * 20, 7]);

    let frame = load_image(&path).unwrap();
    assert_eq!((frame.width(), frame.height()), (8, 4));
    assert_eq!(frame.layout(), ColorLayout::Rgb);
    assert_eq!(frame.pixel(3, 5, 0), 50);
    assert_eq!(frame.pixel(3, 5, 1), 60);
    assert_eq!(frame.pixel(3, 5, 2), 7);
}

#[test]
fn test_load_gray_png_stays_gray() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.png");
    image::GrayImage::from_pixel(5, 5, image::Luma([42])).save(&path).unwrap();

    let frame = load_image(&path).unwrap();
    assert_eq!(frame.layout(), ColorLayout::Gray);
    assert_eq!(frame.pixel(2, 2, 0), 42);
}

#[test]
fn test_load_missing_file() {
    let err = load_image(Path::new("/nonexistent/frame.png")).unwrap_err();
    assert!(matches!(err, DecodeError::Io { .. }));
}

#[test]
fn test_load_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_garbage(dir.path(), "broken.png");
    let err = load_image(&path).unwrap_err();
    assert!(matches!(err, DecodeError::Image(_)));
}

#[test]
fn test_decode_image_from_memory() {
    let mut bytes = Vec::new();
    image::RgbImage::from_pixel(3, 3, image::Rgb([9, 8, 7]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let frame = decode_image(&bytes).unwrap();
    assert_eq!(frame.pixel(1, 1, 0), 9);
    assert!(decode_image(b"nope").is_err());
}
