use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn cover_fit_crops_wide_source_horizontally() {
    // Left third red, middle third green, right third blue.
    let src = image::RgbaImage::from_fn(300, 100, |x, _| match x / 100 {
        0 => image::Rgba([255, 0, 0, 255]),
        1 => image::Rgba([0, 255, 0, 255]),
        _ => image::Rgba([0, 0, 255, 255]),
    });

    let out = fit_and_crop(&src, 100, 100);
    assert_eq!(out.dimensions(), (100, 100));
    // Only the centre band survives.
    let centre = out.get_pixel(50, 50);
    assert!(centre[1] > 200 && centre[0] < 50 && centre[2] < 50);
}

#[test]
fn cover_fit_upscales_small_source() {
    let src = image::RgbaImage::from_pixel(10, 20, image::Rgba([9, 9, 9, 255]));
    let out = fit_and_crop(&src, 580, 550);
    assert_eq!(out.dimensions(), (580, 550));
    assert_eq!(out.get_pixel(0, 0)[3], 255);
    assert_eq!(out.get_pixel(579, 549)[3], 255);
}

#[test]
fn fit_bytes_premultiplies_alpha() {
    let src = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 50, 128]));
    let fitted = fit_bytes(&png_bytes(src), 2, 2).unwrap();

    assert_eq!((fitted.width, fitted.height), (2, 2));
    assert_eq!(fitted.rgba8_premul.len(), 2 * 2 * 4);
    let px = &fitted.rgba8_premul[0..4];
    assert_eq!(px[3], 128);
    assert!((i32::from(px[0]) - 100).abs() <= 2);
    assert!((i32::from(px[1]) - 50).abs() <= 2);
}

#[test]
fn corrupt_bytes_fail() {
    assert!(fit_bytes(b"definitely not an image", 10, 10).is_err());
    assert!(fit_bytes(&png_bytes(image::RgbaImage::new(2, 2)), 0, 10).is_err());
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_fitted(&dir.path().join("nope.png"), 10, 10).is_err());
}
