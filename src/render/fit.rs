use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Background raster resized to its target area, in premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FittedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Vec<u8>,
}

/// Decode an image file and cover-fit it into `width`×`height`.
pub fn load_fitted(path: &Path, width: u32, height: u32) -> SlidecastResult<FittedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    fit_bytes(&bytes, width, height)
}

/// Decode encoded image bytes and cover-fit them into `width`×`height`.
pub fn fit_bytes(bytes: &[u8], width: u32, height: u32) -> SlidecastResult<FittedImage> {
    if width == 0 || height == 0 {
        return Err(SlidecastError::validation(
            "fit target width/height must be non-zero",
        ));
    }
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let fitted = fit_and_crop(&dyn_img.to_rgba8(), width, height);

    let mut rgba8_premul = fitted.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(FittedImage {
        width,
        height,
        rgba8_premul,
    })
}

/// Aspect-preserving cover resize: scale until both sides cover the target, then crop the
/// overflow evenly from both ends. Lanczos3 resampling.
pub fn fit_and_crop(src: &image::RgbaImage, width: u32, height: u32) -> image::RgbaImage {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return image::RgbaImage::new(width, height);
    }

    let scale = f64::max(
        f64::from(width) / f64::from(sw),
        f64::from(height) / f64::from(sh),
    );
    let scaled_w = ((f64::from(sw) * scale).round() as u32).max(width);
    let scaled_h = ((f64::from(sh) * scale).round() as u32).max(height);

    let scaled = image::imageops::resize(
        src,
        scaled_w,
        scaled_h,
        image::imageops::FilterType::Lanczos3,
    );
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    image::imageops::crop_imm(&scaled, x, y, width, height).to_image()
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
