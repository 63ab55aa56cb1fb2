use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

use crate::error::DetectError;

/// Fill used for the letterbox bars.
pub const PADDING_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// Resize `image` to fit inside `width`x`height` keeping its aspect ratio,
/// then center it on a canvas filled with `fill`.
pub fn letterbox(
    image: &DynamicImage,
    width: u32,
    height: u32,
    fill: Rgb<u8>,
) -> Result<RgbImage, DetectError> {
    let (img_w, img_h) = image.dimensions();
    if img_w == 0 || img_h == 0 || width == 0 || height == 0 {
        return Err(DetectError::EmptyImage);
    }

    if (img_w, img_h) == (width, height) {
        return Ok(image.to_rgb8());
    }

    let scale = f64::min(width as f64 / img_w as f64, height as f64 / img_h as f64);
    let new_w = ((img_w as f64 * scale).round() as u32).clamp(1, width);
    let new_h = ((img_h as f64 * scale).round() as u32).clamp(1, height);

    let resized = imageops::resize(&image.to_rgb8(), new_w, new_h, FilterType::CatmullRom);

    let mut canvas = RgbImage::from_pixel(width, height, fill);
    imageops::replace(
        &mut canvas,
        &resized,
        ((width - new_w) / 2) as i64,
        ((height - new_h) / 2) as i64,
    );
    Ok(canvas)
}
