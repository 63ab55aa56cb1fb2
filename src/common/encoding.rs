use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;

/// PNG-encode and base64 an image.
pub fn encode_png_base64(image: &DynamicImage) -> Result<String, ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(STANDARD.encode(buffer.into_inner()))
}
