use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::Detection;
use crate::detection::font::{self, GLYPH_HEIGHT};

const OUTLINE_WIDTH: u32 = 2;
const LABEL_SCALE: u32 = 2;
const LABEL_PADDING: u32 = 2;

/// Stable color for a class, seeded by its id.
pub fn class_color(class_id: u32) -> Rgb<u8> {
    let mut rng = StdRng::seed_from_u64(class_id as u64);
    Rgb([rng.random(), rng.random(), rng.random()])
}

fn contrasting_text(color: Rgb<u8>) -> Rgb<u8> {
    let [r, g, b] = color.0;
    let luma = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    if luma > 128_000 {
        Rgb([0, 0, 0])
    } else {
        Rgb([255, 255, 255])
    }
}

fn fill_rect(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let (width, height) = image.dimensions();
    for y in y0..y1.min(height) {
        for x in x0..x1.min(width) {
            image.put_pixel(x, y, color);
        }
    }
}

fn draw_outline(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    let t = OUTLINE_WIDTH;
    fill_rect(image, x0, y0, x1 + 1, y0 + t, color);
    fill_rect(image, x0, (y1 + 1).saturating_sub(t), x1 + 1, y1 + 1, color);
    fill_rect(image, x0, y0, x0 + t, y1 + 1, color);
    fill_rect(image, (x1 + 1).saturating_sub(t), y0, x1 + 1, y1 + 1, color);
}

/// Draw one detection: box outline plus a label tab in the class color.
pub fn draw_detection(image: &mut RgbImage, detection: &Detection) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let color = class_color(detection.class_id);
    let [ymin, xmin, ymax, xmax] = detection.bbox;

    let to_px = |v: f32, extent: u32| -> u32 {
        ((v.clamp(0.0, 1.0) * extent as f32) as u32).min(extent - 1)
    };
    let (x0, x1) = (to_px(xmin, width), to_px(xmax, width));
    let (y0, y1) = (to_px(ymin, height), to_px(ymax, height));
    let (x0, x1) = (x0.min(x1), x0.max(x1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));

    draw_outline(image, x0, y0, x1, y1, color);

    let label = detection.label();
    let tab_w = font::text_width(&label, LABEL_SCALE) + LABEL_PADDING * 2;
    let tab_h = GLYPH_HEIGHT * LABEL_SCALE + LABEL_PADDING * 2;
    // Prefer the tab above the box, fall back to inside when there is no room.
    let tab_y = if y0 >= tab_h { y0 - tab_h } else { y0 };
    fill_rect(image, x0, tab_y, x0 + tab_w, tab_y + tab_h, color);
    font::draw_text(
        image,
        (x0 + LABEL_PADDING) as i64,
        (tab_y + LABEL_PADDING) as i64,
        &label,
        contrasting_text(color),
        LABEL_SCALE,
    );
}

pub fn draw_detections(image: &mut RgbImage, detections: &[Detection]) {
    for detection in detections {
        draw_detection(image, detection);
    }
}
