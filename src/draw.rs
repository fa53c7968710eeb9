//! Minimal 2D raster primitives over an RGBA pixel buffer.

use image::{Rgba, RgbaImage};

/// Source-over blend of `color` into the pixel at (x, y).
/// Off-canvas coordinates are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    *dst = blend(color, *dst);
}

/// Alpha blends two RGBA pixels (source over destination).
fn blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Fills a circle centered at (cx, cy).
pub fn fill_circle(img: &mut RgbaImage, cx: i32, cy: i32, r: i32, color: Rgba<u8>) {
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let dx = x - cx;
            let dy = y - cy;
            if dx * dx + dy * dy <= r * r {
                blend_pixel(img, x as i64, y as i64, color);
            }
        }
    }
}

/// Fills a rounded rectangle spanning (x0, y0)..=(x1, y1).
pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    radius: i32,
    color: Rgba<u8>,
) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            if in_rounded_rect(x, y, x0, y0, x1, y1, radius) {
                blend_pixel(img, x as i64, y as i64, color);
            }
        }
    }
}

/// Strokes a rounded-rectangle outline of the given width, drawn inward
/// from the outer edge.
pub fn stroke_rounded_rect(
    img: &mut RgbaImage,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    radius: i32,
    width: i32,
    color: Rgba<u8>,
) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            if in_rounded_rect(x, y, x0, y0, x1, y1, radius)
                && !in_rounded_rect(
                    x,
                    y,
                    x0 + width,
                    y0 + width,
                    x1 - width,
                    y1 - width,
                    radius - width,
                )
            {
                blend_pixel(img, x as i64, y as i64, color);
            }
        }
    }
}

fn in_rounded_rect(x: i32, y: i32, x0: i32, y0: i32, x1: i32, y1: i32, radius: i32) -> bool {
    if x < x0 || x > x1 || y < y0 || y > y1 {
        return false;
    }
    // Distance to the radius-inset core rectangle decides the corners.
    let rx = x.clamp(x0 + radius, x1 - radius);
    let ry = y.clamp(y0 + radius, y1 - radius);
    let dx = x - rx;
    let dy = y - ry;
    dx * dx + dy * dy <= radius * radius
}

/// Draws a thick line segment between `a` and `b`. Each covered pixel is
/// blended exactly once, so translucent strokes keep a uniform alpha.
pub fn line(img: &mut RgbaImage, a: (i32, i32), b: (i32, i32), width: i32, color: Rgba<u8>) {
    let half = width as f32 / 2.0;
    let pad = half.ceil() as i32;
    let x0 = a.0.min(b.0) - pad;
    let x1 = a.0.max(b.0) + pad;
    let y0 = a.1.min(b.1) - pad;
    let y1 = a.1.max(b.1) + pad;

    for y in y0..=y1 {
        for x in x0..=x1 {
            if segment_distance(x as f32, y as f32, a, b) <= half {
                blend_pixel(img, x as i64, y as i64, color);
            }
        }
    }
}

/// Draws a connected polyline. Pixels near the joints are covered by two
/// segments but still blended exactly once.
pub fn polyline(img: &mut RgbaImage, points: &[(i32, i32)], width: i32, color: Rgba<u8>) {
    if points.len() < 2 {
        return;
    }
    let half = width as f32 / 2.0;
    let pad = half.ceil() as i32;
    let x0 = points.iter().map(|p| p.0).min().unwrap() - pad;
    let x1 = points.iter().map(|p| p.0).max().unwrap() + pad;
    let y0 = points.iter().map(|p| p.1).min().unwrap() - pad;
    let y1 = points.iter().map(|p| p.1).max().unwrap() + pad;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let covered = points
                .windows(2)
                .any(|seg| segment_distance(x as f32, y as f32, seg[0], seg[1]) <= half);
            if covered {
                blend_pixel(img, x as i64, y as i64, color);
            }
        }
    }
}

fn segment_distance(px: f32, py: f32, a: (i32, i32), b: (i32, i32)) -> f32 {
    let (ax, ay) = (a.0 as f32, a.1 as f32);
    let (bx, by) = (b.0 as f32, b.1 as f32);
    let (dx, dy) = (bx - ax, by - ay);

    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}
