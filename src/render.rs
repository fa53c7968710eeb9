//! The icon renderer: a fixed back-to-front compose pipeline over an
//! in-memory canvas, followed by a single PNG write.

use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageEncoder, Rgba, RgbaImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::Path,
};

use crate::draw;
use crate::font::{self, DisplayFont};
use crate::theme::IconTheme;

/// Alpha of the innermost glow ring.
const GLOW_PEAK_ALPHA: u8 = 40;
/// How far the glow extends past the core radius, in pixels.
const GLOW_SPREAD: i32 = 30;
/// Radius decrement between successive glow rings.
const GLOW_STEP: i32 = 3;

/// Renders the icon and writes it to `out_path`, creating missing parent
/// directories. Prints one confirmation line on success.
pub fn generate(out_path: &Path) -> Result<()> {
    let theme = IconTheme::default();
    let img = compose(&theme);

    if let Some(parent) = out_path.parent() {
        create_dir_all(parent).context("Can't create output directory")?;
    }
    save_png(&img, out_path)?;

    println!(
        "Icon saved to {} ({}x{})",
        out_path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

/// Composes the full icon using whichever display font resolves on this
/// host.
pub fn compose(theme: &IconTheme) -> RgbaImage {
    compose_with(theme, &font::resolve(font::FONT_CANDIDATES))
}

/// Composes the full icon in memory. Draw order is fixed and significant:
/// background, border, per-dot glow/core/highlight, trail lines, chevrons,
/// then the glyph overlay on top.
pub fn compose_with(theme: &IconTheme, display_font: &DisplayFont) -> RgbaImage {
    let mut img = RgbaImage::new(theme.size, theme.size);
    let pal = &theme.palette;
    let edge = theme.size as i32 - theme.margin;

    draw::fill_rounded_rect(
        &mut img,
        theme.margin,
        theme.margin,
        edge,
        edge,
        theme.corner_radius,
        pal.background,
    );
    draw::stroke_rounded_rect(
        &mut img,
        theme.margin + theme.border_inset,
        theme.margin + theme.border_inset,
        edge - theme.border_inset,
        edge - theme.border_inset,
        theme.corner_radius - theme.border_inset,
        theme.border_width,
        pal.border,
    );

    for dot in &theme.dots {
        for glow_r in glow_radii(dot.radius) {
            let shade = Rgba([
                pal.accent[0],
                pal.accent[1],
                pal.accent[2],
                glow_alpha(dot.radius, glow_r),
            ]);
            draw::fill_circle(&mut img, dot.x, dot.y, glow_r, shade);
        }
        draw::fill_circle(&mut img, dot.x, dot.y, dot.radius, pal.accent);

        // Specular highlight, lifted slightly above the core center.
        let lift = dot.radius * 15 / 100;
        draw::fill_circle(&mut img, dot.x, dot.y - lift, dot.radius / 2, pal.accent_light);
    }

    for (pair, width) in theme.dots.windows(2).zip(theme.trail_widths) {
        draw::line(
            &mut img,
            (pair[0].x, pair[0].y),
            (pair[1].x, pair[1].y),
            width,
            pal.trail,
        );
    }

    for offset in theme.chevron_offsets {
        let cx = theme.chevron_origin.0 + offset;
        let cy = theme.chevron_origin.1 - offset / 2;
        let arm = theme.chevron_arm;
        draw::polyline(
            &mut img,
            &[(cx, cy - arm), (cx + arm, cy), (cx, cy + arm)],
            theme.chevron_width,
            pal.chevron,
        );
    }

    draw_watermark(&mut img, theme, display_font);

    img
}

/// Anchors the glyph's measured ink box near the bottom-right corner and
/// draws it as a faint watermark.
fn draw_watermark(img: &mut RgbaImage, theme: &IconTheme, display_font: &DisplayFont) {
    let (w, h) = display_font.glyph_bounds(theme.glyph, theme.glyph_px);
    if w == 0 || h == 0 {
        return;
    }
    let x = theme.size as i64 - w as i64 - theme.glyph_inset_right as i64;
    let y = theme.size as i64 - h as i64 - theme.glyph_inset_bottom as i64;
    display_font.draw_glyph(img, theme.glyph, theme.glyph_px, x, y, theme.palette.glyph);
}

/// Ring radii for one dot's glow, outermost first so the brighter inner
/// rings composite over the fainter outer ones.
fn glow_radii(core_r: i32) -> impl Iterator<Item = i32> {
    (1..=GLOW_SPREAD / GLOW_STEP)
        .rev()
        .map(move |step| core_r + step * GLOW_STEP)
}

/// Alpha for a glow ring of radius `glow_r` around a core of radius
/// `core_r`: linear falloff from the peak at the core down to zero at the
/// outer edge, clamped to [0, GLOW_PEAK_ALPHA].
fn glow_alpha(core_r: i32, glow_r: i32) -> u8 {
    let t = (glow_r - core_r) as f32 / GLOW_SPREAD as f32;
    (GLOW_PEAK_ALPHA as f32 * (1.0 - t)).clamp(0.0, GLOW_PEAK_ALPHA as f32) as u8
}

// Encode the composed canvas as PNG with compression
fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let mut out_file = BufWriter::new(File::create(path).context("Failed to create PNG file")?);
    let encoder =
        PngEncoder::new_with_quality(&mut out_file, CompressionType::Best, PngFilterType::Adaptive);
    encoder
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
        .context("Failed to write PNG")?;
    out_file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glow_alpha_decays_away_from_the_core() {
        let theme = IconTheme::default();
        for dot in theme.dots {
            let mut radii: Vec<i32> = glow_radii(dot.radius).collect();
            radii.reverse();

            let mut prev = GLOW_PEAK_ALPHA;
            for glow_r in radii {
                let alpha = glow_alpha(dot.radius, glow_r);
                assert!(alpha <= GLOW_PEAK_ALPHA);
                assert!(alpha <= prev, "alpha must not increase away from the core");
                prev = alpha;
            }
        }
    }

    #[test]
    fn glow_outermost_ring_is_fully_faded() {
        assert_eq!(glow_alpha(70, 100), 0);
        assert_eq!(glow_alpha(55, 85), 0);
        assert_eq!(glow_alpha(40, 70), 0);
    }

    #[test]
    fn glow_rings_never_touch_the_core() {
        for r in [70, 55, 40] {
            assert!(glow_radii(r).all(|g| g > r));
            assert_eq!(glow_radii(r).next(), Some(r + GLOW_SPREAD));
            assert_eq!(glow_radii(r).last(), Some(r + GLOW_STEP));
        }
    }

    #[test]
    fn compose_produces_a_full_size_canvas() {
        let img = compose(&IconTheme::default());
        assert_eq!(img.width(), 1024);
        assert_eq!(img.height(), 1024);
    }

    #[test]
    fn corners_outside_the_rounded_rect_stay_transparent() {
        let img = compose(&IconTheme::default());
        for (x, y) in [(0, 0), (1023, 0), (0, 1023), (1023, 1023)] {
            assert_eq!(img.get_pixel(x, y)[3], 0);
        }
    }

    #[test]
    fn background_interior_keeps_the_base_color() {
        let img = compose(&IconTheme::default());
        assert_eq!(*img.get_pixel(150, 150), Rgba([22, 22, 42, 255]));
    }

    #[test]
    fn dot_cores_are_fully_opaque_accent() {
        let img = compose(&IconTheme::default());
        // Inside each core, below the highlight and clear of the trail
        // lines.
        for (x, y) in [(300u32, 735u32), (512, 557), (700, 392)] {
            assert_eq!(
                *img.get_pixel(x, y),
                Rgba([99, 102, 241, 255]),
                "dot core at ({x}, {y})"
            );
        }
    }

    #[test]
    fn highlight_sits_above_the_core_center() {
        let img = compose(&IconTheme::default());
        assert_eq!(*img.get_pixel(300, 670), Rgba([165, 180, 252, 255]));
    }

    #[test]
    fn builtin_font_still_yields_a_watermark() {
        let theme = IconTheme::default();
        let img = compose_with(&theme, &DisplayFont::Builtin);

        // Top-left cell of the block glyph's spine, over plain background.
        let (w, h) = DisplayFont::Builtin.glyph_bounds(theme.glyph, theme.glyph_px);
        let x = theme.size - w - theme.glyph_inset_right as u32 + 2;
        let y = theme.size - h - theme.glyph_inset_bottom as u32 + 2;
        let pixel = img.get_pixel(x, y);
        assert_eq!(pixel[3], 255);
        assert!(
            pixel[0] > theme.palette.background[0],
            "watermark should lighten the background"
        );
    }
}
