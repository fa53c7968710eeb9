//! Display-font resolution for the watermark glyph.
//!
//! Candidate system fonts are tried in order and the first file rusttype
//! accepts wins. When no candidate loads (headless CI, minimal containers),
//! a coarse built-in block glyph keeps the glyph step from ever failing;
//! an ugly watermark is an acceptable degraded result, a crash is not.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, PositionedGlyph, Scale};
use std::fs;

use crate::draw;

/// System font files tried in order: macOS first, then common Linux and
/// Windows locations.
pub const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/SFCompact.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "C:\\Windows\\Fonts\\segoeuib.ttf",
];

/// Cells of the fallback block glyph, 5 columns by 7 rows.
const BLOCK_GLYPH: [&str; 7] = [
    "####.",
    "#...#",
    "#...#",
    "####.",
    "#...#",
    "#...#",
    "####.",
];

/// A resolved display font: either a real system font or the built-in
/// block glyph of last resort.
pub enum DisplayFont {
    System(Font<'static>),
    Builtin,
}

/// Walks the candidate chain and returns the first loadable font, falling
/// back to the built-in glyph. Never fails.
pub fn resolve(candidates: &[&str]) -> DisplayFont {
    for path in candidates {
        if let Ok(data) = fs::read(path) {
            if let Some(font) = Font::try_from_vec(data) {
                return DisplayFont::System(font);
            }
        }
    }
    DisplayFont::Builtin
}

impl DisplayFont {
    /// Ink bounding box of `ch` rendered at `px` pixels, as (width, height).
    pub fn glyph_bounds(&self, ch: char, px: f32) -> (u32, u32) {
        match self {
            DisplayFont::System(font) => match positioned(font, ch, px).pixel_bounding_box() {
                Some(bb) => ((bb.max.x - bb.min.x) as u32, (bb.max.y - bb.min.y) as u32),
                None => (0, 0),
            },
            DisplayFont::Builtin => {
                let cell = block_cell(px);
                (
                    BLOCK_GLYPH[0].len() as u32 * cell,
                    BLOCK_GLYPH.len() as u32 * cell,
                )
            }
        }
    }

    /// Draws `ch` with its ink box anchored at (x, y), scaling the alpha of
    /// `color` by glyph coverage.
    pub fn draw_glyph(
        &self,
        img: &mut RgbaImage,
        ch: char,
        px: f32,
        x: i64,
        y: i64,
        color: Rgba<u8>,
    ) {
        match self {
            DisplayFont::System(font) => {
                let glyph = positioned(font, ch, px);
                if glyph.pixel_bounding_box().is_none() {
                    return;
                }
                glyph.draw(|gx, gy, coverage| {
                    let alpha = (color[3] as f32 * coverage).round() as u8;
                    if alpha > 0 {
                        let shaded = Rgba([color[0], color[1], color[2], alpha]);
                        draw::blend_pixel(img, x + gx as i64, y + gy as i64, shaded);
                    }
                });
            }
            DisplayFont::Builtin => {
                let cell = block_cell(px) as i64;
                for (row, cells) in BLOCK_GLYPH.iter().enumerate() {
                    for (col, c) in cells.bytes().enumerate() {
                        if c != b'#' {
                            continue;
                        }
                        for dy in 0..cell {
                            for dx in 0..cell {
                                draw::blend_pixel(
                                    img,
                                    x + col as i64 * cell + dx,
                                    y + row as i64 * cell + dy,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

fn positioned<'a>(font: &Font<'a>, ch: char, px: f32) -> PositionedGlyph<'a> {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    font.glyph(ch).scaled(scale).positioned(point(0.0, ascent))
}

fn block_cell(px: f32) -> u32 {
    (px / BLOCK_GLYPH.len() as f32).max(1.0) as u32
}
