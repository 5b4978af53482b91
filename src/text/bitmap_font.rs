/*
 *  text/bitmap_font.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pixel fonts - glyph sheets and the compiled-in mono fonts
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::debug;
use serde::Deserialize;

use crate::constants::MONO_THRESHOLD;
use crate::graphics::error::FontError;
use crate::graphics::image::load_png;
use crate::graphics::raster::Raster;

/// On-disk description of a glyph sheet, e.g. `fonts/FIS_20.yaml`:
///
/// ```yaml
/// sheet: FIS_20.png
/// glyph_width: 10
/// glyph_height: 16
/// first_char: 32
/// columns: 16
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SheetDescriptor {
    /// PNG holding the glyph cells, relative to the descriptor
    pub sheet: PathBuf,
    pub glyph_width: u32,
    pub glyph_height: u32,
    #[serde(default = "default_first_char")]
    pub first_char: u32,
    pub columns: u32,
    /// Blank columns between rendered glyphs
    #[serde(default = "default_spacing")]
    pub spacing: u32,
}

fn default_first_char() -> u32 {
    0x20
}

fn default_spacing() -> u32 {
    1
}

/// Fixed-cell glyphs laid out left to right, top to bottom in one image
#[derive(Debug, Clone)]
pub struct GlyphSheet {
    name: String,
    cells: Raster,
    glyph_width: u32,
    glyph_height: u32,
    first_char: u32,
    columns: u32,
    glyph_count: u32,
    spacing: u32,
}

impl GlyphSheet {
    pub fn load(descriptor: &Path) -> Result<Self, FontError> {
        let name = descriptor
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fail = |reason: String| FontError::Sheet { name: name.clone(), reason };

        let yaml = std::fs::read_to_string(descriptor).map_err(|e| fail(e.to_string()))?;
        let desc: SheetDescriptor = serde_yaml::from_str(&yaml).map_err(|e| fail(e.to_string()))?;
        let sheet_path = descriptor
            .parent()
            .map(|dir| dir.join(&desc.sheet))
            .unwrap_or_else(|| desc.sheet.clone());
        let cells = load_png(&sheet_path).map_err(|e| fail(e.to_string()))?;
        let sheet = Self::from_raster(&name, cells, &desc)?;
        debug!("glyph sheet '{}' with {} glyphs", name, sheet.glyph_count);
        Ok(sheet)
    }

    pub fn from_raster(name: &str, cells: Raster, desc: &SheetDescriptor) -> Result<Self, FontError> {
        let fail = |reason: &str| FontError::Sheet { name: name.to_string(), reason: reason.to_string() };
        if desc.glyph_width == 0 || desc.glyph_height == 0 || desc.columns == 0 {
            return Err(fail("glyph size and columns must be non-zero"));
        }
        if (cells.width() as u32) < desc.glyph_width * desc.columns {
            return Err(fail("sheet is narrower than its columns"));
        }
        let rows = cells.height() as u32 / desc.glyph_height;
        if rows == 0 {
            return Err(fail("sheet is shorter than one glyph"));
        }
        Ok(Self {
            name: name.to_string(),
            cells,
            glyph_width: desc.glyph_width,
            glyph_height: desc.glyph_height,
            first_char: desc.first_char,
            columns: desc.columns,
            glyph_count: rows * desc.columns,
            spacing: desc.spacing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn glyph_size(&self) -> Size {
        Size::new(self.glyph_width, self.glyph_height)
    }

    /// Nominal size of a rendered string, blank cells included
    pub fn text_size(&self, chars: usize) -> Size {
        let n = chars as u32;
        let width = if n == 0 { 0 } else { n * self.glyph_width + (n - 1) * self.spacing };
        Size::new(width, self.glyph_height)
    }

    /// Transparent strip with the glyphs drawn in `luma`; characters
    /// missing from the sheet leave an empty cell
    pub fn render(&self, text: &str, luma: u8) -> Raster {
        let chars: Vec<char> = text.chars().collect();
        let size = self.text_size(chars.len());
        let mut out = Raster::transparent(size.width, size.height);
        for (i, ch) in chars.iter().enumerate() {
            let Some(index) = (*ch as u32).checked_sub(self.first_char) else { continue };
            if index >= self.glyph_count {
                continue;
            }
            let sx = ((index % self.columns) * self.glyph_width) as usize;
            let sy = ((index / self.columns) * self.glyph_height) as usize;
            let dx = i * (self.glyph_width + self.spacing) as usize;
            for y in 0..self.glyph_height as usize {
                for x in 0..self.glyph_width as usize {
                    if let Some((l, a)) = self.cells.pixel(sx + x, sy + y) {
                        if l > MONO_THRESHOLD && a > MONO_THRESHOLD {
                            out.set_pixel(dx + x, y, luma, u8::MAX);
                        }
                    }
                }
            }
        }
        out
    }
}

/// Compiled-in fonts by their cell name, e.g. `6x10` or `7x13_bold`
pub fn builtin_mono(name: &str) -> Option<&'static MonoFont<'static>> {
    let font = match name.to_ascii_lowercase().as_str() {
        "4x6" => &ascii::FONT_4X6,
        "5x7" => &ascii::FONT_5X7,
        "5x8" => &ascii::FONT_5X8,
        "6x9" => &ascii::FONT_6X9,
        "6x10" => &ascii::FONT_6X10,
        "6x12" => &ascii::FONT_6X12,
        "6x13" => &ascii::FONT_6X13,
        "6x13_bold" => &ascii::FONT_6X13_BOLD,
        "7x13" => &ascii::FONT_7X13,
        "7x13_bold" => &ascii::FONT_7X13_BOLD,
        "7x14" => &ascii::FONT_7X14,
        "7x14_bold" => &ascii::FONT_7X14_BOLD,
        "8x13" => &ascii::FONT_8X13,
        "8x13_bold" => &ascii::FONT_8X13_BOLD,
        "9x15" => &ascii::FONT_9X15,
        "9x15_bold" => &ascii::FONT_9X15_BOLD,
        "9x18" => &ascii::FONT_9X18,
        "9x18_bold" => &ascii::FONT_9X18_BOLD,
        "10x20" => &ascii::FONT_10X20,
        _ => return None,
    };
    Some(font)
}

/// Nominal cell strip for a mono font
pub fn render_mono(font: &'static MonoFont<'static>, text: &str, luma: u8) -> Raster {
    let n = text.chars().count() as u32;
    let cell = font.character_size;
    let width = if n == 0 { 0 } else { n * cell.width + (n - 1) * font.character_spacing };
    let mut out = Raster::transparent(width, cell.height);
    let style = MonoTextStyle::new(font, Gray8::new(luma));
    let Ok(_) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut out);
    out
}
