/*
 *  text/layout.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Horizontal and vertical text blocks, time string expansion
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

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use embedded_graphics::prelude::Point;

use crate::graphics::canvas::HAlign;
use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;
use crate::text::bitmap_font::render_mono;
use crate::text::font::FontHandle;
use crate::text::outline;

/// Expand a strftime pattern against `now`
pub fn expand_timestring(pattern: &str, now: &NaiveDateTime) -> Result<String, RenderError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(RenderError::TimeFormat(pattern.to_string()));
    }
    let mut out = String::new();
    write!(out, "{}", now.format_with_items(items.iter()))
        .map_err(|_| RenderError::TimeFormat(pattern.to_string()))?;
    Ok(out)
}

/// One line of text. Outline output is cropped to its ink; pixel fonts
/// keep their nominal cells.
pub fn render_line(font: &FontHandle, text: &str, size: u32, luma: u8) -> Result<Raster, RenderError> {
    match font {
        FontHandle::Outline(face) => outline::render(face, text, size, luma),
        FontHandle::Sheet(sheet) => Ok(sheet.render(text, luma)),
        FontHandle::Mono(mono) => Ok(render_mono(mono, text, luma)),
    }
}

/// Characters stacked along the panel: each glyph is turned a quarter
/// counter-clockwise and cropped, then the glyphs are laid side by side.
///
/// `char_align` positions narrow glyphs across the block, as seen when the
/// block is read turned clockwise. Returns `None` for empty text.
pub fn render_vertical(
    font: &FontHandle,
    text: &str,
    size: u32,
    luma: u8,
    spacing: u32,
    char_align: HAlign,
) -> Result<Option<Raster>, RenderError> {
    let mut glyphs = Vec::new();
    for ch in text.chars() {
        let glyph = render_line(font, ch.encode_utf8(&mut [0u8; 4]), size, luma)?;
        glyphs.push(glyph.rotate(90.0).crop_to_ink());
    }
    if glyphs.is_empty() {
        return Ok(None);
    }

    let spacing = spacing as i32;
    let total: i32 = glyphs.iter().map(|g| g.width() as i32).sum();
    let width = (spacing * glyphs.len() as i32 - 1 + total).max(0);
    let height = glyphs.iter().map(|g| g.height()).max().unwrap_or(0) as i32;

    let mut block = Raster::transparent(width as u32, height as u32);
    let mut x = 0;
    for glyph in &glyphs {
        let h = glyph.height() as i32;
        let y = match char_align {
            HAlign::Center => (height - h) / 2,
            HAlign::Right => 0,
            HAlign::Left => height - h,
        };
        block.paste(glyph, Point::new(x, y));
        x += glyph.width() as i32 + spacing;
    }
    Ok(Some(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::bitmap_font::builtin_mono;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 7).unwrap()
    }

    fn mono() -> FontHandle {
        FontHandle::Mono(builtin_mono("5x8").unwrap())
    }

    #[test]
    fn test_timestring() {
        assert_eq!(expand_timestring("%H:%M", &now()).unwrap(), "14:05");
        assert_eq!(expand_timestring("%d.%m.", &now()).unwrap(), "09.03.");
        assert_eq!(expand_timestring("plain", &now()).unwrap(), "plain");
    }

    #[test]
    fn test_timestring_invalid() {
        assert!(matches!(expand_timestring("%Q", &now()), Err(RenderError::TimeFormat(_))));
    }

    #[test]
    fn test_line_mono_nominal() {
        let r = render_line(&mono(), "12", 20, 255).unwrap();
        assert_eq!((r.width(), r.height()), (10, 8));
    }

    #[test]
    fn test_vertical_width_formula() {
        let font = mono();
        let text = "1H7";
        let widths: Vec<usize> = text
            .chars()
            .map(|c| {
                render_line(&font, &c.to_string(), 20, 255)
                    .unwrap()
                    .rotate(90.0)
                    .crop_to_ink()
                    .width()
            })
            .collect();
        let block = render_vertical(&font, text, 20, 255, 2, HAlign::Center).unwrap().unwrap();
        assert_eq!(block.width(), widths.iter().sum::<usize>() + 2 * 3 - 1);
    }

    #[test]
    fn test_vertical_char_align() {
        let font = mono();
        // '.' is short across the block, 'H' spans more rows
        let right = render_vertical(&font, "H.", 20, 255, 1, HAlign::Right).unwrap().unwrap();
        let left = render_vertical(&font, "H.", 20, 255, 1, HAlign::Left).unwrap().unwrap();
        let first_dot_row = |r: &Raster, from: usize| {
            (0..r.height()).find(|&y| (from..r.width()).any(|x| r.is_lit(x, y)))
        };
        let h_width = render_line(&font, "H", 20, 255).unwrap().rotate(90.0).crop_to_ink().width();
        let dot_x = h_width + 1;
        assert_eq!(first_dot_row(&right, dot_x), Some(0));
        assert!(first_dot_row(&left, dot_x).unwrap() > 0);
    }

    #[test]
    fn test_vertical_empty() {
        assert!(render_vertical(&mono(), "", 20, 255, 2, HAlign::Center).unwrap().is_none());
    }
}
