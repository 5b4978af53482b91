/*
 *  text/outline.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Outline font rendering through SVG text
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

use std::sync::Arc;

use log::debug;
use usvg::fontdb::{Stretch, Style};
use usvg::{Options, Transform, Tree};
use tiny_skia::Pixmap;

use crate::constants::{LUMA_OFF, MONO_THRESHOLD};
use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;
use crate::text::font::OutlineFace;

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn css_style(style: Style) -> &'static str {
    match style {
        Style::Normal => "normal",
        Style::Italic => "italic",
        Style::Oblique => "oblique",
    }
}

fn css_stretch(stretch: Stretch) -> &'static str {
    match stretch {
        Stretch::UltraCondensed => "ultra-condensed",
        Stretch::ExtraCondensed => "extra-condensed",
        Stretch::Condensed => "condensed",
        Stretch::SemiCondensed => "semi-condensed",
        Stretch::Normal => "normal",
        Stretch::SemiExpanded => "semi-expanded",
        Stretch::Expanded => "expanded",
        Stretch::ExtraExpanded => "extra-expanded",
        Stretch::UltraExpanded => "ultra-expanded",
    }
}

/// Scratch area generous enough for any glyph run at `size`
fn scratch_size(size: u32, chars: usize) -> (u32, u32) {
    let size = size.max(1) as f32;
    let width = (size * 1.2 * chars as f32 + size).ceil() as u32;
    (width.max(1), (2.0 * size).ceil() as u32)
}

/// SVG document for one line of text, baseline one em down
pub fn text_svg(face: &OutlineFace, text: &str, size: u32, luma: u8) -> String {
    let (w, h) = scratch_size(size, text.chars().count());
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<text x="{x}" y="{size}" xml:space="preserve" "#,
            r#"font-family="{family}" font-size="{size}" font-weight="{weight}" "#,
            r#"font-style="{style}" font-stretch="{stretch}" fill="rgb({l},{l},{l})">{text}</text></svg>"#
        ),
        w = w,
        h = h,
        x = (size as f32 * 0.25).round() as u32,
        size = size,
        family = escape_xml(&face.family),
        weight = face.weight,
        style = css_style(face.style),
        stretch = css_stretch(face.stretch),
        l = luma,
        text = escape_xml(text),
    )
}

/// Coverage above half becomes an opaque dot of `luma`, the rest transparent
fn binarize(raster: &mut Raster, luma: u8) {
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            match raster.pixel(x, y) {
                Some((_, alpha)) if alpha > MONO_THRESHOLD => raster.set_pixel(x, y, luma, u8::MAX),
                _ => raster.set_pixel(x, y, LUMA_OFF, 0),
            }
        }
    }
}

/// Render `text` anti-aliased, binarize the coverage and crop to its ink. Text without ink comes back as a
/// blank quarter-em by one em box so spaces still take room.
pub fn render(face: &OutlineFace, text: &str, size: u32, luma: u8) -> Result<Raster, RenderError> {
    let svg = text_svg(face, text, size, luma);
    let options = Options {
        fontdb: Arc::clone(&face.db),
        ..Options::default()
    };
    let tree = Tree::from_str(&svg, &options)
        .map_err(|e| RenderError::Text(format!("failed to lay out '{text}': {e}")))?;

    let (w, h) = scratch_size(size, text.chars().count());
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| RenderError::Text(format!("no {w}x{h} pixmap for '{text}'")))?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    let mut raster = Raster::from_pixmap(&pixmap);
    binarize(&mut raster, luma);
    match raster.ink_bounds() {
        Some(bounds) => {
            debug!("'{}' at {}px inks {}x{}", text, size, bounds.width(), bounds.height());
            Ok(raster.crop(bounds))
        }
        None => Ok(Raster::transparent((size / 4).max(1), size.max(1))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usvg::fontdb::Database;

    fn face() -> OutlineFace {
        OutlineFace {
            db: Arc::new(Database::new()),
            family: "Test & Co".into(),
            weight: 700,
            style: Style::Italic,
            stretch: Stretch::Condensed,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml("a<b>&'\""), "a&lt;b&gt;&amp;&apos;&quot;");
    }

    #[test]
    fn test_svg_document() {
        let svg = text_svg(&face(), "1<2", 20, 255);
        assert!(svg.contains(r#"font-family="Test &amp; Co""#));
        assert!(svg.contains(r#"font-weight="700""#));
        assert!(svg.contains(r#"font-style="italic""#));
        assert!(svg.contains(r#"font-stretch="condensed""#));
        assert!(svg.contains(">1&lt;2</text>"));
        assert!(svg.contains(r#"width="92" height="40""#));
    }

    fn dejavu() -> OutlineFace {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans.ttf");
        OutlineFace::from_file(&path).unwrap()
    }

    #[test]
    fn test_panel_size_text_keeps_strokes() {
        let r = render(&dejavu(), "12:34", 14, 255).unwrap();
        assert!((30..=40).contains(&r.width()), "width {}", r.width());
        assert!((9..=12).contains(&r.height()), "height {}", r.height());

        // every dot is fully on or fully off
        assert!(r.alpha_slice().iter().all(|&a| a == 0 || a == u8::MAX));
        assert!(r.luma_slice().iter().zip(r.alpha_slice()).all(|(&l, &a)| (l == 255) == (a == 255)));

        // thin diagonals and bars survive
        assert!(r.count_lit() > 75, "only {} dots lit", r.count_lit());
        for y in 0..r.height() {
            assert!((0..r.width()).any(|x| r.is_lit(x, y)), "row {y} empty");
        }
    }

    #[test]
    fn test_text_colour_kept() {
        let r = render(&dejavu(), "8", 14, 200).unwrap();
        assert!(r.count_lit() > 0);
        assert!(r.luma_slice().iter().all(|&l| l == 0 || l == 200));
    }

    #[test]
    fn test_no_fonts_renders_blank_box() {
        // nothing in the database, so no glyphs and no ink
        let r = render(&face(), "abc", 16, 255).unwrap();
        assert_eq!((r.width(), r.height()), (4, 16));
        assert_eq!(r.count_lit(), 0);
    }
}
