/*
 *  scene/composer.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Drawing API over one panel - canvas, fonts, clock and commit
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

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use embedded_graphics::prelude::Point;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FONT, DEFAULT_FONT_DIR, DEFAULT_FONT_SIZE, DEFAULT_VERTICAL_SPACING, LUMA_OFF, LUMA_ON,
};
use crate::graphics::canvas::{Canvas, HAlign, Placement};
use crate::graphics::clock::{analog_clock, binary_clock, BinaryClockStyle};
use crate::graphics::codec;
use crate::graphics::error::{FontError, RenderError};
use crate::graphics::image::load_png;
use crate::graphics::raster::Raster;
use crate::panel::error::ControllerError;
use crate::panel::traits::{PanelDriver, PanelGeometry};
use crate::text::font::{FontHandle, FontResolver};
use crate::text::layout::{expand_timestring, render_line, render_vertical};

/// Everything that shapes a block of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font query; the composer default when unset
    pub font: Option<String>,
    pub size: u32,
    #[serde(flatten)]
    pub placement: Placement,
    pub color: u8,
    /// Treat the text as a strftime pattern
    pub timestring: bool,
    /// Vertical text only: glyph position across the block
    pub char_align: HAlign,
    /// Vertical text only: gap between glyphs
    pub spacing: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: None,
            size: DEFAULT_FONT_SIZE,
            placement: Placement::default(),
            color: LUMA_ON,
            timestring: false,
            char_align: HAlign::Center,
            spacing: DEFAULT_VERTICAL_SPACING,
        }
    }
}

impl TextStyle {
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// Draws onto a panel-sized canvas and ships it to the panel on commit
pub struct Composer<D: PanelDriver> {
    driver: D,
    canvas: Canvas,
    resolver: FontResolver,
    fonts: HashMap<String, Arc<FontHandle>>,
    default_font: String,
    clock: Option<NaiveDateTime>,
}

impl<D: PanelDriver> Composer<D> {
    /// Composer with the stock font directory and default font
    pub fn new(driver: D) -> Self {
        Self::with_fonts(driver, FontResolver::new(DEFAULT_FONT_DIR), DEFAULT_FONT)
    }

    pub fn with_fonts(driver: D, resolver: FontResolver, default_font: impl Into<String>) -> Self {
        let canvas = Canvas::new(driver.geometry());
        Self {
            driver,
            canvas,
            resolver,
            fonts: HashMap::new(),
            default_font: default_font.into(),
            clock: None,
        }
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.canvas.geometry()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Put back a canvas taken with `canvas().clone()`
    pub fn restore_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Pin the time used by clocks and time strings; `None` follows the
    /// local wall clock
    pub fn set_clock(&mut self, time: Option<NaiveDateTime>) {
        self.clock = time;
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Resolve once per query, then serve from the cache
    pub fn font(&mut self, query: Option<&str>) -> Result<Arc<FontHandle>, FontError> {
        let query = query.unwrap_or(&self.default_font).to_string();
        if let Some(font) = self.fonts.get(&query) {
            return Ok(Arc::clone(font));
        }
        let font = Arc::new(self.resolver.resolve(&query)?);
        info!("Loaded font '{}': {:?}", query, font);
        self.fonts.insert(query, Arc::clone(&font));
        Ok(font)
    }

    fn content(&self, text: &str, style: &TextStyle) -> Result<String, RenderError> {
        if style.timestring {
            expand_timestring(text, &self.now())
        } else {
            Ok(text.to_string())
        }
    }

    /// One line of text. Returns where it landed, `None` for empty text.
    pub fn text(&mut self, text: &str, style: &TextStyle) -> Result<Option<Point>, RenderError> {
        let content = self.content(text, style)?;
        if content.is_empty() {
            return Ok(None);
        }
        let font = self.font(style.font.as_deref())?;
        let block = render_line(&font, &content, style.size, style.color)?;
        Ok(Some(self.canvas.compose(&block, &style.placement)))
    }

    /// Characters stacked one after another along the panel
    pub fn vertical_text(&mut self, text: &str, style: &TextStyle) -> Result<Option<Point>, RenderError> {
        let content = self.content(text, style)?;
        let font = self.font(style.font.as_deref())?;
        let block = render_vertical(
            &font,
            &content,
            style.size,
            style.color,
            style.spacing,
            style.char_align,
        )?;
        Ok(block.map(|block| self.canvas.compose(&block, &style.placement)))
    }

    pub fn bitmap(&mut self, source: &Raster, placement: &Placement) -> Point {
        self.canvas.compose(source, placement)
    }

    pub fn bitmap_file(&mut self, path: &Path, placement: &Placement) -> Result<Point, RenderError> {
        let source = load_png(path)?;
        Ok(self.canvas.compose(&source, placement))
    }

    pub fn line(&mut self, points: &[Point], width: u32, color: u8) -> Result<(), RenderError> {
        self.canvas.line(points, width, color)
    }

    pub fn rectangle(&mut self, a: Point, b: Point, fill: bool, color: u8) {
        self.canvas.rectangle(a, b, fill, color);
    }

    pub fn binary_clock(&mut self, style: &BinaryClockStyle, placement: &Placement) -> Result<Point, RenderError> {
        let tile = binary_clock(&self.now(), style)?;
        Ok(self.canvas.compose(&tile, placement))
    }

    pub fn analog_clock(&mut self, width: u32, height: u32, placement: &Placement) -> Result<Point, RenderError> {
        let tile = analog_clock(&self.now(), width, height)?;
        Ok(self.canvas.compose(&tile, placement))
    }

    /// All dots off
    pub fn clear(&mut self) {
        self.canvas.fill(LUMA_OFF);
    }

    /// All dots on
    pub fn fill_all(&mut self) {
        self.canvas.fill(LUMA_ON);
    }

    /// Wire bitmap of the current canvas
    pub fn bitmap_bytes(&self) -> Vec<u8> {
        codec::encode(self.canvas.raster())
    }

    /// Send the canvas. A fresh canvas follows success; on failure the
    /// drawing is kept so the caller can retry.
    pub fn commit(&mut self) -> Result<Vec<u8>, ControllerError> {
        let bitmap = codec::pad(&self.bitmap_bytes(), &self.geometry());
        self.driver.transmit(&bitmap)?;
        debug!("committed {} bytes", bitmap.len());
        self.canvas.reset();
        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::canvas::VAlign;
    use crate::panel::null::NullPanel;
    use crate::text::font::{BitmapFont, FontStrategy};
    use chrono::NaiveDate;

    fn composer() -> Composer<NullPanel> {
        let geo = PanelGeometry::new(28, 16).unwrap();
        let strategies: Vec<Box<dyn FontStrategy>> = vec![Box::new(BitmapFont::new("/nonexistent"))];
        let mut c = Composer::with_fonts(NullPanel::new(geo), FontResolver::with_strategies(strategies), "5x8");
        c.set_clock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(14, 5, 0));
        c
    }

    #[test]
    fn test_text_lands_aligned() {
        let mut c = composer();
        let style = TextStyle::default().with_placement(Placement::aligned(HAlign::Right, VAlign::Bottom));
        // two 5x8 cells
        assert_eq!(c.text("ab", &style).unwrap(), Some(Point::new(18, 8)));
        assert!(c.canvas().raster().count_lit() > 0);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut c = composer();
        assert_eq!(c.text("", &TextStyle::default()).unwrap(), None);
        assert_eq!(c.vertical_text("", &TextStyle::default()).unwrap(), None);
        assert_eq!(c.canvas().raster().count_lit(), 0);
    }

    #[test]
    fn test_unknown_font_leaves_canvas() {
        let mut c = composer();
        c.fill_all();
        let err = c.text("x", &TextStyle::default().with_font("Nope")).unwrap_err();
        assert!(matches!(err, RenderError::Font(FontError::NotFound { .. })));
        assert_eq!(c.canvas().raster().count_lit(), 28 * 16);
    }

    #[test]
    fn test_font_cache() {
        let mut c = composer();
        let a = c.font(Some("6x10")).unwrap();
        let b = c.font(Some("6x10")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_timestring_uses_pinned_clock() {
        let mut c = composer();
        let style = TextStyle { timestring: true, ..TextStyle::default() };
        let mut expected = composer();
        c.text("%H%M", &style).unwrap();
        expected.text("1405", &TextStyle::default()).unwrap();
        assert_eq!(c.bitmap_bytes(), expected.bitmap_bytes());
    }

    #[test]
    fn test_commit_resets_canvas() {
        let mut c = composer();
        c.fill_all();
        let sent = c.commit().unwrap();
        assert_eq!(sent.len(), 56);
        assert!(sent.iter().all(|&b| b == 0xFF));
        assert_eq!(c.canvas().raster().count_lit(), 0);
    }
}
