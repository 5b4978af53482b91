/*
 *  graphics/canvas.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel-sized drawing surface, placement and shape primitives
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

use clap::ValueEnum;
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use serde::{Deserialize, Serialize};

use crate::constants::LUMA_OFF;
use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;
use crate::panel::traits::PanelGeometry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Where a source lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub halign: HAlign,
    pub valign: VAlign,
    /// Explicit column; overrides `halign`
    pub x: Option<i32>,
    /// Explicit row; overrides `valign`
    pub y: Option<i32>,
    /// Counter-clockwise rotation in degrees, applied before placing
    pub angle: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self { halign: HAlign::Center, valign: VAlign::Middle, x: None, y: None, angle: 0.0 }
    }
}

impl Placement {
    pub fn aligned(halign: HAlign, valign: VAlign) -> Self {
        Self { halign, valign, ..Self::default() }
    }

    pub fn at(x: i32, y: i32) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    pub fn rotated(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Top-left corner for a source of `source` size on a `canvas` sized area.
    /// Offsets may be negative when the source is larger than the canvas.
    pub fn origin(&self, canvas: Size, source: Size) -> Point {
        let dx = canvas.width as i32 - source.width as i32;
        let dy = canvas.height as i32 - source.height as i32;
        let x = self.x.unwrap_or(match self.halign {
            HAlign::Left => 0,
            HAlign::Center => dx / 2,
            HAlign::Right => dx,
        });
        let y = self.y.unwrap_or(match self.valign {
            VAlign::Top => 0,
            VAlign::Middle => dy / 2,
            VAlign::Bottom => dy,
        });
        Point::new(x, y)
    }
}

/// The panel-sized working image, opaque black when fresh
#[derive(Debug, Clone)]
pub struct Canvas {
    raster: Raster,
    geometry: PanelGeometry,
}

impl Canvas {
    pub fn new(geometry: PanelGeometry) -> Self {
        Self {
            raster: Raster::filled(geometry.width(), geometry.height(), LUMA_OFF),
            geometry,
        }
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    /// Back to all dots off
    pub fn reset(&mut self) {
        self.raster.fill(LUMA_OFF);
    }

    pub fn fill(&mut self, luma: u8) {
        self.raster.fill(luma);
    }

    /// Rotate (if asked), align and blend a source. Returns the origin used.
    pub fn compose(&mut self, source: &Raster, placement: &Placement) -> Point {
        let rotated;
        let source = if placement.angle != 0.0 {
            rotated = source.rotate(placement.angle);
            &rotated
        } else {
            source
        };
        let origin = placement.origin(self.geometry.size(), source.size());
        self.raster.paste(source, origin);
        origin
    }

    /// Polyline through `points`, `width` pixels wide
    pub fn line(&mut self, points: &[Point], width: u32, luma: u8) -> Result<(), RenderError> {
        if points.len() < 2 {
            return Err(RenderError::InvalidParameter(format!(
                "a line needs at least two points, got {}",
                points.len()
            )));
        }
        let Ok(()) = Polyline::new(points)
            .into_styled(PrimitiveStyle::with_stroke(Gray8::new(luma), width))
            .draw(&mut self.raster);
        Ok(())
    }

    /// Box with both corners included; outline always drawn, interior
    /// filled when asked
    pub fn rectangle(&mut self, a: Point, b: Point, fill: bool, luma: u8) {
        draw_box(&mut self.raster, a, b, fill, luma);
    }
}

/// Shared by the canvas and the clock tiles
pub(crate) fn draw_box(target: &mut Raster, a: Point, b: Point, fill: bool, luma: u8) {
    let mut style = PrimitiveStyleBuilder::new()
        .stroke_color(Gray8::new(luma))
        .stroke_width(1);
    if fill {
        style = style.fill_color(Gray8::new(luma));
    }
    let Ok(()) = Rectangle::with_corners(a, b)
        .into_styled(style.build())
        .draw(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LUMA_ON;

    fn panel() -> Canvas {
        Canvas::new(PanelGeometry::new(28, 16).unwrap())
    }

    #[test]
    fn test_placement_right_bottom() {
        let p = Placement::aligned(HAlign::Right, VAlign::Bottom);
        assert_eq!(p.origin(Size::new(28, 16), Size::new(10, 10)), Point::new(18, 6));
    }

    #[test]
    fn test_placement_center_truncates() {
        let p = Placement::default();
        assert_eq!(p.origin(Size::new(28, 16), Size::new(9, 9)), Point::new(9, 3));
        // oversized sources go negative, truncating toward zero
        assert_eq!(p.origin(Size::new(28, 16), Size::new(31, 16)), Point::new(-1, 0));
    }

    #[test]
    fn test_explicit_position_wins() {
        let p = Placement { x: Some(3), ..Placement::aligned(HAlign::Right, VAlign::Top) };
        assert_eq!(p.origin(Size::new(28, 16), Size::new(4, 4)), Point::new(3, 0));
    }

    #[test]
    fn test_compose_rotates_first() {
        let mut c = panel();
        let src = Raster::filled(10, 2, 255);
        let origin = c.compose(&src, &Placement::aligned(HAlign::Left, VAlign::Top).rotated(90.0));
        assert_eq!(origin, Point::zero());
        assert!(c.raster().is_lit(1, 9));
        assert!(!c.raster().is_lit(2, 0));
        assert_eq!(c.raster().count_lit(), 20);
    }

    #[test]
    fn test_rectangle_inclusive_outline() {
        let mut c = panel();
        c.rectangle(Point::new(0, 0), Point::new(3, 3), false, LUMA_ON);
        assert!(c.raster().is_lit(3, 3));
        assert!(!c.raster().is_lit(1, 1));
        assert_eq!(c.raster().count_lit(), 12);

        c.rectangle(Point::new(10, 0), Point::new(12, 2), true, LUMA_ON);
        assert!(c.raster().is_lit(11, 1));
    }

    #[test]
    fn test_line() {
        let mut c = panel();
        c.line(&[Point::new(0, 0), Point::new(27, 0), Point::new(27, 15)], 1, LUMA_ON).unwrap();
        assert!(c.raster().is_lit(14, 0));
        assert!(c.raster().is_lit(27, 8));
        assert!(c.line(&[Point::new(1, 1)], 1, LUMA_ON).is_err());
    }

    #[test]
    fn test_reset_and_fill() {
        let mut c = panel();
        c.fill(LUMA_ON);
        assert_eq!(c.raster().count_lit(), 28 * 16);
        c.reset();
        assert_eq!(c.raster().count_lit(), 0);
    }
}
