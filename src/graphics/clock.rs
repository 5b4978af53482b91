/*
 *  graphics/clock.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Binary and analog clock tiles
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

use chrono::Timelike;
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use serde::{Deserialize, Serialize};

use crate::constants::{LUMA_OFF, LUMA_ON};
use crate::graphics::canvas::draw_box;
use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;

/// Bits shown per row of the binary clock
const BINARY_DIGITS: u32 = 6;

const HOUR_HAND: f32 = 0.3;
const MINUTE_HAND: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryClockStyle {
    pub block_width: u32,
    pub block_height: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
}

impl Default for BinaryClockStyle {
    fn default() -> Self {
        Self { block_width: 3, block_height: 3, spacing_x: 1, spacing_y: 1 }
    }
}

impl BinaryClockStyle {
    pub fn tile_size(&self) -> Size {
        Size::new(
            BINARY_DIGITS * self.block_width + (BINARY_DIGITS - 1) * self.spacing_x,
            2 * self.block_height + self.spacing_y,
        )
    }
}

/// Two rows of six blocks: hour on top, minute below, most significant bit
/// on the left. Only the low six bits of each value are shown.
pub fn binary_clock<T: Timelike>(time: &T, style: &BinaryClockStyle) -> Result<Raster, RenderError> {
    if style.block_width == 0 || style.block_height == 0 {
        return Err(RenderError::InvalidParameter("binary clock blocks need a size".into()));
    }
    let size = style.tile_size();
    let mut tile = Raster::filled(size.width, size.height, LUMA_OFF);

    let rows = [(time.hour(), 0), (time.minute(), style.block_height + style.spacing_y)];
    for (value, top) in rows {
        for digit in 0..BINARY_DIGITS {
            let set = (value >> (BINARY_DIGITS - 1 - digit)) & 1 == 1;
            let left = digit * (style.block_width + style.spacing_x);
            let a = Point::new(left as i32, top as i32);
            let b = a + Size::new(style.block_width - 1, style.block_height - 1);
            draw_box(&mut tile, a, b, set, LUMA_ON);
        }
    }
    Ok(tile)
}

/// Distance from the centre to an ellipse edge along `theta` (radians)
fn ellipse_radius(a: f32, b: f32, theta: f32) -> f32 {
    let (sin, cos) = theta.sin_cos();
    let denom = ((a * sin).powi(2) + (b * cos).powi(2)).sqrt();
    if denom == 0.0 { 0.0 } else { a * b / denom }
}

fn hand_end(center: Point, a: f32, b: f32, degrees: f32, share: f32) -> Point {
    let theta = degrees.to_radians();
    let len = share * ellipse_radius(a, b, theta);
    Point::new(
        center.x + (len * theta.cos()).round() as i32,
        center.y + (len * theta.sin()).round() as i32,
    )
}

/// Boxed clock face with hour and minute hands, transparent behind
pub fn analog_clock<T: Timelike>(time: &T, width: u32, height: u32) -> Result<Raster, RenderError> {
    if width < 2 || height < 2 {
        return Err(RenderError::InvalidParameter(format!(
            "analog clock of {width}x{height} is too small"
        )));
    }
    let mut tile = Raster::transparent(width, height);
    draw_box(
        &mut tile,
        Point::zero(),
        Point::new(width as i32 - 1, height as i32 - 1),
        false,
        LUMA_ON,
    );

    let (h, m) = (time.hour() % 12, time.minute());
    let hour_angle = h as f32 * 30.0 + m as f32 * 0.5 - 90.0;
    let minute_angle = m as f32 * 6.0 - 90.0;

    let center = Point::new(width as i32 / 2, height as i32 / 2);
    let (a, b) = (width as f32 / 2.0, height as f32 / 2.0);
    let hand = PrimitiveStyle::with_stroke(Gray8::new(LUMA_ON), 1);
    for (angle, share) in [(hour_angle, HOUR_HAND), (minute_angle, MINUTE_HAND)] {
        let end = hand_end(center, a, b, angle, share);
        let Ok(()) = Line::new(center, end).into_styled(hand).draw(&mut tile);
    }
    Ok(tile)
}
