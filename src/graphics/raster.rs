/*
 *  graphics/raster.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Runtime-sized greyscale raster with coverage, usable as a DrawTarget
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::{Gray8, GrayColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use tiny_skia::Pixmap;

use crate::constants::{LUMA_OFF, MONO_THRESHOLD};

/// A runtime-sized greyscale raster.
///
/// Every pixel carries a luma and an alpha (coverage) value. Sources built
/// for compositing start fully transparent; anything drawn through the
/// `DrawTarget` impl becomes opaque. Pasting blends by alpha, so only the
/// drawn parts of a source touch the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    luma: Vec<u8>,
    alpha: Vec<u8>,
    w: usize,
    h: usize,
}

/// Inclusive-exclusive pixel box `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl PixelBox {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }
}

impl Raster {
    /// Fully transparent raster
    pub fn transparent(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { luma: vec![LUMA_OFF; w * h], alpha: vec![0; w * h], w, h }
    }

    /// Fully opaque raster of one luma
    pub fn filled(width: u32, height: u32, luma: u8) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { luma: vec![luma; w * h], alpha: vec![u8::MAX; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }
    pub fn is_empty(&self) -> bool { self.w == 0 || self.h == 0 }

    /// Immutable raw access, row-major
    pub fn luma_slice(&self) -> &[u8] { &self.luma }
    pub fn alpha_slice(&self) -> &[u8] { &self.alpha }

    /// (luma, alpha) at a position, None when out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> Option<(u8, u8)> {
        if x < self.w && y < self.h {
            let i = y * self.w + x;
            Some((self.luma[i], self.alpha[i]))
        } else {
            None
        }
    }

    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        self.pixel(x, y).map(|(l, _)| l).unwrap_or(LUMA_OFF)
    }

    /// Monochrome view of a pixel as the panel would show it
    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.luma_at(x, y) > MONO_THRESHOLD
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, luma: u8, alpha: u8) {
        if x < self.w && y < self.h {
            let i = y * self.w + x;
            self.luma[i] = luma;
            self.alpha[i] = alpha;
        }
    }

    /// Opaque fill of the whole raster
    pub fn fill(&mut self, luma: u8) {
        self.luma.fill(luma);
        self.alpha.fill(u8::MAX);
    }

    pub fn count_lit(&self) -> usize {
        self.luma.iter().filter(|&&l| l > MONO_THRESHOLD).count()
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }

    /// Bounding box of every non-blank pixel (any luma or any coverage)
    pub fn ink_bounds(&self) -> Option<PixelBox> {
        let mut bounds: Option<PixelBox> = None;
        for y in 0..self.h {
            for x in 0..self.w {
                let i = y * self.w + x;
                if self.luma[i] == 0 && self.alpha[i] == 0 {
                    continue;
                }
                bounds = Some(match bounds {
                    None => PixelBox { x0: x, y0: y, x1: x + 1, y1: y + 1 },
                    Some(b) => PixelBox {
                        x0: b.x0.min(x),
                        y0: b.y0.min(y),
                        x1: b.x1.max(x + 1),
                        y1: b.y1.max(y + 1),
                    },
                });
            }
        }
        bounds
    }

    /// Copy out a region, clipped to the raster
    pub fn crop(&self, region: PixelBox) -> Raster {
        let x1 = region.x1.min(self.w);
        let y1 = region.y1.min(self.h);
        let x0 = region.x0.min(x1);
        let y0 = region.y0.min(y1);
        let (cw, ch) = (x1 - x0, y1 - y0);

        let mut out = Raster::transparent(cw as u32, ch as u32);
        for y in 0..ch {
            let src = (y0 + y) * self.w + x0;
            let dst = y * cw;
            out.luma[dst..dst + cw].copy_from_slice(&self.luma[src..src + cw]);
            out.alpha[dst..dst + cw].copy_from_slice(&self.alpha[src..src + cw]);
        }
        out
    }

    /// Crop to the ink bounds; a blank raster is returned whole
    pub fn crop_to_ink(&self) -> Raster {
        match self.ink_bounds() {
            Some(b) => self.crop(b),
            None => self.clone(),
        }
    }

    /// Rotate counter-clockwise by `degrees`, growing the canvas to fit.
    ///
    /// Quarter turns are exact; anything else samples the nearest source
    /// pixel.
    pub fn rotate(&self, degrees: f32) -> Raster {
        let turn = degrees.rem_euclid(360.0);
        if turn == 0.0 {
            return self.clone();
        }
        let (w, h) = (self.w, self.h);
        if turn == 90.0 || turn == 180.0 || turn == 270.0 {
            let (nw, nh) = if turn == 180.0 { (w, h) } else { (h, w) };
            let mut out = Raster::transparent(nw as u32, nh as u32);
            for ny in 0..nh {
                for nx in 0..nw {
                    let (sx, sy) = if turn == 90.0 {
                        (w - 1 - ny, nx)
                    } else if turn == 180.0 {
                        (w - 1 - nx, h - 1 - ny)
                    } else {
                        (ny, h - 1 - nx)
                    };
                    let i = sy * w + sx;
                    out.set_pixel(nx, ny, self.luma[i], self.alpha[i]);
                }
            }
            return out;
        }

        let (sin, cos) = turn.to_radians().sin_cos();
        let (hw, hh) = (w as f32 / 2.0, h as f32 / 2.0);
        // forward map of the corners, y pointing down: x' = x cos + y sin, y' = -x sin + y cos
        let corners = [(-hw, -hh), (hw, -hh), (-hw, hh), (hw, hh)];
        let xs = corners.map(|(x, y)| x * cos + y * sin);
        let ys = corners.map(|(x, y)| -x * sin + y * cos);
        let span = |v: [f32; 4]| {
            let lo = v.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = v.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            // absorb float noise so a 10.0000001 span stays 10
            ((hi - 1e-4).ceil() - (lo + 1e-4).floor()).max(0.0) as usize
        };
        let (nw, nh) = (span(xs), span(ys));

        let mut out = Raster::transparent(nw as u32, nh as u32);
        let (nhw, nhh) = (nw as f32 / 2.0, nh as f32 / 2.0);
        for ny in 0..nh {
            for nx in 0..nw {
                let dx = nx as f32 + 0.5 - nhw;
                let dy = ny as f32 + 0.5 - nhh;
                let sx = (dx * cos - dy * sin + hw).floor();
                let sy = (dx * sin + dy * cos + hh).floor();
                if sx >= 0.0 && sy >= 0.0 && (sx as usize) < w && (sy as usize) < h {
                    let i = sy as usize * w + sx as usize;
                    out.set_pixel(nx, ny, self.luma[i], self.alpha[i]);
                }
            }
        }
        out
    }

    /// Alpha-blend `src` with its top-left corner at `origin`; off-raster
    /// parts are clipped
    pub fn paste(&mut self, src: &Raster, origin: Point) {
        for sy in 0..src.h {
            for sx in 0..src.w {
                let si = sy * src.w + sx;
                let a = src.alpha[si] as u32;
                if a == 0 {
                    continue;
                }
                let p = Point::new(origin.x + sx as i32, origin.y + sy as i32);
                let Some(di) = self.idx(p) else { continue };
                let s = src.luma[si] as u32;
                let d = self.luma[di] as u32;
                self.luma[di] = ((s * a + d * (255 - a) + 127) / 255) as u8;
                let da = self.alpha[di] as u32;
                self.alpha[di] = (a + (da * (255 - a) + 127) / 255).min(255) as u8;
            }
        }
    }

    /// Convert a tiny-skia pixmap, folding colour down to luma
    pub fn from_pixmap(pixmap: &Pixmap) -> Raster {
        let (w, h) = (pixmap.width(), pixmap.height());
        let mut out = Raster::transparent(w, h);
        for (i, p) in pixmap.pixels().iter().enumerate() {
            let c = p.demultiply();
            let luma = 0.299 * c.red() as f32 + 0.587 * c.green() as f32 + 0.114 * c.blue() as f32;
            out.luma[i] = luma.round().clamp(0.0, 255.0) as u8;
            out.alpha[i] = c.alpha();
        }
        out
    }
}

impl OriginDimensions for Raster {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for Raster {
    type Color = Gray8;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.luma[i] = c.luma();
                self.alpha[i] = u8::MAX;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.luma());
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // row-major walk of the area, clipped per pixel
        self.draw_iter(
            area.points()
                .zip(colors)
                .map(|(p, c)| Pixel(p, c)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    fn dot(w: u32, h: u32, x: usize, y: usize) -> Raster {
        let mut r = Raster::transparent(w, h);
        r.set_pixel(x, y, 255, 255);
        r
    }

    #[test]
    fn test_draw_makes_opaque() {
        let mut r = Raster::transparent(8, 8);
        Line::new(Point::new(0, 0), Point::new(7, 0))
            .into_styled(PrimitiveStyle::with_stroke(Gray8::WHITE, 1))
            .draw(&mut r)
            .ok();
        assert_eq!(r.pixel(3, 0), Some((255, 255)));
        assert_eq!(r.pixel(3, 1), Some((0, 0)));
        assert_eq!(r.count_lit(), 8);
    }

    #[test]
    fn test_out_of_bounds_clipped() {
        let mut r = Raster::transparent(4, 4);
        Line::new(Point::new(-5, 1), Point::new(10, 1))
            .into_styled(PrimitiveStyle::with_stroke(Gray8::WHITE, 1))
            .draw(&mut r)
            .ok();
        assert_eq!(r.count_lit(), 4);
    }

    #[test]
    fn test_crop_to_ink() {
        let mut r = Raster::transparent(10, 10);
        r.set_pixel(2, 3, 255, 255);
        r.set_pixel(5, 7, 255, 255);
        let c = r.crop_to_ink();
        assert_eq!((c.width(), c.height()), (4, 5));
        assert!(c.is_lit(0, 0));
        assert!(c.is_lit(3, 4));
    }

    #[test]
    fn test_crop_blank_keeps_size() {
        let r = Raster::transparent(6, 9);
        let c = r.crop_to_ink();
        assert_eq!((c.width(), c.height()), (6, 9));
    }

    #[test]
    fn test_rotate_quarter_turns() {
        // top-right corner of a 4x2 raster
        let r = dot(4, 2, 3, 0);

        let ccw = r.rotate(90.0);
        assert_eq!((ccw.width(), ccw.height()), (2, 4));
        assert!(ccw.is_lit(0, 0));

        let half = r.rotate(180.0);
        assert_eq!((half.width(), half.height()), (4, 2));
        assert!(half.is_lit(0, 1));

        let cw = r.rotate(270.0);
        assert_eq!((cw.width(), cw.height()), (2, 4));
        assert!(cw.is_lit(1, 3));

        assert_eq!(r.rotate(-90.0), cw);
        assert_eq!(r.rotate(360.0), r);
    }

    #[test]
    fn test_rotate_arbitrary_expands() {
        let r = Raster::filled(10, 10, 255);
        let rot = r.rotate(45.0);
        // diagonal of a 10x10 square is ~14.14
        assert!(rot.width() >= 14 && rot.width() <= 16, "{}", rot.width());
        assert_eq!(rot.width(), rot.height());
        let cx = rot.width() / 2;
        assert!(rot.is_lit(cx, cx));
        assert_eq!(rot.pixel(0, 0), Some((0, 0)));
    }

    #[test]
    fn test_paste_respects_alpha() {
        let mut dst = Raster::filled(4, 4, 0);
        let mut src = Raster::transparent(2, 2);
        src.set_pixel(1, 1, 255, 255);
        dst.paste(&src, Point::new(1, 1));
        assert_eq!(dst.count_lit(), 1);
        assert!(dst.is_lit(2, 2));
    }

    #[test]
    fn test_paste_opaque_black_overwrites() {
        let mut dst = Raster::filled(4, 4, 255);
        let src = Raster::filled(2, 2, 0);
        dst.paste(&src, Point::new(-1, -1));
        assert!(!dst.is_lit(0, 0));
        assert!(dst.is_lit(1, 1));
        assert_eq!(dst.count_lit(), 15);
    }

    #[test]
    fn test_paste_half_alpha_blends() {
        let mut dst = Raster::filled(1, 1, 0);
        let mut src = Raster::transparent(1, 1);
        src.set_pixel(0, 0, 255, 128);
        dst.paste(&src, Point::zero());
        assert_eq!(dst.luma_at(0, 0), 128);
    }
}
