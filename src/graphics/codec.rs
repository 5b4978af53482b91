/*
 *  graphics/codec.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raster <-> wire bitmap conversion
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

//! Wire bitmap layout.
//!
//! Columns are emitted left to right. Each column is `height / 8` bytes,
//! top byte first, and inside a byte the most significant bit is the
//! topmost of its eight rows. A pixel is set when its luma is above 127.

use crate::constants::{LUMA_OFF, LUMA_ON, ROWS_PER_BYTE};
use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;
use crate::panel::traits::PanelGeometry;

/// Pack a raster into wire bytes.
///
/// Rows past the last whole group of eight are not representable and are
/// dropped.
pub fn encode(raster: &Raster) -> Vec<u8> {
    let per_column = raster.height() / ROWS_PER_BYTE as usize;
    let mut out = Vec::with_capacity(raster.width() * per_column);
    for x in 0..raster.width() {
        for group in 0..per_column {
            let mut byte = 0u8;
            for bit in 0..ROWS_PER_BYTE as usize {
                if raster.is_lit(x, group * ROWS_PER_BYTE as usize + bit) {
                    byte |= 0x80 >> bit;
                }
            }
            out.push(byte);
        }
    }
    out
}

/// Unpack wire bytes for a panel of the given height
pub fn decode(bytes: &[u8], height: u32) -> Result<Raster, RenderError> {
    let per_column = (height / ROWS_PER_BYTE) as usize;
    if per_column == 0 || height % ROWS_PER_BYTE != 0 || bytes.len() % per_column != 0 {
        return Err(RenderError::BitmapLength { len: bytes.len(), per_column });
    }
    let width = bytes.len() / per_column;
    let mut raster = Raster::filled(width as u32, height, LUMA_OFF);
    for (i, byte) in bytes.iter().enumerate() {
        let x = i / per_column;
        let y0 = (i % per_column) * ROWS_PER_BYTE as usize;
        for bit in 0..ROWS_PER_BYTE as usize {
            if byte & (0x80 >> bit) != 0 {
                raster.set_pixel(x, y0 + bit, LUMA_ON, u8::MAX);
            }
        }
    }
    Ok(raster)
}

/// Zero-extend a bitmap to the full panel length; longer input is kept whole
pub fn pad(bitmap: &[u8], geometry: &PanelGeometry) -> Vec<u8> {
    let mut out = bitmap.to_vec();
    if out.len() < geometry.bitmap_len() {
        out.resize(geometry.bitmap_len(), 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_top_left() {
        let mut r = Raster::filled(28, 16, 0);
        r.set_pixel(0, 0, 255, 255);
        let bytes = encode(&r);
        assert_eq!(bytes.len(), 56);
        assert_eq!(bytes[0], 0x80);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_second_byte() {
        let mut r = Raster::filled(2, 16, 0);
        r.set_pixel(1, 15, 255, 255);
        r.set_pixel(0, 8, 255, 255);
        assert_eq!(encode(&r), vec![0x00, 0x80, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_threshold() {
        let mut r = Raster::filled(1, 8, 0);
        r.set_pixel(0, 0, 127, 255);
        r.set_pixel(0, 1, 128, 255);
        assert_eq!(encode(&r), vec![0x40]);
    }

    #[test]
    fn test_decode_rejects_ragged() {
        assert!(matches!(
            decode(&[0, 0, 0], 16),
            Err(RenderError::BitmapLength { len: 3, per_column: 2 })
        ));
    }

    #[test]
    fn test_decode_known() {
        let r = decode(&[0x80, 0x01], 16).unwrap();
        assert_eq!((r.width(), r.height()), (1, 16));
        assert!(r.is_lit(0, 0));
        assert!(r.is_lit(0, 15));
        assert_eq!(r.count_lit(), 2);
    }

    #[test]
    fn test_pad() {
        let geo = PanelGeometry::new(3, 16).unwrap();
        assert_eq!(pad(&[1, 2], &geo), vec![1, 2, 0, 0, 0, 0]);
        assert_eq!(pad(&[9; 8], &geo).len(), 8);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            cols in 1usize..30,
            groups in 1usize..4,
            seed in proptest::collection::vec(any::<u8>(), 120),
        ) {
            let bytes: Vec<u8> = seed.iter().copied().cycle().take(cols * groups).collect();
            let raster = decode(&bytes, (groups * 8) as u32).unwrap();
            prop_assert_eq!(encode(&raster), bytes);
        }
    }
}
