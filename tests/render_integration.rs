/*
 *  tests/render_integration.rs
 *
 *  Integration tests for the raster canvas, wire codec, clocks and text
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 */

use chrono::{NaiveDate, NaiveTime};
use embedded_graphics::prelude::*;
use flipdots::graphics::{
    binary_clock, codec, BinaryClockStyle, Canvas, HAlign, Placement, Raster, VAlign,
};
use flipdots::panel::mock::{MockLine, Reply};
use flipdots::panel::{HardwarePanel, NullPanel, PanelGeometry, ProtocolError};
use flipdots::scene::{Composer, TextStyle};
use flipdots::text::{render_line, render_vertical, BitmapFont, FontHandle, FontResolver};
use proptest::prelude::*;

fn geometry() -> PanelGeometry {
    PanelGeometry::new(28, 16).unwrap()
}

fn mono_only() -> FontResolver {
    FontResolver::with_strategies(vec![Box::new(BitmapFont::new("no-such-dir"))])
}

fn raster_from(width: u32, lumas: &[u8]) -> Raster {
    let mut r = Raster::filled(width, 16, 0);
    for (i, &l) in lumas.iter().enumerate() {
        r.set_pixel(i % width as usize, i / width as usize, l, 255);
    }
    r
}

proptest! {
    #[test]
    fn prop_encode_is_two_bytes_per_column(
        (width, lumas) in (1u32..40).prop_flat_map(|w| {
            (Just(w), proptest::collection::vec(any::<u8>(), (w * 16) as usize))
        })
    ) {
        let r = raster_from(width, &lumas);
        prop_assert_eq!(codec::encode(&r).len(), 2 * width as usize);
    }

    #[test]
    fn prop_decode_of_encode_is_threshold(
        (width, lumas) in (1u32..40).prop_flat_map(|w| {
            (Just(w), proptest::collection::vec(any::<u8>(), (w * 16) as usize))
        })
    ) {
        let r = raster_from(width, &lumas);
        let back = codec::decode(&codec::encode(&r), 16).unwrap();
        for y in 0..16 {
            for x in 0..width as usize {
                let expected = lumas[y * width as usize + x] > 127;
                prop_assert_eq!(back.is_lit(x, y), expected);
            }
        }
    }
}

#[test]
fn test_short_bitmap_padded_on_tail() {
    let padded = codec::pad(&[0xAA, 0x55, 0x01], &geometry());
    assert_eq!(padded.len(), 56);
    assert_eq!(&padded[..3], &[0xAA, 0x55, 0x01]);
    assert!(padded[3..].iter().all(|&b| b == 0));

    let line = MockLine::acking(1);
    let mut p = HardwarePanel::new(line.clone(), geometry(), None);
    flipdots::panel::PanelDriver::transmit(&mut p, &[0xAA]).unwrap();
    let wire = line.written();
    assert_eq!(&wire[..4], &[0xFF, 0xA0, 56, 0xAA]);
    assert_eq!(wire.len(), 3 + 56);
}

#[test]
fn test_right_bottom_placement() {
    let mut canvas = Canvas::new(geometry());
    let source = Raster::filled(10, 10, 255);
    let origin = canvas.compose(&source, &Placement::aligned(HAlign::Right, VAlign::Bottom));
    assert_eq!(origin, Point::new(18, 6));
    assert!(canvas.raster().is_lit(18, 6));
    assert!(canvas.raster().is_lit(27, 15));
    assert!(!canvas.raster().is_lit(17, 6));
    assert!(!canvas.raster().is_lit(18, 5));
}

#[test]
fn test_binary_clock_bits() {
    let tile = binary_clock(&NaiveTime::from_hms_opt(14, 5, 0).unwrap(), &BinaryClockStyle::default())
        .unwrap();
    assert_eq!((tile.width(), tile.height()), (23, 7));

    // interior pixel of each 3x3 block: lit only when the bit is set
    let bits = |row_top: usize| -> String {
        (0..6)
            .map(|d| if tile.is_lit(d * 4 + 1, row_top + 1) { '1' } else { '0' })
            .collect()
    };
    assert_eq!(bits(0), "001110");
    assert_eq!(bits(4), "000101");
}

#[test]
fn test_vertical_width_formula() {
    let font = mono_only().resolve("6x10").unwrap();
    assert!(matches!(font, FontHandle::Mono(_)));

    let glyph_widths: usize = "abc"
        .chars()
        .map(|c| {
            render_line(&font, &c.to_string(), 10, 255)
                .unwrap()
                .rotate(90.0)
                .crop_to_ink()
                .width()
        })
        .sum();
    let block = render_vertical(&font, "abc", 10, 255, 2, HAlign::Center).unwrap().unwrap();
    assert_eq!(block.width(), glyph_widths + 2 * 3 - 1);
}

#[test]
fn test_commit_resets_canvas_only_on_success() {
    let line = MockLine::new();
    line.push_reply(Reply::Byte(0xEE));
    line.push_reply(Reply::Byte(0xFF));
    let panel = HardwarePanel::new(line.clone(), geometry(), None);
    let mut composer = Composer::with_fonts(panel, mono_only(), "6x10");

    composer.fill_all();
    let err = composer.commit().unwrap_err();
    assert_eq!(err.protocol(), Some(ProtocolError::GenericError));
    assert_eq!(composer.canvas().raster().count_lit(), 28 * 16);

    let sent = composer.commit().unwrap();
    assert_eq!(sent, vec![0xFF; 56]);
    assert_eq!(composer.canvas().raster().count_lit(), 0);
}

#[test]
fn test_time_text_lands_on_the_panel() {
    let mut composer = Composer::with_fonts(NullPanel::new(geometry()), mono_only(), "6x10");
    composer.set_clock(Some(
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(7, 30, 0).unwrap(),
    ));
    let style = TextStyle { timestring: true, ..TextStyle::default() };
    let origin = composer.text("%H%M", &style).unwrap().unwrap();

    // four 6x10 cells centred on 28x16
    assert_eq!(origin, Point::new(2, 3));
    let frame = codec::decode(&composer.commit().unwrap(), 16).unwrap();
    assert!(frame.count_lit() > 0);
    assert_eq!(composer.canvas().raster().count_lit(), 0);
}
