/*
 *  constants.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wire protocol and rendering constants
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

// command markers
pub const COMMAND_MARKER: u8 = 0xFF;
pub const MUX_MARKER: u8 = 0xF0;
pub const MUX_ADDRESS_BASE: u8 = 0xC0;
/// 0xC0 + 47 = 0xEF, one below the mux marker
pub const MAX_MUX_ADDRESS: u8 = 47;
pub const MUX_HEADER_LEN: usize = 4;
pub const MAX_MUX_PAYLOAD: usize = u16::MAX as usize;

// status bytes returned by a panel controller
pub const STATUS_SUCCESS: u8 = 0xFF;
pub const STATUS_TIMEOUT: u8 = 0xE0;
pub const STATUS_GENERIC_ERROR: u8 = 0xEE;

pub const DEFAULT_LOG_LEVEL: &str = "info";

// clock faces poll the wall clock this often
pub const CLOCK_POLL_MS: u64 = 1_000;

// serial link defaults (the controllers run at the bootloader rate)
pub const DEFAULT_BAUD_RATE: u32 = 57_600;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

// panel defaults
pub const DEFAULT_PANEL_WIDTH: u32 = 28;
pub const DEFAULT_PANEL_HEIGHT: u32 = 16;
pub const ROWS_PER_BYTE: u32 = 8;
pub const DEFAULT_PANEL_NAME: &str = "main";

/// luma above this is a flipped (lit) dot
pub const MONO_THRESHOLD: u8 = 127;
pub const LUMA_ON: u8 = 255;
pub const LUMA_OFF: u8 = 0;

// text defaults
/// compiled in, so it resolves without a font directory
pub const DEFAULT_FONT: &str = "6x10";
pub const DEFAULT_FONT_DIR: &str = "fonts";
pub const DEFAULT_FONT_SIZE: u32 = 20;
pub const DEFAULT_VERTICAL_SPACING: u32 = 2;
pub const OUTLINE_FONT_EXT: &str = "ttf";
pub const BITMAP_FONT_EXT: &str = "yaml";
