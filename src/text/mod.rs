/*
 *  text/mod.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text layout - font resolution and glyph rendering
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

pub mod font;
pub mod bitmap_font;
pub mod outline;
pub mod layout;

pub use font::{
    normalize_name, BitmapFont, FilePath, FontDirectory, FontHandle, FontResolver, FontStrategy,
    OutlineFace, SystemQuery,
};
pub use bitmap_font::{builtin_mono, GlyphSheet, SheetDescriptor};
pub use layout::{expand_timestring, render_line, render_vertical};
