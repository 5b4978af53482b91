/*
 *  graphics/error.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for rendering and font resolution
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

use thiserror::Error;

/// No resolver strategy produced a font
#[derive(Debug, Error)]
pub enum FontError {
    #[error("no font found for query '{query}'")]
    NotFound { query: String },

    /// A bitmap font descriptor exists but cannot be used
    #[error("bad bitmap font '{name}': {reason}")]
    Sheet { name: String, reason: String },
}

/// Invalid drawing parameters or undecodable input
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid panel geometry {width}x{height} (height must be a positive multiple of 8)")]
    Geometry { width: u32, height: u32 },

    #[error("bitmap of {len} bytes is not a whole number of {per_column}-byte columns")]
    BitmapLength { len: usize, per_column: usize },

    #[error("invalid time format '{0}'")]
    TimeFormat(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("text rendering failed: {0}")]
    Text(String),

    #[error("invalid drawing parameters: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Font(#[from] FontError),
}
