/*
 *  graphics/image.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  PNG loading into rasters
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

use std::path::Path;

use log::debug;
use tiny_skia::Pixmap;

use crate::graphics::error::RenderError;
use crate::graphics::raster::Raster;

pub fn load_png(path: &Path) -> Result<Raster, RenderError> {
    let pixmap = Pixmap::load_png(path)
        .map_err(|e| RenderError::Image(format!("{}: {}", path.display(), e)))?;
    debug!("loaded {} ({}x{})", path.display(), pixmap.width(), pixmap.height());
    Ok(Raster::from_pixmap(&pixmap))
}

pub fn decode_png(data: &[u8]) -> Result<Raster, RenderError> {
    let pixmap = Pixmap::decode_png(data).map_err(|e| RenderError::Image(e.to_string()))?;
    Ok(Raster::from_pixmap(&pixmap))
}
