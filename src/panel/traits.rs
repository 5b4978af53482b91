/*
 *  panel/traits.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for panel driver abstraction
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

use embedded_graphics::geometry::Size;
use serde::Serialize;

use crate::constants::ROWS_PER_BYTE;
use crate::graphics::error::RenderError;
use crate::panel::error::ControllerError;
use crate::panel::mux::MuxAddress;

/// Pixel dimensions of one panel
///
/// The wire format packs eight rows per byte, so the height has to be a
/// multiple of eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PanelGeometry {
    width: u32,
    height: u32,
}

impl PanelGeometry {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || height % ROWS_PER_BYTE != 0 {
            return Err(RenderError::Geometry { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bytes needed to describe one pixel column
    pub fn bytes_per_column(&self) -> usize {
        (self.height / ROWS_PER_BYTE) as usize
    }

    /// Length of a full-panel wire bitmap
    pub fn bitmap_len(&self) -> usize {
        self.bytes_per_column() * self.width as usize
    }
}

/// Minimal panel abstraction - everything the scene composer needs
///
/// Two flavours exist: a hardware panel that talks the controller protocol
/// over a byte stream, and a null panel that only knows its geometry so
/// frames can be rendered without a device attached.
pub trait PanelDriver: Send {
    /// Geometry of the attached panel
    fn geometry(&self) -> PanelGeometry;

    /// Mux port of the panel, if it sits behind a multiplexer
    fn address(&self) -> Option<MuxAddress> {
        None
    }

    /// Whether commands actually reach a device
    fn is_hardware(&self) -> bool;

    /// Send a wire bitmap; short bitmaps are zero padded on the tail
    fn transmit(&mut self, bitmap: &[u8]) -> Result<(), ControllerError>;

    fn set_backlight(&mut self, on: bool) -> Result<(), ControllerError>;

    fn set_inverting(&mut self, on: bool) -> Result<(), ControllerError>;

    fn set_active(&mut self, on: bool) -> Result<(), ControllerError>;

    fn set_quick_update(&mut self, on: bool) -> Result<(), ControllerError>;
}

impl<D: PanelDriver + ?Sized> PanelDriver for Box<D> {
    fn geometry(&self) -> PanelGeometry {
        (**self).geometry()
    }

    fn address(&self) -> Option<MuxAddress> {
        (**self).address()
    }

    fn is_hardware(&self) -> bool {
        (**self).is_hardware()
    }

    fn transmit(&mut self, bitmap: &[u8]) -> Result<(), ControllerError> {
        (**self).transmit(bitmap)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), ControllerError> {
        (**self).set_backlight(on)
    }

    fn set_inverting(&mut self, on: bool) -> Result<(), ControllerError> {
        (**self).set_inverting(on)
    }

    fn set_active(&mut self, on: bool) -> Result<(), ControllerError> {
        (**self).set_active(on)
    }

    fn set_quick_update(&mut self, on: bool) -> Result<(), ControllerError> {
        (**self).set_quick_update(on)
    }
}

/// Type alias for boxed panel driver trait objects
pub type BoxedPanel = Box<dyn PanelDriver>;
