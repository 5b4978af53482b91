/*
 *  panel/null.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Geometry-only panel for rendering without a device
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

use log::debug;

use crate::panel::error::ControllerError;
use crate::panel::mux::MuxAddress;
use crate::panel::traits::{PanelDriver, PanelGeometry};

/// Panel stand-in used for client-side rendering and dry runs.
/// Every command succeeds and goes nowhere.
#[derive(Debug, Clone)]
pub struct NullPanel {
    geometry: PanelGeometry,
    address: Option<MuxAddress>,
}

impl NullPanel {
    pub fn new(geometry: PanelGeometry) -> Self {
        Self { geometry, address: None }
    }

    pub fn with_address(geometry: PanelGeometry, address: Option<MuxAddress>) -> Self {
        Self { geometry, address }
    }
}

impl PanelDriver for NullPanel {
    fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    fn address(&self) -> Option<MuxAddress> {
        self.address
    }

    fn is_hardware(&self) -> bool {
        false
    }

    fn transmit(&mut self, bitmap: &[u8]) -> Result<(), ControllerError> {
        debug!("null panel: dropping {} byte bitmap", bitmap.len());
        Ok(())
    }

    fn set_backlight(&mut self, _on: bool) -> Result<(), ControllerError> {
        Ok(())
    }

    fn set_inverting(&mut self, _on: bool) -> Result<(), ControllerError> {
        Ok(())
    }

    fn set_active(&mut self, _on: bool) -> Result<(), ControllerError> {
        Ok(())
    }

    fn set_quick_update(&mut self, _on: bool) -> Result<(), ControllerError> {
        Ok(())
    }
}
