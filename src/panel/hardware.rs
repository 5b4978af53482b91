/*
 *  panel/hardware.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel driver that talks to a real controller
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

use std::io::{Read, Write};

use log::{debug, info};

use crate::graphics::codec;
use crate::panel::error::ControllerError;
use crate::panel::mux::MuxAddress;
use crate::panel::protocol::Protocol;
use crate::panel::traits::{PanelDriver, PanelGeometry};

/// Flip-dot controller reachable over a byte stream
pub struct HardwarePanel<T: Read + Write + Send> {
    protocol: Protocol<T>,
    geometry: PanelGeometry,
}

impl<T: Read + Write + Send> HardwarePanel<T> {
    pub fn new(transport: T, geometry: PanelGeometry, address: Option<MuxAddress>) -> Self {
        match address {
            Some(a) => info!("Panel {}x{} on {}", geometry.width(), geometry.height(), a),
            None => info!("Panel {}x{} on a direct line", geometry.width(), geometry.height()),
        }
        Self {
            protocol: Protocol::new(transport, address),
            geometry,
        }
    }

    /// Raw access to the command engine (programming mode, pass-through)
    pub fn protocol_mut(&mut self) -> &mut Protocol<T> {
        &mut self.protocol
    }

    pub fn into_inner(self) -> T {
        self.protocol.into_inner()
    }
}

impl<T: Read + Write + Send> PanelDriver for HardwarePanel<T> {
    fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    fn address(&self) -> Option<MuxAddress> {
        self.protocol.address()
    }

    fn is_hardware(&self) -> bool {
        true
    }

    fn transmit(&mut self, bitmap: &[u8]) -> Result<(), ControllerError> {
        // stale controller memory would otherwise fill the rest of the panel
        let padded = codec::pad(bitmap, &self.geometry);
        debug!("sending {} byte bitmap ({} supplied)", padded.len(), bitmap.len());
        self.protocol.send_bitmap(&padded)
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), ControllerError> {
        self.protocol.set_backlight(on)
    }

    fn set_inverting(&mut self, on: bool) -> Result<(), ControllerError> {
        self.protocol.set_inverting(on)
    }

    fn set_active(&mut self, on: bool) -> Result<(), ControllerError> {
        self.protocol.set_active(on)
    }

    fn set_quick_update(&mut self, on: bool) -> Result<(), ControllerError> {
        self.protocol.set_quick_update(on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::mock::{MockLine, Reply};

    #[test]
    fn test_transmit_pads_tail() {
        let line = MockLine::acking(1);
        let geo = PanelGeometry::new(4, 16).unwrap();
        let mut panel = HardwarePanel::new(line.clone(), geo, None);

        panel.transmit(&[0xAA, 0xBB, 0xCC]).unwrap();
        assert_eq!(
            line.written(),
            vec![0xFF, 0xA0, 0x08, 0xAA, 0xBB, 0xCC, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_transmit_framed() {
        let line = MockLine::acking(1);
        let geo = PanelGeometry::new(1, 16).unwrap();
        let addr = MuxAddress::new(1).unwrap();
        let mut panel = HardwarePanel::new(line.clone(), geo, Some(addr));

        panel.transmit(&[0x0F, 0xF0]).unwrap();
        assert_eq!(
            line.written(),
            vec![0xF0, 0xC1, 0x00, 0x05, 0xFF, 0xA0, 0x02, 0x0F, 0xF0]
        );
        assert_eq!(panel.address(), Some(addr));
    }

    #[test]
    fn test_failure_propagates() {
        let line = MockLine::new();
        line.push_reply(Reply::Byte(0xEE));
        let geo = PanelGeometry::new(2, 16).unwrap();
        let mut panel = HardwarePanel::new(line, geo, None);
        assert!(panel.set_backlight(true).is_err());
    }
}
