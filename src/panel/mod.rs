/*
 *  panel/mod.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel subsystem - controller protocol, multiplexer framing, drivers
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

// Core trait definitions
pub mod traits;
pub mod error;

// Wire level
pub mod mux;
pub mod protocol;
pub mod transport;

// Drivers
pub mod hardware;
pub mod null;

// Mock line for testing
pub mod mock;

// Re-exports for convenience
pub use traits::{PanelDriver, PanelGeometry, BoxedPanel};
pub use error::{ControllerError, ProtocolError};
pub use mux::MuxAddress;
pub use protocol::{CommandMessage, Opcode, ProgrammingResponse, Protocol, Status};
pub use transport::{open_serial, SerialSettings, SharedLine};
pub use hardware::HardwarePanel;
pub use null::NullPanel;
