/*
 *  panel/mux.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Multiplexer framing for panels sharing one serial line
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

//! The multiplexer sits between the host and up to 48 panel controllers.
//! It reads a fixed four byte header, then forwards exactly `len` bytes to
//! the addressed port:
//!
//! ```text
//! F0 | C0+addr | len_msb | len_lsb | payload ...
//! ```
//!
//! Payloads are opaque to the mux so nothing is escaped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_MUX_ADDRESS, MAX_MUX_PAYLOAD, MUX_ADDRESS_BASE, MUX_HEADER_LEN, MUX_MARKER,
};
use crate::panel::error::ControllerError;

/// Port number of a panel behind the multiplexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MuxAddress(u8);

impl MuxAddress {
    pub fn new(address: u8) -> Result<Self, ControllerError> {
        if address > MAX_MUX_ADDRESS {
            return Err(ControllerError::InvalidAddress(address));
        }
        Ok(Self(address))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Second header byte selecting this port
    pub fn header_byte(self) -> u8 {
        MUX_ADDRESS_BASE + self.0
    }
}

impl TryFrom<u8> for MuxAddress {
    type Error = ControllerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MuxAddress::new(value)
    }
}

impl From<MuxAddress> for u8 {
    fn from(address: MuxAddress) -> u8 {
        address.0
    }
}

impl fmt::Display for MuxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mux:{}", self.0)
    }
}

/// Wrap `payload` for delivery to `address`.
pub fn frame(payload: &[u8], address: MuxAddress) -> Result<Vec<u8>, ControllerError> {
    let len = payload.len();
    if len > MAX_MUX_PAYLOAD {
        return Err(ControllerError::PayloadTooLong(len));
    }
    let [len_msb, len_lsb] = (len as u16).to_be_bytes();

    let mut framed = Vec::with_capacity(MUX_HEADER_LEN + len);
    framed.extend_from_slice(&[MUX_MARKER, address.header_byte(), len_msb, len_lsb]);
    framed.extend_from_slice(payload);
    Ok(framed)
}
