/*
 *  panel/error.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the controller protocol
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

use crate::constants::{STATUS_GENERIC_ERROR, STATUS_TIMEOUT};

/// A panel controller answered with anything but success, or not at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("controller reported a timeout (0x{:02X})", STATUS_TIMEOUT)]
    Timeout,

    #[error("controller reported a generic error (0x{:02X})", STATUS_GENERIC_ERROR)]
    GenericError,

    #[error("controller returned unknown status 0x{0:02X}")]
    Unknown(u8),

    #[error("no response from controller")]
    NoResponse,
}

impl ProtocolError {
    /// Raw status byte behind this error; `None` when nothing was received
    pub fn code(&self) -> Option<u8> {
        match self {
            ProtocolError::Timeout => Some(STATUS_TIMEOUT),
            ProtocolError::GenericError => Some(STATUS_GENERIC_ERROR),
            ProtocolError::Unknown(code) => Some(*code),
            ProtocolError::NoResponse => None,
        }
    }
}

/// Unified error type for everything between the caller and the wire
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Read/write on the byte stream failed
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The serial port could not be opened
    #[error("cannot open serial port: {0}")]
    Open(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("invalid multiplexer address {0} (must be 0..=47)")]
    InvalidAddress(u8),

    #[error("multiplexer payload of {0} bytes exceeds 65535")]
    PayloadTooLong(usize),

    #[error("bitmap of {0} bytes does not fit the one byte length field")]
    BitmapTooLong(usize),
}

impl ControllerError {
    /// Protocol failure behind this error, if any
    pub fn protocol(&self) -> Option<ProtocolError> {
        match self {
            ControllerError::Protocol(e) => Some(*e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_codes() {
        assert_eq!(ProtocolError::Timeout.code(), Some(0xE0));
        assert_eq!(ProtocolError::GenericError.code(), Some(0xEE));
        assert_eq!(ProtocolError::Unknown(0x42).code(), Some(0x42));
        assert_eq!(ProtocolError::NoResponse.code(), None);
    }

    #[test]
    fn test_display_carries_code() {
        let msg = ControllerError::from(ProtocolError::Unknown(0x5A)).to_string();
        assert!(msg.contains("0x5A"), "{msg}");
    }
}
