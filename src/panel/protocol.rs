/*
 *  panel/protocol.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command protocol engine: build, send and confirm controller commands
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

use std::io::{ErrorKind, Read, Write};

use log::{debug, warn};

use crate::constants::{
    COMMAND_MARKER, MUX_MARKER, STATUS_GENERIC_ERROR, STATUS_SUCCESS, STATUS_TIMEOUT,
};
use crate::panel::error::{ControllerError, ProtocolError};
use crate::panel::mux::{self, MuxAddress};

/// Controller opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    SendBitmap = 0xA0,
    Backlight = 0xA1,
    Invert = 0xA2,
    Active = 0xA3,
    QuickUpdate = 0xA4,
    /// Out-of-band, firmware tooling only
    ProgrammingMode = 0xAF,
}

/// Outcome of one command cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Timeout,
    GenericError,
    Unknown(u8),
    /// Synthesized locally: the read came back empty or timed out
    NoResponse,
}

impl Status {
    pub fn decode(response: Option<u8>) -> Self {
        match response {
            None => Status::NoResponse,
            Some(STATUS_SUCCESS) => Status::Success,
            Some(STATUS_TIMEOUT) => Status::Timeout,
            Some(STATUS_GENERIC_ERROR) => Status::GenericError,
            Some(code) => Status::Unknown(code),
        }
    }

    pub fn into_result(self) -> Result<(), ProtocolError> {
        match self {
            Status::Success => Ok(()),
            Status::Timeout => Err(ProtocolError::Timeout),
            Status::GenericError => Err(ProtocolError::GenericError),
            Status::Unknown(code) => Err(ProtocolError::Unknown(code)),
            Status::NoResponse => Err(ProtocolError::NoResponse),
        }
    }
}

/// A prepared `[0xFF, opcode, operands...]` message, consumed by `transmit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage(Vec<u8>);

impl CommandMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn opcode(&self) -> u8 {
        self.0[1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What the controller said when asked to enter programming mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgrammingResponse {
    Responded(u8),
    /// Nothing came back; the controller is most likely in the bootloader already
    Silent,
}

/// Drives one byte stream, optionally addressing a port behind the mux.
///
/// Every operation is a blocking write followed by a single status read
/// bounded by the transport's own read timeout. Nothing is retried and no
/// state is carried between calls.
pub struct Protocol<T: Read + Write> {
    transport: T,
    address: Option<MuxAddress>,
}

impl<T: Read + Write> Protocol<T> {
    pub fn new(transport: T, address: Option<MuxAddress>) -> Self {
        Self { transport, address }
    }

    pub fn address(&self) -> Option<MuxAddress> {
        self.address
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Build a command message
    pub fn prepare(opcode: Opcode, operands: &[u8]) -> CommandMessage {
        let mut bytes = Vec::with_capacity(2 + operands.len());
        bytes.push(COMMAND_MARKER);
        bytes.push(opcode as u8);
        bytes.extend_from_slice(operands);
        CommandMessage(bytes)
    }

    /// Send a prepared message and wait for its status byte
    pub fn transmit(&mut self, message: CommandMessage) -> Result<(), ControllerError> {
        let wire = match self.address {
            Some(address) => mux::frame(message.as_bytes(), address)?,
            None => message.0,
        };
        self.transport.write_all(&wire)?;
        self.transport.flush()?;

        let status = self.read_status()?;
        debug!("opcode 0x{:02X} -> {:?}", wire_opcode(&wire, self.address.is_some()), status);
        status.into_result().map_err(ControllerError::from)
    }

    /// One blocking read; empty or timed out reads become `NoResponse`
    pub fn read_status(&mut self) -> Result<Status, ControllerError> {
        Ok(Status::decode(self.read_response()?))
    }

    fn read_response(&mut self) -> Result<Option<u8>, ControllerError> {
        let mut byte = [0u8; 1];
        loop {
            match self.transport.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None);
                }
                Err(e) => return Err(ControllerError::Transport(e)),
            }
        }
    }

    /// Bitmap must already be padded to the panel size
    pub fn send_bitmap(&mut self, bitmap: &[u8]) -> Result<(), ControllerError> {
        let len = u8::try_from(bitmap.len())
            .map_err(|_| ControllerError::BitmapTooLong(bitmap.len()))?;
        let mut operands = Vec::with_capacity(1 + bitmap.len());
        operands.push(len);
        operands.extend_from_slice(bitmap);
        self.transmit(Self::prepare(Opcode::SendBitmap, &operands))
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), ControllerError> {
        self.transmit(Self::prepare(Opcode::Backlight, &[flag(on)]))
    }

    pub fn set_inverting(&mut self, on: bool) -> Result<(), ControllerError> {
        self.transmit(Self::prepare(Opcode::Invert, &[flag(on)]))
    }

    pub fn set_active(&mut self, on: bool) -> Result<(), ControllerError> {
        self.transmit(Self::prepare(Opcode::Active, &[flag(on)]))
    }

    pub fn set_quick_update(&mut self, on: bool) -> Result<(), ControllerError> {
        self.transmit(Self::prepare(Opcode::QuickUpdate, &[flag(on)]))
    }

    /// Ask the controller at `address` to jump into its bootloader.
    ///
    /// Written straight to the line with the mux marker, regardless of the
    /// address this engine was built with. A missing answer is expected.
    pub fn enter_programming_mode(
        &mut self,
        address: MuxAddress,
    ) -> Result<ProgrammingResponse, ControllerError> {
        let request = [
            MUX_MARKER,
            address.header_byte(),
            0x00,
            0x02,
            COMMAND_MARKER,
            Opcode::ProgrammingMode as u8,
        ];
        self.transport.write_all(&request)?;
        self.transport.flush()?;

        match self.read_response()? {
            Some(code) => {
                debug!("programming mode request answered with 0x{:02X}", code);
                Ok(ProgrammingResponse::Responded(code))
            }
            None => {
                warn!("no response from controller at {}, assuming it is already in programming mode", address);
                Ok(ProgrammingResponse::Silent)
            }
        }
    }

    /// Zero length frame: the mux keeps forwarding everything to `address`
    pub fn open_passthrough(&mut self, address: MuxAddress) -> Result<(), ControllerError> {
        let header = mux::frame(&[], address)?;
        self.transport.write_all(&header)?;
        self.transport.flush()?;
        Ok(())
    }
}

fn flag(on: bool) -> u8 {
    if on { 0x01 } else { 0x00 }
}

fn wire_opcode(wire: &[u8], framed: bool) -> u8 {
    let at = if framed { 5 } else { 1 };
    wire.get(at).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::mock::{MockLine, Reply};

    fn engine(address: Option<u8>) -> (Protocol<MockLine>, MockLine) {
        let line = MockLine::new();
        let address = address.map(|a| MuxAddress::new(a).unwrap());
        (Protocol::new(line.clone(), address), line)
    }

    #[test]
    fn test_prepare_layout() {
        let msg = Protocol::<MockLine>::prepare(Opcode::Invert, &[0x01]);
        assert_eq!(msg.as_bytes(), &[0xFF, 0xA2, 0x01]);
        assert_eq!(msg.opcode(), 0xA2);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Status::decode(Some(0xFF)), Status::Success);
        assert_eq!(Status::decode(Some(0xE0)), Status::Timeout);
        assert_eq!(Status::decode(Some(0xEE)), Status::GenericError);
        assert_eq!(Status::decode(Some(0x00)), Status::Unknown(0x00));
        assert_eq!(Status::decode(None), Status::NoResponse);
        assert!(Status::Unknown(0x01).into_result().is_err());
    }

    #[test]
    fn test_backlight_unframed() {
        let (mut proto, line) = engine(None);
        line.push_reply(Reply::Byte(0xFF));
        proto.set_backlight(true).unwrap();
        assert_eq!(line.written(), vec![0xFF, 0xA1, 0x01]);
    }

    #[test]
    fn test_toggles_framed() {
        let (mut proto, line) = engine(Some(1));
        for _ in 0..3 {
            line.push_reply(Reply::Byte(0xFF));
        }
        proto.set_inverting(false).unwrap();
        proto.set_active(true).unwrap();
        proto.set_quick_update(true).unwrap();
        assert_eq!(
            line.written(),
            vec![
                0xF0, 0xC1, 0x00, 0x03, 0xFF, 0xA2, 0x00,
                0xF0, 0xC1, 0x00, 0x03, 0xFF, 0xA3, 0x01,
                0xF0, 0xC1, 0x00, 0x03, 0xFF, 0xA4, 0x01,
            ]
        );
    }

    #[test]
    fn test_send_bitmap_does_not_pad() {
        let (mut proto, line) = engine(None);
        line.push_reply(Reply::Byte(0xFF));
        proto.send_bitmap(&[0x81, 0x42]).unwrap();
        assert_eq!(line.written(), vec![0xFF, 0xA0, 0x02, 0x81, 0x42]);
    }

    #[test]
    fn test_send_bitmap_too_long() {
        let (mut proto, line) = engine(None);
        let err = proto.send_bitmap(&vec![0u8; 256]).unwrap_err();
        assert!(matches!(err, ControllerError::BitmapTooLong(256)));
        assert!(line.written().is_empty());
    }

    #[test]
    fn test_error_statuses_surface() {
        let (mut proto, line) = engine(None);
        line.push_reply(Reply::Byte(0xE0));
        line.push_reply(Reply::Byte(0xEE));
        line.push_reply(Reply::Byte(0x13));
        line.push_reply(Reply::Silent);
        line.push_reply(Reply::TimedOut);

        let codes: Vec<_> = (0..5)
            .map(|_| proto.set_active(true).unwrap_err().protocol())
            .collect();
        assert_eq!(
            codes,
            vec![
                Some(ProtocolError::Timeout),
                Some(ProtocolError::GenericError),
                Some(ProtocolError::Unknown(0x13)),
                Some(ProtocolError::NoResponse),
                Some(ProtocolError::NoResponse),
            ]
        );
    }

    #[test]
    fn test_transport_failure() {
        let (mut proto, line) = engine(None);
        line.push_reply(Reply::Broken);
        let err = proto.set_backlight(false).unwrap_err();
        assert!(matches!(err, ControllerError::Transport(_)));
    }

    #[test]
    fn test_programming_mode_silence_is_benign() {
        let (mut proto, line) = engine(None);
        let addr = MuxAddress::new(3).unwrap();
        assert_eq!(proto.enter_programming_mode(addr).unwrap(), ProgrammingResponse::Silent);
        assert_eq!(line.written(), vec![0xF0, 0xC3, 0x00, 0x02, 0xFF, 0xAF]);
    }

    #[test]
    fn test_programming_mode_response() {
        let (mut proto, line) = engine(Some(5));
        line.push_reply(Reply::Byte(0xFF));
        let addr = MuxAddress::new(3).unwrap();
        assert_eq!(
            proto.enter_programming_mode(addr).unwrap(),
            ProgrammingResponse::Responded(0xFF)
        );
        // not wrapped a second time
        assert_eq!(line.written()[..2], [0xF0, 0xC3]);
    }

    #[test]
    fn test_open_passthrough() {
        let (mut proto, line) = engine(None);
        proto.open_passthrough(MuxAddress::new(2).unwrap()).unwrap();
        assert_eq!(line.written(), vec![0xF0, 0xC2, 0x00, 0x00]);
    }
}
