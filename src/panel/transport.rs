/*
 *  panel/transport.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Serial byte streams for the panel controllers
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

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::info;
use serialport::SerialPort;

use crate::panel::error::ControllerError;

/// How to open the serial line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Bounds every status read; expiry reads as "no response"
    pub timeout: Duration,
}

/// Open the serial line 8N1 with the configured read timeout
pub fn open_serial(settings: &SerialSettings) -> Result<Box<dyn SerialPort>, ControllerError> {
    info!(
        "Opening {} at {} baud (timeout {} ms)",
        settings.port,
        settings.baud_rate,
        settings.timeout.as_millis()
    );
    serialport::new(settings.port.as_str(), settings.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(settings.timeout)
        .open()
        .map_err(|e| ControllerError::Open(format!("{}: {}", settings.port, e)))
}

/// One physical line shared by every panel behind the same multiplexer.
///
/// Panels take turns from a single thread; each command is a complete
/// write-then-read cycle before the next one starts.
pub struct SharedLine<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedLine<T> {
    pub fn new(transport: T) -> Self {
        Self { inner: Arc::new(Mutex::new(transport)) }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, T>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("serial line lock poisoned"))
    }
}

impl<T> Clone for SharedLine<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Read> Read for SharedLine<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.lock()?.read(buf)
    }
}

impl<T: Write> Write for SharedLine<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}
