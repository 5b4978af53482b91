/*
 *  panel/mock.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  In-memory serial line for testing without hardware
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

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Scripted answer for the next read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Byte(u8),
    /// read returns 0 bytes
    Silent,
    /// read fails with `TimedOut`, like a serial port with a read timeout
    TimedOut,
    /// read fails with a hard I/O error
    Broken,
}

/// Internal state for the mock line (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockLineState {
    /// Everything written so far, in order
    pub written: Vec<u8>,

    /// Number of write calls
    pub write_count: usize,

    /// Replies handed out by successive reads; empty queue reads as silence
    pub replies: VecDeque<Reply>,

    /// Fail every write (for error testing)
    pub simulate_write_failure: bool,
}

/// Mock serial line
///
/// Records all bytes written and answers reads from a scripted queue.
/// Clones share state, so a test can hand one clone to the protocol engine
/// and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockLine {
    state: Arc<Mutex<MockLineState>>,
}

impl MockLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line whose controller acknowledges `count` commands
    pub fn acking(count: usize) -> Self {
        let line = Self::new();
        for _ in 0..count {
            line.push_reply(Reply::Byte(crate::constants::STATUS_SUCCESS));
        }
        line
    }

    pub fn push_reply(&self, reply: Reply) {
        self.lock().replies.push_back(reply);
    }

    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    pub fn clear_written(&self) {
        self.lock().written.clear();
    }

    pub fn set_write_failure(&self, fail: bool) {
        self.lock().simulate_write_failure = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MockLineState> {
        // a panicking test poisons the lock; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Read for MockLine {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.lock().replies.pop_front() {
            Some(Reply::Byte(b)) if !buf.is_empty() => {
                buf[0] = b;
                Ok(1)
            }
            Some(Reply::Byte(_)) | Some(Reply::Silent) | None => Ok(0),
            Some(Reply::TimedOut) => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
            Some(Reply::Broken) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "line unplugged")),
        }
    }
}

impl Write for MockLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        if state.simulate_write_failure {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated write failure"));
        }
        state.write_count += 1;
        state.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
