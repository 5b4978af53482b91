/*
 *  lib.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Flip-dot panel controller protocol and bitmap rendering engine
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

//! Drive flip-dot panels over a (possibly multiplexed) serial line.
//!
//! Drawing happens on a [`graphics::Canvas`] owned by a
//! [`scene::Composer`]; a commit encodes the canvas into the panel's
//! column-major wire bitmap and sends it through a [`panel::PanelDriver`].
//!
//! ```no_run
//! use flipdots::panel::{HardwarePanel, PanelGeometry, SerialSettings, open_serial};
//! use flipdots::scene::{Composer, TextStyle};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SerialSettings {
//!     port: "/dev/ttyUSB0".into(),
//!     baud_rate: 57_600,
//!     timeout: std::time::Duration::from_secs(1),
//! };
//! let panel = HardwarePanel::new(open_serial(&settings)?, PanelGeometry::new(28, 16)?, None);
//! let mut composer = Composer::new(panel);
//! composer.text("12:34", &TextStyle::default().with_font("6x10"))?;
//! composer.commit()?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod constants;
pub mod config;
pub mod panel;
pub mod graphics;
pub mod text;
pub mod scene;

pub use graphics::{FontError, RenderError};
pub use panel::{ControllerError, ProtocolError};

/// Any failure of the core, for callers that do not care which layer
#[derive(Debug, Error)]
pub enum FlipdotError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Font(#[from] FontError),
}
