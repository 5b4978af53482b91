/*
 *  scene/mod.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scene composition - composer, draw operations, panel hub
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

pub mod composer;
pub mod ops;
pub mod hub;

pub use composer::{Composer, TextStyle};
pub use ops::{DrawOp, PanelScene, SceneFile};
pub use hub::{HubError, PanelHub, PanelInfo, PanelSpec, PanelState};
