/*
 *  scene/hub.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Named panels on one line - queued drawing, toggles and read-back
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

use std::collections::BTreeMap;
use std::io::{Read, Write};

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::panel::error::ControllerError;
use crate::panel::hardware::HardwarePanel;
use crate::panel::mux::MuxAddress;
use crate::panel::null::NullPanel;
use crate::panel::traits::{BoxedPanel, PanelDriver, PanelGeometry};
use crate::panel::transport::SharedLine;
use crate::scene::composer::Composer;
use crate::scene::ops::{DrawOp, PanelScene, SceneFile};
use crate::text::font::FontResolver;
use crate::FlipdotError;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("unknown panel '{0}'")]
    UnknownPanel(String),

    #[error("panel '{panel}': {source}")]
    Flipdot {
        panel: String,
        #[source]
        source: FlipdotError,
    },
}

impl HubError {
    fn on(panel: &str, source: impl Into<FlipdotError>) -> Self {
        HubError::Flipdot { panel: panel.to_string(), source: source.into() }
    }
}

/// Device toggles as last set through the hub; `None` until first set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub backlight: Option<bool>,
    pub inverting: Option<bool>,
    pub active: Option<bool>,
    pub quick_update: Option<bool>,
}

/// Configuration read-back for one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub address: Option<u8>,
    pub hardware: bool,
}

/// What the hub needs to set up one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub name: String,
    pub geometry: PanelGeometry,
    pub address: Option<MuxAddress>,
}

struct HubPanel {
    composer: Composer<BoxedPanel>,
    pending: Vec<DrawOp>,
    state: PanelState,
    last_bitmap: Option<Vec<u8>>,
    /// Canvas holds a frame whose send failed
    unsent: bool,
}

/// Several named panels, typically sharing one multiplexed line
pub struct PanelHub {
    panels: BTreeMap<String, HubPanel>,
}

impl Default for PanelHub {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelHub {
    pub fn new() -> Self {
        Self { panels: BTreeMap::new() }
    }

    /// Every panel talks over the same line, told apart by mux address
    pub fn open<T, F>(line: T, specs: &[PanelSpec], fonts: F) -> Self
    where
        T: Read + Write + Send + 'static,
        F: Fn() -> (FontResolver, String),
    {
        let shared = SharedLine::new(line);
        let mut hub = Self::new();
        for spec in specs {
            let driver = HardwarePanel::new(shared.clone(), spec.geometry, spec.address);
            let (resolver, default_font) = fonts();
            hub.add_panel(&spec.name, Composer::with_fonts(Box::new(driver), resolver, default_font));
        }
        hub
    }

    /// Render-only panels, nothing is sent anywhere
    pub fn offline<F>(specs: &[PanelSpec], fonts: F) -> Self
    where
        F: Fn() -> (FontResolver, String),
    {
        let mut hub = Self::new();
        for spec in specs {
            let driver = NullPanel::with_address(spec.geometry, spec.address);
            let (resolver, default_font) = fonts();
            hub.add_panel(&spec.name, Composer::with_fonts(Box::new(driver), resolver, default_font));
        }
        hub
    }

    pub fn add_panel(&mut self, name: &str, composer: Composer<BoxedPanel>) {
        info!("Hub panel '{}' ({}x{})", name, composer.geometry().width(), composer.geometry().height());
        let panel = HubPanel {
            composer,
            pending: Vec::new(),
            state: PanelState::default(),
            last_bitmap: None,
            unsent: false,
        };
        if self.panels.insert(name.to_string(), panel).is_some() {
            warn!("panel '{}' replaced", name);
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.panels.keys().cloned().collect()
    }

    fn panel_mut(&mut self, name: &str) -> Result<&mut HubPanel, HubError> {
        self.panels
            .get_mut(name)
            .ok_or_else(|| HubError::UnknownPanel(name.to_string()))
    }

    fn panel(&self, name: &str) -> Result<&HubPanel, HubError> {
        self.panels
            .get(name)
            .ok_or_else(|| HubError::UnknownPanel(name.to_string()))
    }

    /// Direct access to a panel's composer, e.g. to pin its clock
    pub fn composer_mut(&mut self, name: &str) -> Result<&mut Composer<BoxedPanel>, HubError> {
        Ok(&mut self.panel_mut(name)?.composer)
    }

    /// Queue a draw operation for the next commit
    pub fn submit(&mut self, name: &str, op: DrawOp) -> Result<(), HubError> {
        self.panel_mut(name)?.pending.push(op);
        Ok(())
    }

    pub fn pending(&self, name: &str) -> Result<usize, HubError> {
        Ok(self.panel(name)?.pending.len())
    }

    fn toggle(
        &mut self,
        name: &str,
        on: bool,
        send: fn(&mut BoxedPanel, bool) -> Result<(), ControllerError>,
        record: fn(&mut PanelState) -> &mut Option<bool>,
    ) -> Result<(), HubError> {
        let panel = self.panel_mut(name)?;
        send(panel.composer.driver_mut(), on).map_err(|e| HubError::on(name, e))?;
        *record(&mut panel.state) = Some(on);
        Ok(())
    }

    pub fn set_backlight(&mut self, name: &str, on: bool) -> Result<(), HubError> {
        self.toggle(name, on, |d, on| d.set_backlight(on), |s| &mut s.backlight)
    }

    pub fn set_inverting(&mut self, name: &str, on: bool) -> Result<(), HubError> {
        self.toggle(name, on, |d, on| d.set_inverting(on), |s| &mut s.inverting)
    }

    pub fn set_active(&mut self, name: &str, on: bool) -> Result<(), HubError> {
        self.toggle(name, on, |d, on| d.set_active(on), |s| &mut s.active)
    }

    pub fn set_quick_update(&mut self, name: &str, on: bool) -> Result<(), HubError> {
        self.toggle(name, on, |d, on| d.set_quick_update(on), |s| &mut s.quick_update)
    }

    /// Render and send every panel with queued drawing or an unsent frame,
    /// in name order. Stops at the first failure. A drawing failure drops
    /// that panel's queue and restores its canvas to what it was before
    /// the batch; a send failure keeps the drawing for the next commit.
    pub fn commit(&mut self) -> Result<Vec<String>, HubError> {
        let mut sent = Vec::new();
        for (name, panel) in self.panels.iter_mut() {
            if panel.pending.is_empty() && !panel.unsent {
                continue;
            }
            let ops = std::mem::take(&mut panel.pending);
            if !ops.is_empty() {
                let snapshot = panel.composer.canvas().clone();
                for op in &ops {
                    if let Err(e) = op.apply(&mut panel.composer) {
                        panel.composer.restore_canvas(snapshot);
                        return Err(HubError::on(name, e));
                    }
                }
            }
            match panel.composer.commit() {
                Ok(bitmap) => {
                    panel.last_bitmap = Some(bitmap);
                    panel.unsent = false;
                    sent.push(name.clone());
                }
                Err(e) => {
                    warn!("panel '{}' frame kept for the next commit", name);
                    panel.unsent = true;
                    return Err(HubError::on(name, e));
                }
            }
        }
        Ok(sent)
    }

    /// Toggles first, then the drawing, of every panel in the scene
    pub fn apply_scene(&mut self, scene: &SceneFile) -> Result<(), HubError> {
        for (name, panel) in &scene.panels {
            self.apply_panel_scene(name, panel)?;
        }
        Ok(())
    }

    fn apply_panel_scene(&mut self, name: &str, scene: &PanelScene) -> Result<(), HubError> {
        if let Some(on) = scene.backlight {
            self.set_backlight(name, on)?;
        }
        if let Some(on) = scene.inverting {
            self.set_inverting(name, on)?;
        }
        if let Some(on) = scene.active {
            self.set_active(name, on)?;
        }
        if let Some(on) = scene.quick_update {
            self.set_quick_update(name, on)?;
        }
        for op in &scene.ops {
            self.submit(name, op.clone())?;
        }
        Ok(())
    }

    pub fn hardware(&self) -> Vec<PanelInfo> {
        self.panels
            .iter()
            .map(|(name, panel)| {
                let driver = panel.composer.driver();
                let geometry = driver.geometry();
                PanelInfo {
                    name: name.clone(),
                    width: geometry.width(),
                    height: geometry.height(),
                    address: driver.address().map(|a| a.value()),
                    hardware: driver.is_hardware(),
                }
            })
            .collect()
    }

    pub fn panel_state(&self, name: &str) -> Result<PanelState, HubError> {
        Ok(self.panel(name)?.state)
    }

    pub fn last_bitmap(&self, name: &str) -> Result<Option<&[u8]>, HubError> {
        Ok(self.panel(name)?.last_bitmap.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::mock::{MockLine, Reply};

    fn specs() -> Vec<PanelSpec> {
        vec![
            PanelSpec {
                name: "front".into(),
                geometry: PanelGeometry::new(4, 16).unwrap(),
                address: Some(MuxAddress::new(0).unwrap()),
            },
            PanelSpec {
                name: "side".into(),
                geometry: PanelGeometry::new(2, 16).unwrap(),
                address: Some(MuxAddress::new(1).unwrap()),
            },
        ]
    }

    fn fonts() -> (FontResolver, String) {
        (FontResolver::with_strategies(Vec::new()), "5x8".to_string())
    }

    #[test]
    fn test_unknown_panel() {
        let mut hub = PanelHub::offline(&specs(), fonts);
        assert!(matches!(hub.submit("back", DrawOp::Black), Err(HubError::UnknownPanel(_))));
        assert!(matches!(hub.set_backlight("back", true), Err(HubError::UnknownPanel(_))));
    }

    #[test]
    fn test_commit_only_pending() {
        let line = MockLine::acking(1);
        let mut hub = PanelHub::open(line.clone(), &specs(), fonts);
        hub.submit("side", DrawOp::Yellow).unwrap();

        assert_eq!(hub.commit().unwrap(), vec!["side".to_string()]);
        let mut expected = vec![0xF0, 0xC1, 0x00, 0x07, 0xFF, 0xA0, 0x04];
        expected.extend([0xFF; 4]);
        assert_eq!(line.written(), expected);
        assert_eq!(hub.last_bitmap("side").unwrap(), Some(&[0xFF; 4][..]));
        assert_eq!(hub.last_bitmap("front").unwrap(), None);
        assert_eq!(hub.pending("side").unwrap(), 0);
    }

    #[test]
    fn test_toggle_recorded_on_success_only() {
        let line = MockLine::new();
        line.push_reply(Reply::Byte(0xFF));
        line.push_reply(Reply::Byte(0xEE));
        let mut hub = PanelHub::open(line.clone(), &specs(), fonts);

        hub.set_backlight("front", true).unwrap();
        assert!(hub.set_inverting("front", true).is_err());
        let state = hub.panel_state("front").unwrap();
        assert_eq!(state.backlight, Some(true));
        assert_eq!(state.inverting, None);
        assert_eq!(&line.written()[..6], &[0xF0, 0xC0, 0x00, 0x03, 0xFF, 0xA1]);
    }

    #[test]
    fn test_failed_op_keeps_canvas() {
        let line = MockLine::new();
        line.push_reply(Reply::Byte(0xEE));
        let mut hub = PanelHub::open(line, &specs(), fonts);

        // first frame fails to send and stays on the canvas
        hub.submit("front", DrawOp::Yellow).unwrap();
        assert!(hub.commit().is_err());
        assert_eq!(hub.composer_mut("front").unwrap().canvas().raster().count_lit(), 4 * 16);

        hub.submit("front", DrawOp::Black).unwrap();
        hub.submit("front", DrawOp::Line { points: vec![1], width: 1, color: 255 }).unwrap();
        assert!(hub.commit().is_err());
        assert_eq!(hub.composer_mut("front").unwrap().canvas().raster().count_lit(), 4 * 16);
        assert_eq!(hub.pending("front").unwrap(), 0);
    }

    #[test]
    fn test_failed_send_retried_on_next_commit() {
        let line = MockLine::new();
        line.push_reply(Reply::Byte(0xEE));
        line.push_reply(Reply::Byte(0xFF));
        let mut hub = PanelHub::open(line.clone(), &specs(), fonts);

        hub.submit("side", DrawOp::Yellow).unwrap();
        assert!(hub.commit().is_err());
        assert_eq!(hub.last_bitmap("side").unwrap(), None);

        line.clear_written();
        assert_eq!(hub.commit().unwrap(), vec!["side".to_string()]);
        let mut expected = vec![0xF0, 0xC1, 0x00, 0x07, 0xFF, 0xA0, 0x04];
        expected.extend([0xFF; 4]);
        assert_eq!(line.written(), expected);
        assert_eq!(hub.last_bitmap("side").unwrap(), Some(&[0xFF; 4][..]));

        // nothing left to send
        line.clear_written();
        assert!(hub.commit().unwrap().is_empty());
        assert!(line.written().is_empty());
    }

    #[test]
    fn test_hardware_readback() {
        let hub = PanelHub::offline(&specs(), fonts);
        let info = hub.hardware();
        assert_eq!(info.len(), 2);
        assert_eq!(info[1].name, "side");
        assert_eq!(info[1].address, Some(1));
        assert!(!info[0].hardware);
        let json = serde_json::to_string(&info[0]).unwrap();
        assert!(json.contains("\"width\":4"));
    }

    #[test]
    fn test_scene_applies_toggles_and_ops() {
        let mut hub = PanelHub::offline(&specs(), fonts);
        let scene = SceneFile::from_yaml(
            "panels:\n  front:\n    active: true\n    ops:\n      - op: yellow\n      - op: black\n",
        )
        .unwrap();
        hub.apply_scene(&scene).unwrap();
        assert_eq!(hub.panel_state("front").unwrap().active, Some(true));
        assert_eq!(hub.pending("front").unwrap(), 2);
    }
}
