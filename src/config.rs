/*
 *  config.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration, CLI overrides and validation
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

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::graphics::canvas::{HAlign, Placement, VAlign};
use crate::panel::mux::MuxAddress;
use crate::panel::traits::PanelGeometry;
use crate::panel::transport::SerialSettings;
use crate::scene::composer::TextStyle;
use crate::scene::hub::PanelSpec;
use crate::scene::ops::ClockFace;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration; every field optional so files and flags layer
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,
    pub serial: Option<SerialConfig>,
    pub fonts: Option<FontConfig>,
    /// Panels on the line; a single 28x16 panel named "main" when absent
    pub panels: Option<Vec<PanelConfig>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SerialConfig {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FontConfig {
    pub dir: Option<PathBuf>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelConfig {
    pub name: String,
    pub width: u32,
    #[serde(default = "default_panel_height")]
    pub height: u32,
    /// Mux port; omit for a panel wired straight to the serial line
    pub address: Option<u8>,
}

fn default_panel_height() -> u32 {
    DEFAULT_PANEL_HEIGHT
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PANEL_NAME.to_string(),
            width: DEFAULT_PANEL_WIDTH,
            height: DEFAULT_PANEL_HEIGHT,
            address: None,
        }
    }
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn serial_settings(&self) -> SerialSettings {
        let serial = self.serial.clone().unwrap_or_default();
        SerialSettings {
            port: serial.port.unwrap_or_else(|| DEFAULT_SERIAL_PORT.to_string()),
            baud_rate: serial.baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
            timeout: Duration::from_millis(serial.timeout_ms.unwrap_or(DEFAULT_READ_TIMEOUT_MS)),
        }
    }

    pub fn font_dir(&self) -> PathBuf {
        self.fonts
            .as_ref()
            .and_then(|f| f.dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FONT_DIR))
    }

    pub fn default_font(&self) -> String {
        self.fonts
            .as_ref()
            .and_then(|f| f.default.clone())
            .unwrap_or_else(|| DEFAULT_FONT.to_string())
    }

    pub fn panel_configs(&self) -> Vec<PanelConfig> {
        match &self.panels {
            Some(panels) if !panels.is_empty() => panels.clone(),
            _ => vec![PanelConfig::default()],
        }
    }

    /// Validated panel list, ready for the hub
    pub fn panel_specs(&self) -> Result<Vec<PanelSpec>, ConfigError> {
        self.panel_configs()
            .into_iter()
            .map(|p| {
                let geometry = PanelGeometry::new(p.width, p.height)
                    .map_err(|e| ConfigError::Validation(format!("panel '{}': {}", p.name, e)))?;
                let address = p
                    .address
                    .map(MuxAddress::new)
                    .transpose()
                    .map_err(|e| ConfigError::Validation(format!("panel '{}': {}", p.name, e)))?;
                Ok(PanelSpec { name: p.name, geometry, address })
            })
            .collect()
    }
}

/// Flip-dot panel controller
#[derive(Debug, Parser, Clone)]
#[command(name = "flipdots", version, about = "Drive flip-dot panels over a serial line")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Serial device
    #[arg(short, long, global = true)]
    pub port: Option<String>,
    #[arg(long, global = true)]
    pub baud: Option<u32>,
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
    /// Panel to draw on; the first configured panel by default
    #[arg(long, global = true)]
    pub panel: Option<String>,
    #[arg(short, long, global = true)]
    pub width: Option<u32>,
    #[arg(long, global = true)]
    pub height: Option<u32>,
    /// Mux port of the panel
    #[arg(long, global = true)]
    pub address: Option<u8>,
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    pub font_dir: Option<PathBuf>,
    /// Render without a device and print the frame
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args, Clone)]
pub struct PlacementArgs {
    #[arg(long = "halign", value_enum, default_value_t = HAlign::Center)]
    pub halign: HAlign,
    #[arg(long = "valign", value_enum, default_value_t = VAlign::Middle)]
    pub valign: VAlign,
    #[arg(short = 'x', long, allow_hyphen_values = true)]
    pub x: Option<i32>,
    #[arg(short = 'y', long, allow_hyphen_values = true)]
    pub y: Option<i32>,
    /// Counter-clockwise degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub angle: f32,
}

impl PlacementArgs {
    pub fn placement(&self) -> Placement {
        Placement {
            halign: self.halign,
            valign: self.valign,
            x: self.x,
            y: self.y,
            angle: self.angle,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct TextArgs {
    /// Font query (file, font directory entry, bitmap font or system font name)
    #[arg(short, long)]
    pub font: Option<String>,
    #[arg(short, long, default_value_t = DEFAULT_FONT_SIZE)]
    pub size: u32,
    /// Treat the text as a strftime pattern
    #[arg(long, action = ArgAction::SetTrue)]
    pub timestring: bool,
    #[command(flatten)]
    pub placement: PlacementArgs,
}

impl TextArgs {
    pub fn style(&self) -> TextStyle {
        TextStyle {
            font: self.font.clone(),
            size: self.size,
            timestring: self.timestring,
            placement: self.placement.placement(),
            ..TextStyle::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Setting {
    Backlight,
    Inverting,
    Active,
    QuickUpdate,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// One line of text
    Text {
        text: String,
        #[command(flatten)]
        args: TextArgs,
    },
    /// Characters stacked along the panel
    Vtext {
        text: String,
        #[command(flatten)]
        args: TextArgs,
        #[arg(long, default_value_t = DEFAULT_VERTICAL_SPACING)]
        spacing: u32,
        #[arg(long, value_enum, default_value_t = HAlign::Center)]
        char_align: HAlign,
    },
    /// A PNG image
    Image {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// Run a clock face, redrawing when the minute changes
    Clock {
        #[arg(value_enum, default_value_t = ClockFace::Clock)]
        face: ClockFace,
        /// Font for the time text
        #[arg(short, long)]
        font: Option<String>,
        /// Draw once and exit
        #[arg(long, action = ArgAction::SetTrue)]
        once: bool,
    },
    /// Switch a controller setting
    Set {
        #[arg(value_enum)]
        setting: Setting,
        #[arg(action = ArgAction::Set)]
        on: bool,
    },
    /// Apply a YAML scene file to the configured panels
    Scene {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Put the addressed mux port into pass-through for flashing
    Program,
    /// List the system fonts known by name
    Fonts,
    /// Print the panel configuration as JSON
    Info,
}

/// Parse CLI, read YAML, merge, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli)?;

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
pub fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/flipdots/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/flipdots/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/flipdots.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["flipdots.yaml", "config/flipdots.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option. Panel lists replace.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.serial, src.serial) {
        (None, Some(s)) => dst.serial = Some(s),
        (Some(d), Some(s)) => merge_serial(d, s),
        _ => {}
    }
    match (&mut dst.fonts, src.fonts) {
        (None, Some(f)) => dst.fonts = Some(f),
        (Some(d), Some(f)) => {
            if f.dir.is_some() { d.dir = f.dir; }
            if f.default.is_some() { d.default = f.default; }
        }
        _ => {}
    }
    if src.panels.is_some() { dst.panels = src.panels; }
}

fn merge_serial(dst: &mut SerialConfig, src: SerialConfig) {
    if src.port.is_some()       { dst.port = src.port; }
    if src.baud_rate.is_some()  { dst.baud_rate = src.baud_rate; }
    if src.timeout_ms.is_some() { dst.timeout_ms = src.timeout_ms; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    if cli.port.is_some() || cli.baud.is_some() || cli.timeout_ms.is_some() {
        merge_serial(
            cfg.serial.get_or_insert_with(SerialConfig::default),
            SerialConfig {
                port: cli.port.clone(),
                baud_rate: cli.baud,
                timeout_ms: cli.timeout_ms,
            },
        );
    }
    if cli.font_dir.is_some() {
        cfg.fonts.get_or_insert_with(FontConfig::default).dir = cli.font_dir.clone();
    }

    let any_panel = cli.width.is_some() || cli.height.is_some() || cli.address.is_some();
    if any_panel {
        let mut panels = cfg.panel_configs();
        let target = match cli.panel.as_deref() {
            Some(name) => panels
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or_else(|| ConfigError::Validation(format!("no panel named '{name}'")))?,
            None => &mut panels[0],
        };
        if let Some(w) = cli.width { target.width = w; }
        if let Some(h) = cli.height { target.height = h; }
        if cli.address.is_some() { target.address = cli.address; }
        cfg.panels = Some(panels);
    }
    Ok(())
}

/// Panel geometry must fit the wire format, addresses the mux, names unique
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    let mut addresses = HashSet::new();
    for panel in cfg.panel_configs() {
        if panel.name.is_empty() {
            return Err(ConfigError::Validation("panel names must not be empty".into()));
        }
        if !names.insert(panel.name.clone()) {
            return Err(ConfigError::Validation(format!("duplicate panel name '{}'", panel.name)));
        }
        if panel.width == 0 || panel.height == 0 || panel.height % ROWS_PER_BYTE != 0 {
            return Err(ConfigError::Validation(format!(
                "panel '{}': height must be a positive multiple of {} and width > 0",
                panel.name, ROWS_PER_BYTE
            )));
        }
        if let Some(a) = panel.address {
            if a > MAX_MUX_ADDRESS {
                return Err(ConfigError::Validation(format!(
                    "panel '{}': mux address {} is above {}",
                    panel.name, a, MAX_MUX_ADDRESS
                )));
            }
            if !addresses.insert(a) {
                return Err(ConfigError::Validation(format!("mux address {a} used twice")));
            }
        }
    }
    if let Some(baud) = cfg.serial.as_ref().and_then(|s| s.baud_rate) {
        if baud == 0 {
            return Err(ConfigError::Validation("serial baud_rate must be > 0".into()));
        }
    }
    Ok(())
}
