/*
 *  scene/ops.rs
 *
 *  flipdots - flip the dots
 *  (c) 2020-26 Stuart Hunter
 *
 *  Serializable draw operations and scene files
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
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use embedded_graphics::prelude::Point;
use serde::{Deserialize, Serialize};

use crate::constants::LUMA_ON;
use crate::graphics::canvas::{HAlign, Placement, VAlign};
use crate::graphics::clock::BinaryClockStyle;
use crate::graphics::error::RenderError;
use crate::panel::traits::PanelDriver;
use crate::scene::composer::{Composer, TextStyle};

fn default_width() -> u32 {
    1
}

fn default_color() -> u8 {
    LUMA_ON
}

fn default_clock_size() -> u32 {
    16
}

/// One drawing primitive with its keyword arguments, as queued for a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text {
        text: String,
        #[serde(flatten)]
        style: TextStyle,
    },
    VerticalText {
        text: String,
        #[serde(flatten)]
        style: TextStyle,
    },
    Bitmap {
        image: PathBuf,
        #[serde(flatten)]
        placement: Placement,
    },
    Line {
        /// Flat x, y list
        points: Vec<i32>,
        #[serde(default = "default_width")]
        width: u32,
        #[serde(default = "default_color")]
        color: u8,
    },
    Rectangle {
        /// x0, y0, x1, y1, both corners inclusive
        points: [i32; 4],
        #[serde(default)]
        fill: bool,
        #[serde(default = "default_color")]
        color: u8,
    },
    BinaryClock {
        #[serde(flatten)]
        style: BinaryClockStyle,
        #[serde(flatten)]
        placement: Placement,
    },
    AnalogClock {
        #[serde(default = "default_clock_size")]
        width: u32,
        #[serde(default = "default_clock_size")]
        height: u32,
        #[serde(flatten)]
        placement: Placement,
    },
    Black,
    Yellow,
}

impl DrawOp {
    pub fn name(&self) -> &'static str {
        match self {
            DrawOp::Text { .. } => "text",
            DrawOp::VerticalText { .. } => "vertical_text",
            DrawOp::Bitmap { .. } => "bitmap",
            DrawOp::Line { .. } => "line",
            DrawOp::Rectangle { .. } => "rectangle",
            DrawOp::BinaryClock { .. } => "binary_clock",
            DrawOp::AnalogClock { .. } => "analog_clock",
            DrawOp::Black => "black",
            DrawOp::Yellow => "yellow",
        }
    }

    pub fn apply<D: PanelDriver>(&self, composer: &mut Composer<D>) -> Result<(), RenderError> {
        match self {
            DrawOp::Text { text, style } => {
                composer.text(text, style)?;
            }
            DrawOp::VerticalText { text, style } => {
                composer.vertical_text(text, style)?;
            }
            DrawOp::Bitmap { image, placement } => {
                composer.bitmap_file(image, placement)?;
            }
            DrawOp::Line { points, width, color } => {
                if points.len() % 2 != 0 {
                    return Err(RenderError::InvalidParameter(format!(
                        "line points need x, y pairs, got {} values",
                        points.len()
                    )));
                }
                let points: Vec<Point> = points.chunks(2).map(|p| Point::new(p[0], p[1])).collect();
                composer.line(&points, *width, *color)?;
            }
            DrawOp::Rectangle { points: [x0, y0, x1, y1], fill, color } => {
                composer.rectangle(Point::new(*x0, *y0), Point::new(*x1, *y1), *fill, *color);
            }
            DrawOp::BinaryClock { style, placement } => {
                composer.binary_clock(style, placement)?;
            }
            DrawOp::AnalogClock { width, height, placement } => {
                composer.analog_clock(*width, *height, placement)?;
            }
            DrawOp::Black => composer.clear(),
            DrawOp::Yellow => composer.fill_all(),
        }
        Ok(())
    }
}

/// Ready-made clock layouts, redrawn once a minute by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClockFace {
    /// Time on the left, analog face on the right
    Clock,
    /// Time stacked along the panel
    Vclock,
    /// Compact time in a narrow face
    Small,
    /// Time, date and a binary clock
    Medium,
}

impl ClockFace {
    /// Draw operations for the face; `font` replaces the time font.
    /// Each list starts from a blank panel, so a frame left over from a
    /// failed send is never drawn over.
    pub fn ops(&self, font: Option<&str>) -> Vec<DrawOp> {
        let mut ops = vec![DrawOp::Black];
        ops.extend(self.face_ops(font));
        ops
    }

    fn face_ops(&self, font: Option<&str>) -> Vec<DrawOp> {
        let time = |size: u32, placement: Placement, fallback: Option<&str>| TextStyle {
            font: font.or(fallback).map(str::to_string),
            size,
            placement,
            timestring: true,
            ..TextStyle::default()
        };
        match self {
            ClockFace::Clock => vec![
                DrawOp::Text {
                    text: "%H:%M".into(),
                    style: time(22, Placement::aligned(HAlign::Left, VAlign::Middle), None),
                },
                DrawOp::AnalogClock {
                    width: 16,
                    height: 16,
                    placement: Placement::aligned(HAlign::Right, VAlign::Middle),
                },
            ],
            ClockFace::Vclock => vec![DrawOp::VerticalText {
                text: "%H:%M".into(),
                style: time(33, Placement::default(), None),
            }],
            ClockFace::Small => vec![DrawOp::Text {
                text: "%H:%M".into(),
                style: time(14, Placement::default(), Some("Arial Narrow Bold")),
            }],
            ClockFace::Medium => vec![
                DrawOp::Text {
                    text: "%H:%M".into(),
                    style: time(22, Placement::aligned(HAlign::Right, VAlign::Middle), None),
                },
                DrawOp::Text {
                    text: "%d.%m.%y".into(),
                    style: TextStyle {
                        font: Some("4x6".into()),
                        size: 4,
                        timestring: true,
                        placement: Placement::aligned(HAlign::Left, VAlign::Top),
                        ..TextStyle::default()
                    },
                },
                DrawOp::BinaryClock {
                    style: BinaryClockStyle { block_width: 4, block_height: 4, ..Default::default() },
                    placement: Placement::aligned(HAlign::Left, VAlign::Bottom),
                },
            ],
        }
    }
}

/// Panel settings and drawing for one panel of a scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelScene {
    pub backlight: Option<bool>,
    pub inverting: Option<bool>,
    pub active: Option<bool>,
    pub quick_update: Option<bool>,
    pub ops: Vec<DrawOp>,
}

/// A whole scene, panels by name
///
/// ```yaml
/// panels:
///   front:
///     backlight: true
///     ops:
///       - op: text
///         text: "%H:%M"
///         timestring: true
///         halign: right
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub panels: BTreeMap<String, PanelScene>,
}

impl SceneFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml).map_err(std::io::Error::other)
    }
}
