//! # Configuration
//!
//! This module defines the configuration struct for the Editor.

use std::time::Duration;

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::input::Keymap;

/// Configuration parameters for the Editor.
///
/// These settings allow the host application to tune the feel of the editor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Max gap between presses to count as a double-click. Default: 400ms.
    pub double_click_interval: Duration,
    /// Time between the placement click and the placed object becoming interactive.
    /// Default: 200ms.
    pub placement_commit_delay: Duration,
    /// Thickness of connectors created by interaction. Must be odd. Default: 9.
    pub connector_thickness: u32,
    /// Radius of placed circles. Default: 50.
    pub circle_radius: f32,
    /// Size of placed rectangles. Default: 100x100.
    pub rectangle_size: Vec2,
    /// Depth of placed objects. Default: 50.
    pub placement_depth: i32,
    /// Key bindings for editor commands.
    pub keymap: Keymap,
    /// Visual styling configuration.
    pub style: EditorStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            double_click_interval: Duration::from_millis(400),
            placement_commit_delay: Duration::from_millis(200),
            connector_thickness: 9,
            circle_radius: 50.0,
            rectangle_size: Vec2::new(100.0, 100.0),
            placement_depth: 50,
            keymap: Keymap::default(),
            style: EditorStyle::default(),
        }
    }
}

/// Colors used to draw objects, as `glam::Vec4` RGBA.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorStyle {
    /// Clear color of the canvas.
    pub background_color: Vec4,
    /// Fill of every shape.
    pub base_color: Vec4,
    /// Outline of the selected object.
    pub select_color: Vec4,
    /// Outline of the hovered object.
    pub hover_color: Vec4,
    /// Outline of a placement ghost.
    pub preview_color: Vec4,
    /// Outline of an idle object.
    pub outline_color: Vec4,
    /// Label text.
    pub text_color: Vec4,
}

impl Default for EditorStyle {
    fn default() -> Self {
        Self {
            background_color: rgb(50, 50, 50),
            base_color: rgb(127, 127, 127),
            select_color: rgb(255, 127, 14),
            hover_color: rgb(31, 119, 180),
            preview_color: rgb(225, 255, 255),
            outline_color: rgb(155, 155, 155),
            text_color: rgb(230, 230, 230),
        }
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Vec4 {
    Vec4::new(r as f32, g as f32, b as f32, 255.0) / 255.0
}
