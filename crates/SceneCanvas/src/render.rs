//! # Rendering System
//!
//! Objects never draw pixels themselves. They draw through the [`Surface`] trait,
//! which has two implementations:
//! - [`RenderList`]: records `DrawCommand`s that the host application turns into pixels.
//! - [`crate::depth::IdBuffer`]: rasterizes silhouettes in per-object gray levels for hit-testing.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::math::Rect;

/// The drawing primitives the scene needs from a raster target.
pub trait Surface {
    /// What a primitive is painted with: a color, or an id.
    type Paint: Copy;

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Self::Paint);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: Self::Paint);
    fn fill_rect(&mut self, rect: Rect, paint: Self::Paint);
    fn stroke_rect(&mut self, rect: Rect, width: f32, paint: Self::Paint);
    fn line(&mut self, start: Vec2, end: Vec2, width: f32, paint: Self::Paint);
    /// Text centered on `center`.
    fn text(&mut self, center: Vec2, text: &str, size: f32, paint: Self::Paint);
}

/// A single drawing primitive.
///
/// Coordinates are in **Screen Space** (Pixels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// A circle, filled when `stroke_width` is `None`.
    Circle {
        center: Vec2,
        radius: f32,
        /// RGBA, 0.0 - 1.0.
        color: Vec4,
        stroke_width: Option<f32>,
    },
    /// An axis-aligned rectangle, filled when `stroke_width` is `None`.
    Rect {
        /// Top-left position in screen pixels.
        pos: Vec2,
        /// Size in screen pixels.
        size: Vec2,
        color: Vec4,
        stroke_width: Option<f32>,
    },
    /// A straight line segment.
    Line {
        start: Vec2,
        end: Vec2,
        color: Vec4,
        /// Line thickness in pixels.
        width: f32,
    },
    /// Text to be rendered centered on `center`.
    ///
    /// Font selection and glyph layout are left to the host.
    Text {
        center: Vec2,
        text: String,
        color: Vec4,
        /// Font size in pixels (approximate).
        size: f32,
    },
}

/// A list of draw commands representing the current frame.
pub type RenderList = Vec<DrawCommand>;

impl Surface for RenderList {
    type Paint = Vec4;

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            color,
            stroke_width: None,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Vec4) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            color,
            stroke_width: Some(width),
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Vec4) {
        self.push(DrawCommand::Rect {
            pos: rect.min,
            size: rect.size(),
            color,
            stroke_width: None,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Vec4) {
        self.push(DrawCommand::Rect {
            pos: rect.min,
            size: rect.size(),
            color,
            stroke_width: Some(width),
        });
    }

    fn line(&mut self, start: Vec2, end: Vec2, width: f32, color: Vec4) {
        self.push(DrawCommand::Line {
            start,
            end,
            color,
            width,
        });
    }

    fn text(&mut self, center: Vec2, text: &str, size: f32, color: Vec4) {
        self.push(DrawCommand::Text {
            center,
            text: text.to_owned(),
            color,
            size,
        });
    }
}
