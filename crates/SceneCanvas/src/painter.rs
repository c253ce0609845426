use glam::{Vec2, Vec4};

use crate::anchor::peek_position;
use crate::config::EditorStyle;
use crate::error::Result;
use crate::math::Rect;
use crate::model::{Object, ObjectFlags, ObjectId, SceneState, Shape};
use crate::render::{RenderList, Surface};
use crate::shapes;

/// Inset of the base fill inside the outline.
const OUTLINE_WIDTH: f32 = 2.0;

/// Converts scene objects into drawing commands.
///
/// Every shape is drawn the same way: an outline in a state color, then the base
/// fill inset by [`OUTLINE_WIDTH`]. The state color is chosen with the precedence
/// previewing > selected > hovered > idle. A previewing object is a placement ghost:
/// a thin preview-colored outline and no fill.
pub struct Painter;

impl Painter {
    /// Appends the draw commands for one object at its resolved position.
    pub fn draw_object(
        scene: &SceneState,
        id: ObjectId,
        pointer: Vec2,
        style: &EditorStyle,
        draw_list: &mut RenderList,
    ) -> Result<()> {
        let object = scene.object(id)?;
        let previewing = object.is(ObjectFlags::PREVIEWING);
        let outline = Self::outline_color(object, style);

        match &object.shape {
            Shape::Circle { radius } => {
                let center = peek_position(scene, id, pointer)?;
                if previewing {
                    draw_list.stroke_circle(center, *radius, 1.0, outline);
                } else {
                    draw_list.fill_circle(center, *radius, outline);
                    draw_list.fill_circle(center, radius - OUTLINE_WIDTH, style.base_color);
                }
            }
            Shape::Rectangle { size } => {
                let rect = Rect::from_center(peek_position(scene, id, pointer)?, *size);
                Self::draw_box(rect, previewing, outline, style, draw_list);
            }
            Shape::TextLabel {
                size,
                text,
                font_size,
            } => {
                let center = peek_position(scene, id, pointer)?;
                let rect = Rect::from_center(center, *size);
                Self::draw_box(rect, previewing, outline, style, draw_list);
                if !previewing {
                    draw_list.text(center, text, *font_size, style.text_color);
                }
            }
            Shape::Connector { thickness, .. } => {
                let (start, end) = shapes::connector_endpoints(scene, id, pointer)?;
                let width = *thickness as f32;
                if previewing {
                    draw_list.line(start, end, width + 2.0, outline);
                } else {
                    draw_list.line(start, end, width, outline);
                    draw_list.line(start, end, (width - 2.0).max(1.0), style.base_color);
                }
            }
        }
        Ok(())
    }

    fn draw_box(
        rect: Rect,
        previewing: bool,
        outline: Vec4,
        style: &EditorStyle,
        draw_list: &mut RenderList,
    ) {
        if previewing {
            draw_list.stroke_rect(rect, 1.0, outline);
            return;
        }
        draw_list.fill_rect(rect, outline);
        let inner = Rect {
            min: rect.min + OUTLINE_WIDTH,
            max: rect.max - OUTLINE_WIDTH,
        };
        draw_list.fill_rect(inner, style.base_color);
    }

    fn outline_color(object: &Object, style: &EditorStyle) -> Vec4 {
        if object.is(ObjectFlags::PREVIEWING) {
            style.preview_color
        } else if object.is(ObjectFlags::SELECTED) {
            style.select_color
        } else if object.is(ObjectFlags::HOVERED) {
            style.hover_color
        } else {
            style.outline_color
        }
    }
}
