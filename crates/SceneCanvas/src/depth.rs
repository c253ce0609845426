//! # Depth/Id Buffer Hit-Testing
//!
//! Every frame each object gets a distinct gray level and its silhouette is
//! rasterized into an offscreen [`IdBuffer`] in ascending depth order, so deeper
//! objects overwrite shallower ones where they overlap. An object is hovered when the
//! buffer pixel under the pointer holds exactly its level.
//!
//! The buffer is rebuilt from scratch every frame.

use std::collections::HashSet;
use std::ops::Range;

use glam::{IVec2, UVec2, Vec2};

use crate::bond;
use crate::error::{Result, SceneError};
use crate::math::{self, Rect};
use crate::model::{ObjectId, SceneState};
use crate::render::Surface;
use crate::shapes;

/// Objects that can be told apart per frame. Gray 0 is the background.
pub const MAX_HIT_IDS: usize = 254;

/// One gray level per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdBuffer {
    size: UVec2,
    pixels: Vec<u8>,
}

impl IdBuffer {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            pixels: vec![0; size.x as usize * size.y as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Row-major pixels, `size.x` per row.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn resize(&mut self, size: UVec2) {
        if size != self.size {
            *self = Self::new(size);
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// The level at a pixel; 0 outside the buffer.
    pub fn sample(&self, at: IVec2) -> u8 {
        if at.x < 0 || at.y < 0 || at.x as u32 >= self.size.x || at.y as u32 >= self.size.y {
            return 0;
        }
        self.pixels[at.y as usize * self.size.x as usize + at.x as usize]
    }

    fn span(lo: f32, hi: f32, limit: u32) -> Range<u32> {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil() + 1.0).clamp(0.0, limit as f32) as u32;
        start.min(end)..end
    }

    /// Sets every pixel in the bounding box for which `inside` holds.
    fn paint_where(&mut self, bounds: Rect, level: u8, inside: impl Fn(Vec2) -> bool) {
        let ys = Self::span(bounds.min.y, bounds.max.y, self.size.y);
        let xs = Self::span(bounds.min.x, bounds.max.x, self.size.x);
        for y in ys {
            let row = y as usize * self.size.x as usize;
            for x in xs.clone() {
                if inside(Vec2::new(x as f32, y as f32)) {
                    self.pixels[row + x as usize] = level;
                }
            }
        }
    }
}

impl Surface for IdBuffer {
    type Paint = u8;

    fn fill_circle(&mut self, center: Vec2, radius: f32, level: u8) {
        let bounds = Rect::new(center - radius, Vec2::splat(radius * 2.0));
        let r_sq = radius * radius;
        self.paint_where(bounds, level, |p| p.distance_squared(center) <= r_sq);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, level: u8) {
        let bounds = Rect::new(center - radius, Vec2::splat(radius * 2.0));
        let outer = radius * radius;
        let inner = (radius - width).max(0.0).powi(2);
        self.paint_where(bounds, level, |p| {
            let d = p.distance_squared(center);
            d <= outer && d > inner
        });
    }

    fn fill_rect(&mut self, rect: Rect, level: u8) {
        self.paint_where(rect, level, |p| rect.contains(p));
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, level: u8) {
        let hole = Rect {
            min: rect.min + width,
            max: rect.max - width,
        };
        self.paint_where(rect, level, |p| rect.contains(p) && !hole.contains(p));
    }

    fn line(&mut self, start: Vec2, end: Vec2, width: f32, level: u8) {
        let half = width * 0.5;
        let min = start.min(end) - half;
        let bounds = Rect {
            min,
            max: start.max(end) + half,
        };
        self.paint_where(bounds, level, |p| {
            math::distance_to_segment(p, start, end) <= half
        });
    }

    /// Text takes no part in hit-testing; labels contribute their box instead.
    fn text(&mut self, _center: Vec2, _text: &str, _size: f32, _level: u8) {}
}

/// Gray levels for `count` objects, evenly spread over 1..=255.
///
/// Fails before anything is drawn when the count exceeds [`MAX_HIT_IDS`].
pub fn hit_id_levels(count: usize) -> Result<Vec<u8>> {
    if count > MAX_HIT_IDS {
        return Err(SceneError::ConfigurationOverflow {
            count,
            capacity: MAX_HIT_IDS,
        });
    }
    Ok((1..=count).map(|k| (255 * k / count) as u8).collect())
}

/// Every root object plus its direct bond targets, sorted by ascending depth.
///
/// Ties keep first-seen order.
pub fn flatten_scene(scene: &SceneState) -> Result<Vec<ObjectId>> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for &root in &scene.roots {
        for id in bond::collect_reachable(scene, root, true)? {
            if seen.insert(id) {
                order.push(id);
            }
        }
    }
    order.sort_by_key(|&id| scene.objects[id].depth);
    Ok(order)
}

/// Receives the finished id buffer each frame, for debugging.
pub trait IdBufferSink {
    fn consume(&mut self, buffer: &IdBuffer) -> Result<()>;
}

/// Writes the id buffer to a grayscale PNG.
#[cfg(feature = "diagnostics")]
#[derive(Clone, Debug)]
pub struct PngDump {
    pub path: std::path::PathBuf,
}

#[cfg(feature = "diagnostics")]
impl IdBufferSink for PngDump {
    fn consume(&mut self, buffer: &IdBuffer) -> Result<()> {
        let size = buffer.size();
        let image = image::GrayImage::from_raw(size.x, size.y, buffer.pixels().to_vec())
            .ok_or_else(|| SceneError::DiagnosticSink("id buffer size mismatch".into()))?;
        image
            .save(&self.path)
            .map_err(|err| SceneError::DiagnosticSink(format!("{}: {err}", self.path.display())))
    }
}

/// Owns the id buffer and rebuilds it each frame.
pub struct HitTester {
    buffer: IdBuffer,
    sink: Option<Box<dyn IdBufferSink>>,
}

impl HitTester {
    pub fn new(size: UVec2) -> Self {
        Self {
            buffer: IdBuffer::new(size),
            sink: None,
        }
    }

    pub fn buffer(&self) -> &IdBuffer {
        &self.buffer
    }

    pub fn resize(&mut self, size: UVec2) {
        self.buffer.resize(size);
    }

    /// Installs (or removes) the diagnostic sink.
    pub fn set_sink(&mut self, sink: Option<Box<dyn IdBufferSink>>) {
        self.sink = sink;
    }

    /// Assigns ids and rasterizes the scene. Returns the objects in depth order.
    pub fn rebuild(&mut self, scene: &mut SceneState, pointer: Vec2) -> Result<Vec<ObjectId>> {
        let order = flatten_scene(scene)?;
        let levels = hit_id_levels(order.len())?;

        for (&id, &level) in order.iter().zip(&levels) {
            scene.object_mut(id)?.hit_id = level;
        }

        self.buffer.clear();
        for (&id, &level) in order.iter().zip(&levels) {
            shapes::draw_silhouette(scene, id, pointer, &mut self.buffer, level)?;
        }

        if let Some(sink) = self.sink.as_mut()
            && let Err(err) = sink.consume(&self.buffer)
        {
            tracing::warn!(error = %err, "id buffer sink failed");
        }
        Ok(order)
    }

    /// Whether the pixel under `pointer` belongs to the object with `hit_id`.
    pub fn is_hovered(&self, hit_id: u8, pointer: IVec2) -> bool {
        hit_id != 0 && self.buffer.sample(pointer) == hit_id
    }
}
