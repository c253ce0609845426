use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Keeps the rim distance finite when two centers coincide.
const RIM_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Box of `size` centered on `center`. The top-left corner is floored to whole
    /// pixels so odd sizes land on the same pixels in every pass.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let min = (center - (size * 0.5).floor()).floor();
        Self::new(min, size)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Half-open containment: the max edges are outside, like pixel rows.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// Shortest distance from `p` to the segment `a`..`b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Point `reach` units from `from` towards `to`.
pub fn point_towards(from: Vec2, to: Vec2, reach: f32) -> Vec2 {
    let dist = from.distance(to) + RIM_EPSILON;
    from + (to - from) * (reach / dist)
}
