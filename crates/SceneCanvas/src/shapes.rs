//! # Shape Behaviour
//!
//! Per-variant geometry: silhouettes for the id buffer, connection anchors for
//! connectors, and what happens when the active object is clicked onto another one.
//! Visual styling lives in [`crate::painter`].

use glam::Vec2;

use crate::anchor::{peek_position, resolve_chain};
use crate::bond;
use crate::error::{Result, SceneError};
use crate::math::{self, Rect};
use crate::model::{ObjectId, SceneState, Shape, ShapeKind};
use crate::render::Surface;

/// Gap between a circle's rim and the end of a connector line.
pub const CONNECTOR_MARGIN: f32 = 5.0;

/// Where a connector attached to `endpoint` should end.
///
/// Circles push the end out to their rim, `radius + CONNECTOR_MARGIN` from the
/// center towards the connector's other endpoint. Every other shape is reached at
/// its center.
pub fn connection_anchor(
    scene: &SceneState,
    endpoint: ObjectId,
    connector: ObjectId,
    pointer: Vec2,
) -> Result<Vec2> {
    anchor_at(scene, endpoint, connector, pointer, 0)
}

fn anchor_at(
    scene: &SceneState,
    endpoint: ObjectId,
    connector: ObjectId,
    pointer: Vec2,
    hops: usize,
) -> Result<Vec2> {
    let center = resolve_chain(scene, endpoint, pointer, hops)?;
    let Shape::Circle { radius } = scene.object(endpoint)?.shape else {
        return Ok(center);
    };
    let Some((from, to)) = scene.object(connector)?.shape.endpoints() else {
        return Ok(center);
    };
    let far = if from == endpoint { to } else { from };
    let far_center = resolve_chain(scene, far, pointer, hops)?;
    Ok(math::point_towards(center, far_center, radius + CONNECTOR_MARGIN))
}

/// Live start and end points of a connector.
pub fn connector_endpoints(
    scene: &SceneState,
    connector: ObjectId,
    pointer: Vec2,
) -> Result<(Vec2, Vec2)> {
    endpoints_at(scene, connector, pointer, 0)
}

/// [`connector_endpoints`] as one step of a longer anchor chain.
pub(crate) fn endpoints_at(
    scene: &SceneState,
    connector: ObjectId,
    pointer: Vec2,
    hops: usize,
) -> Result<(Vec2, Vec2)> {
    let object = scene.object(connector)?;
    let (from, to) = object
        .shape
        .endpoints()
        .ok_or(SceneError::UnknownObject(connector))?;
    Ok((
        anchor_at(scene, from, connector, pointer, hops)?,
        anchor_at(scene, to, connector, pointer, hops)?,
    ))
}

/// Paints the object's hit-test silhouette at its resolved position.
///
/// Labels hit-test as their box, not their glyphs.
pub fn draw_silhouette<S: Surface>(
    scene: &SceneState,
    id: ObjectId,
    pointer: Vec2,
    surface: &mut S,
    paint: S::Paint,
) -> Result<()> {
    let object = scene.object(id)?;
    match &object.shape {
        Shape::Circle { radius } => {
            let center = peek_position(scene, id, pointer)?;
            surface.fill_circle(center, *radius, paint);
        }
        Shape::Rectangle { size } | Shape::TextLabel { size, .. } => {
            let center = peek_position(scene, id, pointer)?;
            surface.fill_rect(Rect::from_center(center, *size), paint);
        }
        Shape::Connector { thickness, .. } => {
            let (start, end) = connector_endpoints(scene, id, pointer)?;
            surface.line(start, end, *thickness as f32, paint);
        }
    }
    Ok(())
}

/// What clicking `other` while `active` is being edited produces.
///
/// Circles and rectangles connect to circles and rectangles, unless a connector
/// between the two already exists. Any other pairing is refused with
/// [`SceneError::UnsupportedInteractionPair`].
pub fn on_interact(
    scene: &SceneState,
    active: ObjectId,
    other: ObjectId,
    thickness: u32,
) -> Result<Option<Shape>> {
    let active_kind = scene.object(active)?.kind();
    let other_kind = scene.object(other)?.kind();
    match (active_kind, other_kind) {
        (
            ShapeKind::Circle | ShapeKind::Rectangle,
            ShapeKind::Circle | ShapeKind::Rectangle,
        ) => {
            if existing_connector(scene, active, other)?.is_some() {
                return Ok(None);
            }
            Ok(Some(Shape::Connector {
                from: active,
                to: other,
                thickness,
            }))
        }
        (active, other) => Err(SceneError::UnsupportedInteractionPair { active, other }),
    }
}

/// A connector bonded to `other` that already references `active`, if any.
pub fn existing_connector(
    scene: &SceneState,
    active: ObjectId,
    other: ObjectId,
) -> Result<Option<ObjectId>> {
    for candidate in bond::collect_reachable(scene, other, false)? {
        if let Some((from, to)) = scene.object(candidate)?.shape.endpoints()
            && (from == active || to == active)
        {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
