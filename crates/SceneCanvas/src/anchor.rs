//! # Anchor Resolution
//!
//! An object is either positioned by its stored coordinates, or it delegates its
//! position to an [`Anchor`]. Either way its `offset` is added on top.
//!
//! Reading is split in two: [`peek_position`] is a pure query, while
//! [`resolve_and_commit`] also caches the anchored location into the stored
//! coordinates so the object stays put when the anchor is later removed.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::model::{ObjectId, SceneState, Shape};
use crate::shapes;

/// Longest anchor chain followed before giving up.
const MAX_CHAIN: usize = 64;

/// A position source an object can follow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Anchor {
    /// A fixed point.
    Point(Vec2),
    /// Another object's resolved position.
    Object(ObjectId),
    /// The pointer position plus a fixed offset, recomputed on every query.
    Pointer { offset: Vec2 },
}

impl Anchor {
    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer { .. })
    }
}

/// Effective position of an object, without side effects.
///
/// Connectors report the midpoint between their two connection anchors.
pub fn peek_position(scene: &SceneState, id: ObjectId, pointer: Vec2) -> Result<Vec2> {
    resolve_chain(scene, id, pointer, 0)
}

pub(crate) fn resolve_chain(
    scene: &SceneState,
    id: ObjectId,
    pointer: Vec2,
    hops: usize,
) -> Result<Vec2> {
    let object = scene.object(id)?;
    if hops > MAX_CHAIN {
        return Err(SceneError::AnchorCycle(object.tag.clone()));
    }

    if let Shape::Connector { .. } = object.shape {
        let (start, end) = shapes::endpoints_at(scene, id, pointer, hops + 1)?;
        return Ok((start + end) * 0.5 + object.offset);
    }

    let base = match object.anchor {
        None => object.position,
        Some(Anchor::Point(point)) => point,
        Some(Anchor::Pointer { offset }) => pointer + offset,
        Some(Anchor::Object(target)) => resolve_chain(scene, target, pointer, hops + 1)?,
    };
    Ok(base + object.offset)
}

/// Effective position of an object; anchored objects also cache it.
///
/// The cached value excludes the offset, so once the anchor is cleared the object
/// resolves to exactly the last position it was seen at.
pub fn resolve_and_commit(scene: &mut SceneState, id: ObjectId, pointer: Vec2) -> Result<Vec2> {
    let resolved = peek_position(scene, id, pointer)?;
    let object = scene.object_mut(id)?;
    if object.anchor.is_some() && !matches!(object.shape, Shape::Connector { .. }) {
        object.position = resolved - object.offset;
    }
    Ok(resolved)
}

/// Writes the stored coordinates. Fails while any anchor is assigned.
pub fn set_position(scene: &mut SceneState, id: ObjectId, position: Vec2) -> Result<()> {
    let object = scene.object_mut(id)?;
    if object.anchor.is_some() {
        return Err(SceneError::InvalidAnchorMutation(object.tag.clone()));
    }
    object.position = position;
    Ok(())
}

/// Assigns or clears an object's anchor.
///
/// The current position is committed first. An object anchor is refused when its
/// target is the object itself or already follows it, directly or through a chain.
pub fn set_anchor(
    scene: &mut SceneState,
    id: ObjectId,
    anchor: Option<Anchor>,
    pointer: Vec2,
) -> Result<()> {
    if let Some(Anchor::Object(target)) = anchor {
        ensure_acyclic(scene, id, target)?;
    }
    resolve_and_commit(scene, id, pointer)?;
    scene.object_mut(id)?.anchor = anchor;
    Ok(())
}

/// Removes the anchor, freezing the object where it currently resolves.
pub fn clear_anchor(scene: &mut SceneState, id: ObjectId, pointer: Vec2) -> Result<()> {
    set_anchor(scene, id, None, pointer)
}

/// Walks everything `target` takes its position from. Connectors follow both of
/// their endpoints.
fn ensure_acyclic(scene: &SceneState, id: ObjectId, target: ObjectId) -> Result<()> {
    let mut pending = vec![target];
    let mut visited = HashSet::new();
    while let Some(current) = pending.pop() {
        if current == id {
            return Err(SceneError::AnchorCycle(scene.object(id)?.tag.clone()));
        }
        if !visited.insert(current) {
            continue;
        }
        let object = scene.object(current)?;
        if let Some((from, to)) = object.shape.endpoints() {
            pending.extend([from, to]);
        } else if let Some(Anchor::Object(next)) = object.anchor {
            pending.push(next);
        }
    }
    Ok(())
}

/// Starts following the pointer, keeping the object where it is.
///
/// The current anchor is remembered and comes back with [`restore_prior_anchor`].
pub fn begin_drag(scene: &mut SceneState, id: ObjectId, pointer: Vec2) -> Result<()> {
    let resolved = resolve_and_commit(scene, id, pointer)?;
    let object = scene.object_mut(id)?;
    object.prior_anchor = object.anchor;
    object.anchor = Some(Anchor::Pointer {
        offset: resolved - object.offset - pointer,
    });
    Ok(())
}

/// Puts back the anchor remembered at drag start.
pub fn restore_prior_anchor(scene: &mut SceneState, id: ObjectId, pointer: Vec2) -> Result<()> {
    let prior = scene.object(id)?.prior_anchor;
    set_anchor(scene, id, prior, pointer)
}
