//! # Core Data Models
//!
//! This module defines the scene's object model.
//! Objects live in a flat arena (`SlotMap`) and reference each other by [`ObjectId`]
//! handles, never by pointer. Bonds, anchors and connector endpoints are all handles.
//!
//! The set of shapes is closed ([`Shape`]); behaviour per variant is a `match`, not a
//! trait object.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::anchor::Anchor;
use crate::bond::{self, Bond, Relation};
use crate::error::{Result, SceneError};
use crate::interaction::DeferredActivation;

new_key_type! {
    /// Unique handle of an object in the scene arena.
    pub struct ObjectId;
}

/// Depth given to the label a circle creates for itself.
pub const LABEL_DEPTH: i32 = 99;
/// Font size of labels created implicitly by shapes.
pub const LABEL_FONT_SIZE: f32 = 25.0;

bitflags! {
    /// Interaction state of an object.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ObjectFlags: u8 {
        /// Currently selected (the active-for-editing object).
        const SELECTED = 1 << 0;
        /// The pointer is over this object's silhouette.
        const HOVERED = 1 << 1;
        /// Runs the interaction state machine each tick.
        const ACTIVE = 1 << 2;
        /// May become the active-for-editing object.
        const SELECTABLE = 1 << 3;
        /// May be dragged.
        const MOVABLE = 1 << 4;
        /// Drawn as a placement ghost.
        const PREVIEWING = 1 << 5;
        /// Follows the pointer until the placement click.
        const UNDER_PLACEMENT = 1 << 6;
        /// May be removed with the delete command.
        const DELETABLE = 1 << 7;
    }
}

impl ObjectFlags {
    /// Flags of a freshly placed, fully interactive shape.
    pub const INTERACTIVE: Self = Self::ACTIVE
        .union(Self::SELECTABLE)
        .union(Self::MOVABLE)
        .union(Self::DELETABLE);
}

/// Display identity of an object: a letter `A`..`Z` or a number `0`..`99`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectTag(String);

impl ObjectTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-list of object tags.
///
/// The alphabet is fixed: 26 letters followed by the numbers 0 to 99, handed out in
/// that order. Released tags go to the back of the queue.
#[derive(Clone, Debug)]
pub struct TagPool {
    free: VecDeque<ObjectTag>,
    live: HashSet<ObjectTag>,
}

impl Default for TagPool {
    fn default() -> Self {
        let letters = ('A'..='Z').map(|c| c.to_string());
        let numbers = (0..100).map(|n| n.to_string());
        Self {
            free: letters.chain(numbers).map(ObjectTag).collect(),
            live: HashSet::new(),
        }
    }
}

impl TagPool {
    /// Number of tags the alphabet holds.
    pub const CAPACITY: usize = 126;

    /// Takes the next free tag.
    pub fn acquire(&mut self) -> Result<ObjectTag> {
        let tag = self
            .free
            .pop_front()
            .ok_or(SceneError::IdentityExhausted(self.live.len()))?;
        if !self.live.insert(tag.clone()) {
            return Err(SceneError::DuplicateIdentity(tag));
        }
        Ok(tag)
    }

    /// Returns a tag to the pool. Returns false if it was not live.
    pub fn release(&mut self, tag: &ObjectTag) -> bool {
        if self.live.remove(tag) {
            self.free.push_back(tag.clone());
            true
        } else {
            false
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// Kind of a shape, without its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    TextLabel,
    Connector,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::TextLabel => "text label",
            Self::Connector => "connector",
        };
        f.write_str(name)
    }
}

/// Geometry of an object.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Filled disc around the object's position.
    Circle { radius: f32 },
    /// Axis-aligned box centered on the object's position.
    Rectangle { size: Vec2 },
    /// Box with centered text.
    TextLabel {
        size: Vec2,
        text: String,
        font_size: f32,
    },
    /// Thick line between the connection anchors of two objects.
    Connector {
        from: ObjectId,
        to: ObjectId,
        /// Odd, at least 1.
        thickness: u32,
    },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Rectangle { .. } => ShapeKind::Rectangle,
            Self::TextLabel { .. } => ShapeKind::TextLabel,
            Self::Connector { .. } => ShapeKind::Connector,
        }
    }

    /// Returns the connector endpoints, if this is a connector.
    pub fn endpoints(&self) -> Option<(ObjectId, ObjectId)> {
        match *self {
            Self::Connector { from, to, .. } => Some((from, to)),
            _ => None,
        }
    }
}

/// Everything needed to insert an object into the scene.
#[derive(Clone, Debug)]
pub struct ObjectSpec {
    pub shape: Shape,
    pub position: Vec2,
    pub offset: Vec2,
    pub anchor: Option<Anchor>,
    pub depth: i32,
    pub flags: ObjectFlags,
}

impl ObjectSpec {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::new(Shape::Circle { radius }, center, ObjectFlags::INTERACTIVE)
    }

    pub fn rectangle(center: Vec2, size: Vec2) -> Self {
        Self::new(Shape::Rectangle { size }, center, ObjectFlags::INTERACTIVE)
    }

    /// Labels can be selected but are neither dragged nor deleted on their own.
    pub fn label(center: Vec2, size: Vec2, text: impl Into<String>) -> Self {
        let shape = Shape::TextLabel {
            size,
            text: text.into(),
            font_size: LABEL_FONT_SIZE,
        };
        Self::new(shape, center, ObjectFlags::ACTIVE | ObjectFlags::SELECTABLE)
    }

    pub fn connector(from: ObjectId, to: ObjectId, thickness: u32) -> Self {
        let flags = ObjectFlags::ACTIVE | ObjectFlags::SELECTABLE | ObjectFlags::DELETABLE;
        Self::new(Shape::Connector { from, to, thickness }, Vec2::ZERO, flags)
    }

    fn new(shape: Shape, position: Vec2, flags: ObjectFlags) -> Self {
        Self {
            shape,
            position,
            offset: Vec2::ZERO,
            anchor: None,
            depth: 0,
            flags,
        }
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// An object in the scene.
#[derive(Clone, Debug)]
pub struct Object {
    /// Self-reference handle.
    pub id: ObjectId,
    /// Display identity.
    pub tag: ObjectTag,
    pub shape: Shape,
    /// Stored position (center). Only meaningful while no anchor is assigned.
    pub(crate) position: Vec2,
    /// Added to the stored or anchored position.
    pub offset: Vec2,
    pub(crate) anchor: Option<Anchor>,
    /// Anchor to return to when a drag ends or the object is released.
    pub(crate) prior_anchor: Option<Anchor>,
    /// Draw order and hit-test precedence (higher wins).
    pub depth: i32,
    pub flags: ObjectFlags,
    pub(crate) bonds: Vec<Bond>,
    /// Gray level assigned by the last id buffer rebuild. 0 means none.
    pub hit_id: u8,
}

impl Object {
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn prior_anchor(&self) -> Option<&Anchor> {
        self.prior_anchor.as_ref()
    }

    /// Stored coordinates, without offset or anchor.
    pub fn stored_position(&self) -> Vec2 {
        self.position
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn is(&self, flags: ObjectFlags) -> bool {
        self.flags.contains(flags)
    }
}

/// The live scene.
///
/// Holds the object arena, the top-level objects in insertion order, and the single
/// active-for-editing slot. Implicit children (labels, connectors) live in the arena
/// but are only reachable through bonds.
#[derive(Debug, Default)]
pub struct SceneState {
    /// Arena of every live object.
    pub objects: SlotMap<ObjectId, Object>,
    /// Top-level objects, in insertion order.
    pub roots: Vec<ObjectId>,
    /// The selected/dragged object, if any.
    pub active: Option<ObjectId>,
    /// Tag allocator.
    pub tags: TagPool,
    pub(crate) pending_activation: Option<DeferredActivation>,
}

impl SceneState {
    pub fn object(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(id).ok_or(SceneError::UnknownObject(id))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects.get_mut(id).ok_or(SceneError::UnknownObject(id))
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Inserts a top-level object and returns its handle.
    pub fn insert(&mut self, spec: ObjectSpec) -> Result<ObjectId> {
        let id = self.spawn(spec)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Inserts an object that is only reachable through bonds.
    ///
    /// Circles create their own label here: a square of half the radius showing the
    /// circle's tag, anchored to the circle and bonded as its child.
    pub fn spawn(&mut self, spec: ObjectSpec) -> Result<ObjectId> {
        if let Shape::Connector {
            from, to, thickness, ..
        } = spec.shape
        {
            if thickness % 2 == 0 {
                return Err(SceneError::InvalidLineThickness(thickness));
            }
            self.object(from)?;
            self.object(to)?;
        }
        if let Some(Anchor::Object(target)) = spec.anchor {
            self.object(target)?;
        }

        let tag = self.tags.acquire()?;
        let radius = match spec.shape {
            Shape::Circle { radius } => Some(radius),
            _ => None,
        };
        let id = self.objects.insert_with_key(|key| Object {
            id: key,
            tag,
            shape: spec.shape,
            position: spec.position,
            offset: spec.offset,
            anchor: spec.anchor,
            prior_anchor: spec.anchor,
            depth: spec.depth,
            flags: spec.flags,
            bonds: Vec::new(),
            hit_id: 0,
        });

        if let Some(radius) = radius {
            let side = (radius / 2.0).floor();
            let text = self.objects[id].tag.to_string();
            let spec = ObjectSpec::label(Vec2::ZERO, Vec2::splat(side), text)
                .with_anchor(Anchor::Object(id))
                .with_depth(LABEL_DEPTH);
            let label = match self.spawn(spec) {
                Ok(label) => label,
                Err(err) => {
                    // A circle never exists without its label.
                    if let Some(circle) = self.objects.remove(id) {
                        self.tags.release(&circle.tag);
                    }
                    return Err(err);
                }
            };
            bond::add_bond(self, id, Relation::ParentOf, label, true)?;
        }

        tracing::debug!(tag = %self.objects[id].tag, kind = %self.objects[id].kind(), "object spawned");
        Ok(id)
    }

    /// Removes an object from the arena, the roots and the active slot, and releases
    /// its tag. Bonds are not touched; see [`bond::delete_all_bonds`].
    pub fn remove(&mut self, id: ObjectId) -> Result<Object> {
        let object = self.objects.remove(id).ok_or(SceneError::UnknownObject(id))?;
        self.roots.retain(|&root| root != id);
        if self.active == Some(id) {
            self.active = None;
        }
        if self
            .pending_activation
            .as_ref()
            .is_some_and(|pending| pending.target == id)
        {
            self.pending_activation = None;
        }
        let released = self.tags.release(&object.tag);
        debug_assert!(released, "tag {} was not live", object.tag);
        Ok(object)
    }

    /// Looks an object up by its tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.tag.as_str() == tag)
            .map(|(id, _)| id)
    }

    pub fn pending_activation(&self) -> Option<&DeferredActivation> {
        self.pending_activation.as_ref()
    }
}
