use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::anchor::{self, Anchor};
use crate::bond::{self, Relation};
use crate::config::EditorConfig;
use crate::depth::HitTester;
use crate::error::{Result, SceneError};
use crate::input::InputState;
use crate::model::{ObjectFlags, ObjectId, ObjectSpec, SceneState, Shape, ShapeKind};
use crate::shapes;

/// Commands the host (or the keymap) issues to the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    /// Start placing a new object of this kind under the pointer.
    Place(ShapeKind),
    /// Delete the active object, if it is deletable.
    DeleteActive,
    /// Ask the host to stop the loop.
    Quit,
}

/// Events emitted by the Editor logic to the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    /// The object became the active-for-editing object.
    Selected(ObjectId),
    /// The active object was released.
    Released(ObjectId),
    /// A placement ghost was created.
    PlacementStarted(ObjectId),
    /// The placement ghost was frozen in place.
    PlacementCommitted(ObjectId),
    /// The placement ghost was discarded.
    PlacementCancelled(ObjectId),
    /// A deferred activation fired for these objects.
    Activated(Vec<ObjectId>),
    /// An interaction connected two objects.
    ConnectorCreated {
        connector: ObjectId,
        from: ObjectId,
        to: ObjectId,
    },
    /// These objects left the scene.
    Deleted(Vec<ObjectId>),
    /// The active object is not deletable.
    DeleteRefused(ObjectId),
    /// The quit command was issued.
    QuitRequested,
}

/// What an object observed about the pointer this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectSignal {
    pub who: ObjectId,
    pub hovered: bool,
    /// Selectable, hovered, and the left button went down this tick.
    pub selected: bool,
    pub left_clicked: bool,
    pub right_clicked: bool,
}

/// A one-shot activation armed by a placement commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredActivation {
    pub target: ObjectId,
    pub fire_at: Duration,
}

/// Executes one editor command.
pub fn apply_command(
    scene: &mut SceneState,
    config: &EditorConfig,
    input: &InputState,
    command: EditorCommand,
    events: &mut Vec<SceneEvent>,
) -> Result<()> {
    match command {
        EditorCommand::Place(kind) => {
            begin_placement(scene, config, input, kind, events)?;
        }
        EditorCommand::DeleteActive => delete_active(scene, input.pointer_pos(), events)?,
        EditorCommand::Quit => events.push(SceneEvent::QuitRequested),
    }
    Ok(())
}

/// Creates a placement ghost of `kind` that follows the pointer.
///
/// Refused while another placement is in progress. Any other active object is
/// released first. The ghost and everything bonded to it stay inactive until the
/// placement is committed and the deferred activation fires.
pub fn begin_placement(
    scene: &mut SceneState,
    config: &EditorConfig,
    input: &InputState,
    kind: ShapeKind,
    events: &mut Vec<SceneEvent>,
) -> Result<Option<ObjectId>> {
    if let Some(active) = scene.active
        && scene.object(active)?.is(ObjectFlags::UNDER_PLACEMENT)
    {
        tracing::debug!("placement already in progress");
        return Ok(None);
    }

    let spec = match kind {
        ShapeKind::Circle => ObjectSpec::circle(Vec2::ZERO, config.circle_radius),
        ShapeKind::Rectangle => ObjectSpec::rectangle(Vec2::ZERO, config.rectangle_size),
        ShapeKind::TextLabel | ShapeKind::Connector => {
            tracing::warn!(%kind, "this kind cannot be placed on its own");
            return Ok(None);
        }
    };

    let pointer = input.pointer_pos();
    release_active(scene, pointer, events)?;

    let flags = spec.flags | ObjectFlags::PREVIEWING | ObjectFlags::UNDER_PLACEMENT;
    let id = scene.insert(
        spec.with_depth(config.placement_depth)
            // The ghost follows the pointer through this anchor until committed.
            .with_anchor(Anchor::Pointer { offset: Vec2::ZERO })
            .with_flags(flags),
    )?;
    for member in bond::collect_reachable(scene, id, true)? {
        scene.object_mut(member)?.flags.remove(ObjectFlags::ACTIVE);
    }
    scene.active = Some(id);

    tracing::debug!(tag = %scene.object(id)?.tag, %kind, "placement started");
    events.push(SceneEvent::PlacementStarted(id));
    Ok(Some(id))
}

/// Commits the placement ghost on a left press, cancels it on a right press.
///
/// Committing freezes the object where it is and arms a deferred activation, so the
/// click that placed it cannot also select it.
pub fn advance_placement(
    scene: &mut SceneState,
    config: &EditorConfig,
    input: &InputState,
    events: &mut Vec<SceneEvent>,
) -> Result<()> {
    let Some(id) = scene.active else {
        return Ok(());
    };
    if !scene.object(id)?.is(ObjectFlags::UNDER_PLACEMENT) {
        return Ok(());
    }

    let pointer = input.pointer_pos();
    if input.buttons.right.pressed {
        return release_active(scene, pointer, events);
    }
    if !input.buttons.left.pressed {
        return Ok(());
    }

    anchor::clear_anchor(scene, id, pointer)?;
    let object = scene.object_mut(id)?;
    object.flags.remove(
        ObjectFlags::UNDER_PLACEMENT | ObjectFlags::PREVIEWING | ObjectFlags::SELECTED,
    );
    object.prior_anchor = None;
    tracing::debug!(tag = %object.tag, position = %object.position, "placement committed");
    scene.active = None;

    // A second commit inside the delay must not strand the first object.
    if let Some(previous) = scene.pending_activation.take() {
        activate(scene, previous.target, events)?;
    }
    scene.pending_activation = Some(DeferredActivation {
        target: id,
        fire_at: input.time + config.placement_commit_delay,
    });
    events.push(SceneEvent::PlacementCommitted(id));
    Ok(())
}

/// Fires the pending activation once its time has come.
pub fn fire_deferred(scene: &mut SceneState, now: Duration, events: &mut Vec<SceneEvent>) -> Result<()> {
    let due = scene
        .pending_activation
        .as_ref()
        .is_some_and(|pending| now >= pending.fire_at);
    if due && let Some(pending) = scene.pending_activation.take() {
        activate(scene, pending.target, events)?;
    }
    Ok(())
}

fn activate(scene: &mut SceneState, target: ObjectId, events: &mut Vec<SceneEvent>) -> Result<()> {
    let members = bond::collect_reachable(scene, target, true)?;
    for &member in &members {
        scene.object_mut(member)?.flags.insert(ObjectFlags::ACTIVE);
    }
    events.push(SceneEvent::Activated(members));
    Ok(())
}

/// Deselects the active object and puts back its pre-drag anchor.
///
/// A placement ghost is discarded instead. Does nothing when no object is active.
pub fn release_active(scene: &mut SceneState, pointer: Vec2, events: &mut Vec<SceneEvent>) -> Result<()> {
    let Some(id) = scene.active.take() else {
        return Ok(());
    };

    if scene.object(id)?.is(ObjectFlags::UNDER_PLACEMENT) {
        delete_object(scene, id, pointer)?;
        events.push(SceneEvent::PlacementCancelled(id));
        return Ok(());
    }

    scene.object_mut(id)?.flags.remove(ObjectFlags::SELECTED);
    anchor::restore_prior_anchor(scene, id, pointer)?;
    events.push(SceneEvent::Released(id));
    Ok(())
}

/// Deletes the active object if it is deletable.
pub fn delete_active(scene: &mut SceneState, pointer: Vec2, events: &mut Vec<SceneEvent>) -> Result<()> {
    let Some(id) = scene.active else {
        return Ok(());
    };
    let object = scene.object(id)?;
    if !object.is(ObjectFlags::DELETABLE) {
        let refusal = SceneError::NotDeletable(object.tag.clone());
        tracing::warn!(error = %refusal, "delete refused");
        events.push(SceneEvent::DeleteRefused(id));
        return Ok(());
    }
    let removed = delete_object(scene, id, pointer)?;
    events.push(SceneEvent::Deleted(removed));
    Ok(())
}

/// Removes an object together with the objects that cannot exist without it.
///
/// Its children and every connector ending on it go too. Bonds are severed on both
/// sides before anything leaves the arena, and objects anchored to a removed object
/// are frozen where they are. Returns the removed handles.
pub fn delete_object(scene: &mut SceneState, id: ObjectId, pointer: Vec2) -> Result<Vec<ObjectId>> {
    let mut doomed = bond::children_of(scene, id)?;
    for candidate in bond::collect_reachable(scene, id, false)? {
        if let Some((from, to)) = scene.object(candidate)?.shape.endpoints()
            && (from == id || to == id)
            && !doomed.contains(&candidate)
        {
            doomed.push(candidate);
        }
    }
    doomed.push(id);

    let followers: Vec<ObjectId> = scene
        .objects
        .iter()
        .filter(|(other, object)| {
            !doomed.contains(other)
                && matches!(object.anchor, Some(Anchor::Object(target)) if doomed.contains(&target))
        })
        .map(|(other, _)| other)
        .collect();
    for follower in followers {
        anchor::clear_anchor(scene, follower, pointer)?;
    }

    for &member in &doomed {
        bond::delete_all_bonds(scene, member)?;
    }
    for &member in &doomed {
        let object = scene.remove(member)?;
        tracing::debug!(tag = %object.tag, kind = %object.kind(), "object deleted");
    }
    Ok(doomed)
}

/// Hit-tests the object against the pointer and updates its hovered flag.
pub fn respond(
    scene: &mut SceneState,
    hit_tester: &HitTester,
    id: ObjectId,
    input: &InputState,
) -> Result<ObjectSignal> {
    anchor::resolve_and_commit(scene, id, input.pointer_pos())?;
    let object = scene.object_mut(id)?;
    let buttons = input.buttons;

    let hovered = hit_tester.is_hovered(object.hit_id, input.pointer);
    object.flags.set(ObjectFlags::HOVERED, hovered);

    Ok(ObjectSignal {
        who: id,
        hovered,
        selected: object.is(ObjectFlags::SELECTABLE) && hovered && buttons.left.pressed,
        left_clicked: hovered && buttons.left.pressed,
        right_clicked: hovered && buttons.right.pressed,
    })
}

/// Makes the signalling object active if the slot is free. Returns whether it won.
///
/// Called in depth order, so the first object to signal a selection in a tick wins.
pub fn arbitrate_selection(
    scene: &mut SceneState,
    signal: &ObjectSignal,
    events: &mut Vec<SceneEvent>,
) -> Result<bool> {
    if scene.active.is_some() || !signal.selected {
        return Ok(false);
    }
    let object = scene.object_mut(signal.who)?;
    object.flags.insert(ObjectFlags::SELECTED);
    tracing::debug!(tag = %object.tag, "object selected");
    scene.active = Some(signal.who);
    events.push(SceneEvent::Selected(signal.who));
    Ok(true)
}

/// Runs one tick of the state machine for an active object.
pub fn step_object(
    scene: &mut SceneState,
    hit_tester: &HitTester,
    id: ObjectId,
    input: &InputState,
    config: &EditorConfig,
    events: &mut Vec<SceneEvent>,
) -> Result<()> {
    let pointer = input.pointer_pos();
    let left = input.buttons.left;

    let signal = respond(scene, hit_tester, id, input)?;
    arbitrate_selection(scene, &signal, events)?;

    // Only the active object keeps its highlight while a click starts.
    if scene.active.is_some_and(|active| active != id) && left.pressed {
        scene.object_mut(id)?.flags.remove(ObjectFlags::HOVERED);
    }

    if scene.active.is_some() && input.buttons.right.pressed {
        release_active(scene, pointer, events)?;
    }

    let object = scene.object(id)?;
    let activate_drag =
        object.is(ObjectFlags::HOVERED | ObjectFlags::SELECTED | ObjectFlags::MOVABLE) && left.pressed;
    if is_dragging(scene, id)? && !left.held {
        anchor::restore_prior_anchor(scene, id, pointer)?;
    }
    if activate_drag && !is_dragging(scene, id)? {
        anchor::begin_drag(scene, id, pointer)?;
        tracing::debug!(tag = %scene.object(id)?.tag, "drag started");
    }

    if !activate_drag
        && let Some(active) = scene.active
        && active != id
        && signal.hovered
        && left.pressed
    {
        interact(scene, config, active, id, events)?;
    }
    Ok(())
}

fn is_dragging(scene: &SceneState, id: ObjectId) -> Result<bool> {
    Ok(scene
        .object(id)?
        .anchor
        .is_some_and(|anchor| anchor.is_pointer()))
}

/// Applies the result of clicking `other` while `active` is being edited.
fn interact(
    scene: &mut SceneState,
    config: &EditorConfig,
    active: ObjectId,
    other: ObjectId,
    events: &mut Vec<SceneEvent>,
) -> Result<()> {
    match shapes::on_interact(scene, active, other, config.connector_thickness) {
        Ok(None) => Ok(()),
        Ok(Some(Shape::Connector {
            from,
            to,
            thickness,
        })) => {
            let connector = scene.spawn(ObjectSpec::connector(from, to, thickness))?;
            bond::add_bond(scene, active, Relation::ConnectedWith, connector, true)?;
            bond::add_bond(scene, other, Relation::ConnectedWith, connector, true)?;
            tracing::debug!(
                from = %scene.object(from)?.tag,
                to = %scene.object(to)?.tag,
                "connector created"
            );
            events.push(SceneEvent::ConnectorCreated {
                connector,
                from,
                to,
            });
            Ok(())
        }
        Ok(Some(shape)) => Err(SceneError::UnknownInteraction {
            produced: shape.kind(),
        }),
        Err(err) if err.is_recoverable() => {
            tracing::warn!(error = %err, "interaction ignored");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
