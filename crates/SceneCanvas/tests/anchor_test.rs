use glam::Vec2;
use scene_canvas::{
    SceneError,
    anchor::{self, Anchor},
    model::{ObjectSpec, SceneState},
};

#[test]
fn test_unanchored_object_resolves_to_stored_plus_offset() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::new(100.0, 50.0), Vec2::splat(20.0))
                .with_offset(Vec2::new(5.0, -5.0)),
        )
        .unwrap();

    let pos = anchor::peek_position(&scene, id, Vec2::ZERO).unwrap();
    assert_eq!(pos, Vec2::new(105.0, 45.0));
}

#[test]
fn test_resolve_is_idempotent() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(20.0))
                .with_anchor(Anchor::Point(Vec2::new(40.0, 60.0)))
                .with_offset(Vec2::new(10.0, 0.0)),
        )
        .unwrap();

    let first = anchor::resolve_and_commit(&mut scene, id, Vec2::ZERO).unwrap();
    let stored = scene.object(id).unwrap().stored_position();
    let second = anchor::resolve_and_commit(&mut scene, id, Vec2::ZERO).unwrap();

    assert_eq!(first, Vec2::new(50.0, 60.0));
    assert_eq!(first, second);
    assert_eq!(stored, scene.object(id).unwrap().stored_position());
    // The cache excludes the offset.
    assert_eq!(stored, Vec2::new(40.0, 60.0));
}

#[test]
fn test_peek_does_not_touch_stored_position() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::new(1.0, 2.0), Vec2::splat(20.0))
                .with_anchor(Anchor::Pointer { offset: Vec2::ZERO }),
        )
        .unwrap();

    let pos = anchor::peek_position(&scene, id, Vec2::new(300.0, 300.0)).unwrap();
    assert_eq!(pos, Vec2::new(300.0, 300.0));
    assert_eq!(scene.object(id).unwrap().stored_position(), Vec2::new(1.0, 2.0));
}

#[test]
fn test_object_anchor_follows_target() {
    let mut scene = SceneState::default();
    let leader = scene
        .insert(ObjectSpec::rectangle(Vec2::new(100.0, 100.0), Vec2::splat(20.0)))
        .unwrap();
    let follower = scene
        .insert(
            ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0))
                .with_anchor(Anchor::Object(leader))
                .with_offset(Vec2::new(0.0, 30.0)),
        )
        .unwrap();

    anchor::set_position(&mut scene, leader, Vec2::new(200.0, 150.0)).unwrap();

    let pos = anchor::peek_position(&scene, follower, Vec2::ZERO).unwrap();
    assert_eq!(pos, Vec2::new(200.0, 180.0));
}

#[test]
fn test_set_position_rejected_while_anchored() {
    let mut scene = SceneState::default();
    let target = scene
        .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)))
        .unwrap();

    let anchors = [
        Anchor::Point(Vec2::new(10.0, 10.0)),
        Anchor::Object(target),
        Anchor::Pointer { offset: Vec2::ZERO },
    ];
    for source in anchors {
        let id = scene
            .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)).with_anchor(source))
            .unwrap();
        let err = anchor::set_position(&mut scene, id, Vec2::new(5.0, 5.0)).unwrap_err();
        assert!(
            matches!(err, SceneError::InvalidAnchorMutation(_)),
            "{source:?} allowed a position write"
        );
    }
}

#[test]
fn test_clearing_anchor_freezes_position() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0))
                .with_anchor(Anchor::Pointer { offset: Vec2::new(-10.0, 0.0) })
                .with_offset(Vec2::new(0.0, 5.0)),
        )
        .unwrap();

    let pointer = Vec2::new(250.0, 120.0);
    let before = anchor::peek_position(&scene, id, pointer).unwrap();
    anchor::clear_anchor(&mut scene, id, pointer).unwrap();

    assert!(scene.object(id).unwrap().anchor().is_none());
    // The pointer moving away no longer matters.
    let after = anchor::peek_position(&scene, id, Vec2::new(900.0, 900.0)).unwrap();
    assert_eq!(before, Vec2::new(240.0, 125.0));
    assert_eq!(before, after);

    anchor::set_position(&mut scene, id, Vec2::new(1.0, 1.0)).unwrap();
}

#[test]
fn test_anchor_cycle_is_rejected() {
    let mut scene = SceneState::default();
    let a = scene
        .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)))
        .unwrap();
    let b = scene
        .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)).with_anchor(Anchor::Object(a)))
        .unwrap();
    let c = scene
        .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)).with_anchor(Anchor::Object(b)))
        .unwrap();

    let err = anchor::set_anchor(&mut scene, a, Some(Anchor::Object(c)), Vec2::ZERO).unwrap_err();
    assert!(matches!(err, SceneError::AnchorCycle(_)));
    assert!(scene.object(a).unwrap().anchor().is_none());

    let err = anchor::set_anchor(&mut scene, a, Some(Anchor::Object(a)), Vec2::ZERO).unwrap_err();
    assert!(matches!(err, SceneError::AnchorCycle(_)));
}

#[test]
fn test_drag_keeps_grab_offset_and_restores_anchor() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(40.0))
                .with_anchor(Anchor::Point(Vec2::new(100.0, 100.0))),
        )
        .unwrap();

    anchor::begin_drag(&mut scene, id, Vec2::new(110.0, 95.0)).unwrap();
    assert!(scene.object(id).unwrap().anchor().is_some_and(Anchor::is_pointer));
    assert_eq!(
        scene.object(id).unwrap().prior_anchor(),
        Some(&Anchor::Point(Vec2::new(100.0, 100.0)))
    );

    let moved = anchor::peek_position(&scene, id, Vec2::new(160.0, 95.0)).unwrap();
    assert_eq!(moved, Vec2::new(150.0, 100.0));

    anchor::restore_prior_anchor(&mut scene, id, Vec2::new(160.0, 95.0)).unwrap();
    assert_eq!(
        scene.object(id).unwrap().anchor(),
        Some(&Anchor::Point(Vec2::new(100.0, 100.0)))
    );
}

#[test]
fn test_drag_of_free_object_leaves_it_where_dropped() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(ObjectSpec::rectangle(Vec2::new(100.0, 100.0), Vec2::splat(40.0)))
        .unwrap();

    anchor::begin_drag(&mut scene, id, Vec2::new(100.0, 100.0)).unwrap();
    anchor::restore_prior_anchor(&mut scene, id, Vec2::new(180.0, 130.0)).unwrap();

    let object = scene.object(id).unwrap();
    assert!(object.anchor().is_none());
    assert_eq!(object.stored_position(), Vec2::new(180.0, 130.0));
}

#[test]
fn test_anchor_to_own_connector_is_a_cycle() {
    let mut scene = SceneState::default();
    let a = scene
        .insert(ObjectSpec::rectangle(Vec2::new(100.0, 100.0), Vec2::splat(20.0)))
        .unwrap();
    let b = scene
        .insert(ObjectSpec::rectangle(Vec2::new(300.0, 100.0), Vec2::splat(20.0)))
        .unwrap();
    let connector = scene.spawn(ObjectSpec::connector(a, b, 9)).unwrap();
    scene_canvas::bond::add_bond(
        &mut scene,
        a,
        scene_canvas::bond::Relation::ConnectedWith,
        connector,
        true,
    )
    .unwrap();

    let err = anchor::set_anchor(&mut scene, a, Some(Anchor::Object(connector)), Vec2::ZERO)
        .unwrap_err();
    assert!(matches!(err, SceneError::AnchorCycle(_)));
    assert!(scene.object(a).unwrap().anchor().is_none());

    // Through a follower of the far endpoint as well.
    let follower = scene
        .insert(
            ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0))
                .with_anchor(Anchor::Object(connector)),
        )
        .unwrap();
    let err = anchor::set_anchor(&mut scene, b, Some(Anchor::Object(follower)), Vec2::ZERO)
        .unwrap_err();
    assert!(matches!(err, SceneError::AnchorCycle(_)));

    assert_eq!(
        anchor::peek_position(&scene, follower, Vec2::ZERO).unwrap(),
        Vec2::new(200.0, 100.0)
    );
}

#[test]
fn test_anchor_to_unrelated_connector_is_allowed() {
    let mut scene = SceneState::default();
    let a = scene
        .insert(ObjectSpec::rectangle(Vec2::new(100.0, 100.0), Vec2::splat(20.0)))
        .unwrap();
    let b = scene
        .insert(ObjectSpec::rectangle(Vec2::new(300.0, 300.0), Vec2::splat(20.0)))
        .unwrap();
    let connector = scene.spawn(ObjectSpec::connector(a, b, 9)).unwrap();
    let other = scene
        .insert(ObjectSpec::rectangle(Vec2::ZERO, Vec2::splat(10.0)))
        .unwrap();

    anchor::set_anchor(&mut scene, other, Some(Anchor::Object(connector)), Vec2::ZERO).unwrap();
    assert_eq!(
        anchor::peek_position(&scene, other, Vec2::ZERO).unwrap(),
        Vec2::new(200.0, 200.0)
    );
}
