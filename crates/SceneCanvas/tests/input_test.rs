use std::time::Duration;

use glam::{Vec2, Vec4};
use scene_canvas::{
    EditorConfig, EditorStyle,
    input::{ButtonState, InputState, Key, Keymap, PointerTracker},
    interaction::EditorCommand,
    model::{ObjectFlags, ObjectSpec, SceneState, ShapeKind},
    painter::Painter,
    render::DrawCommand,
};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_tracker_derives_edges() {
    let mut tracker = PointerTracker::new(ms(400));

    assert_eq!(tracker.track(false, false, false, ms(0)).left, ButtonState::UP);
    assert_eq!(tracker.track(true, false, false, ms(16)).left, ButtonState::PRESSED);
    assert_eq!(tracker.track(true, false, false, ms(32)).left, ButtonState::HELD);
    assert_eq!(tracker.track(false, false, false, ms(48)).left, ButtonState::RELEASED);

    let buttons = tracker.track(false, false, true, ms(64));
    assert!(buttons.right.pressed);
    assert!(!buttons.left.down);
}

#[test]
fn test_tracker_detects_double_click() {
    let mut tracker = PointerTracker::new(ms(400));

    let first = tracker.track(true, false, false, ms(1_000));
    assert!(first.left.pressed);
    assert!(!first.left.double_clicked);
    tracker.track(false, false, false, ms(1_100));

    let second = tracker.track(true, false, false, ms(1_300));
    assert!(second.left.pressed);
    assert!(second.left.double_clicked);
    tracker.track(false, false, false, ms(1_350));

    // Too late for a double-click.
    let third = tracker.track(true, false, false, ms(2_000));
    assert!(third.left.pressed);
    assert!(!third.left.double_clicked);
}

#[test]
fn test_holding_the_button_counts_from_the_last_tick_down() {
    let mut tracker = PointerTracker::new(ms(400));

    tracker.track(true, false, false, ms(0));
    tracker.track(true, false, false, ms(900));
    tracker.track(false, false, false, ms(1_000));

    assert!(tracker.track(true, false, false, ms(1_200)).left.double_clicked);
}

#[test]
fn test_default_keymap() {
    let keymap = Keymap::default();
    let input = InputState {
        pressed_keys: vec![Key::Num1, Key::X, Key::Q],
        ..Default::default()
    };

    assert_eq!(
        keymap.commands(&input),
        vec![
            EditorCommand::Place(ShapeKind::Circle),
            EditorCommand::DeleteActive,
            EditorCommand::Quit,
        ]
    );
}

#[test]
fn test_default_config() {
    let config = EditorConfig::default();
    assert_eq!(config.double_click_interval, ms(400));
    assert_eq!(config.placement_commit_delay, ms(200));
    assert_eq!(config.connector_thickness % 2, 1);
}

fn first_color(commands: &[DrawCommand]) -> Vec4 {
    match &commands[0] {
        DrawCommand::Circle { color, .. } | DrawCommand::Rect { color, .. } => *color,
        other => panic!("unexpected first command {other:?}"),
    }
}

#[test]
fn test_outline_color_follows_state() {
    let style = EditorStyle::default();
    let mut scene = SceneState::default();
    let id = scene
        .insert(ObjectSpec::rectangle(Vec2::new(50.0, 50.0), Vec2::splat(20.0)))
        .unwrap();

    let cases = [
        (ObjectFlags::empty(), style.outline_color),
        (ObjectFlags::HOVERED, style.hover_color),
        (ObjectFlags::HOVERED | ObjectFlags::SELECTED, style.select_color),
        (
            ObjectFlags::HOVERED | ObjectFlags::SELECTED | ObjectFlags::PREVIEWING,
            style.preview_color,
        ),
    ];
    for (state, expected) in cases {
        let object = scene.object_mut(id).unwrap();
        object.flags = ObjectFlags::INTERACTIVE | state;

        let mut draw_list = Vec::new();
        Painter::draw_object(&scene, id, Vec2::ZERO, &style, &mut draw_list).unwrap();
        assert_eq!(first_color(&draw_list), expected, "state {state:?}");
    }
}

#[test]
fn test_circle_is_drawn_with_label_text() {
    let style = EditorStyle::default();
    let mut scene = SceneState::default();
    let circle = scene
        .insert(ObjectSpec::circle(Vec2::new(200.0, 200.0), 50.0))
        .unwrap();
    let label = scene_canvas::bond::children_of(&scene, circle).unwrap()[0];

    let mut draw_list = Vec::new();
    Painter::draw_object(&scene, circle, Vec2::ZERO, &style, &mut draw_list).unwrap();
    Painter::draw_object(&scene, label, Vec2::ZERO, &style, &mut draw_list).unwrap();

    assert!(matches!(
        &draw_list[1],
        DrawCommand::Circle { radius, stroke_width: None, .. } if *radius == 48.0
    ));
    assert!(draw_list.iter().any(|command| matches!(
        command,
        DrawCommand::Text { text, center, .. } if text == "A" && *center == Vec2::new(200.0, 200.0)
    )));
}

#[test]
fn test_placement_ghost_is_outlined_only() {
    let style = EditorStyle::default();
    let mut scene = SceneState::default();
    let id = scene
        .insert(
            ObjectSpec::rectangle(Vec2::new(50.0, 50.0), Vec2::splat(20.0))
                .with_flags(ObjectFlags::PREVIEWING | ObjectFlags::UNDER_PLACEMENT),
        )
        .unwrap();

    let mut draw_list = Vec::new();
    Painter::draw_object(&scene, id, Vec2::ZERO, &style, &mut draw_list).unwrap();

    assert_eq!(draw_list.len(), 1);
    assert!(matches!(
        draw_list[0],
        DrawCommand::Rect { stroke_width: Some(_), .. }
    ));
}
