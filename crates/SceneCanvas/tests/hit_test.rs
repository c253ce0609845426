use glam::{IVec2, UVec2, Vec2};
use scene_canvas::{
    HitTester, SceneError,
    depth::{self, MAX_HIT_IDS},
    model::{ObjectSpec, SceneState},
};

#[test]
fn test_hit_id_levels_are_spread_and_distinct() {
    let levels = depth::hit_id_levels(3).unwrap();
    assert_eq!(levels, vec![85, 170, 255]);

    let full = depth::hit_id_levels(MAX_HIT_IDS).unwrap();
    assert_eq!(full.len(), MAX_HIT_IDS);
    assert!(full.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!full.contains(&0));

    assert!(depth::hit_id_levels(0).unwrap().is_empty());
}

#[test]
fn test_too_many_objects_overflow() {
    let err = depth::hit_id_levels(MAX_HIT_IDS + 1).unwrap_err();
    assert_eq!(
        err,
        SceneError::ConfigurationOverflow {
            count: 255,
            capacity: 254
        }
    );
}

#[test]
fn test_flatten_orders_by_depth_and_includes_children() {
    let mut scene = SceneState::default();
    let top = scene
        .insert(ObjectSpec::rectangle(Vec2::new(50.0, 50.0), Vec2::splat(20.0)).with_depth(10))
        .unwrap();
    let circle = scene
        .insert(ObjectSpec::circle(Vec2::new(200.0, 200.0), 40.0))
        .unwrap();
    let bottom = scene
        .insert(ObjectSpec::rectangle(Vec2::new(90.0, 50.0), Vec2::splat(20.0)).with_depth(-1))
        .unwrap();
    let label = scene_canvas::bond::children_of(&scene, circle).unwrap()[0];

    let order = depth::flatten_scene(&scene).unwrap();
    assert_eq!(order, vec![bottom, circle, top, label]);
}

#[test]
fn test_only_the_deepest_object_is_hovered() {
    let mut scene = SceneState::default();
    let under = scene
        .insert(ObjectSpec::rectangle(Vec2::new(100.0, 100.0), Vec2::splat(100.0)))
        .unwrap();
    let over = scene
        .insert(ObjectSpec::rectangle(Vec2::new(140.0, 100.0), Vec2::splat(100.0)).with_depth(5))
        .unwrap();

    let mut hit_tester = HitTester::new(UVec2::new(400, 300));
    hit_tester.rebuild(&mut scene, Vec2::ZERO).unwrap();
    let under_id = scene.object(under).unwrap().hit_id;
    let over_id = scene.object(over).unwrap().hit_id;
    assert_ne!(under_id, over_id);

    let overlap = IVec2::new(120, 100);
    assert!(hit_tester.is_hovered(over_id, overlap));
    assert!(!hit_tester.is_hovered(under_id, overlap));

    let only_under = IVec2::new(60, 100);
    assert!(hit_tester.is_hovered(under_id, only_under));
    assert!(!hit_tester.is_hovered(over_id, only_under));

    let empty = IVec2::new(350, 250);
    assert!(!hit_tester.is_hovered(under_id, empty));
    assert!(!hit_tester.is_hovered(over_id, empty));
    assert_eq!(hit_tester.buffer().sample(empty), 0);
}

#[test]
fn test_pointer_outside_buffer_hits_nothing() {
    let mut scene = SceneState::default();
    let id = scene
        .insert(ObjectSpec::rectangle(Vec2::new(10.0, 10.0), Vec2::splat(20.0)))
        .unwrap();

    let mut hit_tester = HitTester::new(UVec2::new(100, 100));
    hit_tester.rebuild(&mut scene, Vec2::ZERO).unwrap();
    let hit_id = scene.object(id).unwrap().hit_id;

    assert!(hit_tester.is_hovered(hit_id, IVec2::new(5, 5)));
    assert!(!hit_tester.is_hovered(hit_id, IVec2::new(-1, 5)));
    assert!(!hit_tester.is_hovered(hit_id, IVec2::new(5, 100)));
}

#[test]
fn test_label_wins_over_its_circle() {
    let mut scene = SceneState::default();
    let circle = scene
        .insert(ObjectSpec::circle(Vec2::new(100.0, 100.0), 50.0))
        .unwrap();
    let label = scene_canvas::bond::children_of(&scene, circle).unwrap()[0];

    let mut hit_tester = HitTester::new(UVec2::new(300, 300));
    hit_tester.rebuild(&mut scene, Vec2::ZERO).unwrap();
    let circle_id = scene.object(circle).unwrap().hit_id;
    let label_id = scene.object(label).unwrap().hit_id;

    assert!(hit_tester.is_hovered(label_id, IVec2::new(100, 100)));
    assert!(!hit_tester.is_hovered(circle_id, IVec2::new(100, 100)));
    assert!(hit_tester.is_hovered(circle_id, IVec2::new(135, 100)));
}

struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

impl depth::IdBufferSink for Recorder {
    fn consume(&mut self, buffer: &depth::IdBuffer) -> scene_canvas::Result<()> {
        *self.0.borrow_mut() = buffer.pixels().to_vec();
        Ok(())
    }
}

struct Broken;

impl depth::IdBufferSink for Broken {
    fn consume(&mut self, _buffer: &depth::IdBuffer) -> scene_canvas::Result<()> {
        Err(SceneError::DiagnosticSink("disk full".into()))
    }
}

#[test]
fn test_sink_sees_every_rebuild() {
    let mut scene = SceneState::default();
    scene
        .insert(ObjectSpec::rectangle(Vec2::new(5.0, 5.0), Vec2::splat(4.0)))
        .unwrap();

    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut hit_tester = HitTester::new(UVec2::new(10, 10));
    hit_tester.set_sink(Some(Box::new(Recorder(seen.clone()))));
    hit_tester.rebuild(&mut scene, Vec2::ZERO).unwrap();

    let pixels = seen.borrow();
    assert_eq!(pixels.len(), 100);
    assert_eq!(pixels.iter().filter(|&&level| level == 255).count(), 16);
}

#[test]
fn test_failing_sink_does_not_fail_the_frame() {
    let mut scene = SceneState::default();
    scene
        .insert(ObjectSpec::rectangle(Vec2::new(5.0, 5.0), Vec2::splat(4.0)))
        .unwrap();

    let mut hit_tester = HitTester::new(UVec2::new(10, 10));
    hit_tester.set_sink(Some(Box::new(Broken)));
    assert!(hit_tester.rebuild(&mut scene, Vec2::ZERO).is_ok());
}

#[test]
fn test_buffer_holds_one_pixel_per_cell() {
    let mut buffer = depth::IdBuffer::new(UVec2::new(300, 7));
    assert_eq!(buffer.pixels().len(), 2_100);

    buffer.resize(UVec2::new(70_000, 1));
    assert_eq!(buffer.pixels().len(), 70_000);
    assert_eq!(buffer.sample(IVec2::new(69_999, 0)), 0);
    assert_eq!(buffer.sample(IVec2::new(70_000, 0)), 0);
}
