use std::time::Duration;

use anyhow::Context;
use macroquad::prelude as mq;
use scene_canvas::input::{InputState, Key, ModifiersState, PointerTracker};
use scene_canvas::model::{ObjectSpec, SceneState};
use scene_canvas::render::DrawCommand;
use scene_canvas::{Editor, EditorConfig, SceneEvent};
use tracing_subscriber::EnvFilter;

const KEYS: [(mq::KeyCode, Key); 6] = [
    (mq::KeyCode::Key1, Key::Num1),
    (mq::KeyCode::Key2, Key::Num2),
    (mq::KeyCode::X, Key::X),
    (mq::KeyCode::Delete, Key::Delete),
    (mq::KeyCode::Q, Key::Q),
    (mq::KeyCode::Escape, Key::Escape),
];

fn color(c: glam::Vec4) -> mq::Color {
    mq::Color::new(c.x, c.y, c.z, c.w)
}

fn draw(command: DrawCommand) {
    match command {
        DrawCommand::Circle {
            center,
            radius,
            color: c,
            stroke_width,
        } => match stroke_width {
            Some(width) => mq::draw_circle_lines(center.x, center.y, radius, width, color(c)),
            None => mq::draw_circle(center.x, center.y, radius, color(c)),
        },
        DrawCommand::Rect {
            pos,
            size,
            color: c,
            stroke_width,
        } => match stroke_width {
            Some(width) => mq::draw_rectangle_lines(pos.x, pos.y, size.x, size.y, width, color(c)),
            None => mq::draw_rectangle(pos.x, pos.y, size.x, size.y, color(c)),
        },
        DrawCommand::Line {
            start,
            end,
            color: c,
            width,
        } => {
            mq::draw_line(start.x, start.y, end.x, end.y, width, color(c));
        }
        DrawCommand::Text {
            center,
            text,
            color: c,
            size,
        } => {
            // Macroquad anchors text at the baseline.
            let dims = mq::measure_text(&text, None, size as u16, 1.0);
            mq::draw_text(
                &text,
                center.x - dims.width * 0.5,
                center.y + dims.offset_y * 0.5,
                size,
                color(c),
            );
        }
    }
}

/// A circle and a rectangle to start from.
fn seed_scene() -> anyhow::Result<SceneState> {
    let mut scene = SceneState::default();
    scene
        .insert(ObjectSpec::circle(glam::Vec2::new(200.0, 200.0), 50.0))
        .context("seeding circle")?;
    scene
        .insert(ObjectSpec::rectangle(
            glam::Vec2::new(450.0, 300.0),
            glam::Vec2::new(100.0, 100.0),
        ))
        .context("seeding rectangle")?;
    Ok(scene)
}

#[macroquad::main("Scene Playground")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EditorConfig::default();
    let mut tracker = PointerTracker::new(config.double_click_interval);
    let background = color(config.style.background_color);
    let mut editor = Editor::new(
        config,
        glam::UVec2::new(mq::screen_width() as u32, mq::screen_height() as u32),
    );

    let mut scene = match seed_scene() {
        Ok(scene) => scene,
        Err(e) => {
            tracing::error!(error = ?e, "failed to seed the scene");
            return;
        }
    };
    tracing::info!("1/2 place a circle/rectangle, X deletes, right click releases, Q quits");

    loop {
        let now = Duration::from_secs_f64(mq::get_time());
        let (mx, my) = mq::mouse_position();

        let buttons = tracker.track(
            mq::is_mouse_button_down(mq::MouseButton::Left),
            mq::is_mouse_button_down(mq::MouseButton::Middle),
            mq::is_mouse_button_down(mq::MouseButton::Right),
            now,
        );

        let modifiers = ModifiersState {
            ctrl: mq::is_key_down(mq::KeyCode::LeftControl)
                || mq::is_key_down(mq::KeyCode::RightControl),
            shift: mq::is_key_down(mq::KeyCode::LeftShift)
                || mq::is_key_down(mq::KeyCode::RightShift),
            alt: mq::is_key_down(mq::KeyCode::LeftAlt) || mq::is_key_down(mq::KeyCode::RightAlt),
            meta: mq::is_key_down(mq::KeyCode::LeftSuper)
                || mq::is_key_down(mq::KeyCode::RightSuper),
        };

        let pressed_keys = KEYS
            .iter()
            .filter(|(code, _)| mq::is_key_pressed(*code))
            .map(|&(_, key)| key)
            .collect();

        let input = InputState {
            pointer: glam::IVec2::new(mx as i32, my as i32),
            buttons,
            modifiers,
            pressed_keys,
            time: now,
            screen_size: glam::UVec2::new(mq::screen_width() as u32, mq::screen_height() as u32),
        };

        let (draw_list, events) = match editor.update(&input, &mut scene) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "scene update failed");
                return;
            }
        };

        let mut quit = false;
        for event in events {
            tracing::debug!(?event, "scene event");
            quit |= event == SceneEvent::QuitRequested;
        }
        if quit {
            tracing::info!("quit requested");
            return;
        }

        mq::clear_background(background);
        for command in draw_list {
            draw(command);
        }

        mq::next_frame().await
    }
}
