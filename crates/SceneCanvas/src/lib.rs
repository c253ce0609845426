//! # SceneCanvas
//!
//! `scene_canvas` is the headless core of an interactive 2D scene editor.
//! It owns the object graph, hit-testing and interaction state, and delegates
//! windowing and pixels to the host application.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: Stores the objects in a flat arena (SlotMap).
//! - **Anchors (`src/anchor.rs`)**: Resolves where an object is, directly or by following another.
//! - **Bonds (`src/bond.rs`)**: Parent/child/connection relations between objects.
//! - **Depth (`src/depth.rs`)**: Per-frame id buffer used for hit-testing.
//! - **Interaction (`src/interaction.rs`)**: Hover, selection, drag, placement and deletion.
//! - **Render (`src/render.rs`)**: Outputs a list of `DrawCommand`s for the host to render.

pub mod anchor;
pub mod bond;
pub mod config;
pub mod depth;
pub mod error;
pub mod input;
pub mod interaction;
pub mod math;
pub mod model;
pub mod painter;
pub mod render;
pub mod shapes;

use glam::UVec2;
use input::InputState;
use interaction::EditorCommand;
use model::{ObjectFlags, SceneState};
use render::RenderList;

// Re-exports for convenience
pub use config::{EditorConfig, EditorStyle};
pub use depth::HitTester;
pub use error::{Result, SceneError};
pub use interaction::SceneEvent;

/// The main entry point for the library.
///
/// The `Editor` holds the configuration and the hit-testing buffer. The scene itself
/// is owned by the host and passed into every [`Editor::update`].
pub struct Editor {
    /// Configuration settings.
    pub config: EditorConfig,
    /// The id buffer used to resolve hover.
    pub hit_tester: HitTester,
}

impl Editor {
    /// Creates a new Editor with an id buffer of `screen_size` pixels.
    pub fn new(config: EditorConfig, screen_size: UVec2) -> Self {
        Self {
            config,
            hit_tester: HitTester::new(screen_size),
        }
    }

    /// Runs one tick.
    ///
    /// Order: deferred activation, placement commands, placement commit/cancel,
    /// remaining commands, id buffer rebuild, then the state machine and drawing of
    /// every object in depth order.
    ///
    /// Errors are fatal; recoverable refusals are logged and skipped internally.
    pub fn update(
        &mut self,
        input: &InputState,
        scene: &mut SceneState,
    ) -> Result<(RenderList, Vec<SceneEvent>)> {
        let mut events = Vec::new();
        let mut draw_list = RenderList::new();
        let pointer = input.pointer_pos();

        self.hit_tester.resize(input.screen_size);
        interaction::fire_deferred(scene, input.time, &mut events)?;

        let (placements, others): (Vec<_>, Vec<_>) = self
            .config
            .keymap
            .commands(input)
            .into_iter()
            .partition(|command| matches!(command, EditorCommand::Place(_)));
        for command in placements {
            interaction::apply_command(scene, &self.config, input, command, &mut events)?;
        }
        interaction::advance_placement(scene, &self.config, input, &mut events)?;
        for command in others {
            interaction::apply_command(scene, &self.config, input, command, &mut events)?;
        }

        let order = self.hit_tester.rebuild(scene, pointer)?;
        for id in order {
            if !scene.contains(id) {
                continue;
            }
            if scene.object(id)?.is(ObjectFlags::ACTIVE) {
                interaction::step_object(
                    scene,
                    &self.hit_tester,
                    id,
                    input,
                    &self.config,
                    &mut events,
                )?;
            }
            if scene.contains(id) {
                painter::Painter::draw_object(scene, id, pointer, &self.config.style, &mut draw_list)?;
            }
        }

        Ok((draw_list, events))
    }
}
