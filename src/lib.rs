//! Bike Lane Story - a scroll-driven 3D street scene.
//!
//! Scrolling through the story page moves the camera between shots of a
//! two-way street and switches the street between its "problem" state
//! (cars parked in the bike lanes, bikes swerving into traffic) and its
//! "solution" state (bollards up, green protected lanes).

use bevy::prelude::*;

pub mod camera;
pub mod narrative;
pub mod render;
pub mod simulation;
pub mod ui;

/// Everything except the window and engine plugins.
pub struct StoryPlugin;

impl Plugin for StoryPlugin {
    fn build(&self, app: &mut App) {
        // Story state first: the other plugins schedule into its sets.
        app.add_plugins(narrative::NarrativePlugin)
            .add_plugins(render::RenderPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(simulation::SimulationPlugin)
            .add_plugins(ui::UiPlugin);
    }
}
