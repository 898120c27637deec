//! Static street scene and the shared vehicle models.

use bevy::prelude::*;

pub mod bike_lanes;
pub mod lighting;
pub mod skyline;
pub mod street;
pub mod vehicle_models;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Startup,
            (SceneBuildSet::Models, SceneBuildSet::Spawn).chain(),
        )
        .add_systems(
            Startup,
            vehicle_models::setup_vehicle_models.in_set(SceneBuildSet::Models),
        )
        .add_plugins(lighting::LightingPlugin)
        .add_plugins(street::StreetPlugin)
        .add_plugins(skyline::SkylinePlugin)
        .add_plugins(bike_lanes::BikeLanesPlugin);
    }
}

/// Startup ordering: shared model assets exist before anything spawns
/// vehicles from them.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    Models,
    Spawn,
}
