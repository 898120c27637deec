//! Street traffic: moving cars and bikes, and the parked cars that block
//! the bike lanes.
//!
//! Motion is stepped once per rendered frame with per-frame speeds and
//! easing factors, so apparent speed follows the display refresh rate.

use bevy::prelude::*;

pub mod parked_cars;
pub mod traffic;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(parked_cars::ParkedCarsPlugin)
            .add_plugins(traffic::TrafficPlugin);
    }
}
