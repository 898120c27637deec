//! Parked cars sitting in both bike lanes.
//!
//! They rise out of the street while the story shows the problem and sink
//! away once the lanes are protected.

use bevy::{math::FloatExt, prelude::*};
use rand::Rng;

use crate::narrative::{Mode, StorySet, StoryState};
use crate::render::vehicle_models::{car_blueprint, VehicleModels};
use crate::render::SceneBuildSet;

pub struct ParkedCarsPlugin;

impl Plugin for ParkedCarsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParkedCarConfig>()
            .add_systems(Startup, spawn_parked_cars.in_set(SceneBuildSet::Spawn))
            .add_systems(Update, animate_parked_cars.in_set(StorySet::Animate));
    }
}

/// A car parked at a fixed spot in a bike lane.
#[derive(Component, Debug)]
pub struct ParkedCar {
    /// Longitudinal position of the parking spot.
    pub base_z: f32,
}

#[derive(Resource)]
pub struct ParkedCarConfig {
    pub per_side: usize,
    /// Lateral position of each row of parked cars.
    pub lanes: [f32; 2],
    pub first_z: f32,
    pub spacing: f32,
    /// Random yaw in radians, +/- this much.
    pub yaw_jitter: f32,
    pub color: Color,
    pub shown_y: f32,
    pub hidden_y: f32,
    /// Cars are drawn only while above this height.
    pub visible_above: f32,
    pub easing: f32,
}

impl Default for ParkedCarConfig {
    fn default() -> Self {
        Self {
            per_side: 5,
            lanes: [11.0, -11.0],
            first_z: -20.0,
            spacing: 35.0,
            yaw_jitter: 0.1,
            color: Color::srgb_u8(0x55, 0x55, 0x55),
            shown_y: 0.0,
            hidden_y: -5.0,
            visible_above: -4.0,
            easing: 0.1,
        }
    }
}

impl ParkedCarConfig {
    /// Parking spots as (lateral, longitudinal) pairs.
    pub fn spots(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.lanes.iter().flat_map(move |&x| {
            (0..self.per_side).map(move |i| Vec2::new(x, self.first_z - i as f32 * self.spacing))
        })
    }
}

/// One easing step for a parked car's height. Returns the new height and
/// whether the car should be drawn.
pub fn ease_parked_car(y: f32, mode: Mode, config: &ParkedCarConfig) -> (f32, bool) {
    let target = if mode.shows_parked_cars() {
        config.shown_y
    } else {
        config.hidden_y
    };
    let y = y.lerp(target, config.easing);
    (y, y > config.visible_above)
}

fn spawn_parked_cars(
    mut commands: Commands,
    config: Res<ParkedCarConfig>,
    models: Option<Res<VehicleModels>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(models) = models else {
        warn!("Vehicle models missing, skipping parked cars");
        return;
    };
    let mut rng = rand::thread_rng();
    let body = VehicleModels::body_material(&mut materials, config.color);
    let blueprint = car_blueprint();

    let mut count = 0;
    for spot in config.spots() {
        // Cars on the left side face the other way.
        let facing = if spot.x < 0.0 { std::f32::consts::PI } else { 0.0 };
        let yaw = facing + rng.gen_range(-config.yaw_jitter..config.yaw_jitter);

        models.spawn(
            &mut commands,
            &blueprint,
            &body,
            (
                Transform::from_xyz(spot.x, config.shown_y, spot.y)
                    .with_rotation(Quat::from_rotation_y(yaw)),
                ParkedCar { base_z: spot.y },
                Name::new("Parked car"),
            ),
        );
        count += 1;
    }

    info!("Spawned {} parked cars", count);
}

fn animate_parked_cars(
    story: Res<StoryState>,
    config: Res<ParkedCarConfig>,
    mut cars: Query<(&mut Transform, &mut Visibility), With<ParkedCar>>,
) {
    for (mut transform, mut visibility) in &mut cars {
        let (y, visible) = ease_parked_car(transform.translation.y, story.mode, &config);
        transform.translation.y = y;
        visibility.set_if_neq(if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}
