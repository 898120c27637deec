//! Moving cars and bikes.
//!
//! Every vehicle keeps its lane and drives at a constant per-frame speed
//! along the street corridor, jumping back to the far end when it leaves.
//! Bikes additionally swerve around parked cars while the story shows the
//! blocked lanes, leaning into the swerve.

use std::f32::consts::PI;

use bevy::{math::FloatExt, prelude::*};
use rand::Rng;
use smallvec::SmallVec;

use crate::narrative::{Mode, StorySet, StoryState};
use crate::render::vehicle_models::{bike_blueprint, car_blueprint, Blueprint, VehicleModels};
use crate::render::SceneBuildSet;
use crate::simulation::parked_cars::ParkedCar;

pub struct TrafficPlugin;

impl Plugin for TrafficPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrafficConfig>()
            .add_systems(Startup, spawn_traffic.in_set(SceneBuildSet::Spawn))
            .add_systems(
                Update,
                (move_vehicles, steer_bikes)
                    .chain()
                    .in_set(StorySet::Animate),
            );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleKind {
    Car,
    Bike,
}

impl VehicleKind {
    pub fn blueprint(self) -> Blueprint {
        match self {
            VehicleKind::Car => car_blueprint(),
            VehicleKind::Bike => bike_blueprint(),
        }
    }
}

/// A vehicle driving along the street.
#[derive(Component, Debug)]
pub struct Vehicle {
    pub kind: VehicleKind,
    /// Signed longitudinal speed in units per frame (negative = away from
    /// the opening camera).
    pub speed: f32,
    /// Lateral centre of the vehicle's lane.
    pub lane_x: f32,
    /// Yaw of the model so its front faces the direction of travel.
    pub heading: f32,
}

/// Longitudinal range vehicles loop within.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corridor {
    pub min: f32,
    pub max: f32,
}

impl Corridor {
    /// Moves `z` by `speed`, jumping to the opposite end once it passes the
    /// end it is heading for.
    pub fn advance(&self, z: f32, speed: f32) -> f32 {
        let z = z + speed;
        if speed < 0.0 && z < self.min {
            self.max
        } else if speed > 0.0 && z > self.max {
            self.min
        } else {
            z
        }
    }

    /// Folds an arbitrary position into the corridor.
    pub fn wrap(&self, z: f32) -> f32 {
        self.min + (z - self.min).rem_euclid(self.max - self.min)
    }

    pub fn contains(&self, z: f32) -> bool {
        (self.min..=self.max).contains(&z)
    }
}

/// A group of identical vehicles sharing a lane.
#[derive(Clone, Debug)]
pub struct Fleet {
    pub kind: VehicleKind,
    pub count: usize,
    pub lane_x: f32,
    pub first_z: f32,
    pub spacing: f32,
    /// Minimum speed magnitude; a random extra up to `speed_jitter` is added.
    pub base_speed: f32,
    pub speed_jitter: f32,
    /// -1 drives toward -Z, +1 toward +Z.
    pub direction: f32,
    /// Body paint; `None` for models without painted bodywork.
    pub color: Option<Color>,
}

#[derive(Resource)]
pub struct TrafficConfig {
    pub corridor: Corridor,
    pub fleets: Vec<Fleet>,
    /// Longitudinal distance at which a parked car blocks a bike.
    pub bike_clearance: f32,
    /// Lateral position a blocked bike swerves to (mirrored per side).
    pub bike_swerve_x: f32,
    pub bike_lateral_easing: f32,
    /// Roll per unit of remaining lateral error.
    pub bike_tilt_gain: f32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        let fleet = |kind, lane_x, first_z, spacing, (base_speed, speed_jitter), direction| Fleet {
            kind,
            count: 5,
            lane_x,
            first_z,
            spacing,
            base_speed,
            speed_jitter,
            direction,
            color: None,
        };
        let red = Color::srgb_u8(0xcc, 0x33, 0x33);
        let yellow = Color::srgb_u8(0xcc, 0xcc, 0x33);
        Self {
            corridor: Corridor {
                min: -250.0,
                max: 50.0,
            },
            fleets: vec![
                Fleet {
                    color: Some(red),
                    ..fleet(VehicleKind::Car, 4.0, -10.0, 45.0, (0.4, 0.1), -1.0)
                },
                Fleet {
                    color: Some(yellow),
                    ..fleet(VehicleKind::Car, -4.0, -100.0, 45.0, (0.4, 0.1), 1.0)
                },
                fleet(VehicleKind::Bike, 11.0, 10.0, 30.0, (0.2, 0.05), -1.0),
                fleet(VehicleKind::Bike, -11.0, -100.0, 30.0, (0.2, 0.05), 1.0),
            ],
            bike_clearance: 12.0,
            bike_swerve_x: 6.0,
            bike_lateral_easing: 0.1,
            bike_tilt_gain: 0.5,
        }
    }
}

/// Model yaw for a direction of travel. Models face -Z unrotated.
pub fn heading_for(speed: f32) -> f32 {
    if speed > 0.0 {
        PI
    } else {
        0.0
    }
}

/// Where a bike wants to ride laterally this frame.
///
/// While parked cars are shown, a parked car on the bike's side of the road
/// within `bike_clearance` pushes the bike out toward the traffic lane.
pub fn bike_target_x(
    mode: Mode,
    lane_x: f32,
    z: f32,
    parked: &[Vec2],
    config: &TrafficConfig,
) -> f32 {
    if !mode.bikes_avoid_parked_cars() {
        return lane_x;
    }

    let blocked = parked.iter().any(|spot| {
        (z - spot.y).abs() < config.bike_clearance && spot.x.signum() == lane_x.signum()
    });

    if !blocked {
        lane_x
    } else if lane_x > 0.0 {
        config.bike_swerve_x
    } else {
        -config.bike_swerve_x
    }
}

/// One easing step toward `target_x`. Returns the new lateral position and
/// the roll angle, signed so the rider leans into the swerve whichever way
/// the bike faces.
pub fn steer_bike(x: f32, target_x: f32, speed: f32, config: &TrafficConfig) -> (f32, f32) {
    let x = x.lerp(target_x, config.bike_lateral_easing);
    let tilt = (target_x - x) * config.bike_tilt_gain;
    let facing = if speed < 0.0 { 1.0 } else { -1.0 };
    (x, -tilt * facing)
}

fn spawn_traffic(
    mut commands: Commands,
    config: Res<TrafficConfig>,
    models: Option<Res<VehicleModels>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(models) = models else {
        warn!("Vehicle models missing, skipping traffic");
        return;
    };
    let mut rng = rand::thread_rng();
    let mut count = 0;
    for fleet in &config.fleets {
        let blueprint = fleet.kind.blueprint();
        // Unpainted models never read the body handle.
        let body = fleet
            .color
            .map(|color| VehicleModels::body_material(&mut materials, color))
            .unwrap_or_default();

        for i in 0..fleet.count {
            let speed =
                fleet.direction * (fleet.base_speed + rng.gen::<f32>() * fleet.speed_jitter);
            let heading = heading_for(speed);
            let z = config.corridor.wrap(fleet.first_z - i as f32 * fleet.spacing);

            models.spawn(
                &mut commands,
                &blueprint,
                &body,
                (
                    Transform::from_xyz(fleet.lane_x, 0.0, z)
                        .with_rotation(Quat::from_rotation_y(heading)),
                    Vehicle {
                        kind: fleet.kind,
                        speed,
                        lane_x: fleet.lane_x,
                        heading,
                    },
                    Name::new(match fleet.kind {
                        VehicleKind::Car => "Car",
                        VehicleKind::Bike => "Bike",
                    }),
                ),
            );
            count += 1;
        }
    }

    info!("Spawned {} moving vehicles", count);
}

fn move_vehicles(config: Res<TrafficConfig>, mut vehicles: Query<(&Vehicle, &mut Transform)>) {
    for (vehicle, mut transform) in &mut vehicles {
        transform.translation.z = config.corridor.advance(transform.translation.z, vehicle.speed);
    }
}

fn steer_bikes(
    story: Res<StoryState>,
    config: Res<TrafficConfig>,
    parked: Query<(&ParkedCar, &Transform), Without<Vehicle>>,
    mut vehicles: Query<(&Vehicle, &mut Transform)>,
) {
    let spots: SmallVec<[Vec2; 16]> = parked
        .iter()
        .map(|(car, transform)| Vec2::new(transform.translation.x, car.base_z))
        .collect();

    for (vehicle, mut transform) in &mut vehicles {
        if vehicle.kind != VehicleKind::Bike {
            continue;
        }

        let target_x = bike_target_x(
            story.mode,
            vehicle.lane_x,
            transform.translation.z,
            &spots,
            &config,
        );
        let (x, roll) = steer_bike(transform.translation.x, target_x, vehicle.speed, &config);

        transform.translation.x = x;
        transform.rotation = Quat::from_euler(EulerRot::XYZ, 0.0, vehicle.heading, roll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn spots() -> Vec<Vec2> {
        vec![Vec2::new(11.0, -20.0), Vec2::new(-11.0, -55.0)]
    }

    #[test]
    fn test_corridor_wraps_in_direction_of_travel() {
        let corridor = TrafficConfig::default().corridor;
        assert_eq!(corridor.advance(-249.9, -0.4), 50.0);
        assert_eq!(corridor.advance(49.9, 0.4), -250.0);
        assert!((corridor.advance(-100.0, -0.4) - -100.4).abs() < 1e-4);
        // Landing exactly on the bound does not wrap yet.
        assert_eq!(corridor.advance(-249.5, -0.5), -250.0);
        assert_eq!(corridor.advance(49.5, 0.5), 50.0);
    }

    #[test]
    fn test_corridor_wrap_folds_spawn_positions() {
        let corridor = TrafficConfig::default().corridor;
        assert_eq!(corridor.wrap(-280.0), 20.0);
        assert_eq!(corridor.wrap(-10.0), -10.0);
        assert!(corridor.contains(corridor.wrap(400.0)));
    }

    #[test]
    fn test_positions_stay_in_corridor() {
        let config = TrafficConfig::default();
        let corridor = config.corridor;
        let mut rng = StdRng::seed_from_u64(7);

        let mut fleet: Vec<(f32, f32)> = config
            .fleets
            .iter()
            .flat_map(|f| (0..f.count).map(move |i| (f, i)))
            .map(|(f, i)| {
                let speed = f.direction * (f.base_speed + rng.gen::<f32>() * f.speed_jitter);
                (corridor.wrap(f.first_z - i as f32 * f.spacing), speed)
            })
            .collect();

        for _ in 0..5_000 {
            for (z, speed) in &mut fleet {
                *z = corridor.advance(*z, *speed);
                assert!(corridor.contains(*z), "z = {z}");
            }
        }
    }

    #[test]
    fn test_bike_swerves_around_same_side_parked_car() {
        let config = TrafficConfig::default();
        assert_eq!(bike_target_x(Mode::Problem, 11.0, -28.0, &spots(), &config), 6.0);
        assert_eq!(bike_target_x(Mode::Home, -11.0, -60.0, &spots(), &config), -6.0);
        // Out of range
        assert_eq!(bike_target_x(Mode::Problem, 11.0, -32.0, &spots(), &config), 11.0);
        // Parked car on the other side of the road
        assert_eq!(bike_target_x(Mode::Problem, -11.0, -20.0, &spots(), &config), -11.0);
    }

    #[test]
    fn test_bike_holds_lane_once_lanes_are_protected() {
        let config = TrafficConfig::default();
        for mode in [Mode::Success, Mode::Solution, Mode::Benefits, Mode::Action] {
            assert_eq!(bike_target_x(mode, 11.0, -20.0, &spots(), &config), 11.0);
            assert_eq!(bike_target_x(mode, -11.0, -55.0, &spots(), &config), -11.0);
        }
    }

    #[test]
    fn test_bike_leans_into_swerve_whichever_way_it_faces() {
        let config = TrafficConfig::default();

        // Outbound bike on the right swerving left toward x = 6
        let (x, roll) = steer_bike(11.0, 6.0, -0.2, &config);
        assert!((x - 10.5).abs() < 1e-5);
        assert!((roll - 2.25).abs() < 1e-5);

        // Inbound bike on the left swerving right toward x = -6
        let (x, roll) = steer_bike(-11.0, -6.0, 0.2, &config);
        assert!((x - -10.5).abs() < 1e-5);
        assert!((roll - 2.25).abs() < 1e-5);

        let (_, roll) = steer_bike(11.0, 11.0, -0.2, &config);
        assert_eq!(roll, 0.0);
    }

    #[test]
    fn test_heading_faces_travel() {
        assert_eq!(heading_for(-0.3), 0.0);
        assert_eq!(heading_for(0.3), PI);
    }

    #[test]
    fn test_only_painted_fleets_carry_a_colour() {
        use crate::render::vehicle_models::PartPaint;

        let config = TrafficConfig::default();
        for fleet in &config.fleets {
            let painted = fleet
                .kind
                .blueprint()
                .iter()
                .any(|part| part.paint == PartPaint::Body);
            assert_eq!(fleet.color.is_some(), painted, "{:?}", fleet.kind);
        }
        assert_eq!(
            config.fleets.iter().filter(|f| f.color.is_some()).count(),
            2
        );
    }

    #[test]
    fn test_traffic_systems_step_world() {
        let mut app = App::new();
        app.insert_resource(TrafficConfig::default())
            .insert_resource(StoryState {
                mode: Mode::Problem,
                ..default()
            })
            .add_systems(Update, (move_vehicles, steer_bikes).chain());

        app.world_mut()
            .spawn((ParkedCar { base_z: -20.0 }, Transform::from_xyz(11.0, 0.0, -20.0)));
        let bike = app
            .world_mut()
            .spawn((
                Vehicle {
                    kind: VehicleKind::Bike,
                    speed: -0.25,
                    lane_x: 11.0,
                    heading: 0.0,
                },
                Transform::from_xyz(11.0, 0.0, -15.0),
            ))
            .id();
        let car = app
            .world_mut()
            .spawn((
                Vehicle {
                    kind: VehicleKind::Car,
                    speed: 0.5,
                    lane_x: -4.0,
                    heading: PI,
                },
                Transform::from_xyz(-4.0, 0.0, 49.8),
            ))
            .id();

        for _ in 0..20 {
            app.update();
        }

        let bike = app.world().get::<Transform>(bike).unwrap();
        assert!((bike.translation.z - -20.0).abs() < 1e-3);
        assert!(bike.translation.x < 8.0, "bike should swerve, x = {}", bike.translation.x);

        let car = app.world().get::<Transform>(car).unwrap();
        assert_eq!(car.translation.x, -4.0);
        // Wrapped to -250 on the first frame, then 19 more frames
        assert!((car.translation.z - (-250.0 + 19.0 * 0.5)).abs() < 1e-3);
    }
}
