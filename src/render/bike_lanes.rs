//! Curb-side bike lanes: coloured surface, white separator stripe and a
//! row of bollards along the stripe.
//!
//! Bollards hide under the street until the story reaches the protected
//! lanes, then rise while the lane surface turns green.

use bevy::{color::Mix, math::FloatExt, pbr::NotShadowCaster, prelude::*};

use crate::narrative::{StorySet, StoryState};
use crate::render::street::StreetConfig;

pub struct BikeLanesPlugin;

impl Plugin for BikeLanesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BikeLaneConfig>()
            .add_systems(Startup, spawn_bike_lanes)
            .add_systems(Update, animate_bike_lanes.in_set(StorySet::Animate));
    }
}

#[derive(Component)]
pub struct BikeLaneSurface;

#[derive(Component)]
pub struct Bollard;

#[derive(Resource)]
pub struct BikeLaneConfig {
    /// Lateral centre of each lane.
    pub lanes: [f32; 2],
    pub lane_width: f32,
    pub stripe_width: f32,
    /// Distance of the stripe from the lane centre, toward the road centre.
    pub stripe_offset: f32,
    pub bollard_radius: f32,
    pub bollard_height: f32,
    pub bollard_spacing: f32,
    /// First (nearest) bollard.
    pub bollard_start_z: f32,
    /// Bollards are placed while z stays above this.
    pub bollard_end_z: f32,
    pub bollard_raised_y: f32,
    pub bollard_lowered_y: f32,
    pub bollard_easing: f32,
    pub protected_color: Color,
    pub unprotected_color: Color,
    pub color_easing: f32,
}

impl Default for BikeLaneConfig {
    fn default() -> Self {
        Self {
            lanes: [11.0, -11.0],
            lane_width: 3.5,
            stripe_width: 0.3,
            stripe_offset: 2.0,
            bollard_radius: 0.1,
            bollard_height: 1.2,
            bollard_spacing: 10.0,
            bollard_start_z: 50.0,
            bollard_end_z: -250.0,
            bollard_raised_y: 0.6,
            bollard_lowered_y: -2.0,
            bollard_easing: 0.1,
            protected_color: Color::srgb_u8(0x00, 0x66, 0x00),
            unprotected_color: Color::srgb_u8(0x33, 0x33, 0x33),
            color_easing: 0.05,
        }
    }
}

impl BikeLaneConfig {
    /// Stripe position for a lane: between the lane and the car traffic.
    pub fn stripe_x(&self, lane_x: f32) -> f32 {
        if lane_x > 0.0 {
            lane_x - self.stripe_offset
        } else {
            lane_x + self.stripe_offset
        }
    }

    /// Bollard positions along one lane's stripe, at their lowered height.
    pub fn bollard_positions(&self, lane_x: f32) -> impl Iterator<Item = Vec3> + '_ {
        let x = self.stripe_x(lane_x);
        (0..)
            .map(move |i| self.bollard_start_z - i as f32 * self.bollard_spacing)
            .take_while(move |&z| z > self.bollard_end_z)
            .map(move |z| Vec3::new(x, self.bollard_lowered_y, z))
    }
}

/// One easing step for a bollard's height.
pub fn ease_bollard(y: f32, protected: bool, config: &BikeLaneConfig) -> f32 {
    let target = if protected {
        config.bollard_raised_y
    } else {
        config.bollard_lowered_y
    };
    y.lerp(target, config.bollard_easing)
}

/// One easing step for the lane surface colour, blended in linear RGB.
pub fn ease_lane_color(
    current: LinearRgba,
    protected: bool,
    config: &BikeLaneConfig,
) -> LinearRgba {
    let target = if protected {
        config.protected_color
    } else {
        config.unprotected_color
    };
    current.mix(&target.to_linear(), config.color_easing)
}

fn spawn_bike_lanes(
    mut commands: Commands,
    config: Res<BikeLaneConfig>,
    street: Res<StreetConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let stripe_mesh =
        meshes.add(Plane3d::default().mesh().size(config.stripe_width, street.length));
    let stripe_material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        unlit: true,
        ..default()
    });
    let lane_mesh = meshes.add(Plane3d::default().mesh().size(config.lane_width, street.length));
    let bollard_mesh = meshes.add(Cylinder::new(config.bollard_radius, config.bollard_height));
    let bollard_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xee, 0xee, 0xee),
        perceptual_roughness: 0.6,
        ..default()
    });

    let mut bollard_count = 0;
    for &lane_x in &config.lanes {
        commands.spawn((
            Mesh3d(stripe_mesh.clone()),
            MeshMaterial3d(stripe_material.clone()),
            Transform::from_xyz(config.stripe_x(lane_x), 0.03, street.center_z),
            Name::new("Lane stripe"),
            NotShadowCaster,
        ));

        // Each lane gets its own material so its colour can be animated.
        let lane_material = materials.add(StandardMaterial {
            base_color: config.unprotected_color,
            perceptual_roughness: 0.7,
            ..default()
        });
        commands.spawn((
            Mesh3d(lane_mesh.clone()),
            MeshMaterial3d(lane_material),
            Transform::from_xyz(lane_x, 0.02, street.center_z),
            BikeLaneSurface,
            NotShadowCaster,
        ));

        for position in config.bollard_positions(lane_x) {
            commands.spawn((
                Mesh3d(bollard_mesh.clone()),
                MeshMaterial3d(bollard_material.clone()),
                Transform::from_translation(position),
                Bollard,
            ));
            bollard_count += 1;
        }
    }

    info!("Spawned {} bike lanes with {} bollards", config.lanes.len(), bollard_count);
}

fn animate_bike_lanes(
    story: Res<StoryState>,
    config: Res<BikeLaneConfig>,
    mut bollards: Query<&mut Transform, With<Bollard>>,
    lanes: Query<&MeshMaterial3d<StandardMaterial>, With<BikeLaneSurface>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let protected = story.mode.bike_lanes_protected();

    for mut transform in &mut bollards {
        transform.translation.y = ease_bollard(transform.translation.y, protected, &config);
    }

    for handle in &lanes {
        let Some(material) = materials.get_mut(&handle.0) else {
            continue;
        };
        let color = ease_lane_color(material.base_color.to_linear(), protected, &config);
        material.base_color = color.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::Mode;

    fn distance(a: LinearRgba, b: LinearRgba) -> f32 {
        Vec3::new(a.red - b.red, a.green - b.green, a.blue - b.blue).length()
    }

    #[test]
    fn test_bollard_layout() {
        let config = BikeLaneConfig::default();
        let right: Vec<Vec3> = config.bollard_positions(11.0).collect();
        assert_eq!(right.len(), 30);
        assert_eq!(right[0], Vec3::new(9.0, -2.0, 50.0));
        assert_eq!(right[29].z, -240.0);

        let left: Vec<Vec3> = config.bollard_positions(-11.0).collect();
        assert!(left.iter().all(|b| b.x == -9.0));
    }

    #[test]
    fn test_bollards_rise_only_when_protected() {
        let config = BikeLaneConfig::default();
        let mut y = -2.0;
        for _ in 0..100 {
            y = ease_bollard(y, true, &config);
        }
        assert!((y - 0.6).abs() < 1e-3);

        for _ in 0..100 {
            y = ease_bollard(y, false, &config);
        }
        assert!((y - -2.0).abs() < 1e-3);
    }

    #[test]
    fn test_lane_color_converges_monotonically() {
        let config = BikeLaneConfig::default();
        let green = config.protected_color.to_linear();
        let gray = config.unprotected_color.to_linear();

        for (mode, target) in [
            (Mode::Solution, green),
            (Mode::Success, green),
            (Mode::Benefits, green),
            (Mode::Action, green),
            (Mode::Home, gray),
            (Mode::Problem, gray),
            (Mode::Research, gray),
        ] {
            let start = if target == green { gray } else { green };
            let mut color = start;
            let mut last = distance(color, target);
            for _ in 0..200 {
                color = ease_lane_color(color, mode.bike_lanes_protected(), &config);
                let d = distance(color, target);
                assert!(d <= last, "{mode:?} moved away from target");
                last = d;
            }
            assert!(last < 1e-3, "{mode:?} did not converge");
        }
    }
}
