//! Randomised skyline of dark blocks with scattered lit windows.
//!
//! Layout is generated once per run from an unseeded RNG; only counts and
//! bounds are fixed.

use std::f32::consts::FRAC_PI_2;

use bevy::{pbr::NotShadowCaster, prelude::*};
use rand::Rng;

pub struct SkylinePlugin;

impl Plugin for SkylinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SkylineConfig>()
            .add_systems(Startup, spawn_skyline);
    }
}

#[derive(Resource, Clone)]
pub struct SkylineConfig {
    pub count: usize,
    pub min_height: f32,
    pub height_range: f32,
    pub min_width: f32,
    pub width_range: f32,
    /// Distance from the road centre to the nearest building centre.
    pub setback: f32,
    pub setback_jitter: f32,
    pub first_z: f32,
    pub spacing: f32,
    pub z_jitter: f32,
    /// Chance that a building has any lit windows.
    pub window_chance: f64,
    /// Chance that a given row of a windowed building stays dark.
    pub row_skip_chance: f64,
    pub window_size: Vec2,
    pub row_pitch: f32,
    pub first_row_y: f32,
    /// Gap between a window and the wall it sits on.
    pub wall_gap: f32,
}

impl Default for SkylineConfig {
    fn default() -> Self {
        Self {
            count: 50,
            min_height: 10.0,
            height_range: 30.0,
            min_width: 6.0,
            width_range: 8.0,
            setback: 24.0,
            setback_jitter: 5.0,
            first_z: -50.0,
            spacing: 10.0,
            z_jitter: 10.0,
            window_chance: 0.7,
            row_skip_chance: 0.3,
            window_size: Vec2::new(0.4, 0.6),
            row_pitch: 1.5,
            first_row_y: 2.0,
            wall_gap: 0.1,
        }
    }
}

/// A building and its lit windows.
#[derive(Clone, Debug)]
pub struct BuildingPlan {
    /// +1 right of the road, -1 left.
    pub side: f32,
    pub width: f32,
    pub height: f32,
    /// Centre of the block (y is half the height).
    pub center: Vec3,
    /// Window centres on the wall facing the road.
    pub windows: Vec<Vec3>,
}

impl BuildingPlan {
    /// Yaw turning a +Z facing window toward the road.
    pub fn window_yaw(&self) -> f32 {
        if self.side > 0.0 {
            -FRAC_PI_2
        } else {
            FRAC_PI_2
        }
    }
}

pub fn generate_skyline(rng: &mut impl Rng, config: &SkylineConfig) -> Vec<BuildingPlan> {
    (0..config.count)
        .map(|i| {
            let height = config.min_height + rng.gen::<f32>() * config.height_range;
            let width = config.min_width + rng.gen::<f32>() * config.width_range;
            let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let center = Vec3::new(
                side * (config.setback + rng.gen::<f32>() * config.setback_jitter),
                height / 2.0,
                config.first_z - i as f32 * config.spacing + rng.gen::<f32>() * config.z_jitter,
            );

            let mut windows = Vec::new();
            if rng.gen_bool(config.window_chance) {
                // Wall facing the road
                let wall_x = center.x - side * (width / 2.0 + config.wall_gap);
                let rows = (height / 2.0).floor() as usize;
                for row in 0..rows {
                    if rng.gen_bool(config.row_skip_chance) {
                        continue;
                    }
                    windows.push(Vec3::new(
                        wall_x,
                        row as f32 * config.row_pitch + config.first_row_y,
                        center.z,
                    ));
                }
            }

            BuildingPlan {
                side,
                width,
                height,
                center,
                windows,
            }
        })
        .collect()
}

fn spawn_skyline(
    mut commands: Commands,
    config: Res<SkylineConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let plans = generate_skyline(&mut rand::thread_rng(), &config);

    let block_mesh = meshes.add(Cuboid::new(1.0, 1.0, 1.0));
    let block_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x15, 0x15, 0x15),
        perceptual_roughness: 0.95,
        ..default()
    });
    let window_mesh = meshes.add(Rectangle::from_size(config.window_size));
    let window_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 0.93, 0.6),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let mut window_count = 0;
    for plan in &plans {
        commands.spawn((
            Mesh3d(block_mesh.clone()),
            MeshMaterial3d(block_material.clone()),
            Transform::from_translation(plan.center).with_scale(Vec3::new(
                plan.width,
                plan.height,
                plan.width,
            )),
            Name::new("Building"),
        ));

        let rotation = Quat::from_rotation_y(plan.window_yaw());
        for &window in &plan.windows {
            commands.spawn((
                Mesh3d(window_mesh.clone()),
                MeshMaterial3d(window_material.clone()),
                Transform::from_translation(window).with_rotation(rotation),
                Name::new("Window"),
                NotShadowCaster,
            ));
        }
        window_count += plan.windows.len();
    }

    info!("Spawned {} buildings with {} lit windows", plans.len(), window_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skyline_bounds() {
        let config = SkylineConfig::default();
        let plans = generate_skyline(&mut rand::thread_rng(), &config);
        assert_eq!(plans.len(), 50);

        for (i, plan) in plans.iter().enumerate() {
            assert!((10.0..=40.0).contains(&plan.height));
            assert!((6.0..=14.0).contains(&plan.width));
            assert_eq!(plan.center.y, plan.height / 2.0);
            assert!((24.0..=29.0).contains(&plan.center.x.abs()));
            assert_eq!(plan.center.x.signum(), plan.side);

            let slot = -50.0 - i as f32 * 10.0;
            assert!(plan.center.z >= slot && plan.center.z <= slot + 10.0);

            assert!(plan.windows.len() <= (plan.height / 2.0).floor() as usize);
            for window in &plan.windows {
                assert!(window.y >= 2.0 && window.y < plan.height);
                assert_eq!(window.z, plan.center.z);
                // On the road-facing wall, nearer the road than the block centre
                assert!(window.x.abs() < plan.center.x.abs());
            }
        }
    }

    #[test]
    fn test_every_row_lit_when_nothing_is_skipped() {
        let config = SkylineConfig {
            window_chance: 1.0,
            row_skip_chance: 0.0,
            ..default()
        };
        for plan in generate_skyline(&mut rand::thread_rng(), &config) {
            let rows = (plan.height / 2.0).floor() as usize;
            assert_eq!(plan.windows.len(), rows);
            for (row, window) in plan.windows.iter().enumerate() {
                assert_eq!(window.y, row as f32 * 1.5 + 2.0);
            }
        }
    }

    #[test]
    fn test_windows_face_the_road() {
        let config = SkylineConfig::default();
        for plan in generate_skyline(&mut rand::thread_rng(), &config) {
            let facing = Quat::from_rotation_y(plan.window_yaw()) * Vec3::Z;
            // Normal points back toward x = 0
            assert!(facing.x * plan.side < -0.99);
        }
    }
}
