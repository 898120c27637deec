//! Perspective story camera that eases toward the shot chosen by the
//! current section.
//!
//! Position and look-at are eased separately; the look-at blend goes through
//! the camera's current forward point, which gives turns a slight lag
//! behind the dolly.

use bevy::{
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
    window::PrimaryWindow,
};

use crate::narrative::{CameraTarget, StorySet, StoryState};
use crate::render::lighting::LightingConfig;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraConfig>()
            .add_systems(Startup, (setup_camera, cap_pixel_density))
            .add_systems(Update, cap_pixel_density.in_set(StorySet::Input))
            .add_systems(Update, follow_story.in_set(StorySet::Animate));
    }
}

#[derive(Resource)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the remaining distance covered each frame.
    pub easing: f32,
    /// Highest pixel density the window renders at.
    pub max_scale_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 55.0,
            near: 0.1,
            far: 1000.0,
            easing: 0.05,
            max_scale_factor: 2.0,
        }
    }
}

/// Marker for the story camera.
#[derive(Component)]
pub struct StoryCamera;

/// One easing step of the camera toward `target`.
pub fn ease_camera(transform: &mut Transform, target: &CameraTarget, easing: f32) {
    transform.translation = transform.translation.lerp(target.position, easing);

    let current_look = transform.translation + *transform.forward();
    let look = current_look.lerp(target.look_at, easing);
    transform.look_at(look, Vec3::Y);
}

/// Scale factor override needed to keep the render surface at or below
/// `max` pixels per logical pixel.
pub fn capped_scale_factor(os_scale_factor: f32, max: f32) -> Option<f32> {
    (os_scale_factor > max).then_some(max)
}

fn setup_camera(
    mut commands: Commands,
    config: Res<CameraConfig>,
    lighting: Res<LightingConfig>,
) {
    // Starts at the origin looking down -Z and eases into the first shot.
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..default()
        }),
        Transform::default(),
        DistanceFog {
            color: lighting.fog_color,
            falloff: FogFalloff::Exponential {
                density: lighting.fog_density,
            },
            ..default()
        },
        StoryCamera,
    ));
}

fn follow_story(
    story: Res<StoryState>,
    config: Res<CameraConfig>,
    mut cameras: Query<&mut Transform, With<StoryCamera>>,
) {
    for mut transform in &mut cameras {
        ease_camera(&mut transform, &story.camera_target, config.easing);
    }
}

fn cap_pixel_density(
    config: Res<CameraConfig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };

    let wanted = capped_scale_factor(
        window.resolution.base_scale_factor(),
        config.max_scale_factor,
    );
    if window.resolution.scale_factor_override() != wanted {
        window.resolution.set_scale_factor_override(wanted);
        match wanted {
            Some(scale) => info!("Pixel density capped at {}x", scale),
            None => debug!("Pixel density cap lifted"),
        }
    }
}
