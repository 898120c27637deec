//! Night-time street lighting: dim ambient, one shadow-casting key light and
//! a row of warm street lights down the middle of the road.

use bevy::{
    pbr::{CascadeShadowConfigBuilder, DirectionalLightShadowMap},
    prelude::*,
};

pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        let config = LightingConfig::default();
        app.insert_resource(DirectionalLightShadowMap {
            size: config.shadow_map_size,
        })
        .insert_resource(AmbientLight {
            color: config.ambient_color,
            brightness: config.ambient_brightness,
        })
        .insert_resource(ClearColor(config.fog_color))
        .insert_resource(config)
        .add_systems(Startup, setup_lighting);
    }
}

#[derive(Resource, Clone)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_brightness: f32,
    pub sun_position: Vec3,
    pub sun_illuminance: f32,
    pub shadow_map_size: usize,
    /// Far bound of the shadow cascade.
    pub shadow_distance: f32,
    pub lamp_color: Color,
    pub lamp_intensity: f32,
    pub lamp_range: f32,
    pub lamp_height: f32,
    pub lamp_start_z: f32,
    /// Lamps are placed while z stays below this.
    pub lamp_end_z: f32,
    pub lamp_spacing: f32,
    pub fog_color: Color,
    pub fog_density: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::srgb_u8(0x40, 0x40, 0x40),
            ambient_brightness: 600.0,
            sun_position: Vec3::new(-20.0, 50.0, 20.0),
            sun_illuminance: 3_000.0,
            shadow_map_size: 2048,
            shadow_distance: 500.0,
            lamp_color: Color::srgb_u8(0xff, 0xaa, 0x00),
            lamp_intensity: 400_000.0,
            lamp_range: 40.0,
            lamp_height: 10.0,
            lamp_start_z: -150.0,
            lamp_end_z: 50.0,
            lamp_spacing: 40.0,
            fog_color: Color::srgb_u8(0x11, 0x11, 0x11),
            fog_density: 0.02,
        }
    }
}

impl LightingConfig {
    pub fn lamp_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..)
            .map(move |i| self.lamp_start_z + i as f32 * self.lamp_spacing)
            .take_while(move |&z| z < self.lamp_end_z)
            .map(move |z| Vec3::new(0.0, self.lamp_height, z))
    }
}

fn setup_lighting(mut commands: Commands, config: Res<LightingConfig>) {
    commands.spawn((
        DirectionalLight {
            illuminance: config.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(config.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
        CascadeShadowConfigBuilder {
            num_cascades: 1,
            minimum_distance: 0.5,
            maximum_distance: config.shadow_distance,
            ..default()
        }
        .build(),
    ));

    let mut lamps = 0;
    for position in config.lamp_positions() {
        commands.spawn((
            PointLight {
                color: config.lamp_color,
                intensity: config.lamp_intensity,
                range: config.lamp_range,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(position),
            Name::new("Street light"),
        ));
        lamps += 1;
    }

    debug!("Lighting ready with {} street lights", lamps);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_lights_cover_the_street() {
        let config = LightingConfig::default();
        let lamps: Vec<Vec3> = config.lamp_positions().collect();
        assert_eq!(lamps.len(), 5);
        assert_eq!(lamps[0], Vec3::new(0.0, 10.0, -150.0));
        assert_eq!(lamps[4].z, 10.0);
        assert!(lamps.windows(2).all(|w| w[1].z - w[0].z == 40.0));
    }
}
