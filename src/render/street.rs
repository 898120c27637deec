//! Road surface, centre line and sidewalks.

use bevy::{pbr::NotShadowCaster, prelude::*};

pub struct StreetPlugin;

impl Plugin for StreetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StreetConfig>()
            .add_systems(Startup, spawn_street);
    }
}

/// Street dimensions. The street runs along Z.
#[derive(Resource)]
pub struct StreetConfig {
    pub road_width: f32,
    pub length: f32,
    /// Z of the street's midpoint.
    pub center_z: f32,
    pub center_line_width: f32,
    /// Distance of each yellow line from the road centre.
    pub center_line_offset: f32,
    pub sidewalk_width: f32,
    pub sidewalk_height: f32,
    /// Lateral position of each sidewalk's centre.
    pub sidewalk_x: f32,
}

impl Default for StreetConfig {
    fn default() -> Self {
        Self {
            road_width: 40.0,
            length: 400.0,
            center_z: -100.0,
            center_line_width: 0.2,
            center_line_offset: 0.15,
            sidewalk_width: 8.0,
            sidewalk_height: 0.4,
            sidewalk_x: 18.0,
        }
    }
}

fn spawn_street(
    mut commands: Commands,
    config: Res<StreetConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let road_mesh = meshes.add(Plane3d::default().mesh().size(config.road_width, config.length));
    let road_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x22, 0x22, 0x22),
        perceptual_roughness: 0.85,
        ..default()
    });
    commands.spawn((
        Mesh3d(road_mesh),
        MeshMaterial3d(road_material),
        Transform::from_xyz(0.0, 0.0, config.center_z),
        Name::new("Road"),
        NotShadowCaster,
    ));

    // Double yellow line, lifted slightly to avoid z-fighting
    let line_mesh = meshes.add(
        Plane3d::default()
            .mesh()
            .size(config.center_line_width, config.length),
    );
    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0xff, 0xcc, 0x00),
        unlit: true,
        ..default()
    });
    for side in [-1.0, 1.0] {
        commands.spawn((
            Mesh3d(line_mesh.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(side * config.center_line_offset, 0.02, config.center_z),
            Name::new("Center line"),
            NotShadowCaster,
        ));
    }

    let sidewalk_mesh = meshes.add(Cuboid::new(
        config.sidewalk_width,
        config.sidewalk_height,
        config.length,
    ));
    let sidewalk_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(0x55, 0x55, 0x55),
        perceptual_roughness: 0.95,
        ..default()
    });
    for side in [-1.0, 1.0] {
        commands.spawn((
            Mesh3d(sidewalk_mesh.clone()),
            MeshMaterial3d(sidewalk_material.clone()),
            Transform::from_xyz(
                side * config.sidewalk_x,
                config.sidewalk_height / 2.0,
                config.center_z,
            ),
            Name::new("Sidewalk"),
        ));
    }

    debug!("Street built");
}
