//! Reusable car and bicycle models built from primitive shapes.
//!
//! A model is described by a blueprint (a short list of parts) and
//! instantiated as a root entity with one child per part. Meshes and the
//! fixed materials are created once and shared by every vehicle; only the
//! car body paint is chosen per spawn.

use std::f32::consts::FRAC_PI_2;

use bevy::{pbr::NotShadowCaster, prelude::*};
use smallvec::{smallvec, SmallVec};

/// Primitive shapes the models are assembled from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartShape {
    Chassis,
    Cabin,
    CarWheel,
    Lamp,
    FrameBar,
    Handlebar,
    BikeWheel,
    Torso,
    Head,
}

/// Which material a part is painted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartPaint {
    /// Caller-supplied body colour.
    Body,
    Cabin,
    Tyre,
    Headlight,
    Taillight,
    Frame,
    Shirt,
    Skin,
}

#[derive(Clone, Copy, Debug)]
pub struct Part {
    pub shape: PartShape,
    pub paint: PartPaint,
    pub translation: Vec3,
    pub rotation: Quat,
    pub casts_shadow: bool,
}

impl Part {
    fn new(shape: PartShape, paint: PartPaint, translation: Vec3) -> Self {
        Self {
            shape,
            paint,
            translation,
            rotation: Quat::IDENTITY,
            casts_shadow: false,
        }
    }

    fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    fn with_shadow(mut self) -> Self {
        self.casts_shadow = true;
        self
    }
}

pub type Blueprint = SmallVec<[Part; 10]>;

/// Car facing -Z: chassis, cabin, four wheels, head and tail lights.
pub fn car_blueprint() -> Blueprint {
    use PartPaint::*;
    use PartShape::*;

    // Cylinders stand along Y; lay them on their side so they roll along Z.
    let axle = Quat::from_rotation_z(FRAC_PI_2);

    smallvec![
        Part::new(Chassis, Body, Vec3::new(0.0, 0.6, 0.0)).with_shadow(),
        Part::new(PartShape::Cabin, PartPaint::Cabin, Vec3::new(0.0, 1.15, 0.0)),
        Part::new(CarWheel, Tyre, Vec3::new(0.9, 0.35, 1.2)).rotated(axle),
        Part::new(CarWheel, Tyre, Vec3::new(-0.9, 0.35, 1.2)).rotated(axle),
        Part::new(CarWheel, Tyre, Vec3::new(0.9, 0.35, -1.2)).rotated(axle),
        Part::new(CarWheel, Tyre, Vec3::new(-0.9, 0.35, -1.2)).rotated(axle),
        Part::new(Lamp, Headlight, Vec3::new(0.6, 0.6, -2.11)),
        Part::new(Lamp, Headlight, Vec3::new(-0.6, 0.6, -2.11)),
        Part::new(Lamp, Taillight, Vec3::new(0.6, 0.6, 2.11)),
        Part::new(Lamp, Taillight, Vec3::new(-0.6, 0.6, 2.11)),
    ]
}

/// Bicycle with rider, facing -Z.
pub fn bike_blueprint() -> Blueprint {
    use PartPaint::*;
    use PartShape::*;

    // Torus rings lie flat in XZ; stand them up in the YZ plane.
    let upright = Quat::from_rotation_z(FRAC_PI_2);

    smallvec![
        Part::new(FrameBar, Frame, Vec3::new(0.0, 0.6, 0.0)),
        Part::new(Handlebar, Frame, Vec3::new(0.0, 1.0, -0.4)),
        Part::new(BikeWheel, Tyre, Vec3::new(0.0, 0.35, 0.6)).rotated(upright),
        Part::new(BikeWheel, Tyre, Vec3::new(0.0, 0.35, -0.6)).rotated(upright),
        Part::new(Torso, Shirt, Vec3::new(0.0, 1.1, 0.0)).with_shadow(),
        Part::new(Head, Skin, Vec3::new(0.0, 1.55, 0.0)),
    ]
}

/// Shared meshes and fixed materials for vehicle models.
#[derive(Resource)]
pub struct VehicleModels {
    pub chassis: Handle<Mesh>,
    pub cabin: Handle<Mesh>,
    pub car_wheel: Handle<Mesh>,
    pub lamp: Handle<Mesh>,
    pub frame_bar: Handle<Mesh>,
    pub handlebar: Handle<Mesh>,
    pub bike_wheel: Handle<Mesh>,
    pub torso: Handle<Mesh>,
    pub head: Handle<Mesh>,

    pub cabin_material: Handle<StandardMaterial>,
    pub tyre_material: Handle<StandardMaterial>,
    pub headlight_material: Handle<StandardMaterial>,
    pub taillight_material: Handle<StandardMaterial>,
    pub frame_material: Handle<StandardMaterial>,
    pub shirt_material: Handle<StandardMaterial>,
    pub skin_material: Handle<StandardMaterial>,
}

impl VehicleModels {
    pub fn mesh(&self, shape: PartShape) -> Handle<Mesh> {
        match shape {
            PartShape::Chassis => self.chassis.clone(),
            PartShape::Cabin => self.cabin.clone(),
            PartShape::CarWheel => self.car_wheel.clone(),
            PartShape::Lamp => self.lamp.clone(),
            PartShape::FrameBar => self.frame_bar.clone(),
            PartShape::Handlebar => self.handlebar.clone(),
            PartShape::BikeWheel => self.bike_wheel.clone(),
            PartShape::Torso => self.torso.clone(),
            PartShape::Head => self.head.clone(),
        }
    }

    pub fn material(
        &self,
        paint: PartPaint,
        body: &Handle<StandardMaterial>,
    ) -> Handle<StandardMaterial> {
        match paint {
            PartPaint::Body => body.clone(),
            PartPaint::Cabin => self.cabin_material.clone(),
            PartPaint::Tyre => self.tyre_material.clone(),
            PartPaint::Headlight => self.headlight_material.clone(),
            PartPaint::Taillight => self.taillight_material.clone(),
            PartPaint::Frame => self.frame_material.clone(),
            PartPaint::Shirt => self.shirt_material.clone(),
            PartPaint::Skin => self.skin_material.clone(),
        }
    }

    /// Spawns `blueprint` under a new root entity carrying `root`.
    ///
    /// `root` must include the model's `Transform` and must not include a
    /// `Visibility`; the root gets one so the parts can be hidden together.
    pub fn spawn(
        &self,
        commands: &mut Commands,
        blueprint: &[Part],
        body: &Handle<StandardMaterial>,
        root: impl Bundle,
    ) -> Entity {
        commands
            .spawn((root, Visibility::default()))
            .with_children(|parent| {
                for part in blueprint {
                    let mut child = parent.spawn((
                        Mesh3d(self.mesh(part.shape)),
                        MeshMaterial3d(self.material(part.paint, body)),
                        Transform::from_translation(part.translation).with_rotation(part.rotation),
                    ));
                    if !part.casts_shadow {
                        child.insert(NotShadowCaster);
                    }
                }
            })
            .id()
    }

    /// Body paint for a fleet of cars.
    pub fn body_material(
        materials: &mut Assets<StandardMaterial>,
        color: Color,
    ) -> Handle<StandardMaterial> {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.45,
            metallic: 0.3,
            ..default()
        })
    }
}

/// Builds the shared [`VehicleModels`] resource.
pub fn setup_vehicle_models(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let matte = |materials: &mut Assets<StandardMaterial>, color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        })
    };
    let glowing = |materials: &mut Assets<StandardMaterial>, color: Color| {
        materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        })
    };

    let models = VehicleModels {
        chassis: meshes.add(Cuboid::new(2.0, 0.6, 4.2)),
        cabin: meshes.add(Cuboid::new(1.8, 0.5, 2.2)),
        car_wheel: meshes.add(Cylinder::new(0.35, 0.2)),
        lamp: meshes.add(Cuboid::new(0.4, 0.2, 0.1)),
        frame_bar: meshes.add(Cuboid::new(0.1, 0.1, 1.2)),
        handlebar: meshes.add(Cuboid::new(0.8, 0.1, 0.1)),
        // Ring radius 0.35, tube radius 0.05
        bike_wheel: meshes.add(Torus::new(0.3, 0.4)),
        torso: meshes.add(Cuboid::new(0.4, 0.7, 0.2)),
        head: meshes.add(Cuboid::new(0.25, 0.25, 0.25)),

        cabin_material: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x22, 0x22, 0x22),
            perceptual_roughness: 0.2,
            ..default()
        }),
        tyre_material: matte(&mut materials, Color::srgb_u8(0x11, 0x11, 0x11)),
        headlight_material: glowing(&mut materials, Color::srgb_u8(0xff, 0xff, 0xcc)),
        taillight_material: glowing(&mut materials, Color::srgb_u8(0xff, 0x00, 0x00)),
        frame_material: matte(&mut materials, Color::srgb_u8(0x33, 0xff, 0x33)),
        shirt_material: matte(&mut materials, Color::WHITE),
        skin_material: matte(&mut materials, Color::srgb_u8(0xff, 0xcc, 0xaa)),
    };

    commands.insert_resource(models);
    debug!("Vehicle models ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(blueprint: &[Part], shape: PartShape) -> usize {
        blueprint.iter().filter(|p| p.shape == shape).count()
    }

    #[test]
    fn test_car_blueprint_parts() {
        let car = car_blueprint();
        assert_eq!(car.len(), 10);
        assert_eq!(count(&car, PartShape::Chassis), 1);
        assert_eq!(count(&car, PartShape::Cabin), 1);
        assert_eq!(count(&car, PartShape::CarWheel), 4);
        assert_eq!(count(&car, PartShape::Lamp), 4);

        // Headlights at the front (-Z), taillights at the back.
        for part in car.iter().filter(|p| p.shape == PartShape::Lamp) {
            match part.paint {
                PartPaint::Headlight => assert!(part.translation.z < 0.0),
                PartPaint::Taillight => assert!(part.translation.z > 0.0),
                other => panic!("unexpected lamp paint {other:?}"),
            }
        }

        // Only the chassis is painted in the caller's colour.
        assert_eq!(car.iter().filter(|p| p.paint == PartPaint::Body).count(), 1);
    }

    #[test]
    fn test_car_wheels_sit_on_the_ground() {
        for wheel in car_blueprint().iter().filter(|p| p.shape == PartShape::CarWheel) {
            // Wheel radius 0.35 touching y = 0
            assert!((wheel.translation.y - 0.35).abs() < 1e-6);
            // Axle points along X after rotation
            let axle = wheel.rotation * Vec3::Y;
            assert!(axle.x.abs() > 0.99);
        }
    }

    #[test]
    fn test_bike_blueprint_parts() {
        let bike = bike_blueprint();
        assert_eq!(bike.len(), 6);
        assert_eq!(count(&bike, PartShape::BikeWheel), 2);
        assert_eq!(count(&bike, PartShape::Torso), 1);
        assert_eq!(count(&bike, PartShape::Head), 1);
        assert!(bike.iter().all(|p| p.paint != PartPaint::Body));

        // Wheels roll along Z: the ring's normal points along X.
        for wheel in bike.iter().filter(|p| p.shape == PartShape::BikeWheel) {
            let normal = wheel.rotation * Vec3::Y;
            assert!(normal.x.abs() > 0.99);
        }
    }

    #[test]
    fn test_blueprints_fit_inline() {
        assert!(!car_blueprint().spilled());
        assert!(!bike_blueprint().spilled());
    }
}
