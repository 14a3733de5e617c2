//! Demo scene: camera, lights, obstacles and one fractal seed.

use avian3d::prelude::{Collider, RigidBody};
use bevy::prelude::*;
use fractal_bevy::FractalSeed;

/// Where the fractal grows from.
pub const SEED: Vec3 = Vec3::new(0.0, 1.5, 0.0);

/// Spawn the static scene and the fractal seed.
pub fn setup_scene(
  mut commands: Commands,
  mut meshes: ResMut<Assets<Mesh>>,
  mut materials: ResMut<Assets<StandardMaterial>>,
) {
  commands.insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)));

  commands.spawn((
    Name::new("MainCamera"),
    Camera3d::default(),
    Transform::from_xyz(3.5, 3.0, 4.5).looking_at(SEED, Vec3::Y),
  ));

  commands.spawn((
    Name::new("Sun"),
    DirectionalLight {
      illuminance: 8_000.0,
      shadows_enabled: true,
      ..default()
    },
    Transform::from_xyz(4.0, 8.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
  ));
  commands.spawn((
    Name::new("Fill"),
    PointLight {
      intensity: 400_000.0,
      range: 30.0,
      ..default()
    },
    Transform::from_xyz(-4.0, 4.0, -2.0),
  ));

  let obstacle = materials.add(StandardMaterial {
    base_color: Color::srgb(0.3, 0.32, 0.36),
    perceptual_roughness: 0.9,
    ..default()
  });

  // Top face at y = 0.2: the deepest -Y cube would sit in it.
  let ground = Vec3::new(20.0, 0.4, 20.0);
  commands.spawn((
    Name::new("Ground"),
    RigidBody::Static,
    Collider::cuboid(ground.x, ground.y, ground.z),
    Mesh3d(meshes.add(Cuboid::from_size(ground))),
    MeshMaterial3d(obstacle.clone()),
    Transform::default(),
  ));

  // Clips the +X tip while the container is near its start orientation.
  let pillar = Vec3::new(0.2, 3.0, 0.2);
  commands.spawn((
    Name::new("Pillar"),
    RigidBody::Static,
    Collider::cuboid(pillar.x, pillar.y, pillar.z),
    Mesh3d(meshes.add(Cuboid::from_size(pillar))),
    MeshMaterial3d(obstacle),
    Transform::from_xyz(1.45, 1.5, 0.0),
  ));

  commands.spawn((
    Name::new("FractalSeed"),
    FractalSeed::default(),
    Transform::from_translation(SEED),
  ));

  info!("[Scene] Fractal seed at {SEED}");
}
