use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::math::primitives::{Cuboid, Sphere};

use crate::simulation::engine::StepEngine;

/// Bevy resource wrapping the engine. The viewer steps it once per frame.
#[derive(Resource)]
struct FlockEngine(StepEngine);

/// Set by the keyboard system; once true no further steps run
#[derive(Resource, Default)]
struct StopSignal(bool);

/// Component tagging each sphere with its boid index
#[derive(Component)]
struct BoidIndex(pub usize);

/// World-space → screen-space scaling factor for positions
const SCALE3D: f32 = 10.0;

/// Boid sphere radius in screen units
const BOID_RADIUS: f32 = 3.0;

/// Camera distance from the look-at point along +Z
const CAMERA_DISTANCE: f32 = 1500.0;

/// Open a window and animate the flock; `q` or `Escape` stops stepping and exits
pub fn run_3d(engine: StepEngine) {
    info!("run_3d: starting Bevy 3D viewer with {} boids", engine.flock().agent_count());

    App::new()
        .insert_resource(FlockEngine(engine))
        .init_resource::<StopSignal>()
        // the binary already installed a tracing subscriber
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_3d)
        .add_systems(Update, (poll_keyboard, step_flock, sync_transforms_3d).chain())
        .run();
}

/// Startup system: camera, axes, one sphere per boid
fn setup_3d(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    engine: Res<FlockEngine>,
) {
    // Look at the midpoint between the two homing targets
    let focus = Vec3::splat(50.0 * SCALE3D);
    commands.spawn(Camera3dBundle {
        camera: Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(0.0, 0.0, 0.0)),
            ..Default::default()
        },
        transform: Transform::from_translation(focus + Vec3::new(200.0, 150.0, CAMERA_DISTANCE))
            .looking_at(focus, Vec3::Y),
        ..Default::default()
    });

    spawn_axes(&mut commands, &mut meshes, &mut materials);

    let mesh = meshes.add(Sphere::new(BOID_RADIUS).mesh());
    for (i, b) in engine.0.flock().boids().iter().enumerate() {
        commands.spawn((
            PbrBundle {
                mesh: mesh.clone(),
                material: materials.add(StandardMaterial {
                    base_color: Color::srgb(1.0, 1.0, 1.0),
                    unlit: true,
                    ..Default::default()
                }),
                transform: Transform::from_xyz(
                    (b.x.x as f32) * SCALE3D,
                    (b.x.y as f32) * SCALE3D,
                    (b.x.z as f32) * SCALE3D,
                ),
                ..Default::default()
            },
            BoidIndex(i),
        ));
    }
}

fn poll_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    mut stop: ResMut<StopSignal>,
    mut exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::KeyQ) || keys.just_pressed(KeyCode::Escape) {
        stop.0 = true;
        exit.send(AppExit::Success);
    }
}

/// One engine step per frame unless the stop signal is set
fn step_flock(mut engine: ResMut<FlockEngine>, stop: Res<StopSignal>) {
    if !stop.0 {
        engine.0.step();
    }
}

fn sync_transforms_3d(
    engine: Res<FlockEngine>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(&BoidIndex, &mut Transform, &Handle<StandardMaterial>)>,
) {
    let boids = engine.0.flock().boids();

    let max_speed = boids.iter().map(|b| b.v.norm() as f32).fold(0.0_f32, f32::max);

    for (BoidIndex(i), mut transform, mat_handle) in &mut query {
        if let Some(b) = boids.get(*i) {
            transform.translation = Vec3::new(
                (b.x.x as f32) * SCALE3D,
                (b.x.y as f32) * SCALE3D,
                (b.x.z as f32) * SCALE3D,
            );

            if let Some(mat) = materials.get_mut(mat_handle) {
                mat.base_color = speed_to_color(b.v.norm() as f32, max_speed);
            }
        }
    }
}

/// Blue (slow) to red (fast)
fn speed_to_color(speed: f32, max_speed: f32) -> Color {
    if max_speed <= 0.0 {
        return Color::srgb(1.0, 1.0, 1.0);
    }
    let t = (speed / max_speed).clamp(0.0, 1.0);
    Color::srgb(t, 0.0, 1.0 - t)
}

fn spawn_axes(commands: &mut Commands, meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) {
    let axis_len = 100.0 * SCALE3D;
    let axis_thickness = 0.1 * SCALE3D;
    let half = axis_len / 2.0;

    // X red, Y green, Z blue; each starts at the origin and covers [0, 100]
    let axes = [
        (Cuboid::new(axis_len, axis_thickness, axis_thickness), Vec3::new(half, 0.0, 0.0), Color::srgb(1.0, 0.0, 0.0)),
        (Cuboid::new(axis_thickness, axis_len, axis_thickness), Vec3::new(0.0, half, 0.0), Color::srgb(0.0, 1.0, 0.0)),
        (Cuboid::new(axis_thickness, axis_thickness, axis_len), Vec3::new(0.0, 0.0, half), Color::srgb(0.0, 0.0, 1.0)),
    ];

    for (cuboid, center, color) in axes {
        commands.spawn(PbrBundle {
            mesh: meshes.add(cuboid.mesh()),
            material: materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..Default::default()
            }),
            transform: Transform::from_translation(center),
            ..Default::default()
        });
    }
}
