//! Demo scene: one player with first/third-person rigs and a pair of enemies.
//!
//! WASD / arrows move, Shift sprints, Space jumps, T swaps cameras, Escape
//! frees the cursor and a left click grabs it again.

use std::path::PathBuf;
use std::process::ExitCode;

use avian3d::prelude::*;
use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy_framepace::{FramepacePlugin, FramepaceSettings, Limiter};
use clap::Parser;
use iyes_perf_ui::prelude::*;

use pursuit::*;

#[derive(Parser, Debug)]
#[command(about = "Chase prototype with a first/third-person player controller")]
struct Args {
    /// JSON file overriding the default player and enemy tunables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
    /// Show frame time and physics diagnostics.
    #[arg(long)]
    perf_ui: bool,
    /// Frame rate cap.
    #[arg(long, default_value_t = 96.0)]
    frame_limit: f64,
}

/// Closest the demo enemies get to the player. Their sphere touches the
/// player's capsule at a centre distance of about 1.12.
const DEMO_STOP_DISTANCE: f32 = 1.5;

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };

    // Plugins first so that config errors go through the logger.
    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins
            .set(LogPlugin {
                level,
                filter: "wgpu=error,naga=warn".to_string(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "pursuit".into(),
                    ..default()
                }),
                ..default()
            }),
        PhysicsPlugins::default(),
        FramepacePlugin,
        InputPlugin,
        PlayerControllerPlugin,
        EnemyPlugin,
    ));

    let mut config = match &args.config {
        Some(path) => match GameConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{err}");
                if let Some(source) = std::error::Error::source(&err) {
                    error!("caused by: {source}");
                }
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };
    config.enemy = demo_enemy_config(&config.enemy);

    app.insert_resource(FramepaceSettings {
        limiter: Limiter::from_framerate(args.frame_limit),
    })
    .insert_resource(config)
    .add_systems(Startup, setup);

    if args.perf_ui {
        app.add_plugins((
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin,
            SystemInformationDiagnosticsPlugin,
            PerfUiPlugin,
            PhysicsDiagnosticsPlugin,
            PhysicsDiagnosticsUiPlugin,
        ))
        .add_systems(Startup, spawn_perf_ui);
    }

    app.run();
    ExitCode::SUCCESS
}

/// Keeps the demo enemies far enough out that they hold position instead of
/// pushing into the player.
fn demo_enemy_config(config: &EnemyConfig) -> EnemyConfig {
    if config.stop_distance >= DEMO_STOP_DISTANCE {
        return config.clone();
    }
    info!(
        "raising enemy stop_distance from {} to {DEMO_STOP_DISTANCE} for the demo colliders",
        config.stop_distance
    );
    EnemyConfig {
        stop_distance: DEMO_STOP_DISTANCE,
        ..config.clone()
    }
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiDefaultEntries::default());
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<GameConfig>,
    mut exit: EventWriter<AppExit>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 7.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // floor
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(100.0, 1.0, 100.0),
        Mesh3d(meshes.add(Cuboid::new(100.0, 1.0, 100.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    // A few crates to walk into
    for (x, z) in [(4.0, -6.0), (-5.0, 3.0), (8.0, 8.0)] {
        commands.spawn((
            RigidBody::Static,
            Collider::cuboid(1.5, 1.5, 1.5),
            Mesh3d(meshes.add(Cuboid::new(1.5, 1.5, 1.5))),
            MeshMaterial3d(materials.add(Color::srgb(0.5, 0.4, 0.3))),
            Transform::from_xyz(x, 0.75, z),
        ));
    }

    let player = match spawn_player(
        &mut commands,
        config.player.clone(),
        Transform::from_xyz(0.0, 1.1, 0.0),
    ) {
        Ok(player) => player,
        Err(err) => {
            error!("cannot spawn player: {err}");
            exit.write(AppExit::error());
            return;
        }
    };
    commands.entity(player).insert((
        Mesh3d(meshes.add(Capsule3d::new(0.5, 1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.5, 0.9))),
    ));

    let enemy_mesh = meshes.add(Sphere::new(0.5));
    let enemy_material = materials.add(Color::srgb(0.8, 0.2, 0.2));

    // Target handed over at construction.
    match spawn_enemy(
        &mut commands,
        config.enemy.clone(),
        Transform::from_xyz(12.0, 3.0, -12.0),
        player,
    ) {
        Ok(enemy) => {
            commands.entity(enemy).insert((
                Mesh3d(enemy_mesh.clone()),
                MeshMaterial3d(enemy_material.clone()),
                Selected,
            ));
        }
        Err(err) => {
            error!("cannot spawn enemy: {err}");
            exit.write(AppExit::error());
            return;
        }
    }

    // Placed without a target; picks up the player by tag on its first frame.
    if let Ok(agent) = EnemyAgent::new(config.enemy.clone()) {
        commands.spawn((
            Name::new("Enemy"),
            agent,
            RigidBody::Dynamic,
            Collider::sphere(0.5),
            Mesh3d(enemy_mesh),
            MeshMaterial3d(enemy_material),
            Transform::from_xyz(-18.0, 1.0, 10.0),
        ));
    }

    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 50.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 15.0, 0.0),
    ));

    info!("scene ready");
}
