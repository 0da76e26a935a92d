//! Headless physics worlds for tests.

#![cfg(test)]

use std::time::Duration;

use avian3d::prelude::*;
use bevy::prelude::*;
use bevy::app::PluginsState;
use bevy::time::TimeUpdateStrategy;

/// App with avian running on a fixed 1/60 s clock and no window or renderer.
pub fn physics_app() -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        TransformPlugin,
        bevy::asset::AssetPlugin::default(),
        bevy::scene::ScenePlugin,
        PhysicsPlugins::default(),
    ))
    .init_resource::<Assets<Mesh>>()
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        1.0 / 60.0,
    )));
    app
}

/// Runs enough frames for new colliders to reach the spatial query pipeline.
pub fn settle(app: &mut App) {
    // `app.update()` alone skips plugin `finish`/`cleanup`, which `App::run` would call.
    if app.plugins_state() != PluginsState::Cleaned {
        app.finish();
        app.cleanup();
    }
    for _ in 0..5 {
        app.update();
    }
}

/// Static box whose top face is at `y = 0`.
pub fn spawn_floor(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            RigidBody::Static,
            Collider::cuboid(40.0, 1.0, 40.0),
            Transform::from_xyz(0.0, -0.5, 0.0),
        ))
        .id()
}

/// Static box of the given `size` centred at `transform`.
pub fn spawn_block(app: &mut App, size: Vec3, transform: Transform) -> Entity {
    app.world_mut()
        .spawn((
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            transform,
        ))
        .id()
}
