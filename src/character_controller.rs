use std::f32::consts::TAU;

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::camera_rig::*;
use crate::error::ConfigError;
use crate::input_plugin::PlayerKeys;
use crate::kinematics::KinematicMover;
use crate::player_motion::{PlayerConfig, PlayerInput, PlayerState};

/// Name the enemy target lookup falls back to when nothing carries [`Player`].
pub const PLAYER_NAME: &str = "Player";

/// Moves players, turns them, and drives their camera rigs. Runs in `Update`.
///
/// Input is sampled earlier, in `PreUpdate`, by [`crate::InputPlugin`]. To run
/// after the controller, order against [`PlayerControllerSet`]:
///
/// ```
/// # use bevy::prelude::*;
/// # use pursuit::PlayerControllerSet;
/// fn my_system() {}
///
/// App::new().add_systems(Update, my_system.after(PlayerControllerSet));
/// ```
pub struct PlayerControllerPlugin;

#[derive(SystemSet, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerControllerSet;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                player_move,
                player_look,
                apply_rig_pitch,
                switch_camera_mode,
                activate_camera_rigs,
                sync_camera_rigs,
            )
                .chain()
                .in_set(PlayerControllerSet),
        );
    }
}

/// Tag for the player entity.
#[derive(Component, Default)]
pub struct Player;

/// Spawns a player at `transform` together with its two camera rigs.
pub fn spawn_player(
    commands: &mut Commands,
    config: PlayerConfig,
    transform: Transform,
) -> Result<Entity, ConfigError> {
    config.validate()?;
    let state = PlayerState::default();
    let first_person = state.first_person;

    let player = commands
        .spawn((
            Name::new(PLAYER_NAME),
            Player,
            config,
            state,
            PlayerInput::default(),
            PlayerKeys::default(),
            KinematicMover::default(),
            RigidBody::Kinematic,
            Collider::capsule(0.5, 1.0),
            transform,
        ))
        .id();

    for kind in [RigKind::FirstPerson, RigKind::ThirdPerson] {
        let rig = CameraRig::new(player, kind, first_person);
        commands.spawn((
            Name::new(format!("{kind:?} camera")),
            Camera3d::default(),
            Camera {
                is_active: rig.active,
                ..default()
            },
            Projection::Perspective(PerspectiveProjection {
                fov: TAU / 5.0,
                ..default()
            }),
            rig,
            transform,
        ));
    }

    Ok(player)
}

pub fn player_move(
    time: Res<Time>,
    spatial_query: SpatialQuery,
    mut players: Query<
        (
            Entity,
            &PlayerConfig,
            &PlayerInput,
            &mut PlayerState,
            &KinematicMover,
            &Collider,
            &mut Transform,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();

    for (entity, config, input, mut state, mover, collider, mut transform) in &mut players {
        let displacement = state.step_movement(
            config,
            input,
            transform.right().as_vec3(),
            transform.forward().as_vec3(),
            dt,
        );

        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);
        let resolution = mover.resolve(
            &spatial_query,
            collider,
            transform.translation,
            transform.rotation,
            displacement,
            &filter,
        );

        if resolution.grounded != state.grounded {
            debug!(
                "player {entity} {}",
                if resolution.grounded { "landed" } else { "left the ground" }
            );
        }
        transform.translation = resolution.translation;
        state.grounded = resolution.grounded;
    }
}

pub fn player_look(
    mut players: Query<
        (&PlayerConfig, &PlayerInput, &mut PlayerState, &mut Transform),
        With<Player>,
    >,
) {
    for (config, input, mut state, mut transform) in &mut players {
        state.step_look(config, input.look_delta);
        transform.rotation = state.body_rotation();
    }
}
