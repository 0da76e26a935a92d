use avian3d::prelude::*;
use bevy::color::palettes::css::{BLUE, RED, YELLOW};
use bevy::gizmos::config::GizmoConfigStore;
use bevy::math::Isometry3d;
use bevy::prelude::*;

use crate::enemy_ai::{EnemyAgent, EnemyConfig};
use crate::error::{ConfigError, TargetError};
use crate::kinematics::RayGroundProbe;
use crate::{PLAYER_NAME, Player, PlayerControllerSet};

/// Drives every [`EnemyAgent`] once per frame in `Update`, after the player
/// has moved.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                (configure_enemy_bodies, resolve_chase_targets, enemy_chase)
                    .chain()
                    .after(PlayerControllerSet),
                draw_enemy_gizmos.run_if(resource_exists::<GizmoConfigStore>),
            ),
        );
    }
}

/// The entity an enemy chases.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaseTarget(pub Entity);

/// Marks an entity as selected for debug drawing.
#[derive(Component, Default)]
pub struct Selected;

/// Spawns an enemy that chases `target`.
///
/// The config is validated before anything is spawned.
pub fn spawn_enemy(
    commands: &mut Commands,
    config: EnemyConfig,
    transform: Transform,
    target: Entity,
) -> Result<Entity, ConfigError> {
    let agent = EnemyAgent::new(config)?;
    let entity = commands
        .spawn((
            Name::new("Enemy"),
            agent,
            transform,
            ChaseTarget(target),
            RigidBody::Dynamic,
            Collider::sphere(0.5),
        ))
        .id();
    debug!("spawned enemy {entity} chasing {target}");
    Ok(entity)
}

/// Picks the chase target: the first tagged [`Player`], otherwise the first
/// entity named [`PLAYER_NAME`].
pub fn resolve_target<'a>(
    mut tagged: impl Iterator<Item = Entity>,
    mut named: impl Iterator<Item = (Entity, &'a Name)>,
) -> Result<Entity, TargetError> {
    tagged
        .next()
        .or_else(|| {
            named
                .find(|(_, name)| name.as_str() == PLAYER_NAME)
                .map(|(entity, _)| entity)
        })
        .ok_or(TargetError::NotFound { name: PLAYER_NAME })
}

/// Gives enemies spawned without a [`ChaseTarget`] one, once, when they appear.
///
/// Enemies that cannot be resolved stay without a target and are skipped by
/// [`enemy_chase`].
pub fn resolve_chase_targets(
    mut commands: Commands,
    enemies: Query<Entity, (Added<EnemyAgent>, Without<ChaseTarget>)>,
    tagged: Query<Entity, With<Player>>,
    named: Query<(Entity, &Name)>,
) {
    if enemies.is_empty() {
        return;
    }

    match resolve_target(tagged.iter(), named.iter()) {
        Ok(target) => {
            for enemy in &enemies {
                info!("enemy {enemy} resolved chase target {target}");
                commands.entity(enemy).insert(ChaseTarget(target));
            }
        }
        Err(err) => {
            for enemy in &enemies {
                error!("enemy {enemy} has no chase target: {err}");
            }
        }
    }
}

/// Scripted bodies: no engine gravity and no rotation from contacts.
pub fn configure_enemy_bodies(
    mut commands: Commands,
    enemies: Query<Entity, Added<EnemyAgent>>,
) {
    for enemy in &enemies {
        commands
            .entity(enemy)
            .insert((GravityScale(0.0), LockedAxes::ROTATION_LOCKED));
    }
}

pub fn enemy_chase(
    time: Res<Time>,
    spatial_query: SpatialQuery,
    mut enemies: Query<(Entity, &mut EnemyAgent, &ChaseTarget, &mut Transform)>,
    targets: Query<&Transform, Without<EnemyAgent>>,
) {
    let dt = time.delta_secs();

    for (entity, mut agent, target, mut transform) in &mut enemies {
        let Ok(target_transform) = targets.get(target.0) else {
            continue;
        };

        let probe = RayGroundProbe::new(&spatial_query, entity);
        let step = agent.step(&mut transform, target_transform.translation, &probe, dt);

        if step.mode_changed {
            debug!(
                "enemy {entity} {} at distance {:.2}",
                if step.chasing { "started chasing" } else { "gave up" },
                step.distance
            );
        }
    }
}

pub fn draw_enemy_gizmos(
    mut gizmos: Gizmos,
    enemies: Query<(&EnemyAgent, &Transform), With<Selected>>,
) {
    for (agent, transform) in &enemies {
        let config = agent.config();
        let origin = transform.translation;
        gizmos.sphere(Isometry3d::from_translation(origin), config.detection_range, BLUE);
        gizmos.sphere(Isometry3d::from_translation(origin), config.stop_range, RED);
        gizmos.line(
            origin,
            origin + Vec3::NEG_Y * config.ground_probe_length,
            YELLOW,
        );
    }
}
