//! Chase/idle behaviour for enemies.
//!
//! The rules here do not touch the ECS: [`EnemyAgent::step`] takes the
//! enemy transform, the target position, a [`GroundProbe`] and the frame
//! delta, so it can be driven by [`crate::EnemyPlugin`] or directly from tests.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, downward_gravity, non_negative};

/// Tunables for an enemy. Defaults match the authored prototype values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Start chasing when the target is closer than this.
    pub detection_range: f32,
    /// Stop chasing when the target is further than this. Must not be
    /// smaller than `detection_range`.
    pub stop_range: f32,
    pub move_speed: f32,
    /// Stop advancing once this close to the target.
    pub stop_distance: f32,
    pub gravity: f32,
    /// Length of the downward ground ray.
    pub ground_probe_length: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            detection_range: 15.0,
            stop_range: 20.0,
            move_speed: 4.0,
            stop_distance: 1.0,
            gravity: -9.81,
            ground_probe_length: 0.6,
        }
    }
}

impl EnemyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("detection_range", self.detection_range)?;
        non_negative("stop_range", self.stop_range)?;
        non_negative("move_speed", self.move_speed)?;
        non_negative("stop_distance", self.stop_distance)?;
        non_negative("ground_probe_length", self.ground_probe_length)?;
        downward_gravity(self.gravity)?;
        if self.stop_range < self.detection_range {
            return Err(ConfigError::InvertedRanges {
                detection_range: self.detection_range,
                stop_range: self.stop_range,
            });
        }
        Ok(())
    }
}

/// Answers whether there is floor within `max_distance` below `origin`.
pub trait GroundProbe {
    fn is_grounded(&self, origin: Vec3, max_distance: f32) -> bool;
}

impl<F> GroundProbe for F
where
    F: Fn(Vec3, f32) -> bool,
{
    fn is_grounded(&self, origin: Vec3, max_distance: f32) -> bool {
        self(origin, max_distance)
    }
}

/// What happened during one [`EnemyAgent::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStep {
    pub distance: f32,
    pub chasing: bool,
    pub grounded: bool,
    pub mode_changed: bool,
}

#[derive(Component, Clone, Debug)]
pub struct EnemyAgent {
    config: EnemyConfig,
    chasing: bool,
    vertical_velocity: f32,
}

impl EnemyAgent {
    pub fn new(config: EnemyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            chasing: false,
            vertical_velocity: 0.0,
        })
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Hysteresis switch between chasing and idling.
    ///
    /// Between `detection_range` and `stop_range` (inclusive) the previous
    /// mode is kept.
    pub fn observe(&mut self, distance: f32) -> bool {
        if distance < self.config.detection_range {
            self.chasing = true;
        } else if distance > self.config.stop_range {
            self.chasing = false;
        }
        self.chasing
    }

    /// Advances the agent by one frame.
    pub fn step(
        &mut self,
        transform: &mut Transform,
        target: Vec3,
        probe: &impl GroundProbe,
        dt: f32,
    ) -> EnemyStep {
        let distance = transform.translation.distance(target);
        let was_chasing = self.chasing;
        let chasing = self.observe(distance);

        if chasing {
            self.chase(transform, target, distance, dt);
        }

        let grounded = self.apply_gravity(transform, probe, dt);

        EnemyStep {
            distance,
            chasing,
            grounded,
            mode_changed: was_chasing != chasing,
        }
    }

    fn chase(&self, transform: &mut Transform, target: Vec3, distance: f32, dt: f32) {
        let offset = target - transform.translation;
        let direction = Vec3::new(offset.x, 0.0, offset.z).normalize_or_zero();
        if direction == Vec3::ZERO {
            return;
        }

        transform.rotation = facing_rotation(direction);

        // Not clamped to the stop distance, so a large step can overshoot.
        if distance > self.config.stop_distance {
            transform.translation += direction * self.config.move_speed * dt;
        }
    }

    fn apply_gravity(
        &mut self,
        transform: &mut Transform,
        probe: &impl GroundProbe,
        dt: f32,
    ) -> bool {
        let grounded = probe.is_grounded(transform.translation, self.config.ground_probe_length);
        if grounded {
            self.vertical_velocity = 0.0;
        } else {
            self.vertical_velocity += self.config.gravity * dt;
        }
        transform.translation.y += self.vertical_velocity * dt;
        grounded
    }
}

/// Yaw-only rotation that points the local forward axis (-Z) along `direction`.
pub fn facing_rotation(direction: Vec3) -> Quat {
    Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z))
}
