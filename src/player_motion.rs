//! Player locomotion, look and camera-mode rules.
//!
//! One frame is three phases in a fixed order: movement reads the grounded
//! flag left by the previous frame's move and the body basis from before this
//! frame's look, then look updates yaw/pitch, then the camera toggle runs.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, downward_gravity, non_negative};

/// Vertical velocity held while standing so the next move keeps touching the floor.
pub const GROUNDED_VELOCITY: f32 = -2.0;

/// Pitch limit, in degrees, either side of the horizon.
pub const PITCH_LIMIT: f32 = 90.0;

#[derive(Component, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    pub sprint_speed: f32,
    /// Target jump height.
    pub jump_force: f32,
    pub gravity: f32,
    /// Degrees of rotation per unit of mouse axis.
    pub mouse_sensitivity: f32,
    pub third_person_distance: f32,
    pub third_person_height: f32,
    /// Eye height of the first-person rig above the body origin.
    pub first_person_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_speed: 8.0,
            jump_force: 5.0,
            gravity: -9.81,
            mouse_sensitivity: 2.0,
            third_person_distance: 5.0,
            third_person_height: 2.0,
            first_person_height: 0.6,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("move_speed", self.move_speed)?;
        non_negative("sprint_speed", self.sprint_speed)?;
        non_negative("jump_force", self.jump_force)?;
        non_negative("mouse_sensitivity", self.mouse_sensitivity)?;
        non_negative("third_person_distance", self.third_person_distance)?;
        downward_gravity(self.gravity)
    }
}

/// Input sampled for a single frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// `x` is strafe (right positive), `y` is forward.
    pub move_axis: Vec2,
    pub sprint: bool,
    /// Jump pressed this frame.
    pub jump: bool,
    /// Mouse movement in axis units, up and right positive.
    pub look_delta: Vec2,
    /// Camera toggle pressed this frame.
    pub toggle_camera: bool,
}

#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub vertical_velocity: f32,
    /// Degrees, unbounded.
    pub yaw: f32,
    /// Degrees, within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub pitch: f32,
    pub first_person: bool,
    /// Set by the movement primitive after each move.
    pub grounded: bool,
}

/// Launch speed that peaks at `jump_force` under constant `gravity`.
pub fn jump_velocity(jump_force: f32, gravity: f32) -> f32 {
    (jump_force * -2.0 * gravity).sqrt()
}

impl PlayerState {
    /// Returns the combined horizontal and vertical displacement for this frame.
    pub fn step_movement(
        &mut self,
        config: &PlayerConfig,
        input: &PlayerInput,
        right: Vec3,
        forward: Vec3,
        dt: f32,
    ) -> Vec3 {
        if self.grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = GROUNDED_VELOCITY;
        }

        let wish = right * input.move_axis.x + forward * input.move_axis.y;
        let speed = if input.sprint {
            config.sprint_speed
        } else {
            config.move_speed
        };

        if input.jump && self.grounded {
            self.vertical_velocity = jump_velocity(config.jump_force, config.gravity);
        }
        self.vertical_velocity += config.gravity * dt;

        wish * speed * dt + Vec3::Y * self.vertical_velocity * dt
    }

    pub fn step_look(&mut self, config: &PlayerConfig, look_delta: Vec2) {
        let delta = look_delta * config.mouse_sensitivity;
        self.yaw += delta.x;
        self.pitch = (self.pitch - delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Flips between first and third person. Returns whether it flipped.
    pub fn step_camera(&mut self, toggle: bool) -> bool {
        if toggle {
            self.first_person = !self.first_person;
        }
        toggle
    }

    /// Body rotation about the vertical axis; positive yaw turns right.
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(-self.yaw.to_radians())
    }

    /// Local camera rotation; positive pitch looks down.
    pub fn camera_pitch_rotation(&self) -> Quat {
        Quat::from_rotation_x(-self.pitch.to_radians())
    }
}
