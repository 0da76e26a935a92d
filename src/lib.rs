mod camera_rig;
mod character_controller;
mod config;
mod enemy_ai;
mod enemy_plugin;
mod error;
mod input_plugin;
mod kinematics;
mod player_motion;
#[cfg(test)]
mod test_support;

pub use camera_rig::*;
pub use character_controller::*;
pub use config::*;
pub use enemy_ai::*;
pub use enemy_plugin::*;
pub use error::{ConfigError, TargetError};
pub use input_plugin::*;
pub use kinematics::*;
pub use player_motion::*;
