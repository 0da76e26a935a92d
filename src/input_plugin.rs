use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::player_motion::PlayerInput;

/// Mouse pixels to look-axis units.
pub const MOUSE_AXIS_SCALE: f32 = 0.1;

/// Samples keyboard and mouse into each player's [`PlayerInput`] in `PreUpdate`,
/// after bevy's own input processing.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        use bevy::input::{keyboard, mouse};

        app.add_systems(
            PreUpdate,
            player_input
                .after(mouse::mouse_button_input_system)
                .after(keyboard::keyboard_input_system),
        )
        .add_systems(Startup, grab_cursor)
        .add_systems(Update, manage_cursor);
    }
}

#[derive(Component, Clone, Debug)]
pub struct PlayerKeys {
    pub enable_input: bool,

    pub key_forward: [KeyCode; 2],
    pub key_back: [KeyCode; 2],
    pub key_left: [KeyCode; 2],
    pub key_right: [KeyCode; 2],
    pub key_sprint: KeyCode,
    pub key_jump: KeyCode,
    pub key_camera: KeyCode,
}

impl Default for PlayerKeys {
    fn default() -> Self {
        Self {
            enable_input: true,
            key_forward: [KeyCode::KeyW, KeyCode::ArrowUp],
            key_back: [KeyCode::KeyS, KeyCode::ArrowDown],
            key_left: [KeyCode::KeyA, KeyCode::ArrowLeft],
            key_right: [KeyCode::KeyD, KeyCode::ArrowRight],
            key_sprint: KeyCode::ShiftLeft,
            key_jump: KeyCode::Space,
            key_camera: KeyCode::KeyT,
        }
    }
}

pub fn player_input(
    key_input: Res<ButtonInput<KeyCode>>,
    mut mouse_events: EventReader<MouseMotion>,
    mut players: Query<(&PlayerKeys, &mut PlayerInput)>,
) {
    let mut mouse_delta = Vec2::ZERO;
    for mouse_event in mouse_events.read() {
        mouse_delta += mouse_event.delta;
    }
    // Screen space grows downwards; the look axis is up-positive.
    let look_delta = Vec2::new(mouse_delta.x, -mouse_delta.y) * MOUSE_AXIS_SCALE;

    for (keys, mut input) in &mut players {
        if !keys.enable_input {
            *input = PlayerInput::default();
            continue;
        }

        *input = PlayerInput {
            move_axis: Vec2::new(
                get_axis(&key_input, keys.key_right, keys.key_left),
                get_axis(&key_input, keys.key_forward, keys.key_back),
            ),
            sprint: key_input.pressed(keys.key_sprint),
            jump: key_input.just_pressed(keys.key_jump),
            look_delta,
            toggle_camera: key_input.just_pressed(keys.key_camera),
        };
    }
}

fn get_pressed(key_input: &ButtonInput<KeyCode>, keys: [KeyCode; 2]) -> f32 {
    if key_input.any_pressed(keys) { 1.0 } else { 0.0 }
}

fn get_axis(key_input: &ButtonInput<KeyCode>, keys_pos: [KeyCode; 2], keys_neg: [KeyCode; 2]) -> f32 {
    get_pressed(key_input, keys_pos) - get_pressed(key_input, keys_neg)
}

fn set_cursor_grab(window: &mut Window, grabbed: bool) {
    window.cursor_options.grab_mode = if grabbed {
        CursorGrabMode::Locked
    } else {
        CursorGrabMode::None
    };
    window.cursor_options.visible = !grabbed;
}

fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    for mut window in &mut windows {
        set_cursor_grab(&mut window, true);
    }
}

/// Escape frees the cursor and pauses player input; a left click takes it back.
fn manage_cursor(
    btn: Res<ButtonInput<MouseButton>>,
    key: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut players: Query<&mut PlayerKeys>,
) {
    let grab = if btn.just_pressed(MouseButton::Left) {
        true
    } else if key.just_pressed(KeyCode::Escape) {
        false
    } else {
        return;
    };

    for mut window in &mut windows {
        set_cursor_grab(&mut window, grab);
    }
    for mut keys in &mut players {
        keys.enable_input = grab;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn app() -> (App, Entity) {
        let mut app = App::new();
        app.init_resource::<ButtonInput<KeyCode>>()
            .add_event::<MouseMotion>()
            .add_systems(Update, player_input);
        let player = app
            .world_mut()
            .spawn((PlayerKeys::default(), PlayerInput::default()))
            .id();
        (app, player)
    }

    fn input(app: &App, player: Entity) -> PlayerInput {
        *app.world().get::<PlayerInput>(player).unwrap()
    }

    #[test]
    fn samples_keys_and_mouse() {
        let (mut app, player) = app();
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::KeyW);
            keys.press(KeyCode::KeyA);
            keys.press(KeyCode::ShiftLeft);
            keys.press(KeyCode::Space);
            keys.press(KeyCode::KeyT);
        }
        app.world_mut().send_event(MouseMotion {
            delta: Vec2::new(10.0, -5.0),
        });
        app.world_mut().send_event(MouseMotion {
            delta: Vec2::new(2.0, 0.0),
        });

        app.update();

        let sampled = input(&app, player);
        assert_eq!(sampled.move_axis, Vec2::new(-1.0, 1.0));
        assert!(sampled.sprint && sampled.jump && sampled.toggle_camera);
        assert_relative_eq!(sampled.look_delta.x, 1.2);
        assert_relative_eq!(sampled.look_delta.y, 0.5);
    }

    #[test]
    fn triggers_fire_on_press_edge_only() {
        let (mut app, player) = app();
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::Space);
            keys.press(KeyCode::KeyT);
            keys.press(KeyCode::ShiftLeft);
        }
        app.update();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        app.update();

        let sampled = input(&app, player);
        assert!(!sampled.jump && !sampled.toggle_camera);
        assert!(sampled.sprint);
        assert_eq!(sampled.look_delta, Vec2::ZERO);
    }

    #[test]
    fn opposite_keys_cancel() {
        let (mut app, player) = app();
        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::KeyD);
            keys.press(KeyCode::ArrowLeft);
            keys.press(KeyCode::ArrowUp);
        }
        app.update();

        assert_eq!(input(&app, player).move_axis, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn disabled_input_is_cleared() {
        let (mut app, player) = app();
        app.world_mut()
            .get_mut::<PlayerKeys>(player)
            .unwrap()
            .enable_input = false;
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyW);
        app.world_mut().send_event(MouseMotion {
            delta: Vec2::new(10.0, 10.0),
        });

        app.update();

        assert_eq!(input(&app, player), PlayerInput::default());
    }
}
