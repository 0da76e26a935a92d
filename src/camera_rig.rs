use bevy::prelude::*;

use crate::player_motion::{PlayerConfig, PlayerInput, PlayerState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RigKind {
    FirstPerson,
    ThirdPerson,
}

impl RigKind {
    pub fn is_selected(self, first_person: bool) -> bool {
        (self == RigKind::FirstPerson) == first_person
    }
}

/// A camera placed relative to its owning player.
///
/// Rigs are separate entities rather than children so they can be positioned
/// after the owner has moved this frame.
#[derive(Component, Clone, Debug)]
pub struct CameraRig {
    pub owner: Entity,
    pub kind: RigKind,
    /// Pitch applied on top of the owner's yaw.
    pub local_rotation: Quat,
    pub active: bool,
}

impl CameraRig {
    pub fn new(owner: Entity, kind: RigKind, first_person: bool) -> Self {
        Self {
            owner,
            kind,
            local_rotation: Quat::IDENTITY,
            active: kind.is_selected(first_person),
        }
    }
}

/// Applies the owner's pitch to the rig in use. The other rig keeps its last pitch.
pub fn apply_rig_pitch(players: Query<&PlayerState>, mut rigs: Query<&mut CameraRig>) {
    for mut rig in &mut rigs {
        let Ok(state) = players.get(rig.owner) else {
            continue;
        };
        if rig.kind.is_selected(state.first_person) {
            rig.local_rotation = state.camera_pitch_rotation();
        }
    }
}

pub fn switch_camera_mode(mut players: Query<(Entity, &PlayerInput, &mut PlayerState)>) {
    for (entity, input, mut state) in &mut players {
        if state.step_camera(input.toggle_camera) {
            info!(
                "player {entity} switched to {} camera",
                if state.first_person { "first-person" } else { "third-person" }
            );
        }
    }
}

/// Keeps exactly one rig per player active.
pub fn activate_camera_rigs(
    players: Query<&PlayerState>,
    mut rigs: Query<(&mut CameraRig, Option<&mut Camera>)>,
) {
    for (mut rig, camera) in &mut rigs {
        let Ok(state) = players.get(rig.owner) else {
            continue;
        };
        let active = rig.kind.is_selected(state.first_person);
        if rig.active != active {
            rig.active = active;
        }
        if let Some(mut camera) = camera {
            if camera.is_active != active {
                camera.is_active = active;
            }
        }
    }
}

pub fn sync_camera_rigs(
    players: Query<(&Transform, &PlayerConfig), Without<CameraRig>>,
    mut rigs: Query<(&CameraRig, &mut Transform)>,
) {
    for (rig, mut transform) in &mut rigs {
        let Ok((body, config)) = players.get(rig.owner) else {
            continue;
        };
        let offset = match rig.kind {
            RigKind::FirstPerson => Vec3::Y * config.first_person_height,
            RigKind::ThirdPerson => {
                body.rotation
                    * Vec3::new(0.0, config.third_person_height, config.third_person_distance)
            }
        };
        transform.translation = body.translation + offset;
        transform.rotation = body.rotation * rig.local_rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Rigs {
        player: Entity,
        first: Entity,
        third: Entity,
    }

    fn spawn(app: &mut App) -> Rigs {
        let world = app.world_mut();
        let player = world
            .spawn((
                PlayerState::default(),
                PlayerInput::default(),
                PlayerConfig::default(),
                Transform::default(),
            ))
            .id();
        let first = world
            .spawn((CameraRig::new(player, RigKind::FirstPerson, false), Transform::default()))
            .id();
        let third = world
            .spawn((CameraRig::new(player, RigKind::ThirdPerson, false), Transform::default()))
            .id();
        Rigs {
            player,
            first,
            third,
        }
    }

    fn active(app: &App, rig: Entity) -> bool {
        app.world().get::<CameraRig>(rig).unwrap().active
    }

    #[test]
    fn starts_in_third_person() {
        let mut app = App::new();
        app.add_systems(Update, activate_camera_rigs);
        let rigs = spawn(&mut app);
        app.update();

        assert!(!active(&app, rigs.first));
        assert!(active(&app, rigs.third));
    }

    #[test]
    fn every_toggle_activates_exactly_one_rig() {
        let mut app = App::new();
        app.add_systems(Update, (switch_camera_mode, activate_camera_rigs).chain());
        let rigs = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerInput>(rigs.player)
            .unwrap()
            .toggle_camera = true;

        for expected_first_person in [true, false, true, false, true] {
            app.update();
            let state = app.world().get::<PlayerState>(rigs.player).unwrap();
            assert_eq!(state.first_person, expected_first_person);
            assert_eq!(active(&app, rigs.first), expected_first_person);
            assert_eq!(active(&app, rigs.third), !expected_first_person);
        }
    }

    #[test]
    fn no_toggle_keeps_mode() {
        let mut app = App::new();
        app.add_systems(Update, (switch_camera_mode, activate_camera_rigs).chain());
        let rigs = spawn(&mut app);
        app.update();
        app.update();

        assert!(!app.world().get::<PlayerState>(rigs.player).unwrap().first_person);
        assert!(active(&app, rigs.third));
    }

    #[test]
    fn pitch_only_reaches_selected_rig() {
        let mut app = App::new();
        app.add_systems(Update, apply_rig_pitch);
        let rigs = spawn(&mut app);
        app.world_mut()
            .get_mut::<PlayerState>(rigs.player)
            .unwrap()
            .pitch = 30.0;
        app.update();

        let third = app.world().get::<CameraRig>(rigs.third).unwrap();
        let first = app.world().get::<CameraRig>(rigs.first).unwrap();
        assert!(third.local_rotation.abs_diff_eq(Quat::from_rotation_x(-30f32.to_radians()), 1e-6));
        assert_eq!(first.local_rotation, Quat::IDENTITY);
    }

    #[test]
    fn rigs_follow_owner() {
        let mut app = App::new();
        app.add_systems(Update, sync_camera_rigs);
        let rigs = spawn(&mut app);
        *app.world_mut().get_mut::<Transform>(rigs.player).unwrap() =
            Transform::from_xyz(1.0, 0.0, 1.0);
        app.update();

        let first = app.world().get::<Transform>(rigs.first).unwrap();
        assert_relative_eq!(first.translation.y, 0.6);
        assert_relative_eq!(first.translation.x, 1.0);

        let third = app.world().get::<Transform>(rigs.third).unwrap();
        assert_relative_eq!(third.translation.y, 2.0);
        // Behind the player, opposite to its -Z forward.
        assert_relative_eq!(third.translation.z, 6.0);
    }
}
