//! Discrete actions and their index encodings.

use serde::{Deserialize, Serialize};
use simcore::{ActuatorInput, DriveCommand};

pub const CAMERA_MIN_ANGLE: i32 = -90;
pub const CAMERA_MAX_ANGLE: i32 = 90;
/// Number of whole-degree camera angles in `[-90, 90]`.
pub const CAMERA_ANGLE_COUNT: usize = (CAMERA_MAX_ANGLE - CAMERA_MIN_ANGLE + 1) as usize;

/// One tick's worth of input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Drive(DriveCommand),
    DriveAndCamera { command: DriveCommand, angle: f64 },
    /// Moves the camera only. The previous drive command keeps acting.
    Camera { angle: f64 },
}

impl Action {
    /// Writes the action into the actuator input. Drive commands persist
    /// until replaced, so camera-only actions repeat the last drive command.
    pub fn apply_to(self, input: &mut ActuatorInput) {
        match self {
            Action::Drive(command) => input.command = command,
            Action::DriveAndCamera { command, angle } => {
                input.command = command;
                input.camera_angle = clamp_camera(angle);
            }
            Action::Camera { angle } => input.camera_angle = clamp_camera(angle),
        }
    }
}

fn clamp_camera(angle: f64) -> f64 {
    angle.clamp(CAMERA_MIN_ANGLE as f64, CAMERA_MAX_ANGLE as f64)
}

/// How trainers' action indices map to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpace {
    /// `forward, left, right, backward, stop`
    #[default]
    Drive,
    /// Every drive command crossed with every camera angle:
    /// `index = drive * 181 + (angle + 90)`.
    DriveWithCamera,
}

impl ActionSpace {
    pub fn size(self) -> usize {
        match self {
            ActionSpace::Drive => DriveCommand::ALL.len(),
            ActionSpace::DriveWithCamera => DriveCommand::ALL.len() * CAMERA_ANGLE_COUNT,
        }
    }

    pub fn decode(self, index: usize) -> Option<Action> {
        match self {
            ActionSpace::Drive => DriveCommand::ALL.get(index).copied().map(Action::Drive),
            ActionSpace::DriveWithCamera => {
                let command = *DriveCommand::ALL.get(index / CAMERA_ANGLE_COUNT)?;
                let angle = (index % CAMERA_ANGLE_COUNT) as i32 + CAMERA_MIN_ANGLE;
                Some(Action::DriveAndCamera {
                    command,
                    angle: angle as f64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_space_decoding() {
        let space = ActionSpace::Drive;
        assert_eq!(space.size(), 5);
        assert_eq!(space.decode(0), Some(Action::Drive(DriveCommand::Forward)));
        assert_eq!(space.decode(4), Some(Action::Drive(DriveCommand::Stop)));
        assert_eq!(space.decode(5), None);
    }

    #[test]
    fn test_camera_space_decoding() {
        let space = ActionSpace::DriveWithCamera;
        assert_eq!(space.size(), 905);
        assert_eq!(
            space.decode(0),
            Some(Action::DriveAndCamera { command: DriveCommand::Forward, angle: -90.0 })
        );
        assert_eq!(
            space.decode(181 * 3 + 90),
            Some(Action::DriveAndCamera { command: DriveCommand::Backward, angle: 0.0 })
        );
        assert_eq!(space.decode(905), None);
    }

    #[test]
    fn test_camera_action_keeps_drive_command() {
        let mut input = ActuatorInput::default();
        Action::Drive(DriveCommand::Forward).apply_to(&mut input);
        Action::Camera { angle: 120.0 }.apply_to(&mut input);
        assert_eq!(input.command, DriveCommand::Forward);
        assert_eq!(input.camera_angle, 90.0);
    }
}
