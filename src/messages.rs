// Wire types exchanged over zenoh

use serde::{Deserialize, Serialize};

/// Drive intent from teleop/scripts -> runtime.
///
/// All three axes are joystick-range values in [-1, 1], sampled once per
/// control cycle. Defaults to full stop, which is what the watchdog sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DriveCommand {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

impl DriveCommand {
    pub const STOP: DriveCommand = DriveCommand {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
    };
}

/// Single gain write from the operator dashboard -> runtime.
///
/// Applied to the tuning store between cycles; the compensation loops pick
/// the new value up on their next cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningUpdate {
    pub key: String,
    pub value: f32,
}

/// Health status published by runtime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeHealth {
    Ok,
    CmdStale,
}
