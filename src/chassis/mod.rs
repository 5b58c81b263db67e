// Mecanum drive controller
//
// Provides:
// - Joystick input shaping (dead-band + sine response curve)
// - Mecanum inverse kinematics with uniform saturation scaling
// - Heading-hold and lateral-speed-hold compensation loops
// - Step-driven autonomous routines

pub mod auto;
mod controller;
pub mod input;
pub mod kinematics;
pub mod pid;

pub use auto::{AutoStatus, DriveStraight, TurnToAngle};
pub use controller::{Chassis, ChassisError};
pub use kinematics::{mix, WheelSpeeds};
pub use pid::{PidConfig, PidController};
