// Motor bridge module for the mecanum base
//
// Provides:
// - Framed serial protocol to the PWM motor bridge
// - Per-channel MotorOutput implementation over a shared bus

pub mod bus;
mod driver;

pub use bus::PwmBus;
pub use driver::{open_drive_motors, BridgeMotor};
