// Motion-control runtime for a four-wheel mecanum base
//
// Pipeline per control cycle:
// joystick command -> input shaping -> optional PID compensation ->
// mecanum mixing -> normalized wheel speeds -> motor bridge

pub mod chassis;
pub mod config;
pub mod hardware;
pub mod messages;
pub mod motor;
pub mod runtime;
pub mod tuning;
