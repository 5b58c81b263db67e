// Loop timing, topics, hardware configuration
use std::time::Duration;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Control period handed to the chassis (compensation gains are tuned against this)
pub const LOOP_PERIOD_S: f32 = 1.0 / LOOP_HZ as f32;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "mecanum/cmd/drive"; // teleop commands
pub const TOPIC_RT_WHEELS: &str = "mecanum/rt/wheels"; // normalized wheel speeds
pub const TOPIC_HEALTH: &str = "mecanum/state/health"; // health status
pub const TOPIC_TUNING: &str = "mecanum/cmd/tuning"; // dashboard gain updates

// Serial port for the PWM motor bridge
pub const MOTOR_PORT: &str = "/dev/ttyACM0";

// Bridge channels for the four drive motors, in mix order
// (front left, front right, back left, back right)
pub const DRIVE_CHANNELS: [u8; 4] = [7, 3, 6, 5];

// Enable hardware motor control (false = simulation backends, no serial I/O)
pub const MOTOR_ENABLED: bool = false;

// Simulation flag: autonomous routines skip their real-time phases when set
pub const SIMULATION: bool = !MOTOR_ENABLED;
