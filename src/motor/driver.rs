// Per-channel motor outputs over a shared bridge bus

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::bus::PwmBus;
use crate::hardware::{MotorError, MotorOutput};

/// One drive channel on the bridge, usable as a chassis motor output.
/// The bus is shared because all four wheels ride the same serial line.
pub struct BridgeMotor {
    bus: Arc<Mutex<PwmBus>>,
    channel: u8,
}

impl BridgeMotor {
    pub fn new(bus: Arc<Mutex<PwmBus>>, channel: u8) -> Self {
        Self { bus, channel }
    }
}

impl MotorOutput for BridgeMotor {
    fn set(&mut self, speed: f32) -> Result<(), MotorError> {
        self.bus
            .lock()
            .map_err(|_| MotorError::BusPoisoned)?
            .set_channel(self.channel, speed)
    }
}

impl Drop for BridgeMotor {
    fn drop(&mut self) {
        // Leave the wheel stopped when the output goes away
        if let Err(e) = self.set(0.0) {
            warn!("failed to stop channel {} on drop: {}", self.channel, e);
        }
    }
}

/// Open the bridge and map the four drive channels, in mix order
/// (front left, front right, back left, back right).
pub fn open_drive_motors(
    port: &str,
    channels: [u8; 4],
) -> Result<Vec<Box<dyn MotorOutput>>, MotorError> {
    info!("Opening motor bridge on {}", port);
    let bus = Arc::new(Mutex::new(PwmBus::open(port)?));

    Ok(channels
        .iter()
        .map(|&ch| Box::new(BridgeMotor::new(Arc::clone(&bus), ch)) as Box<dyn MotorOutput>)
        .collect())
}
