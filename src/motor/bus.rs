// Serial protocol for the PWM motor bridge
//
// The bridge board fans one serial line out to the PWM speed controllers.
// Frame format: [0xA5, 0x5A, Channel, SpeedHi, SpeedLo, Checksum]
// Speed is a signed 16-bit value, -1000..=1000, mapping to [-1, 1].

use std::io::Write;
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::hardware::MotorError;

/// Default serial configuration for the bridge
pub const DEFAULT_BAUDRATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Frame header bytes
const HEADER: [u8; 2] = [0xA5, 0x5A];

/// Highest PWM channel the bridge exposes
const MAX_CHANNEL: u8 = 9;

/// Full-scale speed value on the wire
const SPEED_SCALE: f32 = 1000.0;

/// Serial connection to the PWM motor bridge.
pub struct PwmBus {
    port: Box<dyn SerialPort>,
}

impl PwmBus {
    /// Open a new connection to the bridge
    pub fn open(port_name: &str) -> Result<Self, MotorError> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    /// Open with custom baudrate
    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self, MotorError> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self { port })
    }

    /// Checksum over everything after the header
    fn checksum(data: &[u8]) -> u8 {
        let sum: u16 = data.iter().map(|&b| b as u16).sum();
        (!sum & 0xFF) as u8
    }

    /// Build one speed frame for a channel
    fn build_frame(channel: u8, raw: i16) -> [u8; 6] {
        let [hi, lo] = raw.to_be_bytes();
        let body = [channel, hi, lo];
        [
            HEADER[0],
            HEADER[1],
            channel,
            hi,
            lo,
            Self::checksum(&body),
        ]
    }

    /// Command one channel to a normalized speed in [-1, 1].
    /// Out-of-range speeds are clamped, out-of-range channels rejected.
    pub fn set_channel(&mut self, channel: u8, speed: f32) -> Result<(), MotorError> {
        if channel > MAX_CHANNEL {
            return Err(MotorError::BadChannel { channel });
        }

        let raw = (speed.clamp(-1.0, 1.0) * SPEED_SCALE).round() as i16;
        let frame = Self::build_frame(channel, raw);

        debug!("bridge ch {} <- {}", channel, raw);
        self.port.write_all(&frame)?;
        Ok(())
    }

    /// Zero every channel the bridge exposes.
    pub fn stop_all(&mut self) -> Result<(), MotorError> {
        for channel in 0..=MAX_CHANNEL {
            self.set_channel(channel, 0.0)?;
        }
        Ok(())
    }
}
