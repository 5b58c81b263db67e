// Hardware seams for the chassis: motor outputs and feedback sensors.
//
// The chassis only ever talks to these traits; real backends live in the
// motor module, simulation backends below.

use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Errors from feedback sensors. A failed read aborts the control cycle
/// instead of being treated as a zero reading.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("heading sensor unavailable: {0}")]
    Heading(String),

    #[error("rate sensor unavailable: {0}")]
    Rate(String),
}

/// Errors from motor outputs.
#[derive(Debug, Error)]
pub enum MotorError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bridge channel {channel} out of range")]
    BadChannel { channel: u8 },

    #[error("motor bus poisoned")]
    BusPoisoned,
}

/// One actuator accepting a normalized speed in [-1, 1].
pub trait MotorOutput: Send {
    fn set(&mut self, speed: f32) -> Result<(), MotorError>;
}

/// Heading feedback in degrees, resettable to re-zero the reference.
pub trait HeadingSensor: Send {
    fn angle(&mut self) -> Result<f32, SensorError>;
    fn reset(&mut self) -> Result<(), SensorError>;
}

/// Rate feedback (e.g. wheel encoder velocity) in the lateral-speed units.
pub trait RateSensor: Send {
    fn rate(&mut self) -> Result<f32, SensorError>;
}

/// In-memory backends used in simulation mode, by the demos, and by tests.
pub mod sim {
    use super::*;

    /// Motor that records the last commanded speed.
    #[derive(Debug, Clone, Default)]
    pub struct SimMotor {
        last: Arc<Mutex<f32>>,
    }

    impl SimMotor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Handle to read back what the chassis wrote.
        pub fn probe(&self) -> Arc<Mutex<f32>> {
            Arc::clone(&self.last)
        }
    }

    impl MotorOutput for SimMotor {
        fn set(&mut self, speed: f32) -> Result<(), MotorError> {
            *self.last.lock().map_err(|_| MotorError::BusPoisoned)? = speed;
            Ok(())
        }
    }

    /// Settable gyro; `reset` re-zeroes the reference like the real part.
    #[derive(Debug, Clone, Default)]
    pub struct SimGyro {
        angle: Arc<Mutex<f32>>,
        resets: Arc<Mutex<u32>>,
    }

    impl SimGyro {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_angle(&self, degrees: f32) {
            *self.angle.lock().unwrap() = degrees;
        }

        pub fn current(&self) -> f32 {
            *self.angle.lock().unwrap()
        }

        /// Number of times `reset` has been called (for tests).
        pub fn reset_count(&self) -> u32 {
            *self.resets.lock().unwrap()
        }
    }

    impl HeadingSensor for SimGyro {
        fn angle(&mut self) -> Result<f32, SensorError> {
            Ok(*self
                .angle
                .lock()
                .map_err(|_| SensorError::Heading("poisoned".into()))?)
        }

        fn reset(&mut self) -> Result<(), SensorError> {
            *self
                .angle
                .lock()
                .map_err(|_| SensorError::Heading("poisoned".into()))? = 0.0;
            *self
                .resets
                .lock()
                .map_err(|_| SensorError::Heading("poisoned".into()))? += 1;
            Ok(())
        }
    }

    /// Settable rate encoder.
    #[derive(Debug, Clone, Default)]
    pub struct SimEncoder {
        rate: Arc<Mutex<f32>>,
    }

    impl SimEncoder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_rate(&self, rate: f32) {
            *self.rate.lock().unwrap() = rate;
        }
    }

    impl RateSensor for SimEncoder {
        fn rate(&mut self) -> Result<f32, SensorError> {
            Ok(*self
                .rate
                .lock()
                .map_err(|_| SensorError::Rate("poisoned".into()))?)
        }
    }

    /// Gyro that always fails, for exercising the sensor-failure path.
    #[derive(Debug, Default)]
    pub struct DeadGyro;

    impl HeadingSensor for DeadGyro {
        fn angle(&mut self) -> Result<f32, SensorError> {
            Err(SensorError::Heading("disconnected".into()))
        }

        fn reset(&mut self) -> Result<(), SensorError> {
            Err(SensorError::Heading("disconnected".into()))
        }
    }
}
