// Mecanum drive controller
//
// Per cycle: shape joystick axes, let the enabled compensation loops
// substitute their corrections, mix into wheel speeds, write the motors.
// Collaborators (motors, gyro, lateral encoder, tuning store) are injected
// at construction.

use thiserror::Error;
use tracing::debug;

use super::input;
use super::kinematics::{mix, WheelSpeeds};
use super::pid::{PidConfig, PidController};
use crate::hardware::{HeadingSensor, MotorError, MotorOutput, RateSensor, SensorError};
use crate::tuning::{SharedTuning, TuningStore as _};

/// Full-scale lateral speed target, units/s (matches the drive encoder)
pub const MAX_LATERAL_SPEED: f32 = 37.5;

/// Tuning-store keys for the heading loop
pub const KEY_ANGLE_P: &str = "pidAngleP";
pub const KEY_ANGLE_I: &str = "pidAngleI";
pub const KEY_ANGLE_D: &str = "pidAngleD";

/// Tuning-store keys for the lateral loop
pub const KEY_Y_P: &str = "pidYP";
pub const KEY_Y_I: &str = "pidYI";
pub const KEY_Y_D: &str = "pidYD";

const ANGLE_GAIN_DEFAULTS: [f32; 3] = [0.03, 0.0, 0.1];
const Y_GAIN_DEFAULTS: [f32; 3] = [0.05, 0.0, 0.02];

#[derive(Debug, Error)]
pub enum ChassisError {
    #[error("expected 4 drive motors, got {got}")]
    WrongMotorCount { got: usize },

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Motor(#[from] MotorError),

    #[error("tuning store poisoned")]
    TuningPoisoned,
}

pub struct Chassis {
    motors: Vec<Box<dyn MotorOutput>>,
    gyro: Box<dyn HeadingSensor>,
    encoder_y: Box<dyn RateSensor>,
    tuning: SharedTuning,
    /// Control period in seconds, fixed by the external scheduler
    period: f32,

    pid_angle: PidController,
    pid_y: PidController,

    heading_hold: bool,
    lateral_hold: bool,
    /// Latch: a turn happened, re-zero the heading reference once the
    /// rotation input returns to neutral
    was_rotating: bool,
    /// Keep the lateral loop's wraparound error handling (see
    /// `set_lateral_wrap_compat`)
    lateral_wrap_compat: bool,
}

impl Chassis {
    /// Build a chassis over its collaborators. The actuator sink must have
    /// exactly four outputs (front left, front right, back left, back right);
    /// anything else fails here, not mid-cycle. Default loop gains are seeded
    /// into the tuning store so the dashboard starts from known values.
    pub fn new(
        motors: Vec<Box<dyn MotorOutput>>,
        gyro: Box<dyn HeadingSensor>,
        encoder_y: Box<dyn RateSensor>,
        tuning: SharedTuning,
        period: f32,
    ) -> Result<Self, ChassisError> {
        if motors.len() != 4 {
            return Err(ChassisError::WrongMotorCount { got: motors.len() });
        }

        {
            let mut store = tuning.lock().map_err(|_| ChassisError::TuningPoisoned)?;
            for (key, default) in [KEY_ANGLE_P, KEY_ANGLE_I, KEY_ANGLE_D]
                .iter()
                .zip(ANGLE_GAIN_DEFAULTS)
            {
                store.put(key, default);
            }
            for (key, default) in [KEY_Y_P, KEY_Y_I, KEY_Y_D].iter().zip(Y_GAIN_DEFAULTS) {
                store.put(key, default);
            }
        }

        let pid_angle = PidController::new(
            PidConfig::new(
                ANGLE_GAIN_DEFAULTS[0],
                ANGLE_GAIN_DEFAULTS[1],
                ANGLE_GAIN_DEFAULTS[2],
            )
            .with_input_range(-180.0, 180.0)
            .with_output_range(-1.0, 1.0)
            .with_tolerance(5.0),
        );

        // The lateral loop ships with continuous input on, reference-
        // compatible; see set_lateral_wrap_compat
        let pid_y = PidController::new(
            PidConfig::new(Y_GAIN_DEFAULTS[0], Y_GAIN_DEFAULTS[1], Y_GAIN_DEFAULTS[2])
                .with_input_range(-MAX_LATERAL_SPEED, MAX_LATERAL_SPEED)
                .with_output_range(-1.0, 1.0)
                .with_continuous(true),
        );

        Ok(Self {
            motors,
            gyro,
            encoder_y,
            tuning,
            period,
            pid_angle,
            pid_y,
            heading_hold: false,
            lateral_hold: false,
            was_rotating: false,
            lateral_wrap_compat: true,
        })
    }

    /// Toggle the heading-hold loop. Turning it off releases the loop and
    /// clears the turn latch.
    pub fn set_heading_hold(&mut self, enabled: bool) {
        self.heading_hold = enabled;
        if !enabled {
            self.pid_angle.disable();
            self.pid_angle.reset();
            self.was_rotating = false;
        }
    }

    /// Toggle the lateral-speed-hold loop.
    pub fn set_lateral_hold(&mut self, enabled: bool) {
        self.lateral_hold = enabled;
        if !enabled {
            self.pid_y.disable();
            self.pid_y.reset();
        }
    }

    /// Lateral speed is not a circular quantity, but the loop has always run
    /// with continuous (wraparound) error handling and retuning against the
    /// corrected behavior has not happened yet. On by default; turn off to
    /// get the plain error term.
    pub fn set_lateral_wrap_compat(&mut self, enabled: bool) {
        self.lateral_wrap_compat = enabled;
        self.pid_y.set_continuous(enabled);
    }

    /// One teleop cycle: raw joystick axes in [-1, 1] through shaping,
    /// compensation, and mixing, out to the motors. Returns the normalized
    /// wheel speeds that were written.
    pub fn drive(&mut self, x: f32, y: f32, rotation: f32) -> Result<WheelSpeeds, ChassisError> {
        let x = input::curve(x);
        let mut y = input::curve(y);
        let mut rotation = input::shape_rotation(rotation);

        if self.heading_hold {
            self.reload_angle_gains()?;
            if rotation == 0.0 {
                // Operator stopped turning: re-zero the reference once, then
                // hold the heading we are at now
                if self.was_rotating {
                    self.gyro.reset()?;
                    self.pid_angle.reset();
                    self.was_rotating = false;
                }

                self.pid_angle.set_setpoint(0.0);
                self.pid_angle.set_continuous(true);
                self.pid_angle.enable();
                let angle = self.gyro.angle()?;
                rotation = -self.pid_angle.calculate(angle, self.period);
            } else {
                // Operator-driven turn: bypass the loop, remember the episode
                self.was_rotating = true;
            }
        }

        if self.lateral_hold {
            self.reload_y_gains()?;
            let target = input::remap(y, -1.0, 1.0, -MAX_LATERAL_SPEED, MAX_LATERAL_SPEED);
            self.pid_y.enable();
            self.pid_y.set_setpoint(target);
            let rate = self.encoder_y.rate()?;
            y = self.pid_y.calculate(rate, self.period);
        }

        self.apply(x, y, rotation)
    }

    /// Mix pre-shaped body commands and write the motors. Compensation-loop
    /// outputs and autonomous corrections enter here so they are never
    /// re-curved or dead-banded.
    pub fn apply(&mut self, x: f32, y: f32, rotation: f32) -> Result<WheelSpeeds, ChassisError> {
        let speeds = mix(x, y, rotation);
        debug!(
            "wheels: fl={:.3} fr={:.3} bl={:.3} br={:.3}",
            speeds.front_left, speeds.front_right, speeds.back_left, speeds.back_right
        );

        for (motor, speed) in self.motors.iter_mut().zip(speeds.as_array()) {
            motor.set(speed)?;
        }
        Ok(speeds)
    }

    /// Full stop.
    pub fn stop(&mut self) -> Result<WheelSpeeds, ChassisError> {
        self.apply(0.0, 0.0, 0.0)
    }

    /// Arm the heading loop for a point turn: re-zero the reference and
    /// target `angle` degrees from it.
    pub(crate) fn begin_turn(&mut self, angle: f32, continuous: bool) -> Result<(), ChassisError> {
        self.gyro.reset()?;
        self.pid_angle.reset();
        self.pid_angle.set_setpoint(angle);
        self.pid_angle.set_continuous(continuous);
        self.pid_angle.enable();
        Ok(())
    }

    /// Current heading-loop error, degrees.
    pub(crate) fn heading_error(&mut self) -> Result<f32, ChassisError> {
        let angle = self.gyro.angle()?;
        Ok(self.pid_angle.error(angle))
    }

    /// Run the heading loop one cycle and return its correction.
    pub(crate) fn heading_correction(&mut self) -> Result<f32, ChassisError> {
        self.reload_angle_gains()?;
        let angle = self.gyro.angle()?;
        Ok(self.pid_angle.calculate(angle, self.period))
    }

    /// Release the heading loop after a turn: disable, stop, re-zero.
    pub(crate) fn end_turn(&mut self) -> Result<(), ChassisError> {
        self.pid_angle.disable();
        self.stop()?;
        self.gyro.reset()?;
        Ok(())
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    // Gains come from the store every cycle the loop runs, so dashboard
    // writes land on the next cycle
    fn reload_angle_gains(&mut self) -> Result<(), ChassisError> {
        let (p, i, d) = {
            let store = self.tuning.lock().map_err(|_| ChassisError::TuningPoisoned)?;
            (
                store.get(KEY_ANGLE_P, ANGLE_GAIN_DEFAULTS[0]),
                store.get(KEY_ANGLE_I, ANGLE_GAIN_DEFAULTS[1]),
                store.get(KEY_ANGLE_D, ANGLE_GAIN_DEFAULTS[2]),
            )
        };
        self.pid_angle.set_gains(p, i, d);
        Ok(())
    }

    fn reload_y_gains(&mut self) -> Result<(), ChassisError> {
        let (p, i, d) = {
            let store = self.tuning.lock().map_err(|_| ChassisError::TuningPoisoned)?;
            (
                store.get(KEY_Y_P, Y_GAIN_DEFAULTS[0]),
                store.get(KEY_Y_I, Y_GAIN_DEFAULTS[1]),
                store.get(KEY_Y_D, Y_GAIN_DEFAULTS[2]),
            )
        };
        self.pid_y.set_gains(p, i, d);
        Ok(())
    }
}
