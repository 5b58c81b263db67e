// Step-driven autonomous routines.
//
// Each routine does one control cycle's worth of work per `step` call and
// reports Pending/Done/TimedOut, so the external scheduler keeps owning the
// timing. Dropping a routine cancels it; `Chassis::stop` is always valid.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::controller::{Chassis, ChassisError};

/// Point-turn completion threshold, degrees
const TURN_DONE_DEG: f32 = 2.0;

/// Default point-turn deadline: 5 s worth of cycles at 50 Hz
pub const TURN_TIMEOUT_CYCLES: u32 = 250;

/// Outcome of one routine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoStatus {
    Pending,
    Done,
    TimedOut,
}

/// Drive forward at fixed power for a duration, then stop.
///
/// Under the simulation flag the routine is a no-op that completes
/// immediately.
pub struct DriveStraight {
    power: f32,
    cycles_remaining: u32,
    simulated: bool,
}

impl DriveStraight {
    pub fn new(duration: Duration, power: f32, period: f32, simulated: bool) -> Self {
        let cycles_remaining = (duration.as_secs_f32() / period).ceil() as u32;
        Self {
            power,
            cycles_remaining,
            simulated,
        }
    }

    pub fn step(&mut self, chassis: &mut Chassis) -> Result<AutoStatus, ChassisError> {
        if self.simulated {
            return Ok(AutoStatus::Done);
        }

        if self.cycles_remaining == 0 {
            info!("drive straight finished, stopping");
            chassis.stop()?;
            return Ok(AutoStatus::Done);
        }

        self.cycles_remaining -= 1;
        chassis.drive(0.0, self.power, 0.0)?;
        Ok(AutoStatus::Pending)
    }
}

/// Turn toward a heading using the heading loop.
///
/// Continuous mode feeds the live correction alongside forward power and
/// never finishes on its own (the caller decides when to stop driving
/// straight). Non-continuous mode point-turns until the error drops under
/// 2 degrees or the cycle deadline expires, then releases the loop, stops,
/// and re-zeroes the heading reference.
pub struct TurnToAngle {
    power: f32,
    continuous: bool,
    cycles_remaining: u32,
}

impl TurnToAngle {
    /// Re-zero the heading reference and arm the loop at `target_angle`
    /// degrees from it.
    pub fn begin(
        chassis: &mut Chassis,
        power: f32,
        target_angle: f32,
        continuous: bool,
    ) -> Result<Self, ChassisError> {
        chassis.begin_turn(target_angle, continuous)?;
        Ok(Self {
            power,
            continuous,
            cycles_remaining: TURN_TIMEOUT_CYCLES,
        })
    }

    /// Override the point-turn deadline.
    pub fn with_timeout(mut self, cycles: u32) -> Self {
        self.cycles_remaining = cycles;
        self
    }

    pub fn step(&mut self, chassis: &mut Chassis) -> Result<AutoStatus, ChassisError> {
        if self.continuous {
            let correction = chassis.heading_correction()?;
            chassis.apply(0.0, self.power, -correction)?;
            return Ok(AutoStatus::Pending);
        }

        let error = chassis.heading_error()?;
        if error.abs() <= TURN_DONE_DEG {
            info!("turn complete, error {:.2} deg", error);
            chassis.end_turn()?;
            return Ok(AutoStatus::Done);
        }

        if self.cycles_remaining == 0 {
            warn!("turn deadline expired, error still {:.2} deg", error);
            chassis.end_turn()?;
            return Ok(AutoStatus::TimedOut);
        }

        self.cycles_remaining -= 1;
        debug!("turn error {:.2} deg", error);
        let correction = chassis.heading_correction()?;
        chassis.apply(0.0, 0.0, -correction)?;
        Ok(AutoStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::chassis::controller::KEY_ANGLE_D;
    use crate::hardware::sim::{SimEncoder, SimGyro, SimMotor};
    use crate::hardware::MotorOutput;
    use crate::tuning::{DashboardTable, SharedTuning};

    const PERIOD: f32 = 0.02;

    fn rig() -> (Chassis, Vec<Arc<Mutex<f32>>>, SimGyro, SharedTuning) {
        let motors: Vec<SimMotor> = (0..4).map(|_| SimMotor::new()).collect();
        let probes = motors.iter().map(|m| m.probe()).collect();
        let gyro = SimGyro::new();
        let tuning = DashboardTable::shared();
        let chassis = Chassis::new(
            motors
                .into_iter()
                .map(|m| Box::new(m) as Box<dyn MotorOutput>)
                .collect(),
            Box::new(gyro.clone()),
            Box::new(SimEncoder::new()),
            Arc::clone(&tuning),
            PERIOD,
        )
        .unwrap();
        (chassis, probes, gyro, tuning)
    }

    #[test]
    fn drive_straight_runs_for_the_duration_then_stops() {
        let (mut chassis, probes, _, _) = rig();
        let mut routine = DriveStraight::new(Duration::from_millis(100), 0.5, PERIOD, false);

        for _ in 0..5 {
            assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Pending);
            assert!(*probes[0].lock().unwrap() > 0.0);
        }

        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Done);
        for probe in &probes {
            assert_eq!(*probe.lock().unwrap(), 0.0);
        }
    }

    #[test]
    fn simulated_drive_straight_is_a_no_op() {
        let (mut chassis, probes, _, _) = rig();
        let mut routine = DriveStraight::new(Duration::from_secs(3), 0.5, PERIOD, true);

        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Done);
        for probe in &probes {
            assert_eq!(*probe.lock().unwrap(), 0.0);
        }
    }

    #[test]
    fn begin_re_zeroes_the_heading_reference() {
        let (mut chassis, _, gyro, _) = rig();
        gyro.set_angle(63.0);
        TurnToAngle::begin(&mut chassis, 0.0, 90.0, false).unwrap();
        assert_eq!(gyro.reset_count(), 1);
        assert_eq!(gyro.current(), 0.0);
    }

    #[test]
    fn point_turn_corrects_until_on_target() {
        let (mut chassis, probes, gyro, tuning) = rig();
        tuning.lock().unwrap().put(KEY_ANGLE_D, 0.0);
        let mut routine = TurnToAngle::begin(&mut chassis, 0.0, 90.0, false).unwrap();

        // Far from target: keeps commanding rotation
        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Pending);
        // error = 90, P = 0.03 -> correction clamps to 1.0, rotation = -1.0
        assert!((*probes[0].lock().unwrap() + 1.0).abs() < 1e-6);

        // Heading converges to within 2 degrees
        gyro.set_angle(89.0);
        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Done);
        // Loop released: stopped and reference re-zeroed
        for probe in &probes {
            assert_eq!(*probe.lock().unwrap(), 0.0);
        }
        assert_eq!(gyro.reset_count(), 2);
    }

    #[test]
    fn point_turn_times_out_instead_of_stalling() {
        let (mut chassis, probes, _gyro, _) = rig();
        let mut routine = TurnToAngle::begin(&mut chassis, 0.0, 90.0, false)
            .unwrap()
            .with_timeout(3);

        // Gyro never moves
        for _ in 0..3 {
            assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Pending);
        }
        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::TimedOut);
        for probe in &probes {
            assert_eq!(*probe.lock().unwrap(), 0.0);
        }
    }

    #[test]
    fn continuous_turn_blends_forward_power_with_correction() {
        let (mut chassis, probes, gyro, tuning) = rig();
        tuning.lock().unwrap().put(KEY_ANGLE_D, 0.0);
        let mut routine = TurnToAngle::begin(&mut chassis, 0.5, 10.0, true).unwrap();

        gyro.set_angle(0.0);
        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Pending);
        // error = 10, P = 0.03 -> correction 0.3, rotation = -0.3
        // front left = y + rotation = 0.5 - 0.3 = 0.2
        assert!((*probes[0].lock().unwrap() - 0.2).abs() < 1e-6);
        // front right = y - rotation = 0.5 + 0.3 = 0.8
        assert!((*probes[1].lock().unwrap() - 0.8).abs() < 1e-6);

        // Never completes on its own
        assert_eq!(routine.step(&mut chassis).unwrap(), AutoStatus::Pending);
    }
}
