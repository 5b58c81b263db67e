// 50 Hz control loop with command watchdog
//
// Samples the newest drive command each tick, runs one chassis cycle, and
// publishes the normalized wheel speeds plus a health status. A stale
// command stream zeroes the drive instead of letting the last command run.

use std::time::{Duration, Instant};

use tokio::time::interval;
use tracing::{info, warn};

use crate::chassis::Chassis;
use crate::config::{
    CMD_TIMEOUT, DRIVE_CHANNELS, LOOP_HZ, LOOP_PERIOD_S, MOTOR_ENABLED, MOTOR_PORT,
    TOPIC_CMD_DRIVE, TOPIC_HEALTH, TOPIC_RT_WHEELS, TOPIC_TUNING,
};
use crate::hardware::sim::{SimEncoder, SimGyro, SimMotor};
use crate::hardware::MotorOutput;
use crate::messages::{DriveCommand, RuntimeHealth, TuningUpdate};
use crate::motor::open_drive_motors;
use crate::tuning::{DashboardTable, SharedTuning, TuningStore};

pub struct Runtime {
    latest_cmd: Option<DriveCommand>,
    cmd_received_at: Instant,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    /// Process incoming command
    fn on_command(&mut self, cmd: DriveCommand) {
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = Instant::now();
    }

    /// Pick the command for this cycle, applying the watchdog
    fn current_command(&mut self) -> DriveCommand {
        let cmd_age = self.cmd_received_at.elapsed();

        if cmd_age > CMD_TIMEOUT {
            // Watchdog triggered - stop the robot
            if self.health != RuntimeHealth::CmdStale {
                warn!("Command stale ({:?} old), stopping robot", cmd_age);
            }
            self.health = RuntimeHealth::CmdStale;
            DriveCommand::STOP
        } else if let Some(cmd) = self.latest_cmd {
            self.health = RuntimeHealth::Ok;
            cmd
        } else {
            // No command ever received
            self.health = RuntimeHealth::CmdStale;
            DriveCommand::STOP
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn drive_motors() -> Result<Vec<Box<dyn MotorOutput>>, Box<dyn std::error::Error + Send + Sync>> {
    if MOTOR_ENABLED {
        Ok(open_drive_motors(MOTOR_PORT, DRIVE_CHANNELS)?)
    } else {
        info!("Motor bridge disabled, using simulation outputs");
        Ok((0..4)
            .map(|_| Box::new(SimMotor::new()) as Box<dyn MotorOutput>)
            .collect())
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let sub_cmd = session.declare_subscriber(TOPIC_CMD_DRIVE).await?;
    let sub_tuning = session.declare_subscriber(TOPIC_TUNING).await?;
    let pub_wheels = session.declare_publisher(TOPIC_RT_WHEELS).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let tuning: SharedTuning = DashboardTable::shared();
    // TODO: wire a real gyro/encoder backend once the sensor bridge lands;
    // until then the compensation loops only run in tests and demos
    let mut chassis = Chassis::new(
        drive_motors()?,
        Box::new(SimGyro::new()),
        Box::new(SimEncoder::new()),
        tuning.clone(),
        LOOP_PERIOD_S,
    )?;

    let mut runtime = Runtime::new();
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout",
        LOOP_HZ,
        CMD_TIMEOUT.as_millis()
    );
    info!("Subscribed to: {}, {}", TOPIC_CMD_DRIVE, TOPIC_TUNING);
    info!("Publishing to: {}, {}", TOPIC_RT_WHEELS, TOPIC_HEALTH);

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = sub_cmd.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd),
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Apply dashboard tuning writes before the cycle runs
        while let Ok(Some(sample)) = sub_tuning.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<TuningUpdate>(&payload) {
                Ok(update) => {
                    info!("Tuning: {} = {}", update.key, update.value);
                    match tuning.lock() {
                        Ok(mut store) => store.put(&update.key, update.value),
                        Err(_) => warn!("Tuning store poisoned, dropping update"),
                    }
                }
                Err(e) => warn!("Failed to parse tuning update: {}", e),
            }
        }

        // 3. One chassis cycle (includes watchdog logic)
        let cmd = runtime.current_command();
        let wheels = chassis.drive(cmd.x, cmd.y, cmd.rotation)?;

        // 4. Publish wheel speeds
        let wheels_json = serde_json::to_string(&wheels)?;
        pub_wheels.put(wheels_json).await?;

        // 5. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}
