// Keyboard teleop: WASD move, Q/E rotate, R/F stick scale, Esc quit
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::info;

use mecanum_zenoh_runtime::config::TOPIC_CMD_DRIVE;

const SCALES: [f32; 3] = [0.3, 0.6, 1.0]; // fraction of full stick
const INPUT_TIMEOUT_MS: u64 = 100; // Recenter the sticks after this much time with no input

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_CMD_DRIVE).await?;

    info!("Controls: WASD=move, Q/E=rotate, R/F=scale, Esc=quit");
    info!("Scale: LOW");

    enable_raw_mode()?;
    let result = run_teleop(&publisher).await;
    disable_raw_mode()?;

    result
}

async fn run_teleop(
    publisher: &zenoh::pubsub::Publisher<'_>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut scale_idx: usize = 0;

    // Persistent stick state
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut rotation = 0.0f32;
    let mut last_movement_input = Instant::now();

    loop {
        // Poll for key with 20ms timeout (50Hz effective rate)
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;

                match code {
                    // Translation - update stick and refresh timestamp
                    KeyCode::Char('w') if pressed => {
                        y = SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('s') if pressed => {
                        y = -SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('a') if pressed => {
                        x = -SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('d') if pressed => {
                        x = SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }

                    // Rotation (the chassis inverts and halves this axis)
                    KeyCode::Char('q') if pressed => {
                        rotation = SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }
                    KeyCode::Char('e') if pressed => {
                        rotation = -SCALES[scale_idx];
                        last_movement_input = Instant::now();
                    }

                    // Scale control
                    KeyCode::Char('r') if pressed => {
                        scale_idx = (scale_idx + 1).min(2);
                        print_scale(scale_idx);
                    }
                    KeyCode::Char('f') if pressed => {
                        scale_idx = scale_idx.saturating_sub(1);
                        print_scale(scale_idx);
                    }

                    // Quit
                    KeyCode::Esc if pressed => break,

                    _ => {}
                }
            }
        }

        // Recenter the sticks if no movement input for INPUT_TIMEOUT_MS
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            x = 0.0;
            y = 0.0;
            rotation = 0.0;
        }

        // Always publish at ~50Hz
        let cmd = json!({
            "x": x,
            "y": y,
            "rotation": rotation
        });
        publisher.put(cmd.to_string()).await?;
    }

    Ok(())
}

fn print_scale(idx: usize) {
    let label = ["LOW", "MED", "HIGH"][idx];
    info!("Scale: {}", label);
}
