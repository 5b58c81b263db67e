// Publish one gain write to the runtime's tuning store.
//
// Usage: cargo run --example tune -- pidAngleP 0.05
// Recognized keys: pidAngleP/I/D, pidYP/I/D (unknown keys are stored but
// never read).

use clap::Parser;
use tracing::info;

use mecanum_zenoh_runtime::config::TOPIC_TUNING;
use mecanum_zenoh_runtime::messages::TuningUpdate;

#[derive(Parser, Debug)]
#[command(about = "Publish a compensation-loop gain to the runtime")]
struct Args {
    /// Tuning-store key, e.g. pidAngleP
    key: String,

    /// New value
    value: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let session = zenoh::open(zenoh::Config::default()).await?;
    let publisher = session.declare_publisher(TOPIC_TUNING).await?;

    let update = TuningUpdate {
        key: args.key,
        value: args.value,
    };
    publisher.put(serde_json::to_string(&update)?).await?;
    info!("Published {} = {}", update.key, update.value);

    Ok(())
}
