use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use roboaide_arm::ArmConfig;

/// Control panel for the six-motor arm
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port of the arm controller (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baudrate: Option<u32>,

    /// Keyboard jog mode instead of the line console
    #[arg(long)]
    jog: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ArmConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => ArmConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(baudrate) = args.baudrate {
        config.baudrate = baudrate;
    }

    if let Err(e) = roboaide_arm::runtime::run(config, args.jog).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
