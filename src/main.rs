//! Lynara invoke CLI
//!
//! Feeds one saved function event through the adapter and prints the
//! response object the runtime would receive.
//!
//! # Architecture Overview
//!
//! ```text
//!     event.json ──▶ ┌──────────┐    ┌────────────┐    ┌──────────────┐
//!                    │  Lynara  │───▶│ interfaces │───▶│ echo router  │
//!     config.toml ─▶ │  runner  │    │ v1 / v2    │    │ (tower app)  │
//!                    └────┬─────┘    └─────┬──────┘    └──────────────┘
//!                         │                │
//!                    lifecycle        LambdaResponse ──▶ stdout (JSON)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use lynara::config::{load_config, validate_config, ConfigError, LynaraConfig};
use lynara::http::{echo_router, TowerApplication};
use lynara::observability::logging::init_logging;
use lynara::{LifecycleMode, Lynara, ShapeSelection};

#[derive(Parser)]
#[command(name = "lynara-invoke")]
#[command(about = "Run a saved API Gateway event through the Lynara adapter", long_about = None)]
struct Cli {
    /// Path to the event JSON document
    #[arg(short, long)]
    event: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event shape: auto, api_gateway_v1 or api_gateway_v2
    #[arg(short, long)]
    shape: Option<ShapeSelection>,

    /// Base path stripped from request paths
    #[arg(short, long)]
    base_path: Option<String>,

    /// Lifecycle mode: off, on or auto
    #[arg(short, long)]
    lifecycle: Option<LifecycleMode>,

    /// Optional runtime context JSON (request id etc.)
    #[arg(long)]
    context: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Result<LynaraConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => LynaraConfig::default(),
        };

        if let Some(shape) = self.shape {
            config.shape = shape;
        }
        if let Some(base_path) = &self.base_path {
            config.base_path = Some(base_path.clone());
        }
        if let Some(mode) = self.lifecycle {
            config.lifecycle = mode;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

fn read_json(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config()?;
    init_logging(&config.observability.log_level);

    tracing::debug!(
        shape = ?config.shape,
        lifecycle = %config.lifecycle,
        base_path = ?config.base_path,
        "Configuration loaded"
    );

    let event = read_json(&cli.event)?;
    let context = cli.context.as_ref().map(read_json).transpose()?;

    let app = std::sync::Arc::new(TowerApplication::new(echo_router()));
    let lynara = Lynara::from_config(app, &config);

    let response = lynara.run(&event, context).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
