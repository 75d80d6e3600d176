//! Entry point for the Defect Cost Engine binary.
//!
//! Running this binary starts an HTTP server exposing the cost
//! calculator, configuration and defect ledger.  Data is kept as JSON
//! files in the directory named by `DEFECT_COST_DATA_DIR` (default
//! `data`).  The bind address comes from `DEFECT_COST_BIND_ADDR`
//! (default `127.0.0.1:3000`).  Setting `DEFECT_COST_SEED_SAMPLES` to
//! `1` or `true` fills an empty ledger with sample defects.  Log
//! verbosity follows `RUST_LOG`.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let data_dir = std::env::var("DEFECT_COST_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let addr = std::env::var("DEFECT_COST_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let seed_samples = std::env::var("DEFECT_COST_SEED_SAMPLES")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false);

    if let Err(err) = defect_cost_engine::api::serve(&addr, PathBuf::from(data_dir), seed_samples).await {
        tracing::error!("Error running server: {err:#}");
        std::process::exit(1);
    }
}
