//! # inertia-axum
//!
//! Demo binary for the Inertia protocol adapter.
//!
//! ## Usage
//!
//! ```bash
//! # Start the demo server
//! inertia-axum serve --host 0.0.0.0 --port 3000
//!
//! # Same, with settings from a file
//! inertia-axum --config inertia.toml serve
//!
//! # Print the asset version for a build manifest
//! inertia-axum version --manifest public/build/manifest.json
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // INERTIA_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("INERTIA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inertia_axum=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        "\n  inertia-axum v{}\n  server-driven pages for axum\n",
        env!("CARGO_PKG_VERSION")
    );
}
