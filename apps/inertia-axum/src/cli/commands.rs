//! # CLI Command Implementations

use inertia_axum::server;
use inertia_axum::settings::ServerSettings;
use inertia_core::InertiaError;

/// Start the demo server.
pub async fn cmd_serve(settings: ServerSettings) -> Result<(), InertiaError> {
    tracing::info!("Starting server on {}", settings.bind_addr());
    server::run_server(settings).await
}

/// Print the asset version.
pub fn cmd_version(settings: &ServerSettings, json_mode: bool) -> Result<(), InertiaError> {
    let version = settings.version_source()?.current();
    if json_mode {
        let out = serde_json::json!({ "version": version });
        println!("{}", out);
    } else {
        println!("Asset version: {}", version);
    }
    Ok(())
}
