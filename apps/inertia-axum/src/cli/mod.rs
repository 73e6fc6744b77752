//! # CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the demo server (default)
//! - `version` - Print the asset version the server would use

mod commands;

use clap::{Parser, Subcommand};
use inertia_axum::settings::ServerSettings;
use inertia_core::InertiaError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// inertia-axum - Inertia protocol adapter demo
#[derive(Parser, Debug)]
#[command(name = "inertia-axum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the demo server
    Serve(ServeArgs),

    /// Print the asset version
    Version {
        /// Build manifest to fingerprint
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

/// Flags of `serve`; each one overrides file and environment settings.
#[derive(clap::Args, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// HTML shell file
    #[arg(long)]
    pub root_view: Option<PathBuf>,

    /// Fixed asset version
    #[arg(long)]
    pub asset_version: Option<String>,

    /// Build manifest to fingerprint into the asset version
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// SSR server base URL
    #[arg(long)]
    pub ssr_url: Option<String>,

    /// Encrypt browser history for every page
    #[arg(long)]
    pub encrypt_history: bool,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), InertiaError> {
    let mut settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve(args)) => {
            args.apply(&mut settings);
            cmd_serve(settings).await
        }
        Some(Commands::Version { manifest }) => {
            if manifest.is_some() {
                settings.asset_version = None;
                settings.manifest = manifest;
            }
            cmd_version(&settings, cli.json_mode)
        }
        // No subcommand - serve with file and environment settings
        None => cmd_serve(settings).await,
    }
}

/// Defaults, then the optional file, then `INERTIA_*` variables.
fn load_settings(path: Option<&std::path::Path>) -> Result<ServerSettings, InertiaError> {
    let mut settings = match path {
        Some(path) => ServerSettings::from_file(path)?,
        None => ServerSettings::default(),
    };
    settings.apply_env()?;
    Ok(settings)
}

impl ServeArgs {
    fn apply(self, settings: &mut ServerSettings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(path) = self.root_view {
            settings.root_view = Some(path);
        }
        if let Some(version) = self.asset_version {
            settings.asset_version = Some(version);
        }
        if let Some(path) = self.manifest {
            settings.manifest = Some(path);
        }
        if let Some(url) = self.ssr_url {
            settings.ssr_url = Some(url);
        }
        if self.encrypt_history {
            settings.encrypt_history = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "inertia-axum",
            "serve",
            "--port",
            "4000",
            "--asset-version",
            "v2",
            "--encrypt-history",
        ]);
        let Some(Commands::Serve(args)) = cli.command else {
            unreachable!("serve was given");
        };

        let mut settings = ServerSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.asset_version.as_deref(), Some("v2"));
        assert!(settings.encrypt_history);
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::parse_from(["inertia-axum", "-q"]);
        assert!(cli.quiet);
        assert!(cli.command.is_none());
    }
}
