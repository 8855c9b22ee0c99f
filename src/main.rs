//! editor-context-mcp: MCP resource server for live editor state
//!
//! Standalone front end for the library. It serves a host state loaded
//! from a JSON fixture, which is handy for developing MCP clients without
//! a running editor.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use editor_context_mcp::config;
use editor_context_mcp::editor::FixtureHost;
use editor_context_mcp::mcp::ServerState;
use editor_context_mcp::plugin::{show_state, EditorContextPlugin};

/// MCP resource server for live editor state.
///
/// Serves `sublime-context://state` over JSON-RPC on http://127.0.0.1.
#[derive(Parser, Debug)]
#[command(name = "editor-context-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to settings file
    #[arg(value_name = "SETTINGS_FILE")]
    config: Option<PathBuf>,

    /// JSON file describing the editor windows to serve
    #[arg(long, value_name = "FIXTURE")]
    state: Option<PathBuf>,

    /// Port to listen on (overrides the settings file)
    #[arg(long)]
    port: Option<u16>,

    /// Print the current snapshot and exit
    #[arg(long)]
    dump: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Blocks until the process is asked to terminate.
#[cfg(unix)]
async fn wait_for_shutdown() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
    }
    Ok(())
}

/// Blocks until the process is asked to terminate.
#[cfg(windows)]
async fn wait_for_shutdown() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, initiating graceful shutdown");
    Ok(())
}

/// Entry point for the editor-context-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(port) = args.port {
        cfg.mcp_server_port = port;
    }

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let host = match args.state.as_deref() {
        Some(path) => match FixtureHost::from_file(path) {
            Ok(host) => host,
            Err(e) => {
                error!(error = %e, "Failed to load editor state");
                return ExitCode::FAILURE;
            }
        },
        None => FixtureHost::empty(),
    };

    if args.dump {
        return match show_state(&host) {
            Ok(buffer) => {
                println!("{}", buffer.text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Failed to render snapshot");
                ExitCode::FAILURE
            }
        };
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.mcp_server_port,
        "Starting editor-context-mcp server"
    );

    let plugin = EditorContextPlugin::load(Arc::new(host), &cfg);
    if plugin.server().state() != ServerState::Running {
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            plugin.unload();
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(wait_for_shutdown());
    plugin.unload();

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to install signal handlers");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }

    #[test]
    fn config_level_used_without_flags() {
        assert_eq!(get_log_level(0, false, "DEBUG"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
    }
}
