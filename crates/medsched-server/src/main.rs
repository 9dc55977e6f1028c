use std::{env, path::Path};

use std::sync::Arc;

use medsched_server::audit::AuditHook;
use medsched_server::bootstrap::bootstrap;
use medsched_server::{AppState, ServerBuilder, load_config};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From MEDSCHED_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (medsched.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (MEDSCHED_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    medsched_server::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(Path::new(&config_path))) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    }

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    medsched_server::apply_logging_level(&cfg.logging.level);

    let state = AppState::new();
    medsched_core::spawn_hook(&state.events, Arc::new(AuditHook));

    if let Err(e) = bootstrap(&state, &cfg.bootstrap) {
        eprintln!("Bootstrap failed: {e}");
        std::process::exit(2);
    }

    let server = ServerBuilder::new()
        .with_config(cfg)
        .with_state(state)
        .build();

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: MEDSCHED_CONFIG
/// 3. Default: medsched.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("MEDSCHED_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("medsched.toml".to_string(), ConfigSource::Default)
}
