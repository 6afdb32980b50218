// # ddns-bridged - DynDNS update bridge daemon
//
// Routers (FRITZ!Box and friends) only speak "call this URL with my new
// address". This daemon accepts that call and reconciles the A/AAAA records
// at Hetzner.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging (stdout, plus a file when DDNS_LOG_PATH is set)
//    and the runtime
// 3. Registering provider models
// 4. Serving `/update` and `/health` until SIGINT/SIGTERM
//
// ## Example
//
// ```bash
// export DDNS_PROVIDER_TYPE=hetzner-cloud
// export DDNS_PROVIDER_API_TOKEN=your_token
// export DDNS_LISTEN_ADDR=0.0.0.0:8080
//
// ddns-bridged
// # router update URL:
// # http://bridge:8080/update?domain=home.example.com&ipv4=<ipaddr>&ipv6=<ip6addr>
// ```

use anyhow::Result;
use ddns_bridged::{AppState, Settings, router};
use ddns_core::config::mask_token;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let log_level = match settings.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let builder = FmtSubscriber::builder().with_max_level(log_level);

    let installed = match settings.log_file() {
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), e);
                    return DdnsExitCode::ConfigError.into();
                }
            };
            // Plain text so the file carries no escape codes
            let subscriber = builder
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => tracing::subscriber::set_global_default(builder.finish()),
    };

    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddns-bridged");
    info!("Provider type: {}", settings.provider_type);
    if let Some(path) = settings.log_file() {
        info!("Also logging to {}", path.display());
    }
    match settings.api_token.as_deref() {
        Some(token) => info!("Using server-side API token {}", mask_token(token)),
        None => info!("No server-side API token, expecting one per request"),
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(settings).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(settings: Settings) -> Result<()> {
    let registry = ddns_core::ProviderRegistry::new();

    #[cfg(feature = "hetzner")]
    {
        info!("Registering Hetzner providers");
        ddns_provider_hetzner::register(&registry);
    }

    if !registry.has_provider(&settings.provider_type) {
        anyhow::bail!(
            "Provider '{}' is not available in this build. Available: {}",
            settings.provider_type,
            registry.list_providers().join(", ")
        );
    }

    let listen_addr = settings.listen_addr;
    let app = router(AppState::new(registry, settings));

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", listen_addr, e))?;
    info!("Listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Resolves once SIGTERM or SIGINT is received
async fn shutdown_signal() {
    match wait_for_shutdown().await {
        Ok(signal) => info!("Received shutdown signal: {}", signal),
        Err(e) => {
            error!("Shutdown signal handling unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
