//! Folio server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on all interfaces, port 23234, printing the connect command
//! PORT=23234 HOST=0.0.0.0 APP_ENV=local folio-server
//!
//! # Same, with flags and a custom host key
//! folio-server --port 23234 --host 0.0.0.0 --host-key-path /etc/folio/host_key
//! ```

use std::process::ExitCode;

use clap::Parser;
use folio_server::{Args, SHUTDOWN_DEADLINE, Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let server = match start(&args).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Could not start server: {}", e);
            return ExitCode::FAILURE;
        },
    };

    let handle = server.handle();
    let mut serving = tokio::spawn(server.listen_and_serve());

    tokio::select! {
        () = shutdown_signal() => {},
        result = &mut serving => {
            if let Err(e) = result {
                tracing::error!("Server task failed: {}", e);
            }
        },
    }

    tracing::info!("Stopping SSH server");
    if let Err(e) = handle.shutdown(SHUTDOWN_DEADLINE).await {
        tracing::error!("Could not stop server: {}", e);
    }

    ExitCode::SUCCESS
}

async fn start(args: &Args) -> Result<Server, folio_server::ServerError> {
    let config = ServerConfig::from_args(args)?;
    tracing::info!(app_env = %config.app_env, "Starting SSH server on {}", config.address());

    let server = Server::bind(&config).await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!("Listening on {}", addr);
    }
    if let Some(hint) = config.connect_hint() {
        tracing::info!("{}", hint);
    }

    Ok(server)
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
