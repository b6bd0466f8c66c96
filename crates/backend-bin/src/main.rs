use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use beeauth_backend_lib::{
    auth::AuthService,
    bootstrap::BootstrapLoader,
    config::{LogFormat, Settings},
    routes, AppState,
};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// beeauth authentication server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./beeauth.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings);

    let state = AppState::new(settings.clone())?;

    // seeding hashes every password, keep it off the runtime threads
    let report = tokio::task::spawn_blocking({
        let auth = state.auth.clone();
        let bootstrap = settings.bootstrap.clone();
        move || BootstrapLoader::new(&auth, &bootstrap).load_from_env()
    })
    .await?;
    info!(
        matched = report.matched,
        registered = report.registered,
        fallback = report.used_fallback,
        "user bootstrap finished"
    );

    if settings.auth.session_ttl().is_some() {
        let interval = Duration::from_secs(settings.auth.sweep_interval_secs);
        tokio::spawn(sweep_sessions(state.auth.clone(), interval));
    }

    let app = routes::create_router(state);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    info!("listening on {}", settings.bind_addr);

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(());
        })
        .into_future();

    let grace = Duration::from_secs(settings.shutdown_timeout_secs);
    tokio::select! {
        result = server => result?,
        _ = async {
            if stop_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => warn!("in-flight requests did not finish within {grace:?}, exiting"),
    }

    info!("server stopped");
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_ascii_lowercase()));

    match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
}

/// Periodically drop expired sessions
async fn sweep_sessions(auth: Arc<AuthService>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let removed = auth.purge_expired_sessions();
        if removed > 0 {
            info!(removed, "expired sessions purged");
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
