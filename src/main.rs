use oxford_vocab_backend::config::Config;
use oxford_vocab_backend::db::Database;
use oxford_vocab_backend::{build_router, create_state, logging, seed};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = logging::init_tracing(&config);

    let db = match Database::connect(config.database_url.as_deref()).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "failed to open database");
            std::process::exit(1);
        }
    };

    if let Some(path) = config.words_seed_path.as_deref() {
        if let Err(err) = seed::seed_words_if_empty(&db, path).await {
            tracing::warn!(error = %err, path = %path.display(), "word seeding failed");
        }
    }

    let addr = config.bind_addr();
    let app = build_router(create_state(config, db).await);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "oxford-vocab-backend listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
