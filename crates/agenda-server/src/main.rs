use anyhow::Result;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let mut config = config::Config::load(&args.config)?;

    // CLI flags override config file and environment
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    init_tracing(args.json_logs || config.logging.json);

    ensure_data_dirs(&config);

    let db = agenda_db::create_pool(&config.database.url, config.database.max_connections).await?;
    agenda_db::run_migrations(&db).await?;

    let state = agenda_core::AppState {
        db,
        config: agenda_core::AppConfig {
            max_range_days: config.instances.max_range_days,
        },
    };

    let app = agenda_api::build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(
        bind = %config.server.bind_address,
        database = %config.database.url,
        max_range_days = config.instances.max_range_days,
        "agenda-server listening"
    );

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agenda=info,tower_http=debug"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Create the SQLite file's parent directory before connecting.
fn ensure_data_dirs(config: &config::Config) {
    if let Some(db_path) = config
        .database
        .url
        .strip_prefix("sqlite://")
        .and_then(|s| s.split('?').next())
    {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!("Could not create directory {:?}: {}", parent, e);
                }
            }
        }
    }
}
