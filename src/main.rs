use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::sync::Arc;

use connectassist::config::Config;
use connectassist::db::{AppState, Store, create_pool, init_db};
use connectassist::engine::{Engine, spawn_artifact_sweeper};
use connectassist::models::{CustomerMetadata, DeviceHeartbeat};
use connectassist::packager::ZipPackager;

#[derive(Parser, Debug)]
#[command(name = "connectassist")]
#[command(about = "Support-code issuance and installer packaging for ConnectAssist")]
struct Cli {
    /// Seed the database with a demo support code and device (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete artifact files of expired or revoked codes, then exit
    #[arg(long)]
    sweep_once: bool,
}

fn seed_dev_data(engine: &Engine) {
    let metadata = CustomerMetadata {
        customer_name: "Demo Customer".to_string(),
        customer_email: Some("demo@example.com".to_string()),
        customer_phone: None,
        session_notes: Some("Seeded by --seed".to_string()),
    };

    let code = match engine.issue_code(&metadata) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Failed to seed support code: {}", e);
            return;
        }
    };

    let heartbeat = DeviceHeartbeat {
        device_id: None,
        support_code: Some(code.code.clone()),
        customer_name: None,
        device_name: "DEMO-PC".to_string(),
        os: Some("Windows 11".to_string()),
    };

    match engine.register_heartbeat(heartbeat) {
        Ok(device) => {
            println!();
            println!("============================================================");
            println!("DEV SEED DATA");
            println!("============================================================");
            println!("Support code: {} (expires at {})", code.code, code.expires_at);
            println!("Customer:     {}", code.customer_name);
            println!("Device:       {} ({})", device.device_name, device.id);
            println!("============================================================");
            println!();
        }
        Err(e) => tracing::error!("Failed to seed device: {}", e),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connectassist=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }
    let store = Store::new(pool);

    if let Err(e) = std::fs::create_dir_all(&config.downloads_path) {
        tracing::warn!(
            "Could not create downloads directory {}: {}",
            config.downloads_path.display(),
            e
        );
    }

    let packager = ZipPackager::new(
        &config.builder_path,
        &config.downloads_path,
        &config.server_domain,
    );
    if !packager.vendor_binary_path().is_file() {
        tracing::warn!(
            "Remote-access binary missing at {}; installer builds will fail until it is provided",
            packager.vendor_binary_path().display()
        );
    }

    let engine = Arc::new(Engine::new(
        store.clone(),
        Arc::new(packager),
        config.packager_timeout,
    ));

    if cli.sweep_once {
        match engine.sweep_stale_artifacts() {
            Ok(report) => {
                println!(
                    "Sweep complete: {} stale, {} removed, {} failed",
                    report.stale, report.removed, report.failed
                );
                if report.failed > 0 {
                    std::process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set: the admin API is open to anyone who can reach it");
    }

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set CONNECTASSIST_ENV=dev)");
        } else {
            seed_dev_data(&engine);
        }
    }

    if let Some(interval) = config.package_sweep_interval {
        spawn_artifact_sweeper(Arc::clone(&engine), interval);
    }

    let state = AppState {
        store,
        engine,
        server_domain: config.server_domain.clone(),
        admin_api_key: config.admin_api_key.clone(),
        downloads_path: config.downloads_path.clone(),
    };

    let app = connectassist::app(state, Some(config.rate_limit));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("ConnectAssist server listening on {}", addr);

    // Peer addresses are needed for per-IP rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
