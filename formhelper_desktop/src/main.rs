use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use formhelper_backend::api;
use formhelper_backend::bootstrap;
use formhelper_backend::config::FormhelperConfig;
use formhelper_backend::telemetry;
use formhelper_desktop::local_port::LocalCommandPort;
use formhelper_desktop::shell;
use formhelper_frontend::config::FrontendConfig;
use formhelper_frontend::settings::SettingsStore;
use formhelper_frontend::AppStores;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about = "Formhelper desktop shell with an embedded backend")]
struct Args {
    /// Call the backend directly instead of through the embedded HTTP server
    #[arg(long)]
    in_process: bool,
    /// Port for the embedded HTTP server (otherwise FORMHELPER_API_PORT or 8080)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    let mut config = FormhelperConfig::from_env()?;
    if let Some(port) = args.port {
        config.api_port = port;
    }
    let resources = bootstrap::initialize(&config)?;
    let frontend_config = FrontendConfig::from_env();

    let (stores, server) = if args.in_process {
        let port = LocalCommandPort::new(resources.database.clone());
        let stores = AppStores::new(
            Arc::new(port),
            SettingsStore::open(&frontend_config.settings_path),
        );
        (stores, None)
    } else {
        let (listener, bound_port) = api::bind_listener(config.api_port).await?;
        if bound_port != config.api_port {
            warn!(
                requested_port = config.api_port,
                bound_port, "configured port was in use, bound to next available port"
            );
        }
        let database = resources.database.clone();
        let server = tokio::spawn(async move {
            if let Err(err) = api::serve_listener(listener, database).await {
                error!(error = ?err, "embedded HTTP server exited");
            }
        });
        let frontend_config =
            frontend_config.with_api_url(format!("http://127.0.0.1:{bound_port}"));
        (AppStores::connect(&frontend_config)?, Some(server))
    };

    let loaded = stores.preload().await;
    info!(
        persons = stores.persons.count(),
        files = stores.files.count(),
        records = stores.records.count(),
        language = %stores.settings.language(),
        "stores loaded"
    );
    for (label, outcome) in [
        ("persons", &loaded.persons),
        ("files", &loaded.files),
        ("records", &loaded.records),
    ] {
        if let Some(err) = outcome.error() {
            warn!(collection = label, error = %err, "initial load failed");
        }
    }

    let result = shell::run(stores).await;

    if let Some(server) = server {
        server.abort();
        let _ = server.await;
    }
    result
}
