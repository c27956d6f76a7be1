use anyhow::Result;
use clap::{Parser, Subcommand};
use formhelper_backend::api;
use formhelper_backend::bootstrap;
use formhelper_backend::config::FormhelperConfig;
use formhelper_backend::telemetry;
use formhelper_backend::utils;

#[derive(Parser)]
#[command(author, version, about = "Formhelper person/file backend")]
struct Args {
    /// Override the HTTP port (otherwise FORMHELPER_API_PORT or 8080)
    #[arg(long)]
    port: Option<u16>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP command server
    Serve,
    /// Create the data directory and schema, then exit
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::print_banner();
    telemetry::init_tracing();

    let args = Args::parse();

    let mut config = FormhelperConfig::from_env()?;
    if let Some(port) = args.port {
        config.api_port = port;
    }
    let resources = bootstrap::initialize(&config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, resources.database).await,
        Command::Init => {
            for dir in &resources.directories_created {
                println!("created {dir}");
            }
            println!("database ready at {}", config.paths.db_path.display());
            Ok(())
        }
    }
}
