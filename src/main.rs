use beenthere::cli::{self, Cli, Command};
use beenthere::config::Config;
use beenthere::{build_app, db, AppState};
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let command = Cli::parse().into_command();
    let config = Config::from_env()?;

    let pool = db::init_pool(&config.database_url, config.max_connections).await?;
    let state = AppState::new(pool, config.feed_capacity);

    match command {
        Command::Serve => {
            let app = build_app(state);

            let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
            let listener = TcpListener::bind(addr).await?;

            tracing::info!("listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Command::ImportCities { file } => {
            let report = cli::import_cities(&state.cities, &file).await?;
            println!("Imported {} cities ({} already present)", report.imported, report.skipped);
        }
    }

    Ok(())
}
