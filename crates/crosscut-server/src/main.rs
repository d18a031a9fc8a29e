//! Crosscut shard service — hosts graph shards and coordinates
//! distributed BFS runs over a fleet of them.

use anyhow::Result;
use clap::Parser;

mod error;
mod routes;
mod state;

pub use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "crosscut-server")]
#[command(about = "Crosscut shard service - sharded graphs and distributed BFS")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let state = AppState::new();
    let app = routes::create_router(state);

    tracing::info!(%addr, "crosscut shard service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
