mod extract;
mod routes;
mod state;
mod tokens;

use agenda_core::lock::DataDirLock;
use agenda_core::{AgendaConfig, Backend};
use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("AGENDA_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "agenda_server=info,agenda_core=info,tower_http=info".into()),
        )
        .init();

    let config = AgendaConfig::load()?;

    // Ensure only one process writes the data directory
    let _lock = DataDirLock::acquire(&config.data_path())?;

    let backend = Backend::open(&config).await?;
    let app = routes::app(AppState::new(backend));

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, store = %config.store_path().display(), "server started");
    println!("agenda-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
