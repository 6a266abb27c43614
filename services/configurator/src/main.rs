//! Heatmap configurator server.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use clap::Parser;
use renderer::RenderLimits;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use configurator::config::Args;
use configurator::points::load_points;
use configurator::router;
use configurator::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let points = load_points(&args.points)?;
    let limits = RenderLimits::from_env();
    info!(?limits, "Render limits");

    let state = Arc::new(AppState::new(points, limits).with_prometheus(prometheus_handle));
    let app = router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
