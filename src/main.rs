//! bikeshare-gateway server binary
//!
//! Composes the schema, then serves `/graphql` and `/graphiql` on `PORT`
//! (default 4500). A schema that fails to build stops the process before it
//! accepts any traffic.

use std::net::SocketAddr;

use bikeshare_gateway::{assemble, config::GatewayConfig, server::router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    for (name, endpoint) in [
        ("users", &config.users),
        ("prestamos", &config.prestamos),
        ("profile pictures", &config.profile_pictures),
        ("bicicletas", &config.bicicletas),
        ("auth", &config.auth),
    ] {
        tracing::info!(service = name, url = %endpoint.base_url(), "backend configured");
    }

    let port = config.port;
    let schema = assemble(config).map_err(|e| {
        tracing::error!(error = %e, "schema assembly failed");
        e
    })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on port {}", port);
    tracing::info!("GraphiQL available at http://{}/graphiql", addr);

    axum::serve(listener, router(schema)).await?;

    Ok(())
}
