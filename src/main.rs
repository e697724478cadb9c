use std::net::SocketAddr;

use clap::Parser;
use edgelink::agents::create_gateway;
use edgelink::cli::Cli;
use edgelink::config::Settings;
use edgelink::AppContext;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!(mode = %settings.mode, "Starting edgelink gateway on {}:{}", host, port);

    let gateway = create_gateway(&settings).await?;
    let ctx = AppContext {
        agent: gateway.agent,
        sessions: gateway.sessions,
    };
    let app = edgelink::create_app(ctx, &settings.cors.origins);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
