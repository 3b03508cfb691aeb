use clap::Parser;
use myrmidon::adapters::health_handler::HealthHandler;
use myrmidon::adapters::tool_handler::SwarmToolHandler;
use myrmidon::cli::Cli;
use myrmidon::config::Settings;
use myrmidon::swarm::boomerang::BoomerangCoordinator;
use myrmidon::swarm::executor::{RolePromptExecutor, TaskRunner};
use myrmidon::swarm::generate::create_provider;
use myrmidon::swarm::manager::SwarmManager;
use myrmidon::swarm::sparc::SparcEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Myrmidon swarm server on {}:{}", host, port);

    let manager = Arc::new(SwarmManager::new(&settings.swarm));

    // Workflow and boomerang execution run tasks through the generation
    // provider; the validator guarantees it is configured while either is on.
    let runner: Option<Arc<dyn TaskRunner>> = match &settings.generation {
        Some(config) => {
            let provider = create_provider(config)?;
            info!(
                "Generation provider: {} ({})",
                provider.name(),
                provider.model()
            );
            Some(Arc::new(RolePromptExecutor::new(provider)))
        }
        None => None,
    };

    let sparc = match (&runner, settings.sparc.enabled) {
        (Some(runner), true) => Some(Arc::new(SparcEngine::new(
            manager.clone(),
            runner.clone(),
            settings.sparc.clone(),
        ))),
        _ => None,
    };
    let boomerang = match (&runner, settings.boomerang.enabled) {
        (Some(runner), true) => Some(Arc::new(BoomerangCoordinator::new(
            manager.clone(),
            runner.clone(),
            &settings.boomerang,
        ))),
        _ => None,
    };

    let tools = Arc::new(SwarmToolHandler::new(
        manager.clone(),
        sparc,
        boomerang,
    ));
    let health_handler = Arc::new(HealthHandler::new(manager.clone()));

    let app = myrmidon::create_app(manager, tools, health_handler);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
