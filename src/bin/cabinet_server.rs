//! Runs the Cabinet HTTP server.
//!
//! Configuration is read from the TOML file named by `CABINET_CONFIG`
//! (default `cabinet.toml`) and overridden from the environment. Without a
//! database URL tasks are kept in memory and lost on restart.

use cabinet::config::{CONFIG_PATH_ENV, CabinetConfig};
use cabinet::extraction::PlainTextExtractor;
use cabinet::gateway::{
    adapters::OpenAiCompatibleProvider, ports::ModelProvider, services::ModelGateway,
};
use cabinet::http::{AppState, router};
use cabinet::pipeline::{PipelineService, PipelineSettings};
use cabinet::prompt::PromptBuilder;
use cabinet::review::{MarkerReviewGate, ReviewVerdict};
use cabinet::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
    services::ResultProjector,
};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "cabinet.toml";

struct Components {
    gateway: Arc<ModelGateway>,
    gate: Arc<dyn ReviewVerdict>,
    settings: PipelineSettings,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    init_tracing();

    let path = env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let mut config = CabinetConfig::load(&path)?;
    config.apply_env(|name| env::var(name).ok());
    info!(config = %path.display(), "configuration loaded");

    let components = build_components(&config)?;
    match config.database.url.clone() {
        Some(url) => {
            let manager = ConnectionManager::<PgConnection>::new(url);
            let pool = Pool::builder()
                .max_size(config.database.pool_size)
                .build(manager)?;
            let repository = PostgresTaskRepository::new(pool);
            repository.ensure_schema().await?;
            info!("using PostgreSQL task store");
            serve(Arc::new(repository), components, &config).await
        }
        None => {
            warn!("no database configured; tasks are kept in memory");
            serve(Arc::new(InMemoryTaskRepository::new()), components, &config).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_components(config: &CabinetConfig) -> eyre::Result<Components> {
    let settings = config.pipeline_settings()?;
    let mut providers: Vec<Arc<dyn ModelProvider>> = Vec::new();
    for provider_config in config.provider_settings()? {
        info!(provider = %provider_config.name, model = %provider_config.model, "provider enabled");
        providers.push(Arc::new(OpenAiCompatibleProvider::new(provider_config)?));
    }
    let gateway = ModelGateway::new(providers, PromptBuilder::new(), config.budgets);
    Ok(Components {
        gateway: Arc::new(gateway),
        gate: Arc::new(MarkerReviewGate::new(config.review.gate_config())),
        settings,
    })
}

async fn serve<R>(
    repository: Arc<R>,
    components: Components,
    config: &CabinetConfig,
) -> eyre::Result<()>
where
    R: TaskRepository + 'static,
{
    let pipeline = PipelineService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
        components.gateway,
        components.gate,
        components.settings,
    );
    let report = pipeline.recover_interrupted().await?;
    info!(
        relaunched = report.relaunched.len(),
        interrupted = report.interrupted.len(),
        "start-up recovery finished"
    );

    let state = AppState {
        pipeline,
        projector: ResultProjector::new(repository),
        extractor: Arc::new(PlainTextExtractor),
    };
    let app = router(state, &config.server);
    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
