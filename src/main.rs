//! Expansion Readiness server.

use std::sync::Arc;
use std::time::Duration;
use axum::http::{HeaderValue, Method};
use secrecy::ExposeSecret;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use expansion_readiness::adapters::ai::{AnthropicConfig, AnthropicProvider, MockAIProvider};
use expansion_readiness::adapters::http::{
    api_router, AssessmentHandlers, AssessmentPorts, RouteTimeouts,
};
use expansion_readiness::adapters::postgres::{
    self, PostgresConversationRepository, PostgresLedgerRepository, PostgresReportRepository,
    PostgresSessionRepository,
};
use expansion_readiness::adapters::storage::{
    InMemoryConversationRepository, InMemoryLedgerRepository, InMemoryReportRepository,
    InMemorySessionRepository,
};
use expansion_readiness::config::{AppConfig, ConfigError, ProviderChoice, ServerConfig};
use expansion_readiness::ports::{AIError, DialogueProvider, StructuredOutputProvider};

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("AI provider: {0}")]
    Provider(#[from] AIError),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    init_tracing(&config.server);

    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    let ports = build_ports(&config).await?;
    let handlers = AssessmentHandlers::from_ports(ports, &config.assessment);

    let router = api_router(handlers, RouteTimeouts::from_config(&config.server))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "expansion readiness listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if server.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn build_ports(config: &AppConfig) -> Result<AssessmentPorts, StartupError> {
    let (dialogue, structured) = build_providers(config)?;

    let ports = match config.database.url() {
        Some(url) => {
            let pool = postgres::connect(&config.database, url).await?;
            if config.database.run_migrations {
                postgres::migrate(&pool).await?;
            }
            AssessmentPorts {
                sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
                ledger: Arc::new(PostgresLedgerRepository::new(pool.clone())),
                conversations: Arc::new(PostgresConversationRepository::new(pool.clone())),
                reports: Arc::new(PostgresReportRepository::new(pool)),
                dialogue,
                structured,
            }
        }
        None => {
            tracing::warn!("no database configured; using in-memory storage");
            AssessmentPorts {
                sessions: Arc::new(InMemorySessionRepository::new()),
                ledger: Arc::new(InMemoryLedgerRepository::new()),
                conversations: Arc::new(InMemoryConversationRepository::new()),
                reports: Arc::new(InMemoryReportRepository::new()),
                dialogue,
                structured,
            }
        }
    };
    Ok(ports)
}

type Providers = (Arc<dyn DialogueProvider>, Arc<dyn StructuredOutputProvider>);

fn build_providers(config: &AppConfig) -> Result<Providers, StartupError> {
    let ai = &config.ai;
    let choice = ai
        .provider_choice(config.server.environment)
        .map_err(ConfigError::from)?;

    match (choice, ai.anthropic_api_key.as_ref()) {
        (ProviderChoice::Anthropic, Some(key)) => {
            let mut anthropic = AnthropicConfig::new(key.expose_secret().clone())
                .with_model(ai.model.clone())
                .with_timeout(Duration::from_secs(ai.timeout_secs));
            if let Some(base_url) = &ai.base_url {
                anthropic = anthropic.with_base_url(base_url.clone());
            }
            let provider = Arc::new(AnthropicProvider::new(anthropic)?);
            tracing::info!(model = %ai.model, "using Anthropic provider");
            let dialogue: Arc<dyn DialogueProvider> = provider.clone();
            let structured: Arc<dyn StructuredOutputProvider> = provider;
            Ok((dialogue, structured))
        }
        _ => {
            tracing::warn!("no Anthropic key configured; using mock provider");
            let provider = Arc::new(MockAIProvider::new());
            let dialogue: Arc<dyn DialogueProvider> = provider.clone();
            let structured: Arc<dyn StructuredOutputProvider> = provider;
            Ok((dialogue, structured))
        }
    }
}
