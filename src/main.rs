//! Support chat server entry point.

use std::error::Error;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use support_chat::adapters::ai::{
    FailoverAIProvider, OpenAIEmbeddings, OpenAIEmbeddingsConfig, OpenAIProvider,
};
use support_chat::adapters::crm::{Bitrix24Gateway, DisabledCrmGateway};
use support_chat::adapters::http::{app_router, AppState, HttpSettings};
use support_chat::adapters::knowledge::QdrantIndex;
use support_chat::adapters::postgres::{
    PostgresContactRepository, PostgresDocumentRepository, PostgresMessageRepository,
};
use support_chat::application::{
    ConversationState, KnowledgeBase, KnowledgeRetriever, LeadForwarder, ResponseOrchestrator,
    TurnSettings,
};
use support_chat::config::AppConfig;
use support_chat::domain::extraction::EntityExtractor;
use support_chat::ports::{AIProvider, CrmGateway, EmbeddingProvider, VectorIndex};

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let contacts = Arc::new(PostgresContactRepository::new(pool.clone()));
    let messages = Arc::new(PostgresMessageRepository::new(pool.clone()));
    let documents = Arc::new(PostgresDocumentRepository::new(pool));

    let retrieval = &config.retrieval;
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAIEmbeddings::new(
        OpenAIEmbeddingsConfig::new(config.ai.openai_api_key.expose_secret().clone())
            .with_model(retrieval.embedding_model.clone(), retrieval.embedding_dimensions)
            .with_base_url(config.ai.base_url.clone()),
    ));
    let index: Arc<dyn VectorIndex> = Arc::new(QdrantIndex::new(retrieval.qdrant())?);
    let retriever = Arc::new(
        KnowledgeRetriever::new(embedder.clone(), index.clone())
            .with_policy(retrieval.ranking_policy()),
    );
    let knowledge = Arc::new(
        KnowledgeBase::new(embedder, index, documents, retriever.clone())
            .with_chunking(retrieval.chunking_policy()),
    );

    let orchestrator = ResponseOrchestrator::new(
        Arc::new(ConversationState::new(contacts.clone(), messages.clone())),
        Arc::new(EntityExtractor::new(config.extraction.vocabulary())),
        retriever,
        build_ai_provider(&config)?,
        Arc::new(LeadForwarder::new(build_crm_gateway(&config)?)),
    )
    .with_settings(TurnSettings {
        top_k: retrieval.top_k,
        score_threshold: retrieval.score_threshold,
        temperature: config.ai.temperature,
        max_tokens: config.ai.max_tokens,
        apology: config.ai.apology.clone(),
        ..TurnSettings::default()
    })
    .with_prompts(config.ai.prompts());

    let state = AppState::new(Arc::new(orchestrator), contacts, messages, knowledge);
    let app = app_router(
        state,
        &HttpSettings {
            cors_origins: config.server.cors_origins_list(),
            request_timeout: config.server.request_timeout(),
        },
    );

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, environment = ?config.server.environment, "support chat listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Proxied primary with a direct fallback when a proxy is configured.
fn build_ai_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, BoxError> {
    let direct = OpenAIProvider::new(config.ai.direct_provider_config())?;
    if !config.ai.has_proxy() {
        return Ok(Arc::new(direct));
    }

    let proxied = OpenAIProvider::new(config.ai.primary_provider_config())?;
    tracing::info!("model calls go through the configured proxy with a direct fallback");
    Ok(Arc::new(FailoverAIProvider::new(proxied).with_fallback(direct)))
}

fn build_crm_gateway(config: &AppConfig) -> Result<Arc<dyn CrmGateway>, BoxError> {
    match config.crm.webhook() {
        Some(webhook) => Ok(Arc::new(Bitrix24Gateway::new(webhook, config.crm.timeout())?)),
        None => {
            tracing::warn!("no CRM webhook configured, leads will not be forwarded");
            Ok(Arc::new(DisabledCrmGateway))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
