//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod netsuite;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        "Configuração carregada: NetSuite em {} ({:?})",
        settings.netsuite.base_url,
        settings.netsuite.auth
    );

    let app_state = AppState::new(&settings).await?;

    // Cria/atualiza as tabelas espelhadas na inicialização
    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let listener = TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}

fn app(app_state: AppState) -> Router {
    let sync_routes = Router::new()
        .route("/all", post(handlers::sync::sync_all))
        .route("/status", get(handlers::sync::sync_status_all))
        .route("/{entity}", post(handlers::sync::sync_entity))
        .route("/{entity}/status", get(handlers::sync::entity_status))
        .route("/{entity}/{internal_id}", post(handlers::sync::sync_record));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/netsuite/sync", sync_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
