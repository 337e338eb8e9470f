//src/main.rs

use axum::{
    routing::{get, post, put},
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
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

fn router(app_state: AppState) -> Router {
    // Painel de área (escopo pelo cabeçalho X-Area)
    let projeto_routes = Router::new()
        .route("/"
               ,post(handlers::projetos::create_projeto)
               .get(handlers::projetos::list_projetos)
        )
        .route("/painel", get(handlers::projetos::get_painel_area))
        .route("/{id}", get(handlers::projetos::get_projeto))
        .route("/{id}/pedido"
               ,put(handlers::projetos::put_pedido)
               .delete(handlers::projetos::delete_pedido)
        )
        .route("/{id}/transicao", post(handlers::projetos::transition_projeto));

    // Painel do diretor (somente leitura)
    let diretor_routes = Router::new()
        .route("/painel", get(handlers::dashboard::get_painel))
        .route("/pedidos/{id_pedido}", get(handlers::dashboard::get_pedido))
        .route("/areas", get(handlers::dashboard::get_areas));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/projetos", projeto_routes)
        .nest("/api/diretor", diretor_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new().await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, router(app_state)).await?;
    Ok(())
}
