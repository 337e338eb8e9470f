// src/handlers/projetos.rs
//
// Painel de área: cada área só enxerga e altera os próprios projetos (X-Area).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::dashboard::data_referencia,
    middleware::{area::AreaContext, i18n::Locale},
    models::{
        dashboard::{DataReferenciaQuery, PainelArea},
        projeto::{CriarProjetoPayload, Projeto, RegistrarPedidoPayload, TransicaoFasePayload},
    },
};

// GET /api/projetos
#[utoipa::path(
    get,
    path = "/api/projetos",
    tag = "Área",
    params(("x-area" = String, Header, description = "Área dona dos projetos")),
    responses(
        (status = 200, description = "Projetos da área", body = Vec<Projeto>)
    )
)]
pub async fn list_projetos(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
) -> Result<impl IntoResponse, ApiError> {

    let projetos = app_state.projeto_service
        .listar_por_area(&app_state.db_pool, &area.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projetos)))
}

// POST /api/projetos
#[utoipa::path(
    post,
    path = "/api/projetos",
    tag = "Área",
    request_body = CriarProjetoPayload,
    params(("x-area" = String, Header, description = "Área dona dos projetos")),
    responses(
        (status = 201, description = "Projeto criado com o próximo id livre da área", body = Projeto),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_projeto(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Json(payload): Json<CriarProjetoPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let projeto = app_state.projeto_service
        .criar(&app_state.db_pool, &area.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(projeto)))
}

// GET /api/projetos/{id}
#[utoipa::path(
    get,
    path = "/api/projetos/{id}",
    tag = "Área",
    params(
        ("id" = i32, Path, description = "Id do projeto na área"),
        ("x-area" = String, Header, description = "Área dona dos projetos")
    ),
    responses(
        (status = 200, description = "Projeto com histórico", body = Projeto),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn get_projeto(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {

    let projeto = app_state.projeto_service
        .buscar(&app_state.db_pool, &area.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projeto)))
}

// PUT /api/projetos/{id}/pedido
#[utoipa::path(
    put,
    path = "/api/projetos/{id}/pedido",
    tag = "Área",
    request_body = RegistrarPedidoPayload,
    params(
        ("id" = i32, Path, description = "Id do projeto na área"),
        ("x-area" = String, Header, description = "Área dona dos projetos")
    ),
    responses(
        (status = 200, description = "Pedido do diretor registrado", body = Projeto),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn put_pedido(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Path(id): Path<i32>,
    Json(payload): Json<RegistrarPedidoPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let projeto = app_state.projeto_service
        .registrar_pedido(&app_state.db_pool, &area.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projeto)))
}

// DELETE /api/projetos/{id}/pedido
#[utoipa::path(
    delete,
    path = "/api/projetos/{id}/pedido",
    tag = "Área",
    params(
        ("id" = i32, Path, description = "Id do projeto na área"),
        ("x-area" = String, Header, description = "Área dona dos projetos")
    ),
    responses(
        (status = 200, description = "Pedido removido; some do painel do diretor", body = Projeto),
        (status = 404, description = "Projeto não encontrado")
    )
)]
pub async fn delete_pedido(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {

    let projeto = app_state.projeto_service
        .remover_pedido(&app_state.db_pool, &area.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projeto)))
}

// POST /api/projetos/{id}/transicao
#[utoipa::path(
    post,
    path = "/api/projetos/{id}/transicao",
    tag = "Área",
    request_body = TransicaoFasePayload,
    params(
        ("id" = i32, Path, description = "Id do projeto na área"),
        ("x-area" = String, Header, description = "Área dona dos projetos")
    ),
    responses(
        (status = 200, description = "Fase alterada", body = Projeto),
        (status = 409, description = "Projeto em fase terminal ou já nesta fase")
    )
)]
pub async fn transition_projeto(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Path(id): Path<i32>,
    Json(payload): Json<TransicaoFasePayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let projeto = app_state.projeto_service
        .transicionar_fase(&app_state.db_pool, &area.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(projeto)))
}

// GET /api/projetos/painel
#[utoipa::path(
    get,
    path = "/api/projetos/painel",
    tag = "Área",
    params(
        ("x-area" = String, Header, description = "Área dona dos projetos"),
        DataReferenciaQuery
    ),
    responses(
        (status = 200, description = "Cabeçalho da área e pedidos classificados", body = PainelArea),
        (status = 503, description = "Sem dados: a fonte de projetos não respondeu")
    )
)]
pub async fn get_painel_area(
    State(app_state): State<AppState>,
    locale: Locale,
    area: AreaContext,
    Query(referencia): Query<DataReferenciaQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let hoje = data_referencia(&referencia);

    let painel = app_state.dashboard_service
        .painel_area(&app_state.db_pool, &area.0, hoje)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(painel)))
}
