// src/handlers/dashboard.rs
//
// Painel do diretor: somente leitura. Tudo sai da consolidação recalculada.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::{DataReferenciaQuery, DetalhePedido, FiltroPedidos, PainelDiretor},
};

// "Hoje" é lido uma vez por requisição e repassado ao motor.
pub(crate) fn data_referencia(query: &DataReferenciaQuery) -> NaiveDate {
    query
        .data_referencia
        .unwrap_or_else(|| Local::now().date_naive())
}

// GET /api/diretor/painel
#[utoipa::path(
    get,
    path = "/api/diretor/painel",
    tag = "Diretor",
    params(FiltroPedidos, DataReferenciaQuery),
    responses(
        (status = 200, description = "Estatísticas do conjunto completo e pedidos filtrados, mais urgentes primeiro", body = PainelDiretor),
        (status = 503, description = "Sem dados: a fonte de projetos não respondeu")
    )
)]
pub async fn get_painel(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filtro): Query<FiltroPedidos>,
    Query(referencia): Query<DataReferenciaQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let hoje = data_referencia(&referencia);

    let painel = app_state.dashboard_service
        .painel_diretor(&app_state.db_pool, &filtro, hoje)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(painel)))
}

// GET /api/diretor/pedidos/{id_pedido}
#[utoipa::path(
    get,
    path = "/api/diretor/pedidos/{id_pedido}",
    tag = "Diretor",
    params(
        ("id_pedido" = String, Path, description = "Chave do pedido (pedido_{area}_{id})", example = "pedido_rh_7"),
        DataReferenciaQuery
    ),
    responses(
        (status = 200, description = "Pedido classificado e o projeto de origem", body = DetalhePedido),
        (status = 400, description = "Chave de pedido inválida"),
        (status = 404, description = "Pedido inexistente ou não mais pendente")
    )
)]
pub async fn get_pedido(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id_pedido): Path<String>,
    Query(referencia): Query<DataReferenciaQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let hoje = data_referencia(&referencia);

    let detalhe = app_state.dashboard_service
        .detalhe_pedido(&app_state.db_pool, &id_pedido, hoje)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detalhe)))
}

// GET /api/diretor/areas
#[utoipa::path(
    get,
    path = "/api/diretor/areas",
    tag = "Diretor",
    responses(
        (status = 200, description = "Áreas com projetos cadastrados", body = Vec<String>)
    )
)]
pub async fn get_areas(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {

    let areas = app_state.dashboard_service
        .listar_areas(&app_state.db_pool)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(areas)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_informada_tem_precedencia() {
        let dia = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let query = DataReferenciaQuery { data_referencia: Some(dia) };
        assert_eq!(data_referencia(&query), dia);
    }
}
