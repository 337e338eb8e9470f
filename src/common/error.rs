// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Erro interno dos serviços e repositórios.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Identificador de pedido inválido: {0}")]
    PedidoIdInvalido(String),

    #[error("Projeto {area}/{id} não encontrado")]
    ProjetoNaoEncontrado { area: String, id: i32 },

    #[error("Pedido {0} não encontrado")]
    PedidoNaoEncontrado(String),

    #[error("Projeto já existe nesta área")]
    ProjetoDuplicado,

    #[error("Transição de fase inválida: {de} -> {para}")]
    TransicaoInvalida { de: &'static str, para: &'static str },

    // A fonte de projetos falhou: o painel mostra "sem dados", nunca zeros.
    #[error("Dados dos projetos indisponíveis")]
    DadosIndisponiveis(#[source] sqlx::Error),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// Erro que sai pela API (já traduzido).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::PedidoIdInvalido(_) => StatusCode::BAD_REQUEST,
            AppError::ProjetoNaoEncontrado { .. } | AppError::PedidoNaoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::ProjetoDuplicado | AppError::TransicaoInvalida { .. } => StatusCode::CONFLICT,
            AppError::DadosIndisponiveis(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        let status = self.status_code();

        let message = match self {
            AppError::ValidationError(_) => {
                if en { "One or more fields are invalid.".to_string() } else { "Um ou mais campos são inválidos.".to_string() }
            }
            AppError::PedidoIdInvalido(id) => {
                if en { format!("Invalid request identifier: {id}") } else { format!("Identificador de pedido inválido: {id}") }
            }
            AppError::ProjetoNaoEncontrado { area, id } => {
                if en { format!("Project {id} not found in area {area}.") } else { format!("Projeto {id} não encontrado na área {area}.") }
            }
            AppError::PedidoNaoEncontrado(id) => {
                if en { format!("Request {id} not found or no longer pending.") } else { format!("Pedido {id} não encontrado ou não está mais pendente.") }
            }
            AppError::ProjetoDuplicado => {
                if en { "A project with this id already exists in the area.".to_string() } else { "Já existe um projeto com este id na área.".to_string() }
            }
            AppError::TransicaoInvalida { de, para } => {
                if en { format!("Cannot move project from {de} to {para}.") } else { format!("Não é possível mover o projeto de {de} para {para}.") }
            }
            AppError::DadosIndisponiveis(e) => {
                tracing::error!("Fonte de projetos indisponível: {}", e);
                if en { "No data: projects could not be loaded.".to_string() } else { "Sem dados: não foi possível carregar os projetos.".to_string() }
            }
            e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                if en { "An unexpected error occurred.".to_string() } else { "Ocorreu um erro inesperado.".to_string() }
            }
        };

        let details = match self {
            AppError::ValidationError(errors) => Some(detalhes_validacao(errors)),
            _ => None,
        };

        ApiError { status, message, details }
    }
}

fn detalhes_validacao(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<Value> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
                    .into()
            })
            .collect();
        details.insert(field.to_string(), Value::Array(codes));
    }
    Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Formulario {
        #[validate(length(min = 1, message = "required"))]
        titulo: String,
    }

    #[test]
    fn mapeia_status_http() {
        assert_eq!(AppError::PedidoIdInvalido("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PedidoNaoEncontrado("pedido_rh_7".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ProjetoDuplicado.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DadosIndisponiveis(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn traduz_conforme_idioma() {
        let erro = AppError::ProjetoNaoEncontrado { area: "RH".into(), id: 7 };

        let pt = erro.to_api_error(&Locale("pt".into()));
        assert_eq!(pt.message, "Projeto 7 não encontrado na área RH.");

        let en = erro.to_api_error(&Locale("en".into()));
        assert_eq!(en.message, "Project 7 not found in area RH.");
        assert_eq!(en.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn sem_dados_nao_parece_zero_pedidos() {
        let erro = AppError::DadosIndisponiveis(sqlx::Error::PoolTimedOut).to_api_error(&Locale("pt".into()));
        assert!(erro.message.starts_with("Sem dados"));
    }

    #[test]
    fn validacao_inclui_detalhes_por_campo() {
        let errors = Formulario { titulo: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()));

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["titulo"][0], "required");
    }
}
