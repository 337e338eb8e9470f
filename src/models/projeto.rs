// src/models/projeto.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fase_projeto", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Fase {
    Planejamento,
    Execucao,
    Concluido,
    Suspenso,
}

impl Fase {
    /// Projetos concluídos ou suspensos não mudam mais de fase.
    pub fn e_terminal(self) -> bool {
        matches!(self, Fase::Concluido | Fase::Suspenso)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Fase::Planejamento => "planejamento",
            Fase::Execucao => "execucao",
            Fase::Concluido => "concluido",
            Fase::Suspenso => "suspenso",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipoMovimentacao {
    Criacao,
    Fase,
    PedidoDiretor,
}

// --- Histórico ---

// Uma linha do histórico (append-only, gravado como JSONB)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovimentacaoHistorico {
    pub registrado_em: DateTime<Utc>,
    pub tipo: TipoMovimentacao,
    #[schema(example = "planejamento")]
    pub de: Option<String>,
    #[schema(example = "execucao")]
    pub para: Option<String>,
    #[schema(example = "Orçamento aprovado")]
    pub observacao: Option<String>,
}

// --- Projeto (fonte de verdade) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Projeto {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "RH")]
    pub area: String,
    #[schema(example = "Programa de capacitação de servidores")]
    pub titulo: String,
    pub fase: Fase,
    #[schema(example = "Pendente")]
    pub status_pedido_diretor: Option<String>,
    #[schema(example = "Enviar cronograma revisado")]
    pub descricao_pedido_diretor: Option<String>,
    pub prazo_resposta: Option<NaiveDate>,
    #[sqlx(json)]
    pub historico_movimentacao: Vec<MovimentacaoHistorico>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Projeto {
    /// Um pedido só existe se o status vier preenchido.
    pub fn tem_pedido_diretor(&self) -> bool {
        self.status_pedido_diretor
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Registros legados sem área ou com id inválido não entram na consolidação.
    pub fn e_malformado(&self) -> bool {
        self.area.trim().is_empty() || self.id <= 0
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CriarProjetoPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Programa de capacitação de servidores")]
    pub titulo: String,

    pub fase: Option<Fase>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistrarPedidoPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Pendente")]
    pub status_pedido: String,

    #[schema(example = "Enviar cronograma revisado")]
    pub descricao_pedido: Option<String>,

    #[schema(example = "2025-04-30")]
    pub prazo_resposta: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransicaoFasePayload {
    pub fase: Fase,

    #[validate(length(max = 500, message = "too_long"))]
    pub observacao: Option<String>,
}
