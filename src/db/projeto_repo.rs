// src/db/projeto_repo.rs

use sqlx::{types::Json, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{normalizar_area, PedidoId},
        projeto::{Fase, MovimentacaoHistorico, Projeto},
    },
};

// Repositório da fonte de verdade: a tabela 'projetos'.
// Sem pool próprio: quem chama decide o executor (pool, conexão ou transação).
// A área é sempre comparada por 'area_chave' (normalizar_area), nunca pelo texto exibido.
#[derive(Clone, Default)]
pub struct ProjetoRepository;

impl ProjetoRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projetos = sqlx::query_as::<_, Projeto>("SELECT * FROM projetos ORDER BY area_chave, id")
            .fetch_all(executor)
            .await?;

        Ok(projetos)
    }

    pub async fn list_by_area<'e, E>(&self, executor: E, area: &str) -> Result<Vec<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projetos = sqlx::query_as::<_, Projeto>(
            "SELECT * FROM projetos WHERE area_chave = $1 ORDER BY id",
        )
            .bind(normalizar_area(area))
            .fetch_all(executor)
            .await?;

        Ok(projetos)
    }

    pub async fn list_areas<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let areas: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT area FROM projetos ORDER BY area")
            .fetch_all(executor)
            .await?;

        Ok(areas.into_iter().map(|(area,)| area).collect())
    }

    pub async fn find<'e, E>(&self, executor: E, area: &str, id: i32) -> Result<Option<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projeto = sqlx::query_as::<_, Projeto>("SELECT * FROM projetos WHERE area_chave = $1 AND id = $2")
            .bind(normalizar_area(area))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(projeto)
    }

    // Trava a linha até o fim da transação (escritas do painel de área)
    pub async fn find_for_update<'e, E>(&self, executor: E, area: &str, id: i32) -> Result<Option<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projeto = sqlx::query_as::<_, Projeto>(
            "SELECT * FROM projetos WHERE area_chave = $1 AND id = $2 FOR UPDATE",
        )
            .bind(normalizar_area(area))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(projeto)
    }

    // Caminho inverso da chave pedido_{area}_{id}: a área da chave já é a area_chave
    pub async fn find_by_pedido<'e, E>(&self, executor: E, pedido_id: &PedidoId) -> Result<Option<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projeto = sqlx::query_as::<_, Projeto>(
            "SELECT * FROM projetos WHERE area_chave = $1 AND id = $2",
        )
            .bind(pedido_id.area())
            .bind(pedido_id.projeto_id())
            .fetch_optional(executor)
            .await?;

        Ok(projeto)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    // Serializa as criações de uma área (MAX(id) + 1) até o fim da transação.
    pub async fn lock_area<'e, E>(&self, executor: E, area: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(normalizar_area(area))
            .execute(executor)
            .await?;

        Ok(())
    }

    // Chamar dentro da transação que já passou por lock_area.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        area: &str,
        titulo: &str,
        fase: Fase,
        historico: &[MovimentacaoHistorico],
    ) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Próximo id livre da área. Uma área já existente mantém o nome
        // exibido do primeiro cadastro ("RH" e "rh" são a mesma área).
        sqlx::query_as::<_, Projeto>(
            r#"
            INSERT INTO projetos (area, area_chave, id, titulo, fase, historico_movimentacao)
            SELECT COALESCE(MIN(area), $1), $2, COALESCE(MAX(id), 0) + 1, $3, $4, $5
            FROM projetos
            WHERE area_chave = $2
            RETURNING *
            "#,
        )
            .bind(area.trim())
            .bind(normalizar_area(area))
            .bind(titulo)
            .bind(fase)
            .bind(Json(historico))
            .fetch_one(executor)
            .await
            .map_err(erro_de_insercao)
    }

    pub async fn save<'e, E>(&self, executor: E, projeto: &Projeto) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let atualizado = sqlx::query_as::<_, Projeto>(
            r#"
            UPDATE projetos SET
                titulo = $3,
                fase = $4,
                status_pedido_diretor = $5,
                descricao_pedido_diretor = $6,
                prazo_resposta = $7,
                historico_movimentacao = $8,
                updated_at = NOW()
            WHERE area_chave = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(normalizar_area(&projeto.area))
            .bind(projeto.id)
            .bind(&projeto.titulo)
            .bind(projeto.fase)
            .bind(&projeto.status_pedido_diretor)
            .bind(&projeto.descricao_pedido_diretor)
            .bind(projeto.prazo_resposta)
            .bind(Json(&projeto.historico_movimentacao))
            .fetch_one(executor)
            .await?;

        Ok(atualizado)
    }
}

// Com a área travada, violação de unicidade só acontece num conflito real.
fn erro_de_insercao(e: sqlx::Error) -> AppError {
    let duplicado = e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation());
    if duplicado {
        AppError::ProjetoDuplicado
    } else {
        AppError::DatabaseError(e)
    }
}
