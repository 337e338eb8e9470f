// src/services/dashboard_service.rs

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    config::RegrasPainel,
    db::ProjetoRepository,
    models::{
        dashboard::{DetalhePedido, FiltroPedidos, PainelArea, PainelDiretor, PedidoConsolidado, PedidoId},
        projeto::Projeto,
    },
    services::consolidacao,
};

// Leitura dos dois painéis. Tudo é recalculado a cada chamada: nada daqui é
// gravado e nada é reaproveitado entre datas de referência.
#[derive(Clone)]
pub struct DashboardService {
    repo: ProjetoRepository,
    regras: RegrasPainel,
}

impl DashboardService {
    pub fn new(repo: ProjetoRepository, regras: RegrasPainel) -> Self {
        Self { repo, regras }
    }

    // Falha ao ler a fonte vira "sem dados", nunca um painel zerado.
    fn fonte_indisponivel(erro: AppError) -> AppError {
        match erro {
            AppError::DatabaseError(e) => AppError::DadosIndisponiveis(e),
            outro => outro,
        }
    }

    fn consolidar_com_aviso(projetos: &[Projeto]) -> Vec<PedidoConsolidado> {
        let malformados = consolidacao::contar_malformados(projetos);
        if malformados > 0 {
            tracing::warn!(malformados, "Projetos malformados ignorados na consolidação");
        }
        consolidacao::consolidar(projetos)
    }

    pub async fn painel_diretor<'e, E>(
        &self,
        executor: E,
        filtro: &FiltroPedidos,
        hoje: NaiveDate,
    ) -> Result<PainelDiretor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projetos = self.repo.list_all(executor).await.map_err(Self::fonte_indisponivel)?;
        let pedidos = Self::consolidar_com_aviso(&projetos);

        let estatisticas = consolidacao::agregar(&pedidos, hoje, &self.regras);
        let areas: BTreeSet<String> = pedidos.iter().map(|p| p.area().to_string()).collect();
        let visiveis = consolidacao::filtrar_e_ordenar(&pedidos, filtro, hoje, &self.regras);

        tracing::debug!(
            total = estatisticas.total,
            visiveis = visiveis.len(),
            %hoje,
            "Painel do diretor consolidado"
        );

        Ok(PainelDiretor {
            data_referencia: hoje,
            estatisticas,
            pedidos: consolidacao::classificar_todos(visiveis, hoje, &self.regras),
            areas: areas.into_iter().collect(),
        })
    }

    pub async fn detalhe_pedido<'e, E>(
        &self,
        executor: E,
        id_pedido: &str,
        hoje: NaiveDate,
    ) -> Result<DetalhePedido, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let chave: PedidoId = id_pedido.parse()?;

        let projeto = self
            .repo
            .find_by_pedido(executor, &chave)
            .await
            .map_err(Self::fonte_indisponivel)?
            .ok_or_else(|| AppError::PedidoNaoEncontrado(chave.to_string()))?;

        // O projeto pode ter perdido o pedido desde a última consolidação.
        let pedido = PedidoConsolidado::projetar(&projeto)
            .ok_or_else(|| AppError::PedidoNaoEncontrado(chave.to_string()))?;

        Ok(DetalhePedido {
            pedido: consolidacao::classificar_pedido(pedido, hoje, &self.regras),
            projeto,
        })
    }

    pub async fn painel_area<'e, E>(&self, executor: E, area: &str, hoje: NaiveDate) -> Result<PainelArea, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projetos = self
            .repo
            .list_by_area(executor, area)
            .await
            .map_err(Self::fonte_indisponivel)?;

        let pedidos = Self::consolidar_com_aviso(&projetos);
        let estatisticas = consolidacao::agregar(&pedidos, hoje, &self.regras);
        let ordenados = consolidacao::ordenar_por_prioridade(pedidos, hoje, &self.regras);

        // Nome exibido é o gravado; o cabeçalho pode vir com outra grafia.
        let area = projetos.first().map_or_else(|| area.trim().to_string(), |p| p.area.clone());

        Ok(PainelArea {
            area,
            data_referencia: hoje,
            estatisticas,
            pedidos: consolidacao::classificar_todos(ordenados, hoje, &self.regras),
            projetos,
        })
    }

    pub async fn listar_areas<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_areas(executor).await.map_err(Self::fonte_indisponivel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erro_de_banco_vira_sem_dados() {
        let erro = DashboardService::fonte_indisponivel(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        assert!(matches!(erro, AppError::DadosIndisponiveis(_)));
    }

    #[test]
    fn outros_erros_passam_direto() {
        let erro = DashboardService::fonte_indisponivel(AppError::PedidoNaoEncontrado("pedido_rh_1".into()));
        assert!(matches!(erro, AppError::PedidoNaoEncontrado(_)));
    }
}
