// src/config.rs

use crate::{
    db::ProjetoRepository,
    services::{dashboard_service::DashboardService, projeto_service::ProjetoService},
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

const LIMIAR_AMARELO_PADRAO: i64 = 3;

// ---
// Regras do painel (vocabulário de status e limiar do alerta amarelo)
// ---
#[derive(Debug, Clone)]
pub struct RegrasPainel {
    pub limiar_amarelo_dias: i64,
    pub status_atendidos: Vec<String>,
    // Encerrados sem atendimento: contam como resolvidos (verde), não como atendidos.
    pub status_encerrados: Vec<String>,
    pub status_em_andamento: String,
}

impl Default for RegrasPainel {
    fn default() -> Self {
        Self {
            limiar_amarelo_dias: LIMIAR_AMARELO_PADRAO,
            status_atendidos: vec![
                "Atendido integralmente".to_string(),
                "Atendido parcialmente".to_string(),
            ],
            status_encerrados: vec!["Não atendido".to_string()],
            status_em_andamento: "Em andamento".to_string(),
        }
    }
}

impl RegrasPainel {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    // Separado do `env` para poder ser testado sem mexer no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut regras = Self::default();

        if let Some(valor) = lookup("PAINEL_LIMIAR_AMARELO_DIAS") {
            let dias: i64 = valor.trim().parse().map_err(|_| {
                anyhow::anyhow!("PAINEL_LIMIAR_AMARELO_DIAS inválido: {valor:?}")
            })?;
            anyhow::ensure!(dias >= 0, "PAINEL_LIMIAR_AMARELO_DIAS não pode ser negativo");
            regras.limiar_amarelo_dias = dias;
        }

        if let Some(lista) = lookup("PAINEL_STATUS_ATENDIDOS").map(|v| dividir_lista(&v)) {
            anyhow::ensure!(!lista.is_empty(), "PAINEL_STATUS_ATENDIDOS está vazio");
            regras.status_atendidos = lista;
        }

        if let Some(valor) = lookup("PAINEL_STATUS_ENCERRADOS") {
            regras.status_encerrados = dividir_lista(&valor);
        }

        if let Some(valor) = lookup("PAINEL_STATUS_EM_ANDAMENTO") {
            let valor = valor.trim();
            anyhow::ensure!(!valor.is_empty(), "PAINEL_STATUS_EM_ANDAMENTO está vazio");
            regras.status_em_andamento = valor.to_string();
        }

        Ok(regras)
    }
}

fn dividir_lista(valor: &str) -> Vec<String> {
    valor
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---
// Estado compartilhado da aplicação
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub projeto_service: ProjetoService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;

        let regras = RegrasPainel::from_env()?;
        tracing::info!(
            limiar_amarelo_dias = regras.limiar_amarelo_dias,
            status_atendidos = ?regras.status_atendidos,
            "Regras do painel carregadas"
        );

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let projeto_repo = ProjetoRepository::new();
        let projeto_service = ProjetoService::new(projeto_repo.clone());
        let dashboard_service = DashboardService::new(projeto_repo, regras);

        Ok(Self {
            db_pool,
            projeto_service,
            dashboard_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_de(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> = pares
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |chave| mapa.get(chave).cloned()
    }

    #[test]
    fn sem_variaveis_usa_padrao() {
        let regras = RegrasPainel::from_lookup(|_| None).unwrap();
        assert_eq!(regras.limiar_amarelo_dias, 3);
        assert_eq!(regras.status_atendidos.len(), 2);
        assert_eq!(regras.status_encerrados, vec!["Não atendido".to_string()]);
        assert_eq!(regras.status_em_andamento, "Em andamento");
    }

    #[test]
    fn le_limiar_e_listas() {
        let regras = RegrasPainel::from_lookup(lookup_de(&[
            ("PAINEL_LIMIAR_AMARELO_DIAS", " 5 "),
            ("PAINEL_STATUS_ATENDIDOS", "Concluído; Entregue ;"),
            ("PAINEL_STATUS_ENCERRADOS", ""),
        ]))
        .unwrap();

        assert_eq!(regras.limiar_amarelo_dias, 5);
        assert_eq!(regras.status_atendidos, vec!["Concluído", "Entregue"]);
        assert!(regras.status_encerrados.is_empty());
    }

    #[test]
    fn rejeita_limiar_invalido() {
        assert!(RegrasPainel::from_lookup(lookup_de(&[("PAINEL_LIMIAR_AMARELO_DIAS", "três")])).is_err());
        assert!(RegrasPainel::from_lookup(lookup_de(&[("PAINEL_LIMIAR_AMARELO_DIAS", "-1")])).is_err());
    }

    #[test]
    fn rejeita_lista_de_atendidos_vazia() {
        assert!(RegrasPainel::from_lookup(lookup_de(&[("PAINEL_STATUS_ATENDIDOS", " ; ")])).is_err());
    }
}
