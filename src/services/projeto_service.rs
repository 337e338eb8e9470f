// src/services/projeto_service.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::ProjetoRepository,
    models::projeto::{
        CriarProjetoPayload, Fase, MovimentacaoHistorico, Projeto, RegistrarPedidoPayload,
        TipoMovimentacao, TransicaoFasePayload,
    },
};

// Escritas do painel de área. O painel do diretor nunca passa por aqui.
#[derive(Clone)]
pub struct ProjetoService {
    repo: ProjetoRepository,
}

impl ProjetoService {
    pub fn new(repo: ProjetoRepository) -> Self {
        Self { repo }
    }

    // --- LEITURA ---

    pub async fn listar_por_area<'e, E>(&self, executor: E, area: &str) -> Result<Vec<Projeto>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_by_area(executor, area).await
    }

    pub async fn buscar<'e, E>(&self, executor: E, area: &str, id: i32) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find(executor, area, id)
            .await?
            .ok_or_else(|| AppError::ProjetoNaoEncontrado { area: area.to_string(), id })
    }

    // --- ESCRITA ---

    pub async fn criar<'e, E>(
        &self,
        executor: E,
        area: &str,
        payload: &CriarProjetoPayload,
    ) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let fase = payload.fase.unwrap_or(Fase::Planejamento);
        let historico = vec![MovimentacaoHistorico {
            registrado_em: Utc::now(),
            tipo: TipoMovimentacao::Criacao,
            de: None,
            para: Some(fase.as_str().to_string()),
            observacao: None,
        }];

        // Criações concorrentes na mesma área esperam a vez: cada uma vê o MAX(id) já gravado.
        let mut tx = executor.begin().await?;
        self.repo.lock_area(&mut *tx, area).await?;

        let projeto = self
            .repo
            .create(&mut *tx, area, payload.titulo.trim(), fase, &historico)
            .await?;
        tx.commit().await?;

        tracing::info!(area = %projeto.area, id = projeto.id, "Projeto criado");
        Ok(projeto)
    }

    pub async fn registrar_pedido<'e, E>(
        &self,
        executor: E,
        area: &str,
        id: i32,
        payload: &RegistrarPedidoPayload,
    ) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.atualizar(executor, area, id, |projeto| {
            aplicar_pedido(projeto, payload, Utc::now());
            Ok(())
        })
        .await
    }

    pub async fn remover_pedido<'e, E>(&self, executor: E, area: &str, id: i32) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.atualizar(executor, area, id, |projeto| {
            limpar_pedido(projeto, Utc::now());
            Ok(())
        })
        .await
    }

    pub async fn transicionar_fase<'e, E>(
        &self,
        executor: E,
        area: &str,
        id: i32,
        payload: &TransicaoFasePayload,
    ) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.atualizar(executor, area, id, |projeto| {
            aplicar_transicao(projeto, payload.fase, payload.observacao.clone(), Utc::now())
        })
        .await
    }

    // Lê com FOR UPDATE, aplica a mudança em memória e grava, tudo numa transação.
    async fn atualizar<'e, E, F>(&self, executor: E, area: &str, id: i32, mudanca: F) -> Result<Projeto, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
        F: FnOnce(&mut Projeto) -> Result<(), AppError>,
    {
        let mut tx = executor.begin().await?;

        let mut projeto = self
            .repo
            .find_for_update(&mut *tx, area, id)
            .await?
            .ok_or_else(|| AppError::ProjetoNaoEncontrado { area: area.to_string(), id })?;

        mudanca(&mut projeto)?;

        let salvo = self.repo.save(&mut *tx, &projeto).await?;
        tx.commit().await?;

        tracing::info!(
            area = %salvo.area,
            id = salvo.id,
            fase = salvo.fase.as_str(),
            pedido = ?salvo.status_pedido_diretor,
            "Projeto atualizado"
        );
        Ok(salvo)
    }
}

// =============================================================================
//  Mudanças puras sobre o projeto (o histórico só cresce)
// =============================================================================

fn texto_opcional(valor: Option<&str>) -> Option<String> {
    valor.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn aplicar_pedido(projeto: &mut Projeto, payload: &RegistrarPedidoPayload, agora: DateTime<Utc>) {
    let novo_status = payload.status_pedido.trim().to_string();

    projeto.historico_movimentacao.push(MovimentacaoHistorico {
        registrado_em: agora,
        tipo: TipoMovimentacao::PedidoDiretor,
        de: projeto.status_pedido_diretor.clone(),
        para: Some(novo_status.clone()),
        observacao: texto_opcional(payload.descricao_pedido.as_deref()),
    });

    projeto.status_pedido_diretor = Some(novo_status);
    projeto.descricao_pedido_diretor = texto_opcional(payload.descricao_pedido.as_deref());
    projeto.prazo_resposta = payload.prazo_resposta;
}

// Sem "lápide": o pedido some da próxima consolidação.
pub fn limpar_pedido(projeto: &mut Projeto, agora: DateTime<Utc>) {
    if projeto.status_pedido_diretor.is_none() {
        return;
    }

    projeto.historico_movimentacao.push(MovimentacaoHistorico {
        registrado_em: agora,
        tipo: TipoMovimentacao::PedidoDiretor,
        de: projeto.status_pedido_diretor.take(),
        para: None,
        observacao: None,
    });

    projeto.descricao_pedido_diretor = None;
    projeto.prazo_resposta = None;
}

pub fn aplicar_transicao(
    projeto: &mut Projeto,
    nova_fase: Fase,
    observacao: Option<String>,
    agora: DateTime<Utc>,
) -> Result<(), AppError> {
    let atual = projeto.fase;
    if atual.e_terminal() || atual == nova_fase {
        return Err(AppError::TransicaoInvalida { de: atual.as_str(), para: nova_fase.as_str() });
    }

    projeto.historico_movimentacao.push(MovimentacaoHistorico {
        registrado_em: agora,
        tipo: TipoMovimentacao::Fase,
        de: Some(atual.as_str().to_string()),
        para: Some(nova_fase.as_str().to_string()),
        observacao: texto_opcional(observacao.as_deref()),
    });
    projeto.fase = nova_fase;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dashboard::normalizar_area;
    use chrono::NaiveDate;
    use sqlx::postgres::PgPoolOptions;
    use tokio::task::JoinSet;

    fn projeto() -> Projeto {
        Projeto {
            id: 7,
            area: "RH".into(),
            titulo: "Capacitação".into(),
            fase: Fase::Planejamento,
            status_pedido_diretor: None,
            descricao_pedido_diretor: None,
            prazo_resposta: None,
            historico_movimentacao: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload(status: &str, prazo: Option<NaiveDate>) -> RegistrarPedidoPayload {
        RegistrarPedidoPayload {
            status_pedido: status.into(),
            descricao_pedido: Some("  Enviar cronograma  ".into()),
            prazo_resposta: prazo,
        }
    }

    #[test]
    fn registrar_pedido_copia_campos_e_registra_historico() {
        let mut p = projeto();
        let prazo = NaiveDate::from_ymd_opt(2025, 4, 30);

        aplicar_pedido(&mut p, &payload(" Pendente ", prazo), Utc::now());

        assert_eq!(p.status_pedido_diretor.as_deref(), Some("Pendente"));
        assert_eq!(p.descricao_pedido_diretor.as_deref(), Some("Enviar cronograma"));
        assert_eq!(p.prazo_resposta, prazo);
        assert_eq!(p.historico_movimentacao.len(), 1);
        assert_eq!(p.historico_movimentacao[0].tipo, TipoMovimentacao::PedidoDiretor);
        assert_eq!(p.historico_movimentacao[0].de, None);
        assert_eq!(p.historico_movimentacao[0].para.as_deref(), Some("Pendente"));
    }

    #[test]
    fn mudar_status_guarda_o_anterior() {
        let mut p = projeto();
        aplicar_pedido(&mut p, &payload("Pendente", None), Utc::now());
        aplicar_pedido(&mut p, &payload("Em andamento", None), Utc::now());

        let ultimo = p.historico_movimentacao.last().unwrap();
        assert_eq!(ultimo.de.as_deref(), Some("Pendente"));
        assert_eq!(ultimo.para.as_deref(), Some("Em andamento"));
        assert_eq!(p.historico_movimentacao.len(), 2);
    }

    #[test]
    fn remover_pedido_limpa_campos() {
        let mut p = projeto();
        aplicar_pedido(&mut p, &payload("Pendente", NaiveDate::from_ymd_opt(2025, 4, 30)), Utc::now());

        limpar_pedido(&mut p, Utc::now());

        assert!(!p.tem_pedido_diretor());
        assert_eq!(p.descricao_pedido_diretor, None);
        assert_eq!(p.prazo_resposta, None);
        assert_eq!(p.historico_movimentacao.len(), 2);
        assert_eq!(p.historico_movimentacao[1].de.as_deref(), Some("Pendente"));
    }

    #[test]
    fn remover_sem_pedido_nao_mexe_no_historico() {
        let mut p = projeto();
        limpar_pedido(&mut p, Utc::now());
        assert!(p.historico_movimentacao.is_empty());
    }

    #[test]
    fn transicao_registra_fase_anterior() {
        let mut p = projeto();
        aplicar_transicao(&mut p, Fase::Execucao, Some("Orçamento aprovado".into()), Utc::now()).unwrap();

        assert_eq!(p.fase, Fase::Execucao);
        let mov = &p.historico_movimentacao[0];
        assert_eq!(mov.tipo, TipoMovimentacao::Fase);
        assert_eq!(mov.de.as_deref(), Some("planejamento"));
        assert_eq!(mov.para.as_deref(), Some("execucao"));
        assert_eq!(mov.observacao.as_deref(), Some("Orçamento aprovado"));
    }

    #[test]
    fn fase_terminal_nao_muda_mais() {
        let mut p = projeto();
        aplicar_transicao(&mut p, Fase::Suspenso, None, Utc::now()).unwrap();

        let erro = aplicar_transicao(&mut p, Fase::Execucao, None, Utc::now()).unwrap_err();
        assert!(matches!(erro, AppError::TransicaoInvalida { de: "suspenso", para: "execucao" }));
        assert_eq!(p.fase, Fase::Suspenso);
        assert_eq!(p.historico_movimentacao.len(), 1);
    }

    #[test]
    fn transicao_para_mesma_fase_e_rejeitada() {
        let mut p = projeto();
        assert!(aplicar_transicao(&mut p, Fase::Planejamento, None, Utc::now()).is_err());
        assert!(p.historico_movimentacao.is_empty());
    }

    // Precisa de um Postgres (DATABASE_URL); sem banco acessível, não há o que verificar.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn criacoes_simultaneas_na_mesma_area_recebem_ids_seguidos() {
        let Ok(url) = std::env::var("DATABASE_URL") else { return };
        let Ok(pool) = PgPoolOptions::new().max_connections(8).connect(&url).await else { return };
        sqlx::migrate!().run(&pool).await.unwrap();

        let area = format!("Concorrência {}", Utc::now().timestamp_micros());
        let service = ProjetoService::new(ProjetoRepository::new());

        let mut tarefas = JoinSet::new();
        for i in 0..8 {
            let (service, pool) = (service.clone(), pool.clone());
            // mesma área, grafias diferentes
            let area = if i % 2 == 0 { area.clone() } else { area.to_uppercase() };
            tarefas.spawn(async move {
                let payload = CriarProjetoPayload { titulo: format!("Projeto {i}"), fase: None };
                service.criar(&pool, &area, &payload).await
            });
        }

        let mut criados = Vec::new();
        while let Some(resultado) = tarefas.join_next().await {
            criados.push(resultado.unwrap().unwrap());
        }

        let mut ids: Vec<i32> = criados.iter().map(|p| p.id).collect();
        ids.sort();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
        assert!(criados.iter().all(|p| p.area == criados[0].area));

        let listados = service.listar_por_area(&pool, &area.to_lowercase()).await.unwrap();
        assert_eq!(listados.len(), 8);
        assert!(service.buscar(&pool, &area.to_uppercase(), 8).await.is_ok());

        sqlx::query("DELETE FROM projetos WHERE area_chave = $1")
            .bind(normalizar_area(&area))
            .execute(&pool)
            .await
            .unwrap();
    }
}
