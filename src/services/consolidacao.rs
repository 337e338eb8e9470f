// src/services/consolidacao.rs
//
// Motor puro dos painéis: Projeto -> PedidoConsolidado -> alerta, filtro,
// ordenação e estatísticas. Sem I/O e sem relógio: a data de referência
// (`hoje`) sempre chega como parâmetro.

use chrono::NaiveDate;

use crate::{
    config::RegrasPainel,
    models::{
        dashboard::{
            AvaliacaoAlerta, EstatisticasPedidos, FiltroPedidos, PedidoClassificado,
            PedidoConsolidado, StatusAlerta,
        },
        projeto::Projeto,
    },
};

const FILTRO_TODOS_STATUS: &str = "Todos";
const FILTRO_TODAS_AREAS: &str = "Todas";

// =============================================================================
//  1. CONSOLIDAÇÃO
// =============================================================================

/// Gera um pedido para cada projeto com pedido do diretor pendente.
/// Registros malformados são ignorados; a saída é sempre um vetor novo.
pub fn consolidar(projetos: &[Projeto]) -> Vec<PedidoConsolidado> {
    projetos.iter().filter_map(PedidoConsolidado::projetar).collect()
}

pub fn contar_malformados(projetos: &[Projeto]) -> usize {
    projetos.iter().filter(|p| p.e_malformado()).count()
}

// =============================================================================
//  2. CLASSIFICAÇÃO DE ALERTA
// =============================================================================

fn mesmo_status(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn e_atendido(status: &str, regras: &RegrasPainel) -> bool {
    regras.status_atendidos.iter().any(|s| mesmo_status(s, status))
}

/// Status desconhecidos nunca são tratados como encerrados.
pub fn e_status_terminal(status: &str, regras: &RegrasPainel) -> bool {
    e_atendido(status, regras) || regras.status_encerrados.iter().any(|s| mesmo_status(s, status))
}

pub fn e_em_andamento(status: &str, regras: &RegrasPainel) -> bool {
    mesmo_status(&regras.status_em_andamento, status)
}

pub fn avaliar(pedido: &PedidoConsolidado, hoje: NaiveDate, regras: &RegrasPainel) -> AvaliacaoAlerta {
    let dias_restantes = pedido
        .prazo_resposta()
        .map(|prazo| prazo.signed_duration_since(hoje).num_days());

    let status = if e_status_terminal(pedido.status_pedido(), regras) {
        StatusAlerta::Verde
    } else {
        match dias_restantes {
            None => StatusAlerta::Neutro,
            Some(d) if d < 0 => StatusAlerta::Vermelho,
            Some(d) if d <= regras.limiar_amarelo_dias => StatusAlerta::Amarelo,
            Some(_) => StatusAlerta::Neutro,
        }
    };

    AvaliacaoAlerta { status, dias_restantes }
}

pub fn classificar(pedido: &PedidoConsolidado, hoje: NaiveDate, regras: &RegrasPainel) -> StatusAlerta {
    avaliar(pedido, hoje, regras).status
}

pub fn formatar_dias_restantes(avaliacao: &AvaliacaoAlerta) -> String {
    if avaliacao.status == StatusAlerta::Verde {
        return "Respondido".to_string();
    }

    match avaliacao.dias_restantes {
        None => "Sem prazo".to_string(),
        Some(-1) => "Atrasado há 1 dia".to_string(),
        Some(d) if d < 0 => format!("Atrasado há {} dias", -d),
        Some(0) => "Vence hoje".to_string(),
        Some(1) => "Vence amanhã".to_string(),
        Some(d) => format!("Faltam {d} dias"),
    }
}

pub fn icone_alerta(status: StatusAlerta) -> &'static str {
    match status {
        StatusAlerta::Vermelho => "🔴",
        StatusAlerta::Amarelo => "🟡",
        StatusAlerta::Neutro => "⚪",
        StatusAlerta::Verde => "🟢",
    }
}

pub fn classificar_pedido(pedido: PedidoConsolidado, hoje: NaiveDate, regras: &RegrasPainel) -> PedidoClassificado {
    let avaliacao = avaliar(&pedido, hoje, regras);
    PedidoClassificado {
        rotulo_prazo: formatar_dias_restantes(&avaliacao),
        icone: icone_alerta(avaliacao.status).to_string(),
        alerta: avaliacao.status,
        dias_restantes: avaliacao.dias_restantes,
        pedido,
    }
}

pub fn classificar_todos(
    pedidos: Vec<PedidoConsolidado>,
    hoje: NaiveDate,
    regras: &RegrasPainel,
) -> Vec<PedidoClassificado> {
    pedidos
        .into_iter()
        .map(|p| classificar_pedido(p, hoje, regras))
        .collect()
}

// =============================================================================
//  3. FILTRO E ORDENAÇÃO
// =============================================================================

// Valor ausente, vazio ou o curinga da tela = sem filtro
fn criterio<'a>(valor: Option<&'a str>, curinga: &str) -> Option<&'a str> {
    valor.filter(|v| !v.trim().is_empty() && *v != curinga)
}

fn contem_texto(pedido: &PedidoConsolidado, termo: &str) -> bool {
    let termo = termo.to_lowercase();
    [Some(pedido.projeto()), pedido.descricao_pedido(), Some(pedido.area())]
        .into_iter()
        .flatten()
        .any(|campo| campo.to_lowercase().contains(&termo))
}

pub fn filtrar(pedidos: &[PedidoConsolidado], filtro: &FiltroPedidos) -> Vec<PedidoConsolidado> {
    let status = criterio(filtro.status.as_deref(), FILTRO_TODOS_STATUS);
    let area = criterio(filtro.area.as_deref(), FILTRO_TODAS_AREAS);
    let texto = filtro.texto.as_deref().map(str::trim).filter(|t| !t.is_empty());

    pedidos
        .iter()
        .filter(|p| status.is_none_or(|s| p.status_pedido() == s))
        .filter(|p| area.is_none_or(|a| p.area() == a))
        .filter(|p| texto.is_none_or(|t| contem_texto(p, t)))
        .cloned()
        .collect()
}

/// Ordena do mais urgente para o menos urgente. `sort_by_key` é estável,
/// então empates mantêm a ordem de entrada.
pub fn ordenar_por_prioridade(
    pedidos: Vec<PedidoConsolidado>,
    hoje: NaiveDate,
    regras: &RegrasPainel,
) -> Vec<PedidoConsolidado> {
    let mut com_prioridade: Vec<(u8, PedidoConsolidado)> = pedidos
        .into_iter()
        .map(|p| (classificar(&p, hoje, regras).prioridade(), p))
        .collect();

    com_prioridade.sort_by_key(|(prioridade, _)| *prioridade);
    com_prioridade.into_iter().map(|(_, p)| p).collect()
}

pub fn filtrar_e_ordenar(
    pedidos: &[PedidoConsolidado],
    filtro: &FiltroPedidos,
    hoje: NaiveDate,
    regras: &RegrasPainel,
) -> Vec<PedidoConsolidado> {
    ordenar_por_prioridade(filtrar(pedidos, filtro), hoje, regras)
}

// =============================================================================
//  4. ESTATÍSTICAS
// =============================================================================

/// Sempre sobre o conjunto completo, não sobre a lista filtrada.
/// `em_andamento` e `atrasados` podem se sobrepor.
pub fn agregar(pedidos: &[PedidoConsolidado], hoje: NaiveDate, regras: &RegrasPainel) -> EstatisticasPedidos {
    pedidos.iter().fold(
        EstatisticasPedidos { total: pedidos.len(), ..Default::default() },
        |mut stats, pedido| {
            if e_atendido(pedido.status_pedido(), regras) {
                stats.atendidos += 1;
            } else if e_em_andamento(pedido.status_pedido(), regras) {
                stats.em_andamento += 1;
            }
            if classificar(pedido, hoje, regras) == StatusAlerta::Vermelho {
                stats.atrasados += 1;
            }
            stats
        },
    )
}
