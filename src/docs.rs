// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Painel de Governança",
        description = "Consolidação dos pedidos do diretor a partir dos projetos estratégicos das áreas"
    ),
    paths(
        // --- Painel de Área ---
        handlers::projetos::list_projetos,
        handlers::projetos::create_projeto,
        handlers::projetos::get_projeto,
        handlers::projetos::put_pedido,
        handlers::projetos::delete_pedido,
        handlers::projetos::transition_projeto,
        handlers::projetos::get_painel_area,

        // --- Painel do Diretor ---
        handlers::dashboard::get_painel,
        handlers::dashboard::get_pedido,
        handlers::dashboard::get_areas,
    ),
    components(
        schemas(
            // --- Projetos ---
            models::projeto::Fase,
            models::projeto::TipoMovimentacao,
            models::projeto::MovimentacaoHistorico,
            models::projeto::Projeto,
            models::projeto::CriarProjetoPayload,
            models::projeto::RegistrarPedidoPayload,
            models::projeto::TransicaoFasePayload,

            // --- Painéis ---
            models::dashboard::PedidoConsolidado,
            models::dashboard::StatusAlerta,
            models::dashboard::PedidoClassificado,
            models::dashboard::EstatisticasPedidos,
            models::dashboard::PainelDiretor,
            models::dashboard::PainelArea,
            models::dashboard::DetalhePedido,
        )
    ),
    tags(
        (name = "Área", description = "Projetos estratégicos de uma área (fonte de verdade)"),
        (name = "Diretor", description = "Pedidos consolidados, alertas e estatísticas (somente leitura)")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documenta_as_rotas_dos_dois_paineis() {
        let doc = ApiDoc::openapi();
        for rota in [
            "/api/projetos",
            "/api/projetos/{id}/pedido",
            "/api/projetos/painel",
            "/api/diretor/painel",
            "/api/diretor/pedidos/{id_pedido}",
        ] {
            assert!(doc.paths.paths.contains_key(rota), "{rota} ausente");
        }
    }
}
