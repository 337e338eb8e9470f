// src/models/dashboard.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::{IntoParams, ToSchema};

use crate::{common::error::AppError, models::projeto::Projeto};

const PREFIXO_PEDIDO: &str = "pedido_";

/// Forma canônica da área: sem espaços nas pontas e em minúsculas (Unicode).
/// É a mesma usada na chave do pedido e gravada em `projetos.area_chave`.
pub fn normalizar_area(area: &str) -> String {
    area.trim().to_lowercase()
}

// 1. Identificador do pedido consolidado
//
// Internamente é a tupla (área em minúsculas, id do projeto). A forma
// `pedido_{area}_{id}` só aparece na fronteira (JSON e URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PedidoId {
    area: String,
    projeto_id: i32,
}

impl PedidoId {
    pub fn new(area: &str, projeto_id: i32) -> Self {
        Self {
            area: normalizar_area(area),
            projeto_id,
        }
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn projeto_id(&self) -> i32 {
        self.projeto_id
    }
}

impl fmt::Display for PedidoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_{}", PREFIXO_PEDIDO, self.area, self.projeto_id)
    }
}

impl FromStr for PedidoId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalido = || AppError::PedidoIdInvalido(s.to_string());

        // A área pode conter '_', o id nunca: cortamos no último separador.
        let resto = s.strip_prefix(PREFIXO_PEDIDO).ok_or_else(invalido)?;
        let (area, id) = resto.rsplit_once('_').ok_or_else(invalido)?;
        let projeto_id: i32 = id.parse().map_err(|_| invalido())?;

        // Só a forma canônica: nada de "+7" ou "007"
        if area.trim().is_empty() || projeto_id <= 0 || id != projeto_id.to_string() {
            return Err(invalido());
        }

        Ok(PedidoId::new(area, projeto_id))
    }
}

impl Serialize for PedidoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PedidoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// 2. Pedido consolidado (projeção do Projeto, nunca persistida)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PedidoConsolidado {
    #[schema(value_type = String, example = "pedido_rh_7")]
    id_pedido: PedidoId,
    #[schema(example = "RH")]
    area: String,
    #[schema(example = "Programa de capacitação de servidores")]
    projeto: String,
    descricao_pedido: Option<String>,
    #[schema(example = "Em andamento")]
    status_pedido: String,
    prazo_resposta: Option<NaiveDate>,
}

impl PedidoConsolidado {
    /// Projeta o pedido a partir do projeto. `None` quando não há pedido
    /// pendente ou o registro está malformado.
    pub fn projetar(projeto: &Projeto) -> Option<Self> {
        if projeto.e_malformado() || !projeto.tem_pedido_diretor() {
            return None;
        }

        Some(Self {
            id_pedido: PedidoId::new(&projeto.area, projeto.id),
            area: projeto.area.clone(),
            projeto: projeto.titulo.clone(),
            descricao_pedido: projeto.descricao_pedido_diretor.clone(),
            status_pedido: projeto.status_pedido_diretor.clone().unwrap_or_default(),
            prazo_resposta: projeto.prazo_resposta,
        })
    }

    pub fn id_pedido(&self) -> &PedidoId {
        &self.id_pedido
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn projeto(&self) -> &str {
        &self.projeto
    }

    pub fn descricao_pedido(&self) -> Option<&str> {
        self.descricao_pedido.as_deref()
    }

    pub fn status_pedido(&self) -> &str {
        &self.status_pedido
    }

    pub fn prazo_resposta(&self) -> Option<NaiveDate> {
        self.prazo_resposta
    }
}

// 3. Semáforo de alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatusAlerta {
    Vermelho,
    Amarelo,
    Neutro,
    Verde,
}

impl StatusAlerta {
    /// Ordem crescente = mais urgente primeiro.
    pub fn prioridade(self) -> u8 {
        match self {
            StatusAlerta::Vermelho => 0,
            StatusAlerta::Amarelo => 1,
            StatusAlerta::Neutro => 2,
            StatusAlerta::Verde => 3,
        }
    }
}

// Resultado de uma única avaliação; rótulo e ícone derivam daqui.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvaliacaoAlerta {
    pub status: StatusAlerta,
    pub dias_restantes: Option<i64>,
}

// 4. Pedido com alerta calculado (válido só para a data de referência)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PedidoClassificado {
    #[serde(flatten)]
    pub pedido: PedidoConsolidado,
    pub alerta: StatusAlerta,
    #[schema(example = 5)]
    pub dias_restantes: Option<i64>,
    #[schema(example = "Faltam 5 dias")]
    pub rotulo_prazo: String,
    #[schema(example = "⚪")]
    pub icone: String,
}

// 5. Cards do topo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct EstatisticasPedidos {
    pub total: usize,
    pub atendidos: usize,
    pub em_andamento: usize,
    pub atrasados: usize,
}

// 6. Filtros do painel do diretor
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FiltroPedidos {
    /// Status exato; "Todos" ou vazio não filtra
    pub status: Option<String>,
    /// Área exata; "Todas" ou vazio não filtra
    pub area: Option<String>,
    /// Busca em projeto, descrição e área (sem diferenciar maiúsculas)
    pub texto: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DataReferenciaQuery {
    /// Data usada como "hoje" no cálculo dos alertas (padrão: data local)
    pub data_referencia: Option<NaiveDate>,
}

// 7. Respostas dos painéis
#[derive(Debug, Serialize, ToSchema)]
pub struct PainelDiretor {
    pub data_referencia: NaiveDate,
    pub estatisticas: EstatisticasPedidos,
    pub pedidos: Vec<PedidoClassificado>,
    pub areas: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PainelArea {
    pub area: String,
    pub data_referencia: NaiveDate,
    pub estatisticas: EstatisticasPedidos,
    pub projetos: Vec<Projeto>,
    pub pedidos: Vec<PedidoClassificado>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetalhePedido {
    pub pedido: PedidoClassificado,
    pub projeto: Projeto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formata_chave_com_area_em_minusculas() {
        assert_eq!(PedidoId::new("RH", 7).to_string(), "pedido_rh_7");
        assert_eq!(PedidoId::new(" Obras Públicas ", 12).to_string(), "pedido_obras públicas_12");
    }

    #[test]
    fn chave_volta_para_area_e_id() {
        let id: PedidoId = "pedido_ti_3".parse().unwrap();
        assert_eq!(id.area(), "ti");
        assert_eq!(id.projeto_id(), 3);

        // área com '_' corta no último separador
        let id: PedidoId = "pedido_gestao_de_pessoas_41".parse().unwrap();
        assert_eq!(id.area(), "gestao_de_pessoas");
        assert_eq!(id.projeto_id(), 41);
        assert_eq!(id.to_string(), "pedido_gestao_de_pessoas_41");
    }

    #[test]
    fn rejeita_chaves_invalidas() {
        for chave in ["", "pedido_", "pedido_rh", "pedido__7", "pedido_rh_x", "pedido_rh_0", "tarefa_rh_7", "pedido_rh_-2"] {
            assert!(chave.parse::<PedidoId>().is_err(), "{chave}");
        }
    }

    #[test]
    fn rejeita_id_fora_da_forma_canonica() {
        for chave in ["pedido_rh_+7", "pedido_rh_007", "pedido_rh_07"] {
            assert!(chave.parse::<PedidoId>().is_err(), "{chave}");
        }
    }

    #[test]
    fn area_normalizada_bate_com_a_chave() {
        assert_eq!(normalizar_area(" SAÚDE "), "saúde");
        assert_eq!(normalizar_area("Educação"), "educação");
        assert_eq!(PedidoId::new("SAÚDE", 4).area(), normalizar_area("Saúde"));
        assert_eq!(PedidoId::new("SAÚDE", 4).to_string(), "pedido_saúde_4");
    }

    #[test]
    fn serializa_como_texto() {
        let json = serde_json::to_value(PedidoId::new("TI", 3)).unwrap();
        assert_eq!(json, serde_json::json!("pedido_ti_3"));

        let de_volta: PedidoId = serde_json::from_value(json).unwrap();
        assert_eq!(de_volta, PedidoId::new("ti", 3));
    }

    #[test]
    fn prioridade_do_alerta() {
        let mut alertas = vec![StatusAlerta::Verde, StatusAlerta::Neutro, StatusAlerta::Vermelho, StatusAlerta::Amarelo];
        alertas.sort_by_key(|a| a.prioridade());
        assert_eq!(
            alertas,
            vec![StatusAlerta::Vermelho, StatusAlerta::Amarelo, StatusAlerta::Neutro, StatusAlerta::Verde]
        );
    }
}
