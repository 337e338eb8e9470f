// src/middleware/area.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::common::error::ApiError;

// Cabeçalho que define a área dona dos projetos da requisição
const AREA_HEADER: &str = "x-area";

// Escopo do painel de área: toda leitura e escrita fica restrita a esta área.
#[derive(Debug, Clone)]
pub struct AreaContext(pub String);

impl<S> FromRequestParts<S> for AreaContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(AREA_HEADER).ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "O cabeçalho X-Area é obrigatório.")
        })?;

        // UTF-8 qualquer, não só ASCII visível ("Saúde", "Educação")
        let area = std::str::from_utf8(value.as_bytes()).map_err(|_| {
            ApiError::new(
                StatusCode::BAD_REQUEST,
                "Cabeçalho X-Area contém caracteres inválidos.",
            )
        })?;

        let area = area.trim();
        if area.is_empty() {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, "O cabeçalho X-Area está vazio."));
        }

        Ok(AreaContext(area.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    async fn extrair_bytes(area: Option<&[u8]>) -> Result<AreaContext, ApiError> {
        let mut builder = Request::builder().uri("/api/projetos");
        if let Some(valor) = area {
            builder = builder.header(AREA_HEADER, HeaderValue::from_bytes(valor).unwrap());
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AreaContext::from_request_parts(&mut parts, &()).await
    }

    async fn extrair(area: Option<&str>) -> Result<AreaContext, ApiError> {
        extrair_bytes(area.map(str::as_bytes)).await
    }

    #[tokio::test]
    async fn le_area_do_cabecalho() {
        let ctx = extrair(Some(" TI ")).await.unwrap();
        assert_eq!(ctx.0, "TI");
    }

    #[tokio::test]
    async fn cabecalho_ausente_ou_vazio_e_rejeitado() {
        assert_eq!(extrair(None).await.unwrap_err().status, StatusCode::BAD_REQUEST);
        assert_eq!(extrair(Some("   ")).await.unwrap_err().status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn aceita_area_com_acento() {
        let ctx = extrair_bytes(Some("Saúde".as_bytes())).await.unwrap();
        assert_eq!(ctx.0, "Saúde");

        let ctx = extrair_bytes(Some(" Educação ".as_bytes())).await.unwrap();
        assert_eq!(ctx.0, "Educação");
    }

    #[tokio::test]
    async fn bytes_que_nao_sao_utf8_sao_rejeitados() {
        let erro = extrair_bytes(Some(&[0x53, 0xE1, 0x75])).await.unwrap_err();
        assert_eq!(erro.status, StatusCode::BAD_REQUEST);
    }
}
