//! Product catalog search over `/produtos`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::wire;

pub const PRODUTOS_PATH: &str = "/produtos";

const DEFAULT_LIMIT: u32 = 10;

/// One catalog row, passed through with the upstream field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub codigo: String,
    #[serde(default)]
    pub descricao_produto: String,
    #[serde(default)]
    pub descricao_grupo: String,
}

/// Query parameters for `/produtos`. All-digit input searches by product
/// code, anything else goes out under the `nome` filter, which the upstream
/// matches against product names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub nome: Option<String>,
    pub codigo: Option<String>,
    pub limite: u32,
}

impl ProductQuery {
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            Self {
                nome: None,
                codigo: None,
                limite: DEFAULT_LIMIT,
            }
        } else if trimmed.chars().all(|c| c.is_ascii_digit()) {
            Self {
                nome: None,
                codigo: Some(trimmed.to_string()),
                limite: DEFAULT_LIMIT,
            }
        } else {
            Self {
                nome: Some(trimmed.to_string()),
                codigo: None,
                limite: DEFAULT_LIMIT,
            }
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(nome) = &self.nome {
            params.push(("nome", nome.clone()));
        }
        if let Some(codigo) = &self.codigo {
            params.push(("codigo", codigo.clone()));
        }
        params.push(("limite", self.limite.to_string()));
        params
    }
}

pub async fn search_products(
    api: &ApiClient,
    query: &ProductQuery,
) -> Result<Vec<Product>, ApiError> {
    let value: Value = api.get_json(PRODUTOS_PATH, &query.params()).await?;
    Ok(wire::rows_from_value(value, "produtos"))
}
