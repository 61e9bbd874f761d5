//! Customer directory search over `/clientes`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::wire;

pub const CLIENTES_PATH: &str = "/clientes";

const DEFAULT_LIMIT: u32 = 10;

/// One customer row as the ERP returns it. Field names are the upstream wire
/// names; the front-end consumes them unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "wire::flex_i64")]
    pub id_cliente: i64,
    #[serde(default)]
    pub razao_cliente: String,
    #[serde(default)]
    pub nome_fantasia: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub id_grupo: String,
    #[serde(default)]
    pub descricao_grupo: String,
}

/// Query parameters for `/clientes`, derived from the search box text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    pub nome: Option<String>,
    pub id_cliente: Option<String>,
    pub limite: u32,
}

impl CustomerQuery {
    /// Derive the query from raw input: all-digit text searches by customer
    /// id, any other text searches by name, empty input lists the first page.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            Self {
                nome: None,
                id_cliente: None,
                limite: DEFAULT_LIMIT,
            }
        } else if trimmed.chars().all(|c| c.is_ascii_digit()) {
            Self {
                nome: None,
                id_cliente: Some(trimmed.to_string()),
                limite: DEFAULT_LIMIT,
            }
        } else {
            Self {
                nome: Some(trimmed.to_string()),
                id_cliente: None,
                limite: DEFAULT_LIMIT,
            }
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(nome) = &self.nome {
            params.push(("nome", nome.clone()));
        }
        if let Some(id) = &self.id_cliente {
            params.push(("id_cliente", id.clone()));
        }
        params.push(("limite", self.limite.to_string()));
        params
    }
}

/// Search customers. A non-array payload yields an empty list; fetch failures
/// propagate so the page can offer a retry.
pub async fn search_customers(
    api: &ApiClient,
    query: &CustomerQuery,
) -> Result<Vec<Customer>, ApiError> {
    let value: Value = api.get_json(CLIENTES_PATH, &query.params()).await?;
    Ok(wire::rows_from_value(value, "clientes"))
}
