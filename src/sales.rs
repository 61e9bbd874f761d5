//! Sales listing over `/vendas`, with client-side text filtering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError};
use crate::wire;

pub const VENDAS_PATH: &str = "/vendas";

const DEFAULT_LIMIT: u32 = 50;

/// One sale row as the ERP reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, deserialize_with = "wire::flex_i64")]
    pub id_venda: i64,
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub codigo_produto: String,
    #[serde(default)]
    pub descricao_produto: String,
    #[serde(default)]
    pub nome_fantasia: String,
    #[serde(default)]
    pub razao_cliente: String,
    #[serde(default)]
    pub cidade: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub qtde: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub valor_unitario: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub total: f64,
    #[serde(default)]
    pub data_emissao: String,
}

/// Fetch one page of sales. `limit` defaults to 50 rows; `page` maps to the
/// upstream `pagina` parameter and is omitted when not given.
pub async fn list_sales(
    api: &ApiClient,
    limit: Option<u32>,
    page: Option<u32>,
) -> Result<Vec<Sale>, ApiError> {
    let mut params = vec![("limite", limit.unwrap_or(DEFAULT_LIMIT).to_string())];
    if let Some(page) = page {
        params.push(("pagina", page.to_string()));
    }
    let value: Value = api.get_json(VENDAS_PATH, &params).await?;
    Ok(wire::rows_from_value(value, "vendas"))
}

/// Case-insensitive filter over product description and customer trade name.
/// An empty needle keeps every row.
pub fn filter_sales(sales: &[Sale], needle: &str) -> Vec<Sale> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return sales.to_vec();
    }
    sales
        .iter()
        .filter(|sale| {
            sale.descricao_produto.to_lowercase().contains(&needle)
                || sale.nome_fantasia.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
