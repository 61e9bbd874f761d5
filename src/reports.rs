//! Reporting surfaces over the analytics endpoints.
//!
//! Each fetcher maps the upstream rows the way the report screens consume
//! them: numeric strings parsed at the boundary, derived percentages filled
//! in. The renegotiation reply comes out of a language model, so its sections
//! are individually optional and degrade to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::wire;

pub const MAIS_VENDIDOS_PATH: &str = "/produtos/mais-vendidos";
pub const MAIOR_VALOR_PATH: &str = "/produtos/maior-valor";
pub const VARIACAO_PRECO_PATH: &str = "/produtos/variacao-preco";
pub const PARTICIPACAO_PATH: &str = "/empresas/participacao";
pub const PARTICIPACAO_VALOR_PATH: &str = "/empresas/participacao-por-valor";
pub const RENEGOCIACAO_PATH: &str = "/contas_receber/ai";
pub const AI_ANALYSIS_PATH: &str = "/ai/analysis";
pub const PREVISAO_PATH: &str = "/previsao/vendas";

/// Errors from the report services. Messages under `InvalidInput` are the
/// exact texts the front-end shows next to the input field.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    InvalidInput(String),

    /// The renegotiation endpoint replied with something other than a JSON
    /// object.
    #[error("Dados inválidos recebidos da API")]
    InvalidReply,

    #[error("report request failed: {0}")]
    Api(#[from] ApiError),
}

/// Row of the top-products-by-quantity report. `percentual` is derived here
/// from `quantidade_total` against the all-time `total`; the wire never
/// carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProductByQuantity {
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub codigo_produto: String,
    #[serde(default)]
    pub descricao_produto: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub quantidade_total: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub total: f64,
    #[serde(skip_deserializing)]
    pub percentual: f64,
}

impl TopProductByQuantity {
    fn compute_percentual(&self) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            self.quantidade_total / self.total * 100.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProductByValue {
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub codigo_produto: String,
    #[serde(default)]
    pub descricao_produto: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub valor_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceVariation {
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub codigo_produto: String,
    #[serde(default)]
    pub descricao_produto: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub valor_minimo: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub valor_maximo: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub percentual_diferenca: f64,
}

/// Wire row for `/empresas/participacao`. Older API builds report the
/// quantity as `quantidade_total` instead of `qtde`.
#[derive(Debug, Deserialize)]
struct CustomerShareRow {
    #[serde(default)]
    nome_fantasia: String,
    #[serde(default, deserialize_with = "wire::flex_opt_f64")]
    qtde: Option<f64>,
    #[serde(default, deserialize_with = "wire::flex_opt_f64")]
    quantidade_total: Option<f64>,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    percentual: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCustomerByQuantity {
    pub nome_fantasia: String,
    pub qtde: f64,
    pub percentual: f64,
}

impl From<CustomerShareRow> for TopCustomerByQuantity {
    fn from(row: CustomerShareRow) -> Self {
        Self {
            nome_fantasia: row.nome_fantasia,
            qtde: row.qtde.or(row.quantidade_total).unwrap_or(0.0),
            percentual: row.percentual,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCustomerByValue {
    #[serde(default)]
    pub nome_fantasia: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub valor_total: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub percentual: f64,
}

pub async fn top_products_by_quantity(
    api: &ApiClient,
) -> Result<Vec<TopProductByQuantity>, ReportError> {
    let value = api.get_value(MAIS_VENDIDOS_PATH).await?;
    let mut rows: Vec<TopProductByQuantity> = wire::rows_from_value(value, "produtos/mais-vendidos");
    for row in &mut rows {
        row.percentual = row.compute_percentual();
    }
    Ok(rows)
}

pub async fn top_products_by_value(api: &ApiClient) -> Result<Vec<TopProductByValue>, ReportError> {
    let value = api.get_value(MAIOR_VALOR_PATH).await?;
    Ok(wire::rows_from_value(value, "produtos/maior-valor"))
}

pub async fn price_variation(api: &ApiClient) -> Result<Vec<PriceVariation>, ReportError> {
    let value = api.get_value(VARIACAO_PRECO_PATH).await?;
    Ok(wire::rows_from_value(value, "produtos/variacao-preco"))
}

pub async fn top_customers_by_quantity(
    api: &ApiClient,
) -> Result<Vec<TopCustomerByQuantity>, ReportError> {
    let value = api.get_value(PARTICIPACAO_PATH).await?;
    let rows: Vec<CustomerShareRow> = wire::rows_from_value(value, "empresas/participacao");
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn top_customers_by_value(
    api: &ApiClient,
) -> Result<Vec<TopCustomerByValue>, ReportError> {
    let value = api.get_value(PARTICIPACAO_VALOR_PATH).await?;
    Ok(wire::rows_from_value(value, "empresas/participacao-por-valor"))
}

/// One renegotiated title in the plan. Amounts stay as the strings the model
/// produced; `parse_money_brl` turns them into numbers when totalling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenegotiatedTitle {
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub title: String,
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub value: String,
    #[serde(default)]
    pub renegotiation_date: String,
    #[serde(default)]
    pub original_due_date: String,
    #[serde(default)]
    pub new_due_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowEntry {
    #[serde(default)]
    pub month_year: String,
    #[serde(default, deserialize_with = "wire::flex_string")]
    pub total_renegotiated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenegotiationPlan {
    pub renegotiated_titles: Vec<RenegotiatedTitle>,
    pub cash_flow_summary: Vec<CashFlowEntry>,
    pub notes: String,
}

impl RenegotiationPlan {
    /// Sum of the monthly cash-flow amounts, tolerant of whatever money
    /// format the model used.
    pub fn cash_flow_total(&self) -> f64 {
        self.cash_flow_summary
            .iter()
            .map(|entry| parse_money_brl(&entry.total_renegotiated))
            .sum()
    }
}

/// Ask the AI endpoint to renegotiate every overdue title at `per_day`
/// titles per day. The per-day count must be between 1 and 100.
pub async fn renegotiate_titles(
    api: &ApiClient,
    per_day: u32,
) -> Result<RenegotiationPlan, ReportError> {
    if per_day == 0 || per_day > 100 {
        return Err(ReportError::InvalidInput(
            "Por favor, insira um número válido entre 1 e 100.".to_string(),
        ));
    }

    let prompt = renegotiation_prompt(per_day);
    let value: Value = api
        .get_json(RENEGOCIACAO_PATH, &[("prompt", prompt)])
        .await?;
    shape_plan(value)
}

fn renegotiation_prompt(per_day: u32) -> String {
    let plural = if per_day == 1 { "" } else { "s" };
    format!(
        "Realize a renegociação de todos os títulos vencidos, considere a renegociação de \
         {per_day} título{plural} por dia, somente os títulos vencidos e o inicio da \
         renegociação a data de hoje. Considerar que a nova data de vencimento será de 20 dias \
         a contar da data de cada renegociação. Crie uma tabela e projete um fluxo de caixa \
         com base nas novas datas de vencimento, exibir as seguintes colunas: título, valor, \
         dt de renegociação, dt original vencto, nova dt vencto. Exiba também o novo fluxo de \
         caixa resumido por mês. Apresente apenas a tabela de título de renegociação e o \
         fluxo de caixa."
    )
}

/// Shape the model reply into a plan. Missing or mistyped sections degrade
/// to empty rather than failing the whole report; only a non-object reply is
/// rejected outright.
fn shape_plan(value: Value) -> Result<RenegotiationPlan, ReportError> {
    let Value::Object(mut reply) = value else {
        return Err(ReportError::InvalidReply);
    };

    let renegotiated_titles = match reply.remove("renegotiated_titles") {
        Some(v) => wire::rows_from_value(v, "renegotiated_titles"),
        None => Vec::new(),
    };
    let cash_flow_summary = match reply.remove("cash_flow_summary") {
        Some(v) => wire::rows_from_value(v, "cash_flow_summary"),
        None => Vec::new(),
    };
    let notes = match reply.remove("notes") {
        Some(Value::String(s)) => s,
        _ => "Processamento concluído.".to_string(),
    };

    Ok(RenegotiationPlan {
        renegotiated_titles,
        cash_flow_summary,
        notes,
    })
}

/// Parse a Brazilian-formatted money string. `"1.234,56"` reads as 1234.56,
/// `"R$ 500"` as 500.0, and anything without a digit as 0.0. A comma with
/// more than two decimals counts as a thousands separator.
pub fn parse_money_brl(text: &str) -> f64 {
    let clean: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if !clean.bytes().any(|b| b.is_ascii_digit()) {
        return 0.0;
    }

    let has_comma = clean.contains(',');
    let has_dot = clean.contains('.');
    let candidate = if has_comma && has_dot {
        clean.replace('.', "").replace(',', ".")
    } else if has_comma {
        let parts: Vec<&str> = clean.split(',').collect();
        if parts.len() == 2 && parts[1].len() <= 2 {
            clean.replace(',', ".")
        } else {
            clean.replace(',', "")
        }
    } else {
        clean
    };

    leading_number(&candidate).unwrap_or(0.0)
}

/// Parse the longest leading number of `text`: optional sign, digits, at
/// most one decimal point. Trailing junk is ignored, like JS `parseFloat`.
fn leading_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    for &b in &bytes[end..] {
        match b {
            b'0'..=b'9' => end += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    let prefix = &text[..end];
    if !prefix.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// One processed analysis exchange.
#[derive(Debug, Clone, Serialize)]
pub struct AiAnalysis {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct AnalysisReply {
    #[serde(default)]
    response: Option<String>,
}

/// Run a free-form financial analysis. Never fails: when the endpoint is
/// down or replies badly, the exchange carries the canned fallback text so
/// the screen always has something to show.
pub async fn ai_analysis(api: &ApiClient, query: &str) -> AiAnalysis {
    let body = serde_json::json!({ "prompt": query, "context": "financial_analysis" });
    let response = match api.post_json::<AnalysisReply, _>(AI_ANALYSIS_PATH, &body).await {
        Ok(reply) => reply
            .response
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "Análise processada com sucesso.".to_string()),
        Err(e) => {
            log::warn!("ai analysis unavailable, serving the simulated reply: {e}");
            fallback_analysis(query)
        }
    };

    AiAnalysis {
        query: query.to_string(),
        response,
        timestamp: Utc::now(),
    }
}

fn fallback_analysis(query: &str) -> String {
    format!(
        "Análise para: \"{query}\"\n\nEsta é uma resposta simulada. A funcionalidade de IA \
         está em desenvolvimento e em breve estará totalmente integrada com dados reais do \
         sistema.\n\nPara uma análise completa, recomendamos:\n• Verificar os relatórios \
         específicos disponíveis\n• Consultar os dados históricos\n• Analisar as tendências \
         de vendas\n• Revisar o desempenho por período"
    )
}

/// One day of the sales forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(default)]
    pub ds: String,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub yhat: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub yhat_lower: f64,
    #[serde(default, deserialize_with = "wire::flex_f64")]
    pub yhat_upper: f64,
}

/// Forecast daily sales for the next `days` days, up to one year out.
pub async fn sales_forecast(api: &ApiClient, days: u32) -> Result<Vec<ForecastPoint>, ReportError> {
    if days == 0 {
        return Err(ReportError::InvalidInput(
            "Por favor, insira um número de dias válido.".to_string(),
        ));
    }
    if days > 365 {
        return Err(ReportError::InvalidInput(
            "A previsão não pode exceder 365 dias.".to_string(),
        ));
    }

    let points = api
        .post_forecast(PREVISAO_PATH, &[("dias_previsao", days.to_string())])
        .await?;
    Ok(points)
}
