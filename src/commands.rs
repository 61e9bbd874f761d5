//! Tauri command surface. Thin wrappers over the service modules: every
//! error is flattened to its display string, which the webview shows next to
//! a retry button. None of the data commands gate on a session; routing is
//! the webview's job.

use std::sync::Arc;

use serde::Serialize;
use tauri::State;

use crate::customers::{Customer, CustomerQuery};
use crate::products::{Product, ProductQuery};
use crate::receivables::{AgingBucket, AgingSummary};
use crate::reports::{
    AiAnalysis, ForecastPoint, PriceVariation, RenegotiationPlan, TopCustomerByQuantity,
    TopCustomerByValue, TopProductByQuantity, TopProductByValue,
};
use crate::sales::Sale;
use crate::state::{AppState, OperatorSession};
use crate::{assistant, customers, insights, products, receivables, reports, sales};

// =============================================================================
// Session
// =============================================================================

#[tauri::command]
pub fn login(
    username: String,
    password: String,
    state: State<Arc<AppState>>,
) -> Result<OperatorSession, String> {
    state.login(&username, &password)
}

#[tauri::command]
pub fn logout(state: State<Arc<AppState>>) -> Result<(), String> {
    state.logout()
}

#[tauri::command]
pub fn current_session(state: State<Arc<AppState>>) -> Result<Option<OperatorSession>, String> {
    state.current_session()
}

// =============================================================================
// Search
// =============================================================================

#[tauri::command]
pub async fn search_customers(
    text: String,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<Customer>, String> {
    let query = CustomerQuery::from_input(&text);
    customers::search_customers(&state.api, &query)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn search_products(
    text: String,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<Product>, String> {
    let query = ProductQuery::from_input(&text);
    products::search_products(&state.api, &query)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn list_sales(
    limit: Option<u32>,
    page: Option<u32>,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<Sale>, String> {
    sales::list_sales(&state.api, limit, page)
        .await
        .map_err(|e| e.to_string())
}

// =============================================================================
// Receivables
// =============================================================================

/// One aging bucket in fixed display order, for the dashboard cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketDescriptor {
    pub id: AgingBucket,
    pub wire_key: &'static str,
    pub label: &'static str,
}

#[tauri::command]
pub async fn get_aging_summary(state: State<'_, Arc<AppState>>) -> Result<AgingSummary, String> {
    receivables::fetch_aging_summary(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_aging_buckets() -> Vec<BucketDescriptor> {
    receivables::PRIORITY_ORDER
        .iter()
        .map(|&bucket| BucketDescriptor {
            id: bucket,
            wire_key: bucket.wire_key(),
            label: bucket.label(),
        })
        .collect()
}

#[tauri::command]
pub fn generate_insight(summary: AgingSummary) -> String {
    insights::synthesize_insight(&summary)
}

// =============================================================================
// Reports
// =============================================================================

#[tauri::command]
pub async fn top_products_by_quantity(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<TopProductByQuantity>, String> {
    reports::top_products_by_quantity(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn top_products_by_value(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<TopProductByValue>, String> {
    reports::top_products_by_value(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn price_variation(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<PriceVariation>, String> {
    reports::price_variation(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn top_customers_by_quantity(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<TopCustomerByQuantity>, String> {
    reports::top_customers_by_quantity(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn top_customers_by_value(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<TopCustomerByValue>, String> {
    reports::top_customers_by_value(&state.api)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn renegotiate_titles(
    per_day: u32,
    state: State<'_, Arc<AppState>>,
) -> Result<RenegotiationPlan, String> {
    reports::renegotiate_titles(&state.api, per_day)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn run_ai_analysis(
    query: String,
    state: State<'_, Arc<AppState>>,
) -> Result<AiAnalysis, String> {
    Ok(reports::ai_analysis(&state.api, &query).await)
}

#[tauri::command]
pub async fn sales_forecast(
    days: u32,
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<ForecastPoint>, String> {
    reports::sales_forecast(&state.api, days)
        .await
        .map_err(|e| e.to_string())
}

// =============================================================================
// Assistant
// =============================================================================

#[tauri::command]
pub fn assistant_greeting() -> String {
    assistant::GREETING.to_string()
}

#[tauri::command]
pub fn assistant_reply(message: String) -> String {
    assistant::reply_to(&message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_descriptors_follow_priority_order() {
        let buckets = get_aging_buckets();

        let labels: Vec<&str> = buckets.iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            vec![
                "Atraso entre 30 e 60 dias",
                "Atraso até 30 dias",
                "Vencimento Hoje",
                "Vence em até 30 dias",
                "Vencimento superior a 30 dias",
                "Atraso superior a 60 dias",
            ]
        );
    }

    #[test]
    fn test_bucket_descriptor_serialization() {
        let buckets = get_aging_buckets();
        let value = serde_json::to_value(&buckets[0]).expect("serialize");

        assert_eq!(value["id"], "overdue30to60");
        assert_eq!(value["wireKey"], "atraso_30_60");
        assert_eq!(value["label"], "Atraso entre 30 e 60 dias");
    }
}
