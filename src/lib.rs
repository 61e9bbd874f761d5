pub mod api;
pub mod assistant;
mod commands;
pub mod config;
pub mod customers;
pub mod insights;
pub mod products;
pub mod receivables;
pub mod reports;
pub mod sales;
pub mod state;
pub mod wire;

use std::sync::Arc;

use tauri::Manager;

use crate::config::Config;
use crate::state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let config = Config::load();
            let state = Arc::new(AppState::new(&config)?);
            app.manage(state);
            log::info!(
                "TechFinance ready; primary API at {}, forecast API at {}",
                config.api_base_url,
                config.forecast_base_url
            );
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Session
            commands::login,
            commands::logout,
            commands::current_session,
            // Search
            commands::search_customers,
            commands::search_products,
            commands::list_sales,
            // Receivables
            commands::get_aging_summary,
            commands::get_aging_buckets,
            commands::generate_insight,
            // Reports
            commands::top_products_by_quantity,
            commands::top_products_by_value,
            commands::price_variation,
            commands::top_customers_by_quantity,
            commands::top_customers_by_value,
            commands::renegotiate_titles,
            commands::run_ai_analysis,
            commands::sales_forecast,
            // Assistant
            commands::assistant_greeting,
            commands::assistant_reply,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
