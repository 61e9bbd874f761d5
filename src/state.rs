//! Shared application state and the operator session.
//!
//! Authentication is the hard-coded `admin`/`admin` pair; the session lives
//! only in memory and dies with the process.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{ApiClient, ApiError};
use crate::config::Config;

const OPERATOR_USERNAME: &str = "admin";
const OPERATOR_PASSWORD: &str = "admin";
const OPERATOR_NAME: &str = "Admin";

/// The logged-in operator, as the webview renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSession {
    pub username: String,
    pub name: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Application state managed by Tauri.
pub struct AppState {
    session: Mutex<Option<OperatorSession>>,
    pub api: ApiClient,
}

impl AppState {
    /// Build the state from configuration. Starts logged out.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self {
            session: Mutex::new(None),
            api: ApiClient::from_config(config)?,
        })
    }

    /// Validate the credential pair and install a fresh session.
    pub fn login(&self, username: &str, password: &str) -> Result<OperatorSession, String> {
        if username != OPERATOR_USERNAME || password != OPERATOR_PASSWORD {
            return Err("Credenciais inválidas. Tente admin/admin.".to_string());
        }

        let session = OperatorSession {
            username: username.to_string(),
            name: OPERATOR_NAME.to_string(),
            logged_in_at: Utc::now(),
        };
        let mut guard = self.session.lock().map_err(|_| "Lock poisoned")?;
        *guard = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), String> {
        let mut guard = self.session.lock().map_err(|_| "Lock poisoned")?;
        *guard = None;
        Ok(())
    }

    pub fn current_session(&self) -> Result<Option<OperatorSession>, String> {
        let guard = self.session.lock().map_err(|_| "Lock poisoned")?;
        Ok(guard.clone())
    }
}
