use axum::extract::FromRef;
use storage::Database;
use storage::services::results::ResultsSettings;

use crate::middleware::auth::{ApiKeys, AuthKeys};

/// Everything handlers and middleware pull out of the router state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub results: ResultsSettings,
    pub auth: AuthKeys,
    pub api_keys: ApiKeys,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for ResultsSettings {
    fn from_ref(state: &AppState) -> Self {
        state.results
    }
}
