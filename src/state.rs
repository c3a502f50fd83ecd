use std::sync::Arc;

use crate::config::Config;
use crate::repository::PgStore;
use crate::scoring::AttemptLedger;
use crate::services::mailer::Mailer;
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub ledger: AttemptLedger,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wires the Postgres-backed ledger from the configured limits.
    pub fn new(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        let ledger = AttemptLedger::new(store, config.max_quiz_attempts, config.passing_score);
        Self {
            pool,
            config,
            ledger,
            mailer,
        }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AttemptLedger {
    fn from_ref(state: &AppState) -> Self {
        state.ledger.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Mailer> {
    fn from_ref(state: &AppState) -> Self {
        state.mailer.clone()
    }
}
