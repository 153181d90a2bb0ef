use std::sync::Arc;

use axum::extract::FromRef;
use common_auth::JwtVerifier;

use crate::metrics::AuthMetrics;
use crate::repository::UserRepository;
use crate::tokens::TokenSigner;

/// Shared application state. Everything here is immutable after startup
/// and shared read-only across requests.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn UserRepository>,
    pub verifier: Arc<JwtVerifier>,
    pub signer: Arc<TokenSigner>,
    pub metrics: Arc<AuthMetrics>,
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl AppState {
    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.login_attempt(outcome);
    }
}
