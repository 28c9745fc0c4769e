use crate::{
    auth::{AuthService, TokenIssuer, TokenVerifier},
    db::CredentialStore,
    middleware::AccessGate,
    service::RecordService,
    utils::Config,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub gate: AccessGate,
    pub records: RecordService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn TokenVerifier>,
        config: Arc<Config>,
    ) -> Self {
        let issuer = TokenIssuer::new(&config.jwt.secret, config.jwt.token_ttl());

        Self {
            auth_service: Arc::new(AuthService::new(store.clone(), issuer)),
            gate: AccessGate::new(store.clone(), verifier, &config.jwt.secret),
            records: RecordService::new(store),
            config,
        }
    }
}
