use crate::config::SecurityConfig;
use crate::store::DocumentStore;

/// Shared application state, constructed once in `main` and injected into
/// every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub security: SecurityConfig,
}
