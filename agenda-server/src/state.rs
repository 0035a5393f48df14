use agenda_core::Backend;

use crate::tokens::TokenRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    backend: Backend,
    tokens: TokenRegistry,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        AppState {
            backend,
            tokens: TokenRegistry::default(),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }
}
