use std::sync::Arc;

use crate::auth::SessionManager;
use crate::database::Store;

/// Shared application state handed to every handler: the store and the
/// session manager working on top of it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: impl Into<String>) -> Self {
        let sessions = SessionManager::new(store.clone(), jwt_secret);
        Self { store, sessions }
    }
}
