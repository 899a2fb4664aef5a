use crate::autosave::AutosaveHandle;
use crate::config::Config;
use crate::resume::store::SharedStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single source of truth for every resume in the session.
    pub store: SharedStore,
    /// Every successful mutation calls `request()` on this.
    pub autosave: AutosaveHandle,
    pub config: Config,
}
