// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, notify::AlertNotifier, store::DynStore};

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Config,
    pub notifier: Arc<dyn AlertNotifier>,
}

impl FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn AlertNotifier> {
    fn from_ref(state: &AppState) -> Self {
        state.notifier.clone()
    }
}
