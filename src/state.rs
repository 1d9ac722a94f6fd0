//! Shared application state handed to every route.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::ServerConfig;
use crate::error::{AppError, Result};
use crate::registry::{Registry, SharedRegistry};

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(registry: Registry, config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> Result<RwLockReadGuard<'_, Registry>> {
        self.registry
            .read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))
    }

    pub fn registry_mut(&self) -> Result<RwLockWriteGuard<'_, Registry>> {
        self.registry
            .write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))
    }
}
