use crate::config::ServerConfig;
use contacts::{AddressBook, ContactService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Address book every handler talks to
    pub service: Arc<dyn ContactService>,
}

impl ServerState {
    /// Connect the configured backend and wrap it in an [`AddressBook`].
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let book = AddressBook::connect(&config.backend()).await?;
        Ok(Self::with_service(config, Arc::new(book)))
    }

    /// Serve an already constructed service.
    pub fn with_service(config: ServerConfig, service: Arc<dyn ContactService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }
}
