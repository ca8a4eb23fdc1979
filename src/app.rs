use crate::config::NodeConfig;
use crate::credentials::ThordataCredentials;
use crate::errors::NodeError;
use crate::host::catalog::validate_wiring;
use crate::managers::thordata::ThordataManager;
use crate::node::response::ResponseRecord;
use crate::services::dispatcher::{Dispatcher, WorkItem};
use crate::services::logger::Logger;
use crate::services::transport::{ReqwestTransport, Transport};
use crate::services::validation::Validation;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: NodeConfig,
    pub dispatcher: Arc<Dispatcher>,
}

impl App {
    pub fn initialize(config: NodeConfig) -> Result<Self, NodeError> {
        let logger = Logger::new("thordata");
        let transport = Arc::new(ReqwestTransport::new(logger.clone(), &config)?);
        Self::with_transport(config, logger, transport)
    }

    /// Wires the node around an arbitrary transport.
    pub fn with_transport(
        config: NodeConfig,
        logger: Logger,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, NodeError> {
        validate_wiring()?;
        let manager = ThordataManager::new(logger.clone(), transport);
        let dispatcher = Arc::new(Dispatcher::new(
            logger.clone(),
            Validation::new(),
            manager,
        ));
        logger.debug(
            "Node initialized",
            Some(&serde_json::json!({
                "scraper_api_base_url": config.scraper_api_base_url,
                "web_unlocker_base_url": config.web_unlocker_base_url,
                "timeout_ms": config.timeout.as_millis() as u64,
                "continue_on_fail": config.continue_on_fail,
            })),
        );
        Ok(Self {
            logger,
            config,
            dispatcher,
        })
    }

    /// `continue_on_fail` falls back to the configured toggle when unset.
    pub async fn execute(
        &self,
        items: &[WorkItem],
        credentials: &ThordataCredentials,
        continue_on_fail: Option<bool>,
    ) -> Result<Vec<ResponseRecord>, NodeError> {
        let continue_on_fail = continue_on_fail.unwrap_or(self.config.continue_on_fail);
        self.dispatcher
            .execute(items, credentials, continue_on_fail)
            .await
    }
}
