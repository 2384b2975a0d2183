use printbooth_core::{Config, PrintDispatcher, PrintOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: PrintOrchestrator,
    dispatcher: PrintDispatcher,
}

impl AppState {
    pub fn new(config: Config, orchestrator: PrintOrchestrator, dispatcher: PrintDispatcher) -> Self {
        Self {
            config,
            orchestrator,
            dispatcher,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &PrintOrchestrator {
        &self.orchestrator
    }

    pub fn dispatcher(&self) -> &PrintDispatcher {
        &self.dispatcher
    }
}
