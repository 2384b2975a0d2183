pub mod config;
pub mod gateway;
pub mod orchestrator;
pub mod printer;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, GatewayConfig,
    PrinterConfig, SanitizedConfig, ServerConfig,
};
pub use gateway::{
    GatewayError, ImagePayload, PendingPhotos, PhotoGateway, PhotoRecord, PrintOutcome,
    RemotePhotoGateway,
};
pub use orchestrator::{
    JobStatus, OrchestratorConfig, OrchestratorError, OrchestratorStatus, PrintJob,
    PrintOrchestrator,
};
pub use printer::{PhotoPrinter, PrintDispatcher, PrinterError, PrinterStatus};
