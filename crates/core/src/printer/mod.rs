//! Printer dispatch engine.
//!
//! Converts a photo's image payload into a physical print through the host's
//! native printing facility, keeping at most one print in flight at a time.

mod dispatcher;
mod platform;

pub use dispatcher::{PrintDispatcher, PrinterStatus};
pub use platform::{list_printers_command, parse_printer_list, print_commands, CommandSpec};

use async_trait::async_trait;
use thiserror::Error;

use crate::gateway::PhotoRecord;

/// Errors that can occur while dispatching a print.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// Image payload is neither an embedded data URL nor an http(s) URL.
    #[error("unsupported image payload: {0}")]
    UnsupportedFormat(String),

    /// No print strategy exists for the host platform.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Embedded payload could not be decoded.
    #[error("failed to decode image payload: {0}")]
    Decode(String),

    /// Remote image payload could not be downloaded.
    #[error("failed to download image: {0}")]
    Download(String),

    /// The OS print command failed to start or exited non-zero.
    #[error("print command {program} failed: {detail}")]
    CommandFailed { program: String, detail: String },

    /// Filesystem error while materializing or cleaning up the print file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for the physical printing seam.
///
/// Implemented by [`PrintDispatcher`] and by the mock in [`crate::testing`],
/// allowing the orchestrator to run without hardware.
#[async_trait]
pub trait PhotoPrinter: Send + Sync {
    /// Print one photo. Resolves when this photo's print has physically
    /// completed (or failed), not merely when it was queued.
    async fn print_photo(&self, photo: &PhotoRecord) -> Result<(), PrinterError>;
}
