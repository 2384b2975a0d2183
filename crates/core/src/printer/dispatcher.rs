//! Serialized print dispatch.
//!
//! Printing is a scarce, sequential physical resource: however many logical
//! jobs are in flight upstream, at most one OS print command runs at a time.
//! Each print request materializes its image as a uniquely named temp file
//! whose lifetime never outlives the attempt that created it.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::PrinterConfig;
use crate::gateway::{ImagePayload, PhotoRecord};

use super::{platform, PhotoPrinter, PrinterError};

/// Minimal 1x1 PNG used by the self-test when no sample image is bundled.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Snapshot of the dispatcher's internal state.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterStatus {
    /// Whether an OS print command is currently in flight.
    pub printing: bool,
    /// Number of files waiting behind the current print.
    pub queued: usize,
    /// Basename of the file currently printing, if any.
    pub current_file: Option<String>,
}

struct QueueEntry {
    path: PathBuf,
    done: oneshot::Sender<Result<(), PrinterError>>,
}

#[derive(Default)]
struct DispatchState {
    queue: VecDeque<QueueEntry>,
    printing: bool,
    current_file: Option<String>,
}

/// The printer dispatch engine.
///
/// Cheap to clone; clones share the same queue and single-flight flag.
#[derive(Clone)]
pub struct PrintDispatcher {
    config: PrinterConfig,
    platform: String,
    client: reqwest::Client,
    state: Arc<Mutex<DispatchState>>,
}

impl PrintDispatcher {
    /// Create a dispatcher for the host platform.
    pub fn new(config: PrinterConfig) -> Result<Self, PrinterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PrinterError::Download(e.to_string()))?;

        Ok(Self {
            config,
            platform: std::env::consts::OS.to_string(),
            client,
            state: Arc::new(Mutex::new(DispatchState::default())),
        })
    }

    /// Override the platform identifier (for tests).
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Current dispatch state for status reporting.
    pub fn status(&self) -> PrinterStatus {
        let state = self.state.lock().expect("dispatch state lock");
        PrinterStatus {
            printing: state.printing,
            queued: state.queue.len(),
            current_file: state.current_file.clone(),
        }
    }

    /// List available printers via the platform's enumeration command.
    ///
    /// Returns an empty list when the platform reports none or the command
    /// is unavailable.
    pub async fn list_printers(&self) -> Vec<String> {
        let Some(spec) = platform::list_printers_command(&self.platform) else {
            return Vec::new();
        };

        match Command::new(&spec.program).args(&spec.args).output().await {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout);
                platform::parse_printer_list(&self.platform, &text)
            }
            Ok(output) => {
                debug!(
                    program = %spec.program,
                    code = ?output.status.code(),
                    "printer enumeration command exited non-zero"
                );
                Vec::new()
            }
            Err(e) => {
                debug!(program = %spec.program, error = %e, "printer enumeration unavailable");
                Vec::new()
            }
        }
    }

    /// Print a test page: the configured sample image, or an embedded
    /// placeholder when the sample is missing. Simulate mode short-circuits.
    pub async fn self_test(&self) -> Result<(), PrinterError> {
        if self.config.simulate {
            info!("simulate mode: self-test reported OK without printing");
            return Ok(());
        }

        let bytes = match &self.config.sample_image {
            Some(path) => match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "sample image missing, using placeholder");
                    PLACEHOLDER_PNG.to_vec()
                }
            },
            None => PLACEHOLDER_PNG.to_vec(),
        };

        let path = self.spool_path("self-test", "png");
        tokio::fs::write(&path, &bytes).await?;
        self.print_file(path).await
    }

    /// Decode the photo's payload into raw image bytes.
    async fn materialize_bytes(&self, payload: &ImagePayload) -> Result<Vec<u8>, PrinterError> {
        match payload {
            ImagePayload::DataUrl(url) => {
                let encoded = url
                    .split_once(',')
                    .map(|(_, data)| data)
                    .ok_or_else(|| PrinterError::Decode("malformed data URL".to_string()))?;
                base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| PrinterError::Decode(e.to_string()))
            }
            ImagePayload::RemoteUrl(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| PrinterError::Download(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(PrinterError::Download(format!(
                        "HTTP {} from {}",
                        response.status(),
                        url
                    )));
                }
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| PrinterError::Download(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            ImagePayload::Unsupported(raw) => {
                Err(PrinterError::UnsupportedFormat(raw.clone()))
            }
        }
    }

    fn spool_path(&self, tag: &str, ext: &str) -> PathBuf {
        let safe_tag: String = tag
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.config.spool_dir.join(format!(
            "print_{}_{}.{}",
            Utc::now().timestamp_millis(),
            safe_tag,
            ext
        ))
    }

    fn extension_for(payload: &ImagePayload) -> &'static str {
        match payload {
            ImagePayload::DataUrl(url) => {
                if url.starts_with("data:image/png") {
                    "png"
                } else if url.starts_with("data:image/gif") {
                    "gif"
                } else {
                    "jpg"
                }
            }
            ImagePayload::RemoteUrl(url) => {
                if url.ends_with(".png") {
                    "png"
                } else if url.ends_with(".gif") {
                    "gif"
                } else {
                    "jpg"
                }
            }
            ImagePayload::Unsupported(_) => "jpg",
        }
    }

    /// Queue a materialized file and wait for its own print to settle.
    ///
    /// The temp file is deleted exactly once in every outcome.
    async fn print_file(&self, path: PathBuf) -> Result<(), PrinterError> {
        if self.config.simulate {
            let _ = tokio::fs::remove_file(&path).await;
            info!(file = %path.display(), "simulate mode: print reported OK");
            return Ok(());
        }

        let (tx, rx) = oneshot::channel();
        let start_worker = {
            let mut state = self.state.lock().expect("dispatch state lock");
            state.queue.push_back(QueueEntry { path, done: tx });
            if state.printing {
                false
            } else {
                state.printing = true;
                true
            }
        };

        if start_worker {
            let this = self.clone();
            tokio::spawn(async move { this.run_queue().await });
        }

        rx.await.map_err(|_| PrinterError::CommandFailed {
            program: "print queue".to_string(),
            detail: "dispatch worker dropped the request".to_string(),
        })?
    }

    /// Drain the file queue, one OS print command at a time.
    async fn run_queue(&self) {
        loop {
            let entry = {
                let mut state = self.state.lock().expect("dispatch state lock");
                match state.queue.pop_front() {
                    Some(entry) => {
                        state.current_file = entry
                            .path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string());
                        Some(entry)
                    }
                    None => {
                        state.printing = false;
                        state.current_file = None;
                        None
                    }
                }
            };

            let Some(entry) = entry else { return };

            let result = self.run_print_command(&entry.path).await;

            if let Err(e) = tokio::fs::remove_file(&entry.path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(file = %entry.path.display(), error = %e, "failed to remove print file");
                }
            }

            // Receiver may have gone away; the cleanup above already ran.
            let _ = entry.done.send(result);
        }
    }

    async fn run_print_command(&self, file: &Path) -> Result<(), PrinterError> {
        let specs = platform::print_commands(
            &self.platform,
            file,
            self.config.printer_name.as_deref(),
            self.config.copies,
        )?;

        let mut last_spawn_error: Option<(String, std::io::Error)> = None;

        for spec in specs {
            match Command::new(&spec.program).args(&spec.args).spawn() {
                Ok(mut child) => {
                    debug!(program = %spec.program, file = %file.display(), "print command started");
                    let status = child.wait().await?;
                    return if status.success() {
                        info!(program = %spec.program, file = %file.display(), "print completed");
                        Ok(())
                    } else {
                        Err(PrinterError::CommandFailed {
                            program: spec.program,
                            detail: format!("exit code {:?}", status.code()),
                        })
                    };
                }
                Err(e) => {
                    warn!(program = %spec.program, error = %e, "print command failed to start");
                    last_spawn_error = Some((spec.program, e));
                }
            }
        }

        let (program, error) =
            last_spawn_error.expect("print_commands returns at least one spec");
        Err(PrinterError::CommandFailed {
            program,
            detail: format!("failed to start: {}", error),
        })
    }
}

#[async_trait::async_trait]
impl PhotoPrinter for PrintDispatcher {
    async fn print_photo(&self, photo: &PhotoRecord) -> Result<(), PrinterError> {
        let bytes = self.materialize_bytes(&photo.payload).await?;

        let ext = Self::extension_for(&photo.payload);
        let path = self.spool_path(&photo.id, ext);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(PrinterError::Io(e));
        }

        self.print_file(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ImagePayload;
    use tempfile::TempDir;

    fn dispatcher(spool: &TempDir, simulate: bool) -> PrintDispatcher {
        let config = PrinterConfig {
            printer_name: Some("test-printer".to_string()),
            copies: 1,
            spool_dir: spool.path().to_path_buf(),
            simulate,
            sample_image: None,
        };
        PrintDispatcher::new(config).unwrap()
    }

    fn photo(id: &str, payload: ImagePayload) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            event_id: "e1".to_string(),
            payload,
            status: "pending".to_string(),
        }
    }

    fn spool_file_count(spool: &TempDir) -> usize {
        std::fs::read_dir(spool.path()).unwrap().count()
    }

    #[tokio::test]
    async fn simulate_print_succeeds_and_leaves_no_temp_file() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let data = base64::engine::general_purpose::STANDARD.encode(b"jpegbytes");
        let photo = photo("p1", ImagePayload::DataUrl(format!("data:image/jpeg;base64,{}", data)));

        dispatcher.print_photo(&photo).await.unwrap();
        assert_eq!(spool_file_count(&spool), 0);
    }

    #[tokio::test]
    async fn unsupported_payload_is_rejected_without_temp_file() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let photo = photo("p1", ImagePayload::Unsupported("ftp://x/p.jpg".to_string()));
        let result = dispatcher.print_photo(&photo).await;

        assert!(matches!(result, Err(PrinterError::UnsupportedFormat(_))));
        assert_eq!(spool_file_count(&spool), 0);
    }

    #[tokio::test]
    async fn malformed_data_url_is_a_decode_error() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let photo = photo("p1", ImagePayload::DataUrl("data:image/png;base64".to_string()));
        let result = dispatcher.print_photo(&photo).await;

        assert!(matches!(result, Err(PrinterError::Decode(_))));
        assert_eq!(spool_file_count(&spool), 0);
    }

    #[tokio::test]
    async fn invalid_base64_is_a_decode_error() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let photo = photo(
            "p1",
            ImagePayload::DataUrl("data:image/png;base64,!!!notbase64!!!".to_string()),
        );
        let result = dispatcher.print_photo(&photo).await;

        assert!(matches!(result, Err(PrinterError::Decode(_))));
        assert_eq!(spool_file_count(&spool), 0);
    }

    #[tokio::test]
    async fn unsupported_platform_fails_print_and_cleans_temp_file() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, false).with_platform("plan9");

        let data = base64::engine::general_purpose::STANDARD.encode(b"jpegbytes");
        let photo = photo("p1", ImagePayload::DataUrl(format!("data:image/jpeg;base64,{}", data)));

        let result = dispatcher.print_photo(&photo).await;
        assert!(matches!(result, Err(PrinterError::UnsupportedPlatform(_))));

        // The materialized file must not outlive the failed attempt.
        assert_eq!(spool_file_count(&spool), 0);
        let status = dispatcher.status();
        assert!(!status.printing);
        assert_eq!(status.queued, 0);
    }

    #[tokio::test]
    async fn self_test_short_circuits_in_simulate_mode() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true).with_platform("plan9");

        // Would fail on this platform if it touched any OS facility.
        dispatcher.self_test().await.unwrap();
        assert_eq!(spool_file_count(&spool), 0);
    }

    #[tokio::test]
    async fn idle_status_reports_nothing_in_flight() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let status = dispatcher.status();
        assert!(!status.printing);
        assert_eq!(status.queued, 0);
        assert!(status.current_file.is_none());
    }

    #[test]
    fn spool_path_embeds_photo_id_and_sanitizes() {
        let spool = TempDir::new().unwrap();
        let dispatcher = dispatcher(&spool, true);

        let path = dispatcher.spool_path("ph/oto 1", "jpg");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("print_"));
        assert!(name.ends_with("_ph_oto_1.jpg"));
    }
}
