//! Mock photo printer for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};

use crate::gateway::PhotoRecord;
use crate::printer::{PhotoPrinter, PrinterError};

/// Mock implementation of the PhotoPrinter trait.
///
/// Provides controllable behavior for testing:
/// - Record printed photo ids and per-photo attempt counts
/// - Fail configured photo ids deterministically
/// - Optionally gate prints on a semaphore so tests can hold a print
///   in flight while exercising the orchestrator around it
#[derive(Default)]
pub struct MockPhotoPrinter {
    /// Photo ids printed successfully, in order.
    printed: Arc<RwLock<Vec<String>>>,
    /// Print attempts per photo id, failures included.
    attempts: Arc<RwLock<HashMap<String, u32>>>,
    /// Photo ids whose prints always fail.
    failing: Arc<RwLock<HashSet<String>>>,
    /// When set, each print consumes one permit before proceeding.
    gate: Option<Arc<Semaphore>>,
}

impl MockPhotoPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate prints on a semaphore: each print consumes one permit.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Make prints of this photo fail.
    pub async fn fail_photo(&self, photo_id: &str) {
        self.failing.write().await.insert(photo_id.to_string());
    }

    /// Photo ids printed successfully, in order.
    pub async fn printed(&self) -> Vec<String> {
        self.printed.read().await.clone()
    }

    /// Print attempts made for one photo, failures included.
    pub async fn attempts_for(&self, photo_id: &str) -> u32 {
        self.attempts
            .read()
            .await
            .get(photo_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl PhotoPrinter for MockPhotoPrinter {
    async fn print_photo(&self, photo: &PhotoRecord) -> Result<(), PrinterError> {
        *self
            .attempts
            .write()
            .await
            .entry(photo.id.clone())
            .or_insert(0) += 1;

        if let Some(ref gate) = self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| PrinterError::CommandFailed {
                    program: "mock".to_string(),
                    detail: "print gate closed".to_string(),
                })?;
            permit.forget();
        }

        if self.failing.read().await.contains(&photo.id) {
            return Err(PrinterError::CommandFailed {
                program: "mock".to_string(),
                detail: format!("simulated print failure for {}", photo.id),
            });
        }

        self.printed.write().await.push(photo.id.clone());
        Ok(())
    }
}
