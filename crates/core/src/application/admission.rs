// Admission Control - caps simultaneously running backend processes

use crate::error::{AppError, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Semaphore in front of the process invoker.
/// A permit is held for the whole lifetime of one child process.
#[derive(Clone)]
pub struct AdmissionControl {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl AdmissionControl {
    /// # Errors
    /// - AppError::Config if `limit` is zero (nothing could ever run)
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(AppError::Config(
                "max_concurrent_processes must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        })
    }

    /// Wait for a free slot. The slot is released when the permit is dropped.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit> {
        if self.semaphore.available_permits() == 0 {
            debug!(limit = self.limit, "Backend slots exhausted, waiting for admission");
        }
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("admission semaphore closed: {}", e)))
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.limit - self.available()
    }
}
