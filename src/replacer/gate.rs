//! Admission gate bounding the number of files processed at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Counters {
  in_flight: AtomicUsize,
  peak: AtomicUsize,
}

/// Counting gate shared by the tasks of one batch.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
  semaphore: Arc<Semaphore>,
  counters: Arc<Counters>,
}

/// A slot of the gate. Dropping it releases the slot, however the task ends.
#[derive(Debug)]
pub struct Admission {
  _permit: OwnedSemaphorePermit,
  counters: Arc<Counters>,
}

impl AdmissionGate {
  pub fn new(limit: usize) -> Self {
    Self {
      semaphore: Arc::new(Semaphore::new(limit.max(1))),
      counters: Arc::default(),
    }
  }

  /// Waits for a free slot. Returns `None` if `cancel` fires first.
  pub async fn enter(&self, cancel: &CancellationToken) -> Option<Admission> {
    if cancel.is_cancelled() {
      return None;
    }

    let permit = tokio::select! {
      biased;
      () = cancel.cancelled() => return None,
      permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok()?,
    };

    let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.counters.peak.fetch_max(now, Ordering::SeqCst);

    Some(Admission {
      _permit: permit,
      counters: Arc::clone(&self.counters),
    })
  }

  /// Highest number of simultaneously admitted tasks so far.
  pub fn peak(&self) -> usize {
    self.counters.peak.load(Ordering::SeqCst)
  }
}

impl Drop for Admission {
  fn drop(&mut self) {
    self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
  }
}
