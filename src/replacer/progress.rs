//! Progress reporting for batch operations.

use std::path::PathBuf;

use tokio::sync::{Mutex, mpsc};

/// Emitted once per completed file of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacerProgress {
  pub total_files: usize,
  pub processed_files: usize,
  pub path: PathBuf,
  /// The new content, for content-mode batches.
  pub content: Option<String>,
}

/// Receiving end is owned by the caller of a batch.
pub type ProgressSender = mpsc::UnboundedSender<ReplacerProgress>;

/// Per-batch progress counter. Every batch creates a fresh reporter, which
/// resets the count.
#[derive(Debug)]
pub struct ProgressReporter {
  total: usize,
  processed: Mutex<usize>,
  sender: Option<ProgressSender>,
}

impl ProgressReporter {
  pub fn new(total: usize, sender: Option<ProgressSender>) -> Self {
    Self {
      total,
      processed: Mutex::new(0),
      sender,
    }
  }

  /// Counts one completed file and publishes the event. Events leave in the
  /// order of their counter values.
  pub async fn report(&self, path: PathBuf, content: Option<String>) {
    let mut processed = self.processed.lock().await;
    *processed += 1;

    if let Some(sender) = &self.sender {
      // A dropped receiver only means nobody is listening.
      let _ = sender.send(ReplacerProgress {
        total_files: self.total,
        processed_files: *processed,
        path,
        content,
      });
    }
  }

  pub async fn processed(&self) -> usize {
    *self.processed.lock().await
  }
}
