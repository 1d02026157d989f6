//! Snapshot persistence.
//!
//! Each output slot is a small text file that overlay software reads.
//! Every write replaces the whole file; there is no append and no
//! rename-into-place, so a reader may briefly see a partial file.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::config::OutputConfig;
use crate::types::Slot;

/// Destination for the five snapshot values.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotSink: Send + Sync {
    /// Overwrite `slot` with `value`. Slots are independent: a failure on
    /// one leaves the others as they are.
    fn write_slot(&self, slot: Slot, value: &str) -> Result<()>;
}

/// Writes each slot to its own file under the configured directory.
pub struct FileSink {
    output: OutputConfig,
}

impl FileSink {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn path_for(&self, slot: Slot) -> PathBuf {
        self.output.path_for(slot)
    }
}

impl SnapshotSink for FileSink {
    fn write_slot(&self, slot: Slot, value: &str) -> Result<()> {
        let path = self.path_for(slot);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write {slot} to {}", path.display()))?;

        debug!(path = %path.display(), %slot, value, "Slot written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
