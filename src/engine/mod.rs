//! Core engine: the fetch → aggregate → write poll cycle.

pub mod aggregator;
pub mod fetcher;
pub mod scheduler;

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, trace};

use crate::config::AppConfig;
use crate::source::PageSource;
use crate::storage::SnapshotSink;
use crate::types::{CycleReport, Donation, DonorSnapshot, Slot, TrackerError};

use aggregator::{format_currency, format_total, select_latest, select_top, truncate_name};
use fetcher::Fetcher;

/// Everything one poll cycle needs to know besides its collaborators.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub stream_id: String,
    pub name_max_length: usize,
    pub page_size: u32,
    pub page_count: u32,
}

impl EngineConfig {
    /// Stock settings: 20-character names, two pages of 150 donations.
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self::from_app_config(stream_id, &AppConfig::default())
    }

    pub fn from_app_config(stream_id: impl Into<String>, cfg: &AppConfig) -> Self {
        Self {
            stream_id: stream_id.into(),
            name_max_length: cfg.tracker.name_max_length,
            page_size: cfg.tracker.page_size,
            page_count: cfg.tracker.page_count,
        }
    }
}

/// Runs poll cycles against one fundraiser.
pub struct PollEngine {
    config: EngineConfig,
    fetcher: Fetcher,
    sink: Arc<dyn SnapshotSink>,
    cycle_count: u64,
}

impl PollEngine {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn PageSource>,
        sink: Arc<dyn SnapshotSink>,
    ) -> Self {
        let fetcher = Fetcher::new(source, config.page_size, config.page_count);
        Self {
            config,
            fetcher,
            sink,
            cycle_count: 0,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.config.stream_id
    }

    /// Completed cycles so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Run one complete cycle.
    ///
    /// The total is written before donations are requested; if the total
    /// fails nothing else is attempted. Any error aborts the rest of the
    /// cycle, leaving slots already written this cycle in place.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, TrackerError> {
        let stream_id = self.config.stream_id.as_str();

        // 1. Total raised
        let raw_total = self.fetcher.fetch_total(stream_id).await?;
        let total_raised =
            format_total(&raw_total).map_err(|source| TrackerError::Connection {
                stream_id: stream_id.to_string(),
                source,
            })?;
        info!(stream_id, total = %total_raised, "Total raised");
        self.write(Slot::TotalRaised, &total_raised)?;

        // 2. Donations
        let donations = self.fetcher.fetch_donations(stream_id).await?;
        log_donations(&donations);

        // 3. Latest donor
        let latest = self.donor_snapshot(select_latest(&donations)?);
        self.write(Slot::LatestName, &latest.name)?;
        self.write(Slot::LatestAmount, &latest.amount)?;

        // 4. Top donor
        let top = self.donor_snapshot(select_top(&donations)?);
        self.write(Slot::TopName, &top.name)?;
        self.write(Slot::TopAmount, &top.amount)?;

        self.cycle_count += 1;
        Ok(CycleReport {
            cycle_number: self.cycle_count,
            timestamp: Utc::now(),
            total_raised,
            donations_seen: donations.len(),
            latest,
            top,
        })
    }

    fn donor_snapshot(&self, donation: &Donation) -> DonorSnapshot {
        DonorSnapshot {
            name: truncate_name(&donation.donor_name, self.config.name_max_length),
            amount: format_currency(donation.amount),
        }
    }

    fn write(&self, slot: Slot, value: &str) -> Result<(), TrackerError> {
        self.sink.write_slot(slot, value)?;
        Ok(())
    }
}

fn log_donations(donations: &[Donation]) {
    for d in donations {
        trace!(
            name = %d.donor_name,
            amount = %d.amount,
            message = %d.message,
            date = %d.date,
            "Donation"
        );
    }
    trace!(count = donations.len(), "Donations");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
