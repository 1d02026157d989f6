//! Pulls the total and the donation list for one poll cycle.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::source::PageSource;
use crate::types::{Donation, TrackerError};

/// Wraps a [`PageSource`] and classifies its failures.
pub struct Fetcher {
    source: Arc<dyn PageSource>,
    page_size: u32,
    page_count: u32,
}

impl Fetcher {
    pub fn new(source: Arc<dyn PageSource>, page_size: u32, page_count: u32) -> Self {
        Self {
            source,
            page_size,
            page_count,
        }
    }

    /// Total raised, as the source rendered it.
    pub async fn fetch_total(&self, stream_id: &str) -> Result<String, TrackerError> {
        let page = self
            .source
            .retrieve_page(stream_id)
            .await
            .map_err(|source| TrackerError::Connection {
                stream_id: stream_id.to_string(),
                source,
            })?;
        Ok(page.total_raised)
    }

    /// Donation pages `1..=page_count`, concatenated in source order.
    ///
    /// Duplicates across pages are kept. A page the source has no response
    /// for is skipped.
    pub async fn fetch_donations(&self, stream_id: &str) -> Result<Vec<Donation>, TrackerError> {
        let mut donations = Vec::new();

        for page_number in 1..=self.page_count {
            let page = self
                .source
                .retrieve_donations_for_page(stream_id, self.page_size, page_number)
                .await
                .map_err(|source| TrackerError::NotFound {
                    stream_id: stream_id.to_string(),
                    source,
                })?;

            match page {
                Some(page) => donations.extend(page.donations),
                None => warn!(
                    source = self.source.name(),
                    page_number, "No response for donations page, skipping"
                ),
            }
        }

        debug!(
            source = self.source.name(),
            count = donations.len(),
            "Donations fetched"
        );
        Ok(donations)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
