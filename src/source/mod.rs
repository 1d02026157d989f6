//! Upstream fundraising-page sources.
//!
//! Defines the `PageSource` trait the poll engine depends on, and the
//! JustGiving REST implementation used in production.

pub mod justgiving;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{DonationPage, FundraisingPage};

/// Read access to a fundraising page and its donations.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page details (including the total raised).
    async fn retrieve_page(&self, stream_id: &str) -> Result<FundraisingPage>;

    /// Fetch one page of donations. `page_number` is 1-based.
    ///
    /// `Ok(None)` means the source had no response for that page.
    async fn retrieve_donations_for_page(
        &self,
        stream_id: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<Option<DonationPage>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}
