//! Shared types for the donation tracker.
//!
//! The data model fetched from the fundraising page, the five output
//! slots, the per-cycle report and the error taxonomy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

/// A single donation as reported by the fundraising page.
///
/// Owned by one poll cycle and dropped once the derived values are written.
#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    pub donor_name: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub message: String,
}

impl Donation {
    pub fn new(
        donor_name: impl Into<String>,
        amount: Decimal,
        date: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            donor_name: donor_name.into(),
            amount,
            date,
            message: message.into(),
        }
    }
}

impl fmt::Display for Donation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} donated {} on {}",
            self.donor_name,
            self.amount,
            self.date.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

/// Page-level details of a fundraiser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundraisingPage {
    /// Total raised, exactly as the API rendered it (e.g. "1000.00").
    pub total_raised: String,
}

/// One page of donations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationPage {
    pub donations: Vec<Donation>,
}

/// Parse a decimal written plainly ("12.50") or in exponent form ("1e3").
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// ---------------------------------------------------------------------------
// Output slots
// ---------------------------------------------------------------------------

/// One of the five snapshot outputs rewritten every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    TotalRaised,
    LatestName,
    LatestAmount,
    TopName,
    TopAmount,
}

impl Slot {
    pub const ALL: &'static [Slot] = &[
        Slot::TotalRaised,
        Slot::LatestName,
        Slot::LatestAmount,
        Slot::TopName,
        Slot::TopAmount,
    ];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::TotalRaised => write!(f, "total raised"),
            Slot::LatestName => write!(f, "latest donation name"),
            Slot::LatestAmount => write!(f, "latest donation amount"),
            Slot::TopName => write!(f, "top donation name"),
            Slot::TopAmount => write!(f, "top donation amount"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Name and formatted amount written for one donor slot pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorSnapshot {
    pub name: String,
    pub amount: String,
}

/// Summary of a single poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub timestamp: DateTime<Utc>,
    pub total_raised: String,
    pub donations_seen: usize,
    pub latest: DonorSnapshot,
    pub top: DonorSnapshot,
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cycle #{}: total={} donations={} latest={} ({}) top={} ({})",
            self.cycle_number,
            self.total_raised,
            self.donations_seen,
            self.latest.name,
            self.latest.amount,
            self.top.name,
            self.top.amount,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Discriminant of a [`TrackerError`], for exhaustive matching by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    NotFound,
    EmptyInput,
    Unexpected,
}

/// Everything that can end a tracking run. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Could not connect to fundraiser: {stream_id}")]
    Connection {
        stream_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unable to retrieve donations for fundraiser: {stream_id}")]
    NotFound {
        stream_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No donations found")]
    EmptyInput,

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Connection { .. } => ErrorKind::Connection,
            TrackerError::NotFound { .. } => ErrorKind::NotFound,
            TrackerError::EmptyInput => ErrorKind::EmptyInput,
            TrackerError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// The line shown to the operator when tracking stops on this error.
    pub fn user_message(&self, stream_id: &str) -> String {
        match self.kind() {
            ErrorKind::Connection => format!("Could not connect to fundraiser: {stream_id}"),
            ErrorKind::NotFound => {
                format!("Unable to retrieve donations for fundraiser: {stream_id}")
            }
            ErrorKind::EmptyInput => format!("No donations found for fundraiser: {stream_id}"),
            ErrorKind::Unexpected => format!("{self:#}\nAn unexpected error has occurred."),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
