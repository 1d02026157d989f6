//! JustGiving fundraising-page integration.
//!
//! Read-only access to a fundraising page's totals and donations.
//!
//! API docs: https://api.justgiving.com/docs
//! Base URL: https://api.justgiving.com/{appId}/v1/
//! Auth: application id in the path; no user auth needed for reads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, trace};

use super::PageSource;
use crate::types::{parse_decimal, Donation, DonationPage, FundraisingPage};

const SOURCE_NAME: &str = "justgiving";

// ---------------------------------------------------------------------------
// API response types (JustGiving JSON → Rust)
// ---------------------------------------------------------------------------

/// `GET /v1/fundraising/pages/{pageShortName}`. Only the fields we need.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JgFundraisingPage {
    /// Rendered as a string by the API ("1000.00"), occasionally a number.
    #[serde(default)]
    total_raised: Option<serde_json::Value>,
}

/// `GET /v1/fundraising/pages/{pageShortName}/donations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JgDonationList {
    #[serde(default)]
    donations: Option<Vec<JgDonation>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JgDonation {
    #[serde(default)]
    donor_display_name: Option<String>,
    /// String, number, or null when the donor hid the amount.
    #[serde(default)]
    amount: Option<serde_json::Value>,
    /// `/Date(1556326412000+0000)/` or RFC 3339.
    #[serde(default)]
    donation_date: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// JustGiving read-only client.
pub struct JustGivingClient {
    http: Client,
    base_url: String,
    app_id: SecretString,
}

impl JustGivingClient {
    /// Create a new client against `base_url` (no trailing slash needed).
    pub fn new(base_url: &str, app_id: SecretString) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("donation-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for JustGiving")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn page_url(&self, stream_id: &str) -> String {
        format!(
            "{}/{}/v1/fundraising/pages/{}",
            self.base_url,
            urlencoding::encode(self.app_id.expose_secret()),
            urlencoding::encode(stream_id),
        )
    }

    fn donations_url(&self, stream_id: &str, page_size: u32, page_number: u32) -> String {
        format!(
            "{}/donations?pageSize={page_size}&pageNum={page_number}",
            self.page_url(stream_id)
        )
    }

    /// GET a JSON endpoint. `Ok(None)` on 204 No Content.
    async fn get_body(&self, url: &str, what: &str) -> Result<Option<String>> {
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("JustGiving {what} request failed"))?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status == StatusCode::NOT_FOUND {
            anyhow::bail!("JustGiving {what} not found");
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("JustGiving API error {status}: {body}");
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read JustGiving {what} response"))?;
        Ok(Some(body))
    }

    fn parse_page(body: &str) -> Result<FundraisingPage> {
        let page: JgFundraisingPage =
            serde_json::from_str(body).context("Failed to parse JustGiving page response")?;

        let total_raised = match page.total_raised {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => anyhow::bail!("JustGiving page response has no totalRaised"),
        };

        Ok(FundraisingPage { total_raised })
    }

    fn parse_donations(body: &str) -> Result<Option<DonationPage>> {
        let list: Option<JgDonationList> = serde_json::from_str(body)
            .context("Failed to parse JustGiving donations response")?;

        Ok(list.map(|l| DonationPage {
            donations: l
                .donations
                .unwrap_or_default()
                .into_iter()
                .map(Self::to_donation)
                .collect(),
        }))
    }

    fn to_donation(d: JgDonation) -> Donation {
        let amount = d
            .amount
            .as_ref()
            .and_then(parse_amount)
            .unwrap_or(Decimal::ZERO);
        let date = d
            .donation_date
            .as_deref()
            .and_then(parse_donation_date)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        Donation {
            donor_name: d.donor_display_name.unwrap_or_default(),
            amount,
            date,
            message: d.message.unwrap_or_default(),
        }
    }
}

/// Amount as sent by the API: a decimal string or a JSON number.
fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => parse_decimal(s),
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

/// Parse either the WCF `/Date(ms+zzzz)/` form or an RFC 3339 timestamp.
fn parse_donation_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(inner) = raw
        .strip_prefix("/Date(")
        .and_then(|s| s.strip_suffix(")/"))
    {
        // The offset only affects local rendering; the millis are UTC.
        let end = inner
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '+' || *c == '-')
            .map(|(i, _)| i)
            .unwrap_or(inner.len());
        let ms: i64 = inner[..end].parse().ok()?;
        return Utc.timestamp_millis_opt(ms).single();
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// PageSource trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PageSource for JustGivingClient {
    async fn retrieve_page(&self, stream_id: &str) -> Result<FundraisingPage> {
        debug!(stream_id, "Fetching JustGiving page");

        let body = self
            .get_body(&self.page_url(stream_id), "page")
            .await?
            .context("JustGiving page response was empty")?;

        Self::parse_page(&body)
    }

    async fn retrieve_donations_for_page(
        &self,
        stream_id: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<Option<DonationPage>> {
        debug!(stream_id, page_size, page_number, "Fetching JustGiving donations");

        let url = self.donations_url(stream_id, page_size, page_number);
        let page = match self.get_body(&url, "donations").await? {
            Some(body) => Self::parse_donations(&body)?,
            None => None,
        };

        trace!(
            page_number,
            count = page.as_ref().map(|p| p.donations.len()),
            "JustGiving donations page received"
        );
        Ok(page)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
