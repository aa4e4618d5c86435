//! Single-attempt page fetching
//!
//! One call, one request: build the query, apply the call-level timeout,
//! check the transport status, and decode the envelope. Any failure — bad
//! status, torn body, timeout — surfaces as a [`FetchError`] for the retry
//! controller to absorb. No retry logic lives here.

use crate::config::ApiConfig;
use crate::journal::MatchRecord;
use crate::FetchError;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// JSON envelope returned by the match history endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    result: EnvelopeResult,
}

#[derive(Debug, Deserialize)]
struct EnvelopeResult {
    #[serde(default)]
    matches: Vec<Value>,
}

/// Builds the HTTP client used for every API call
///
/// The client-level timeout is the structured replacement for a manual
/// watchdog: a call that exceeds it comes back as a plain transport error
/// and is handled like any other failed attempt.
pub fn build_http_client(api: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("match-harvester/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(api.request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
}

/// Issues one paginated fetch starting at `cursor`
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `api` - API settings (endpoint, credential, page size)
/// * `cursor` - Inclusive first sequence number of the page
///
/// # Returns
///
/// * `Ok(Vec<MatchRecord>)` - The page, in ascending sequence order. An
///   empty page signals end-of-data.
/// * `Err(FetchError)` - The attempt failed; the caller decides whether to
///   retry.
pub async fn fetch_page(
    client: &Client,
    api: &ApiConfig,
    cursor: u64,
) -> Result<Vec<MatchRecord>, FetchError> {
    let cursor_param = cursor.to_string();
    let page_size_param = api.matches_per_request.to_string();

    let response = client
        .get(&api.base_url)
        .query(&[
            ("key", api.key.as_str()),
            ("start_at_match_seq_num", cursor_param.as_str()),
            ("matches_requested", page_size_param.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    let envelope: Envelope = serde_json::from_slice(&body)?;

    envelope
        .result
        .matches
        .into_iter()
        .map(MatchRecord::from_value)
        .collect()
}
