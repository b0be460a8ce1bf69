//! Asset details API client
//!
//! Resolves an asset id to its display name with retry and backoff.
//!
//! **Per-id state machine:**
//! - `Attempting(n)` for n = 0..=retries: one request per attempt
//! - 2xx with a name → `Succeeded`
//! - 429 → wait `Retry-After` seconds if given, else `base_delay * 2^n`, retry
//! - network error / 5xx → wait `base_delay * 2^n`, retry
//! - any other status → `FailedFast` (the id does not exist or is malformed)
//! - budget spent → `ExhaustedRetries`
//!
//! Waits only ever suspend the current lookup; ids are resolved one at a time
//! so a shared upstream rate limit is never exceeded by concurrent requests.

use crate::utils::{exponential_delay, parse_retry_after};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

/// Asset details endpoint; `{id}` is replaced by the asset id
pub const DEFAULT_ENDPOINT: &str = "https://economy.roblox.com/v2/assets/{id}/details";
pub const DEFAULT_RETRIES: u32 = 4;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Asset lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("API error {status} for asset {id}")]
    ClientError { id: String, status: u16 },

    #[error("Response for asset {0} carried no name")]
    MissingName(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Exceeded {attempts} attempts for asset {id}")]
    ExhaustedRetries { id: String, attempts: u32 },
}

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    /// `Retry-After` header value, if the server sent one
    pub retry_after: Option<String>,
    pub body: String,
}

impl AssetResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// One request for the details of one asset
///
/// Implementations return `Err` only when no HTTP response was obtained
/// (connect failure, timeout); every status code comes back as `Ok`.
#[async_trait]
pub trait AssetTransport: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<AssetResponse, LookupError>;
}

/// Retry budget for one lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub retries: u32,
    /// Delay unit for exponential backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Total requests permitted for one id
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES, Duration::from_millis(DEFAULT_BASE_DELAY_MS))
    }
}

/// Details payload; the API uses either casing depending on the response shape
#[derive(Debug, Deserialize)]
struct AssetDetails {
    #[serde(rename = "Name")]
    upper: Option<String>,
    #[serde(rename = "name")]
    lower: Option<String>,
}

impl AssetDetails {
    fn into_name(self) -> Option<String> {
        [self.upper, self.lower]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

/// What to do after one attempt
#[derive(Debug)]
enum AttemptOutcome {
    Succeeded(String),
    FailedFast(LookupError),
    Retry { wait: Duration, reason: String },
}

fn evaluate_response(
    id: &str,
    attempt: u32,
    policy: &RetryPolicy,
    response: AssetResponse,
) -> AttemptOutcome {
    match response.status {
        200..=299 => match serde_json::from_str::<AssetDetails>(&response.body) {
            Ok(details) => match details.into_name() {
                Some(name) => AttemptOutcome::Succeeded(name),
                None => AttemptOutcome::FailedFast(LookupError::MissingName(id.to_string())),
            },
            Err(e) => AttemptOutcome::FailedFast(LookupError::ParseError(e.to_string())),
        },
        429 => {
            let hinted = response.retry_after.as_deref().and_then(parse_retry_after);
            AttemptOutcome::Retry {
                wait: hinted.unwrap_or_else(|| exponential_delay(policy.base_delay, attempt)),
                reason: match hinted {
                    Some(_) => "rate limited (server wait hint)".to_string(),
                    None => "rate limited".to_string(),
                },
            }
        }
        500..=599 => AttemptOutcome::Retry {
            wait: exponential_delay(policy.base_delay, attempt),
            reason: format!("server error {}", response.status),
        },
        404 => AttemptOutcome::FailedFast(LookupError::NotFound(id.to_string())),
        status => AttemptOutcome::FailedFast(LookupError::ClientError {
            id: id.to_string(),
            status,
        }),
    }
}

/// Asset name resolver
pub struct AssetClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: AssetTransport> AssetClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `id` to a display name
    ///
    /// Attempt counting is local to this call; every id starts with the full
    /// budget.
    pub async fn lookup(&self, id: &str) -> Result<String, LookupError> {
        let max_attempts = self.policy.max_attempts();

        for attempt in 0..max_attempts {
            tracing::debug!(id = %id, attempt = attempt + 1, max_attempts, "Requesting asset details");

            let outcome = match self.transport.fetch(id).await {
                Ok(response) => evaluate_response(id, attempt, &self.policy, response),
                Err(err) => AttemptOutcome::Retry {
                    wait: exponential_delay(self.policy.base_delay, attempt),
                    reason: err.to_string(),
                },
            };

            match outcome {
                AttemptOutcome::Succeeded(name) => {
                    tracing::debug!(id = %id, name = %name, attempts = attempt + 1, "Resolved asset name");
                    return Ok(name);
                }
                AttemptOutcome::FailedFast(err) => {
                    tracing::error!(id = %id, error = %err, "Asset lookup failed, not retrying");
                    return Err(err);
                }
                AttemptOutcome::Retry { wait, reason } => {
                    if attempt + 1 >= max_attempts {
                        tracing::warn!(id = %id, attempt = attempt + 1, reason = %reason, "Final attempt failed");
                        break;
                    }
                    tracing::warn!(
                        id = %id,
                        attempt = attempt + 1,
                        retries = self.policy.retries,
                        wait_ms = wait.as_millis() as u64,
                        reason = %reason,
                        "Transient lookup failure, will retry after backoff"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }

        tracing::error!(id = %id, attempts = max_attempts, "Exceeded retries fetching asset");
        Err(LookupError::ExhaustedRetries {
            id: id.to_string(),
            attempts: max_attempts,
        })
    }

    /// Resolve `id`, collapsing every failure to `None`
    pub async fn resolve_name(&self, id: &str) -> Option<String> {
        self.lookup(id).await.ok()
    }
}

/// Direct (unkeyed) pacing limiter
type PacingLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Production transport over HTTPS
pub struct HttpAssetTransport {
    http_client: reqwest::Client,
    endpoint: String,
    pacing: Option<PacingLimiter>,
}

impl HttpAssetTransport {
    /// Build a transport
    ///
    /// # Arguments
    /// * `endpoint` - URL template containing `{id}`
    /// * `timeout` - per-request timeout
    /// * `user_agent` - sent with every request
    /// * `requests_per_second` - optional pacing quota applied before each request
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
        requests_per_second: Option<NonZeroU32>,
    ) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            pacing: requests_per_second.map(|rps| RateLimiter::direct(Quota::per_second(rps))),
        })
    }

    pub fn url_for(&self, id: &str) -> String {
        self.endpoint.replace("{id}", id)
    }
}

#[async_trait]
impl AssetTransport for HttpAssetTransport {
    async fn fetch(&self, id: &str) -> Result<AssetResponse, LookupError> {
        if let Some(pacing) = &self.pacing {
            pacing.until_ready().await;
        }

        let url = self.url_for(id);
        tracing::debug!(id = %id, url = %url, "Querying asset details API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::NetworkError(e.to_string()))?;

        Ok(AssetResponse {
            status,
            retry_after,
            body,
        })
    }
}
