//! AcoustID fingerprint lookup
//!
//! Stage one of identification: turns a Chromaprint fingerprint into the
//! MusicBrainz recording ids AcoustID knows for it.

use crate::error::LookupError;
use crate::fingerprint::Fingerprint;
use crate::rate_limit::RateLimiter;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

pub const ACOUSTID_LOOKUP_URL: &str = "https://api.acoustid.org/v2/lookup";

/// AcoustID accepts three requests per second
pub const ACOUSTID_MIN_INTERVAL: Duration = Duration::from_millis(334);

/// Raw lookup response
#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<AcoustIdResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub recordings: Option<Vec<AcoustIdRecording>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcoustIdRecording {
    #[serde(default)]
    pub id: Option<String>,
}

/// Recording ids carried by each result, in response order.
///
/// Recording entries without an id are dropped when the match is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcousticMatch {
    pub results: Vec<Vec<String>>,
}

impl AcousticMatch {
    /// No result entries at all
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First id of the first result that carries any
    pub fn first_recording_id(&self) -> Option<&str> {
        self.results
            .iter()
            .find_map(|ids| ids.first())
            .map(String::as_str)
    }
}

impl TryFrom<AcoustIdResponse> for AcousticMatch {
    type Error = LookupError;

    fn try_from(response: AcoustIdResponse) -> Result<Self, Self::Error> {
        if response.status != "ok" {
            return Err(LookupError::Status(response.status));
        }

        let results = response
            .results
            .into_iter()
            .map(|result| {
                result
                    .recordings
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|recording| recording.id.filter(|id| !id.is_empty()))
                    .collect()
            })
            .collect();

        Ok(AcousticMatch { results })
    }
}

/// Fingerprint index lookup
pub trait AcousticIndex: Send + Sync {
    fn lookup(&self, fingerprint: &Fingerprint) -> Result<AcousticMatch, LookupError>;
}

/// AcoustID web service client
///
/// Requests run on the shared tokio runtime; `lookup` blocks the calling worker thread.
pub struct AcoustIdClient {
    http_client: reqwest::Client,
    handle: Handle,
    api_key: String,
    endpoint: String,
    rate_limiter: Arc<RateLimiter>,
}

impl AcoustIdClient {
    pub fn new(api_key: impl Into<String>, handle: Handle) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::APP_VERSION))
            .build()?;

        Ok(Self {
            http_client,
            handle,
            api_key: api_key.into(),
            endpoint: ACOUSTID_LOOKUP_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::new("AcoustID", ACOUSTID_MIN_INTERVAL)),
        })
    }

    /// Point the client at another lookup endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn lookup_async(&self, fingerprint: &Fingerprint) -> Result<AcoustIdResponse, LookupError> {
        let duration = fingerprint.duration.to_string();
        let params = [
            ("client", self.api_key.as_str()),
            ("format", "json"),
            ("meta", "recordings"),
            ("duration", duration.as_str()),
            ("fingerprint", fingerprint.fingerprint.as_str()),
        ];

        self.rate_limiter.wait().await;
        debug!(duration = fingerprint.duration, "Querying AcoustID");

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<AcoustIdResponse>().await?)
    }
}

impl AcousticIndex for AcoustIdClient {
    fn lookup(&self, fingerprint: &Fingerprint) -> Result<AcousticMatch, LookupError> {
        let response = self.handle.block_on(self.lookup_async(fingerprint))?;
        AcousticMatch::try_from(response)
    }
}
