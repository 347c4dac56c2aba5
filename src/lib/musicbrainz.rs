use crate::error::LookupError;
use crate::metadata::RecordingMetadata;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

pub const MUSICBRAINZ_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz allows one request per second per client
pub const MUSICBRAINZ_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Associations requested with every recording lookup
pub const RECORDING_INCLUDES: &[&str] = &["artist-credits", "releases", "tags"];

/// Recording metadata catalog
pub trait MetadataCatalog: Send + Sync {
    fn recording(&self, recording_id: &str) -> Result<RecordingMetadata, LookupError>;
}

/// Build the user agent MusicBrainz asks clients to send, with a way to contact the operator
pub fn user_agent(contact_email: &str) -> String {
    format!(
        "{}/{} ( {} )",
        crate::APP_NAME,
        crate::APP_VERSION,
        contact_email
    )
}

/// MusicBrainz web service client
///
/// Every lookup goes through one rate limiter, so workers sharing the client
/// stay within the service's request budget.
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    handle: Handle,
    base_url: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MusicBrainzClient {
    pub fn new(contact_email: &str, handle: Handle) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent(contact_email))
            .build()?;

        Ok(Self {
            http_client,
            handle,
            base_url: MUSICBRAINZ_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::new("MusicBrainz", MUSICBRAINZ_MIN_INTERVAL)),
        })
    }

    /// Point the client at another web service root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the request spacing
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(RateLimiter::new("MusicBrainz", min_interval));
        self
    }

    fn recording_url(&self, recording_id: &str) -> String {
        format!(
            "{}/recording/{}",
            self.base_url.trim_end_matches('/'),
            recording_id
        )
    }

    async fn recording_async(&self, recording_id: &str) -> Result<RecordingMetadata, LookupError> {
        let url = format!(
            "{}?inc={}&fmt=json",
            self.recording_url(recording_id),
            RECORDING_INCLUDES.join("+")
        );

        self.rate_limiter.wait().await;
        debug!(recording_id, "Looking up MusicBrainz recording");

        let response = self
            .http_client
            .get(&url)
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

        let recording = response.json::<RecordingMetadata>().await?;
        if recording.id != recording_id {
            // merged recordings answer with their current MBID
            debug!(requested = recording_id, received = %recording.id, "MusicBrainz redirected recording");
        }

        Ok(recording)
    }
}

impl MetadataCatalog for MusicBrainzClient {
    fn recording(&self, recording_id: &str) -> Result<RecordingMetadata, LookupError> {
        self.handle.block_on(self.recording_async(recording_id))
    }
}
