// crates/spine-broker/src/source/http.rs
// ============================================================================
// Module: Spine HTTP Source
// Description: HTTP-backed narrative source.
// Purpose: Fetch narrative JSON from an upstream governance backend.
// Dependencies: reqwest, spine-core, serde_json, url
// ============================================================================

//! ## Overview
//! `HttpNarrativeSource` resolves narratives via
//! `GET <base>/v1/threads/<thread_id>/narrative`. Non-success status codes,
//! redirects, and oversized bodies fail closed; remote content is untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use spine_core::FetchError;
use spine_core::Narrative;
use spine_core::NarrativeSource;
use spine_core::ThreadId;
use url::Url;

use crate::source::MAX_NARRATIVE_BYTES;

// ============================================================================
// SECTION: HTTP Source
// ============================================================================

/// HTTP-backed narrative source.
#[derive(Debug, Clone)]
pub struct HttpNarrativeSource {
    /// Base URL of the upstream narrative backend.
    base: Url,
    /// HTTP client used for fetch requests.
    client: Client,
}

impl HttpNarrativeSource {
    /// Builds an HTTP source against the provided base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Invalid`] for an unusable base URL and
    /// [`FetchError::Unavailable`] when the HTTP client cannot be built.
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base).map_err(|err| FetchError::Invalid(err.to_string()))?;
        match base.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(FetchError::Invalid(format!("unsupported scheme: {scheme}")));
            }
        }
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        Ok(Self {
            base,
            client,
        })
    }

    /// Creates an HTTP source with a preconfigured client.
    #[must_use]
    pub const fn with_client(base: Url, client: Client) -> Self {
        Self {
            base,
            client,
        }
    }

    /// Builds the narrative URL for a thread.
    fn narrative_url(&self, thread_id: &ThreadId) -> Result<Url, FetchError> {
        self.base
            .join(&format!("v1/threads/{thread_id}/narrative"))
            .map_err(|err| FetchError::Invalid(err.to_string()))
    }
}

impl NarrativeSource for HttpNarrativeSource {
    fn fetch(&self, thread_id: &ThreadId) -> Result<Narrative, FetchError> {
        let url = self.narrative_url(thread_id)?;
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(FetchError::Unavailable(format!("http status {}", response.status())));
        }
        if let Some(length) = response.content_length()
            && length > MAX_NARRATIVE_BYTES as u64
        {
            return Err(FetchError::Invalid(format!(
                "narrative payload exceeds size limit: {length} bytes (max {MAX_NARRATIVE_BYTES})"
            )));
        }
        let mut limited = response.take((MAX_NARRATIVE_BYTES + 1) as u64);
        let mut bytes = Vec::new();
        limited
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::Unavailable(err.to_string()))?;
        if bytes.len() > MAX_NARRATIVE_BYTES {
            return Err(FetchError::Invalid(format!(
                "narrative payload exceeds size limit: {} bytes (max {MAX_NARRATIVE_BYTES})",
                bytes.len()
            )));
        }
        serde_json::from_slice(&bytes).map_err(|err| FetchError::Invalid(err.to_string()))
    }
}
