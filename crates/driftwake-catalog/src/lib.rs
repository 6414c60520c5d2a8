//! HTTP event catalog for the Driftwake scheduler.
//!
//! The catalog service answers `GET {url}` with a JSON envelope:
//!
//! ```json
//! { "success": true, "events": [ { "id": "hazard_01", "trigger": { ... } } ] }
//! ```
//!
//! [`HttpCatalog`] implements [`EventCatalog`] over that endpoint. Transport
//! failures, non-2xx statuses, `success: false` and undecodable envelopes
//! all surface as [`CatalogError`] variants, which the scheduler treats
//! alike. Entries are decoded one at a time: a malformed entry is logged and
//! dropped, and the rest of the catalog stays usable.
//! Deadlines are enforced by the scheduler, not here.

use driftwake_core::catalog::{CatalogError, EventCatalog};
use driftwake_core::config::CatalogConfig;
use driftwake_types::EventDefinition;
use serde::Deserialize;
use tracing::{debug, warn};

/// The envelope returned by the catalog endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    events: Vec<serde_json::Value>,
}

/// Event catalog served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    /// Create a catalog client for the configured endpoint.
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.url.clone())
    }

    /// Create a catalog client that reuses an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// The endpoint this client fetches from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EventCatalog for HttpCatalog {
    async fn fetch_events(&self) -> Result<Vec<EventDefinition>, CatalogError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                message: format!("request to {} failed: {e}", self.url),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| CatalogError::Transport {
            message: format!("reading catalog body failed: {e}"),
        })?;
        let events = parse_payload(&body)?;
        debug!(url = %self.url, count = events.len(), "catalog fetched");
        Ok(events)
    }
}

/// Decode a catalog envelope into its event definitions.
///
/// # Errors
///
/// Returns [`CatalogError::Decode`] if the body is not a valid envelope and
/// [`CatalogError::Unsuccessful`] if it reports `success: false` (or omits
/// the flag). Individual entries that fail to decode are skipped, not
/// reported.
pub fn parse_payload(body: &str) -> Result<Vec<EventDefinition>, CatalogError> {
    let response: CatalogResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Decode {
            message: e.to_string(),
        })?;
    if !response.success {
        return Err(CatalogError::Unsuccessful);
    }

    let total = response.events.len();
    let events: Vec<EventDefinition> = response
        .events
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| decode_entry(index, entry))
        .collect();
    if events.len() < total {
        warn!(
            total,
            kept = events.len(),
            "catalog entries skipped as malformed"
        );
    }
    Ok(events)
}

/// Decode one catalog entry, logging and dropping it on failure.
fn decode_entry(index: usize, entry: serde_json::Value) -> Option<EventDefinition> {
    let id = entry
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<missing>")
        .to_owned();
    match serde_json::from_value(entry) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(index, event_id = %id, error = %e, "skipping malformed catalog entry");
            None
        }
    }
}
