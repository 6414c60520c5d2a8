//! Event catalog abstraction.
//!
//! The scheduler is generic over [`EventCatalog`], so the HTTP client in
//! `driftwake-catalog` and the in-memory [`StaticCatalog`] used by tests and
//! offline hosts plug in the same way. A fetch that fails for any reason is
//! a soft failure: the scheduler logs it and abandons the check.

use std::future::Future;
use std::sync::Arc;

use driftwake_types::EventDefinition;

/// Errors a catalog fetch can surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("catalog transport error: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder if it could not be read.
        body: String,
    },

    /// The payload arrived but reported `success: false`.
    #[error("catalog reported an unsuccessful response")]
    Unsuccessful,

    /// The payload could not be decoded into event definitions.
    #[error("catalog payload could not be decoded: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The fetch did not complete before the configured deadline.
    #[error("catalog fetch timed out after {timeout_ms} ms")]
    Timeout {
        /// The deadline that was exceeded.
        timeout_ms: u64,
    },
}

/// A source of event definitions.
pub trait EventCatalog {
    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing why no catalog is available.
    fn fetch_events(
        &self,
    ) -> impl Future<Output = Result<Vec<EventDefinition>, CatalogError>> + Send;
}

impl<C> EventCatalog for Arc<C>
where
    C: EventCatalog + Send + Sync,
{
    fn fetch_events(
        &self,
    ) -> impl Future<Output = Result<Vec<EventDefinition>, CatalogError>> + Send {
        self.as_ref().fetch_events()
    }
}

/// A fixed, in-memory catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticCatalog {
    events: Vec<EventDefinition>,
}

impl StaticCatalog {
    /// Wrap a list of event definitions.
    pub const fn new(events: Vec<EventDefinition>) -> Self {
        Self { events }
    }

    /// The definitions this catalog serves.
    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }
}

impl EventCatalog for StaticCatalog {
    async fn fetch_events(&self) -> Result<Vec<EventDefinition>, CatalogError> {
        Ok(self.events.clone())
    }
}
