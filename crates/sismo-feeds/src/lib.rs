//! Upstream feed clients.
//!
//! Each feed is a stateless translator from one external schema to
//! [`Event`] records. Feeds share nothing beyond the [`Feed`] trait; the
//! ingestion driver calls each independently and a failure in one never
//! affects the others.

mod error;
mod geofon;
mod sgc;
mod usgs;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sismo_types::{Event, FeedSource};

pub use error::FeedError;
pub use geofon::{parse_geofon, GeofonFeed, GEOFON_URL};
pub use sgc::{parse_sgc, SgcFeed, SGC_URL};
pub use usgs::{parse_usgs, UsgsFeed, USGS_URL};

/// A source of seismic events.
#[async_trait]
pub trait Feed: Send + Sync {
    /// The source tag stamped on every event this feed returns.
    fn source(&self) -> FeedSource;

    /// Fetches the current batch of events.
    ///
    /// Records that cannot be translated are skipped; only failures that
    /// invalidate the whole response are returned as errors.
    async fn fetch(&self) -> Result<Vec<Event>, FeedError>;
}

/// Builds an HTTP client with the given request timeout.
///
/// # Errors
///
/// Returns `FeedError::Http` if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, FeedError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sismo/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Instantiates the feeds named in configuration (e.g. `"usgs"`, `"geofon"`).
///
/// # Errors
///
/// Returns `FeedError::UnsupportedSource` for a name without a client.
pub fn build_feeds(
    names: &[String],
    client: &reqwest::Client,
) -> Result<Vec<Arc<dyn Feed>>, FeedError> {
    names
        .iter()
        .map(|name| {
            let source: FeedSource = name
                .parse()
                .map_err(|_| FeedError::UnsupportedSource(name.clone()))?;
            match source {
                FeedSource::Usgs => Ok(Arc::new(UsgsFeed::new(client.clone())) as Arc<dyn Feed>),
                FeedSource::Sgc => Ok(Arc::new(SgcFeed::new(client.clone())) as Arc<dyn Feed>),
                FeedSource::Geofon => Ok(Arc::new(GeofonFeed::new(client.clone())) as Arc<dyn Feed>),
            }
        })
        .collect()
}
