//! Capture source bridge
//!
//! The single request a view can make: list the screens and windows it may
//! share. Enumeration failures never reach the view; they degrade to an empty
//! list.

use crate::capture::{CaptureSource, SourceOptions, SourceProvider};
use serde::Serialize;
use std::sync::Arc;

/// Request name views use for source enumeration
pub const GET_SOURCES: &str = "get_sources";

/// Outcome of one enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceListing {
    /// Sources in provider order; empty when degraded
    pub sources: Vec<CaptureSource>,

    /// The provider failed and the empty list stands in for its result
    pub degraded: bool,
}

impl SourceListing {
    fn complete(sources: Vec<CaptureSource>) -> Self {
        Self {
            sources,
            degraded: false,
        }
    }

    fn degraded() -> Self {
        Self {
            sources: Vec::new(),
            degraded: true,
        }
    }
}

/// Delegates enumeration to a provider with fixed options
pub struct SourceBridge {
    provider: Arc<dyn SourceProvider>,
    options: SourceOptions,
}

impl SourceBridge {
    pub fn new(provider: Arc<dyn SourceProvider>, options: SourceOptions) -> Self {
        Self { provider, options }
    }

    /// One best-effort enumeration: no retry, no timeout, no caching
    pub async fn get_sources(&self) -> SourceListing {
        match self.provider.get_sources(&self.options).await {
            Ok(sources) => {
                tracing::debug!("{} returned {} sources", GET_SOURCES, sources.len());
                SourceListing::complete(sources)
            }
            Err(e) => {
                tracing::error!("Failed to get capture sources: {}", e);
                SourceListing::degraded()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureError, CaptureResult, SourceType};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FixedProvider {
        sources: Vec<CaptureSource>,
        seen_options: Mutex<Vec<SourceOptions>>,
    }

    #[async_trait]
    impl SourceProvider for FixedProvider {
        async fn get_sources(&self, options: &SourceOptions) -> CaptureResult<Vec<CaptureSource>> {
            self.seen_options.lock().push(options.clone());
            Ok(self.sources.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SourceProvider for FailingProvider {
        async fn get_sources(&self, _options: &SourceOptions) -> CaptureResult<Vec<CaptureSource>> {
            Err(CaptureError::Enumeration("display server unavailable".to_string()))
        }
    }

    fn source(source_type: SourceType, native_id: u32, name: &str) -> CaptureSource {
        CaptureSource {
            id: CaptureSource::make_id(source_type, native_id),
            name: name.to_string(),
            source_type,
            thumbnail: String::new(),
            display_id: match source_type {
                SourceType::Screen => native_id.to_string(),
                SourceType::Window => String::new(),
            },
            app_icon: None,
        }
    }

    #[tokio::test]
    async fn test_sources_pass_through_unmodified() {
        // Deliberately unsorted to check order is preserved
        let sources = vec![
            source(SourceType::Window, 90, "Zeta"),
            source(SourceType::Window, 12, "Alpha"),
            source(SourceType::Screen, 2, "Display 2"),
            source(SourceType::Screen, 1, "Display 1"),
        ];
        let provider = Arc::new(FixedProvider {
            sources: sources.clone(),
            seen_options: Mutex::new(Vec::new()),
        });
        let bridge = SourceBridge::new(provider.clone(), SourceOptions::default());

        let listing = bridge.get_sources().await;

        assert!(!listing.degraded);
        assert_eq!(listing.sources.len(), 4);
        assert_eq!(listing.sources, sources);
        assert_eq!(provider.seen_options.lock().as_slice(), &[SourceOptions::default()]);
    }

    #[tokio::test]
    async fn test_empty_platform_result_is_not_degraded() {
        let provider = Arc::new(FixedProvider {
            sources: Vec::new(),
            seen_options: Mutex::new(Vec::new()),
        });
        let bridge = SourceBridge::new(provider, SourceOptions::default());

        let listing = bridge.get_sources().await;

        assert!(listing.sources.is_empty());
        assert!(!listing.degraded);
    }

    #[tokio::test]
    async fn test_failure_becomes_empty_listing() {
        let bridge = SourceBridge::new(Arc::new(FailingProvider), SourceOptions::default());

        let listing = bridge.get_sources().await;

        assert!(listing.sources.is_empty());
        assert!(listing.degraded);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let provider = Arc::new(FixedProvider {
            sources: vec![source(SourceType::Screen, 1, "Display 1")],
            seen_options: Mutex::new(Vec::new()),
        });
        let bridge = SourceBridge::new(provider.clone(), SourceOptions::default());

        let (a, b) = tokio::join!(bridge.get_sources(), bridge.get_sources());

        assert_eq!(a, b);
        assert_eq!(provider.seen_options.lock().len(), 2);
    }
}
