//! Cached loading of configuration documents.
//!
//! ```text
//! ConfigResolver
//!     ↓ uses
//! DocumentLoader (cache)
//!     ↓ depends on (abstraction)
//! DocumentSource trait
//!     ↑ implemented by
//! FileSystemDocumentSource
//! ```
//!
//! Each document is parsed at most once per loader. Cached documents are
//! shared as `Arc<ConfigDocument>` and never change after loading.

use crate::document::ConfigDocument;
use crate::document_source::DocumentSource;
use crate::{ConfigurationResult, DocumentName};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

#[cfg(test)]
#[path = "document_loader_tests.rs"]
mod tests;

/// Configuration document loader with caching.
///
/// # Cache Behavior
///
/// - Cache key: the document name
/// - No automatic expiration (manual invalidation via `invalidate_cache()`)
/// - Failed loads are not cached
/// - Thread-safe concurrent access via `RwLock`
pub struct DocumentLoader {
    /// Document source implementation
    source: Arc<dyn DocumentSource>,

    /// Parsed documents by name
    cache: RwLock<HashMap<DocumentName, Arc<ConfigDocument>>>,

    /// Cache statistics for monitoring
    stats: RwLock<CacheStatistics>,
}

impl std::fmt::Debug for DocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLoader")
            .field("source", &"Arc<dyn DocumentSource>")
            .field("cache", &self.cache)
            .field("stats", &self.stats)
            .finish()
    }
}

impl DocumentLoader {
    /// Create a new loader over a document source.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
            stats: RwLock::new(CacheStatistics::default()),
        }
    }

    /// Load a document, serving it from cache when possible.
    ///
    /// # Errors
    ///
    /// Propagates the source's error unchanged; see [`DocumentSource::load_document`].
    pub async fn load(&self, name: &DocumentName) -> ConfigurationResult<Arc<ConfigDocument>> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(document) = cache.get(name) {
                debug!("Document cache hit: {}", name);

                let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
                stats.total_requests += 1;
                stats.cache_hits += 1;

                return Ok(Arc::clone(document));
            }
        }

        debug!("Document cache miss: {}", name);
        {
            let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
            stats.total_requests += 1;
            stats.cache_misses += 1;
        }

        // Load outside any locks
        let document = Arc::new(self.source.load_document(name).await?);

        let document = {
            let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
            // A concurrent load may have won the race; keep the first instance.
            let cached = Arc::clone(cache.entry(name.clone()).or_insert(document));

            let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
            stats.cached_entries = cache.len();
            cached
        };

        info!("Document cached: {}", name);
        Ok(document)
    }

    /// Remove one document from the cache.
    ///
    /// Returns `true` if the document was cached.
    pub fn invalidate_cache(&self, name: &DocumentName) -> bool {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let was_present = cache.remove(name).is_some();

        if was_present {
            let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
            stats.cached_entries = cache.len();
            debug!("Invalidated cache entry: {}", name);
        }

        was_present
    }

    /// Remove every document from the cache.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.clear();

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.cached_entries = 0;

        info!("All document cache entries cleared");
    }

    /// Snapshot of cache performance counters.
    pub fn cache_statistics(&self) -> CacheStatistics {
        *self.stats.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check whether a document exists. Never consults the cache.
    pub async fn document_exists(&self, name: &DocumentName) -> ConfigurationResult<bool> {
        self.source.document_exists(name).await
    }
}

/// Cache performance statistics.
///
/// ```
/// use config_resolver::CacheStatistics;
///
/// let stats = CacheStatistics {
///     total_requests: 4,
///     cache_hits: 3,
///     cache_misses: 1,
///     cached_entries: 1,
/// };
///
/// assert_eq!(stats.hit_ratio(), 0.75);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStatistics {
    /// Total number of load requests
    pub total_requests: u64,

    /// Number of requests served from cache
    pub cache_hits: u64,

    /// Number of requests that required a source load
    pub cache_misses: u64,

    /// Current number of cached documents
    pub cached_entries: usize,
}

impl CacheStatistics {
    /// Cache hit ratio (0.0 to 1.0). Returns 0.0 if no requests have been made.
    pub fn hit_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}
