//! End-to-end extraction: store fetch, assembly, enumeration, hop filter.
//!
//! [`Extractor`] owns a shared [`GraphStore`] handle and runs one request at
//! a time per call; everything it builds along the way is local to that
//! call. Store failures and timeouts surface as connectivity errors. An
//! unknown start entity is not an error and yields no paths.

use crate::assembler::{AssemblyReport, SubgraphAssembler};
use crate::enumerator::PathEnumerator;
use crate::hop_filter::filter_min_hops;
use crate::store::{BoundedPathQuery, GraphStore};
use crate::{Direction, LabelFilter, Path, Subgraph, render_paths};
use kgpath_core::settings::{DEFAULT_FETCH_LIMIT, DEFAULT_MAX_HOPS, clamp_hops};
use kgpath_core::{Error, ExtractionSettings, Result, StoreSettings};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Request
// ============================================================================

/// Parameters of one extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// `name` of the start entity.
    pub start_name: String,
    /// Requested hop bound; clamped to at least one when used.
    pub max_hops: i64,
    /// Traversal direction.
    pub direction: Direction,
    /// Optional label filter.
    pub labels: Option<LabelFilter>,
    /// Minimum hop count of reported paths.
    pub min_hops: usize,
    /// Explicit enumeration depth bound. Unset, only the cycle guard applies.
    pub max_depth: Option<usize>,
}

impl ExtractionRequest {
    /// A request with default bounds: two hops, both directions, no filter.
    pub fn new(start_name: impl Into<String>) -> Self {
        Self {
            start_name: start_name.into(),
            max_hops: DEFAULT_MAX_HOPS,
            direction: Direction::Both,
            labels: None,
            min_hops: 0,
            max_depth: None,
        }
    }

    /// A request using configured defaults.
    pub fn from_settings(start_name: impl Into<String>, settings: &ExtractionSettings) -> Self {
        Self {
            start_name: start_name.into(),
            max_hops: settings.max_hops,
            direction: Direction::parse_lenient(&settings.direction),
            labels: LabelFilter::from_labels(&settings.labels),
            min_hops: settings.min_hops,
            max_depth: settings.max_depth,
        }
    }

    /// Set the hop bound.
    pub fn with_max_hops(mut self, max_hops: i64) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Set the direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Restrict to nodes carrying any of `labels`. An empty list clears the filter.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = LabelFilter::from_labels(labels);
        self
    }

    /// Set the minimum hop count.
    pub fn with_min_hops(mut self, min_hops: usize) -> Self {
        self.min_hops = min_hops;
        self
    }

    /// Override the enumeration depth bound.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The clamped hop bound.
    pub fn hop_bound(&self) -> usize {
        clamp_hops(self.max_hops)
    }

    /// The enumeration depth bound, if one was requested.
    ///
    /// The hop bound limits distance from the start entity, not the length
    /// of a root-to-leaf walk, so it is never used here.
    pub fn depth_bound(&self) -> Option<usize> {
        self.max_depth.map(|d| d.max(1))
    }

    /// The store query for this request.
    pub fn to_query(&self, limit: usize) -> BoundedPathQuery {
        BoundedPathQuery::new(self.start_name.clone(), self.max_hops, self.direction)
            .with_limit(limit)
    }
}

// ============================================================================
// Result
// ============================================================================

/// Everything one extraction produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// The assembled subgraph.
    pub subgraph: Subgraph,
    /// What assembly discarded or repaired.
    pub report: AssemblyReport,
    /// Enumerated paths after the hop filter.
    pub paths: Vec<Path>,
}

impl Extraction {
    /// Paths rendered with the ` -> ` delimiter.
    pub fn rendered(&self) -> Vec<String> {
        render_paths(&self.paths)
    }

    /// Number of paths cut short by the cycle or depth guard.
    pub fn truncated_count(&self) -> usize {
        self.paths.iter().filter(|p| p.truncated).count()
    }
}

// ============================================================================
// Extractor
// ============================================================================

/// Runs extraction requests against a graph store.
#[derive(Clone)]
pub struct Extractor {
    store: Arc<dyn GraphStore>,
    fetch_limit: usize,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("store", &self.store.name())
            .field("fetch_limit", &self.fetch_limit)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Extractor {
    /// Create an extractor with the default fetch limit and no timeout.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            timeout: None,
        }
    }

    /// Create an extractor using the limits from `settings`.
    pub fn from_settings(store: Arc<dyn GraphStore>, settings: &StoreSettings) -> Self {
        Self::new(store)
            .with_fetch_limit(settings.fetch_limit())
            .with_timeout(settings.timeout())
    }

    /// Set the maximum number of records fetched per request.
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit.max(1);
        self
    }

    /// Bound every store call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Fetch and assemble the subgraph for `request`.
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the store call fails or times out.
    pub async fn fetch_subgraph(
        &self,
        request: &ExtractionRequest,
    ) -> Result<(Subgraph, AssemblyReport)> {
        let query = request.to_query(self.fetch_limit);
        log::debug!(
            "fetching paths from '{}' ({} hops, {}) via {}",
            query.start_name,
            query.max_hops,
            query.direction,
            self.store.name()
        );

        let records = self.bounded(self.store.fetch_bounded_paths(&query)).await?;
        if records.len() >= query.limit {
            log::warn!(
                "traversal from '{}' hit the fetch limit of {} records; subgraph may be partial",
                query.start_name,
                query.limit
            );
        }

        let mut assembler = SubgraphAssembler::new().with_filter(request.labels.clone());
        assembler.add_records(&records);
        Ok(assembler.finish_with_report())
    }

    /// Run the full pipeline for `request`.
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the store call fails or times out.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<Extraction> {
        let (subgraph, report) = self.fetch_subgraph(request).await?;
        if subgraph.is_empty() {
            log::debug!("no subgraph found for '{}'", request.start_name);
        }

        let paths = PathEnumerator::new()
            .with_max_depth(request.depth_bound())
            .enumerate(&subgraph);
        let paths = filter_min_hops(paths, request.min_hops);

        log::debug!(
            "extracted {} paths from {} nodes / {} edges for '{}'",
            paths.len(),
            subgraph.node_count(),
            subgraph.edge_count(),
            request.start_name
        );

        Ok(Extraction {
            subgraph,
            report,
            paths,
        })
    }

    /// Run the full pipeline and render the paths.
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the store call fails or times out.
    pub async fn extract_paths(&self, request: &ExtractionRequest) -> Result<Vec<String>> {
        Ok(self.extract(request).await?.rendered())
    }

    /// Await `fut` under the configured timeout.
    pub(crate) async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => fut.await,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
