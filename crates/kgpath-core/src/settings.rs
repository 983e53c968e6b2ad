//! Store connection and extraction settings.
//!
//! These records back the `[store]` and `[extraction]` sections of the
//! configuration file. They are plain serde structs so any
//! [`ConfigProvider`](crate::ConfigProvider) can hand them out.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default graph identifier used when none is configured.
pub const DEFAULT_GRAPH_ID: &str = "default";

/// Default upper bound on records returned by one traversal query.
pub const DEFAULT_FETCH_LIMIT: usize = 1000;

/// Default hop bound used by the deployed question-answering flow.
pub const DEFAULT_MAX_HOPS: i64 = 2;

/// Environment variables honoured for values the config leaves unset.
const LEGACY_URI: &str = "NEO4J_URI";
const LEGACY_USER: &str = "NEO4J_USER";
const LEGACY_PASSWORD: &str = "NEO4J_PASSWORD";
const LEGACY_GRAPH_ID: &str = "NEO4J_GRAPH_ID";

// ============================================================================
// Store settings
// ============================================================================

/// Connection settings for the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: Option<String>,

    /// Username.
    pub user: Option<String>,

    /// Password.
    pub password: Option<String>,

    /// Tenant identifier; every queried node must carry it as `graph_id`.
    pub graph_id: Option<String>,

    /// Database name (server default when unset).
    pub database: Option<String>,

    /// Size of the connection pool.
    pub max_connections: usize,

    /// Maximum number of path records per traversal query.
    pub fetch_limit: usize,

    /// Per-call timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            uri: None,
            user: None,
            password: None,
            graph_id: None,
            database: None,
            max_connections: 16,
            fetch_limit: DEFAULT_FETCH_LIMIT,
            timeout_secs: 30,
        }
    }
}

impl StoreSettings {
    /// Fill unset connection fields from the `NEO4J_*` environment variables.
    pub fn fill_from_env(&mut self) {
        self.fill_from(|key| std::env::var(key).ok());
    }

    /// Fill unset connection fields using `lookup` for variable values.
    pub fn fill_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fill = |slot: &mut Option<String>, key: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                    *slot = Some(value);
                }
            }
        };
        fill(&mut self.uri, LEGACY_URI);
        fill(&mut self.user, LEGACY_USER);
        fill(&mut self.password, LEGACY_PASSWORD);
        fill(&mut self.graph_id, LEGACY_GRAPH_ID);
    }

    /// Check that everything needed to open a connection is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every missing field.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("uri", &self.uri),
            ("user", &self.user),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::config(format!(
                "incomplete store settings, missing: {} (set them in [store] or via {}/{}/{})",
                missing.join(", "),
                LEGACY_URI,
                LEGACY_USER,
                LEGACY_PASSWORD
            )));
        }
        if self.max_connections == 0 {
            return Err(Error::config("store.max_connections must be at least 1"));
        }
        Ok(())
    }

    /// The tenant identifier, falling back to [`DEFAULT_GRAPH_ID`].
    pub fn graph_id(&self) -> &str {
        self.graph_id
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_GRAPH_ID)
    }

    /// The per-call timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// The fetch limit, never below one.
    pub fn fetch_limit(&self) -> usize {
        self.fetch_limit.max(1)
    }
}

// ============================================================================
// Extraction settings
// ============================================================================

/// Defaults applied to extraction requests that do not override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Hop bound for the traversal query. Values below 1 are clamped.
    pub max_hops: i64,

    /// Traversal direction: `outgoing`, `incoming`, or `both`.
    pub direction: String,

    /// Minimum hop count a path needs to be reported.
    pub min_hops: usize,

    /// Labels a node must carry (any of) to be kept. Empty disables filtering.
    pub labels: Vec<String>,

    /// Recursion bound for path enumeration. Unset, only the cycle guard applies.
    pub max_depth: Option<usize>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            direction: "both".to_string(),
            min_hops: 1,
            labels: Vec::new(),
            max_depth: None,
        }
    }
}

impl ExtractionSettings {
    /// `max_hops` clamped to at least one.
    pub fn clamped_max_hops(&self) -> usize {
        clamp_hops(self.max_hops)
    }
}

/// Clamp a caller-supplied hop count to the supported range.
///
/// Anything below one becomes one; hop counts are never rejected.
pub fn clamp_hops(hops: i64) -> usize {
    if hops < 1 {
        log::debug!("clamping max_hops {hops} to 1");
        1
    } else {
        usize::try_from(hops).unwrap_or(usize::MAX)
    }
}
