//! Configuration for the kgpath CLI.
//!
//! Provides the [`KgpathConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `KGPATH_CONFIG` environment variable
//! 3. XDG default: `~/.config/kgpath/config.toml`
//! 4. Built-in defaults
//!
//! `KGPATH_<SECTION>_<KEY>` variables override file values. Store
//! credentials still missing after that are taken from the `NEO4J_*`
//! variables.

use confyg::{Confygery, env};
use kgpath_core::traits::ConfigProvider;
use kgpath_core::{Error, ExtractionSettings, Result, StoreSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "KGPATH_CONFIG";

/// Prefix of override environment variables.
const ENV_PREFIX: &str = "KGPATH";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the kgpath CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KgpathConfig {
    /// Project name, shown in logs and version output.
    pub project_name: String,

    /// Graph store connection.
    pub store: StoreSettings,

    /// Extraction defaults.
    pub extraction: ExtractionSettings,
}

impl Default for KgpathConfig {
    fn default() -> Self {
        Self {
            project_name: "kgpath".to_string(),
            store: StoreSettings::default(),
            extraction: ExtractionSettings::default(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl KgpathConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// A config path that does not exist is not an error; defaults apply.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("store");
        env_opts.add_section("extraction");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("kgpath").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `KGPATH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for KgpathConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn store_settings(&self) -> Result<StoreSettings> {
        let mut store = self.store.clone();
        store.fill_from_env();
        store.validate()?;
        Ok(store)
    }

    fn extraction_settings(&self) -> ExtractionSettings {
        self.extraction.clone()
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// RAII guard for env var manipulation in tests.
    pub(crate) struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        pub(crate) fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: test-only; each guarded key is used by a single test.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        pub(crate) fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: see `new`.
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: see `new`.
            unsafe {
                match &self.prev {
                    Some(val) => std::env::set_var(&self.key, val),
                    None => std::env::remove_var(&self.key),
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_kgpath_config_default() {
        let config = KgpathConfig::default();
        assert_eq!(config.project_name, "kgpath");
        assert!(config.store.uri.is_none());
        assert_eq!(config.store.max_connections, 16);
        assert_eq!(config.extraction.max_hops, 2);
        assert_eq!(config.extraction.direction, "both");
        assert_eq!(config.extraction.min_hops, 1);
        assert!(config.extraction.labels.is_empty());
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_kgpath_config_from_toml() {
        let toml_str = r#"
            project_name = "steel-qa"

            [store]
            uri = "bolt://db:7687"
            user = "neo4j"
            password = "secret"
            graph_id = "g42"
            fetch_limit = 500

            [extraction]
            max_hops = 3
            direction = "out"
            labels = ["Entity", "Question"]
        "#;

        let config: KgpathConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.project_name, "steel-qa");
        assert_eq!(config.store.uri.as_deref(), Some("bolt://db:7687"));
        assert_eq!(config.store.graph_id(), "g42");
        assert_eq!(config.store.fetch_limit, 500);
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.extraction.max_hops, 3);
        assert_eq!(config.extraction.labels, vec!["Entity", "Question"]);
        assert_eq!(config.extraction.min_hops, 1);
    }

    #[test]
    fn test_kgpath_config_to_toml_round_trip() {
        let config = KgpathConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("project_name = \"kgpath\""));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[extraction]"));
        assert!(toml_str.contains("max_hops = 2"));

        let parsed: KgpathConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_kgpath_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "loaded"
                [store]
                uri = "bolt://file:7687"
                [extraction]
                max_hops = 4
            "#,
        )
        .unwrap();

        let config = KgpathConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.project_name, "loaded");
        assert_eq!(config.store.uri.as_deref(), Some("bolt://file:7687"));
        assert_eq!(config.extraction.max_hops, 4);
    }

    #[test]
    fn test_kgpath_config_load_defaults() {
        let config = KgpathConfig::load(Some("/nonexistent/kgpath.toml")).unwrap();
        assert_eq!(config.project_name, "kgpath");
        assert_eq!(config.extraction.max_hops, 2);
    }

    #[test]
    fn test_kgpath_config_load_env_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                [store]
                user = "file-user"
            "#,
        )
        .unwrap();

        // confyg passes env values as strings, so this uses a string field.
        let _guard = EnvGuard::new("KGPATH_STORE_USER", "env-user");
        let config = KgpathConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.store.user.as_deref(), Some("env-user"));
    }

    // ------------------------------------------------------------------------
    // resolve_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = KgpathConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_env_then_default() {
        {
            let _guard = EnvGuard::new(CONFIG_ENV, "/env/config.toml");
            let path = KgpathConfig::resolve_config_path(None);
            assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
        }

        let _guard = EnvGuard::remove(CONFIG_ENV);
        let path = KgpathConfig::resolve_config_path(None).unwrap();
        let text = path.to_string_lossy();
        assert!(text.contains("kgpath"));
        assert!(text.ends_with("config.toml"));
    }

    // ------------------------------------------------------------------------
    // ConfigProvider tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_store_settings_complete() {
        let config = KgpathConfig {
            store: StoreSettings {
                uri: Some("bolt://db:7687".into()),
                user: Some("neo4j".into()),
                password: Some("pw".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let store = config.store_settings().unwrap();
        assert_eq!(store.uri.as_deref(), Some("bolt://db:7687"));
    }

    #[test]
    fn test_store_settings_legacy_fill() {
        let mut store = StoreSettings::default();
        let env: HashMap<&str, &str> = [
            ("NEO4J_URI", "bolt://legacy:7687"),
            ("NEO4J_USER", "neo4j"),
            ("NEO4J_PASSWORD", "pw"),
            ("NEO4J_GRAPH_ID", "g7"),
        ]
        .into_iter()
        .collect();
        store.fill_from(|k| env.get(k).map(|v| v.to_string()));
        assert!(store.validate().is_ok());
        assert_eq!(store.graph_id(), "g7");
    }

    #[test]
    fn test_extraction_settings() {
        let config = KgpathConfig::default();
        assert_eq!(config.extraction_settings(), ExtractionSettings::default());
    }

    // ------------------------------------------------------------------------
    // to_env_vars tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_kgpath_config_to_env_vars() {
        let config = KgpathConfig::default();
        let vars = config.to_env_vars().unwrap();
        let map: HashMap<_, _> = vars.into_iter().collect();
        assert_eq!(map.get("KGPATH_PROJECT_NAME").unwrap(), "kgpath");
        assert_eq!(map.get("KGPATH_STORE_MAX_CONNECTIONS").unwrap(), "16");
        assert_eq!(map.get("KGPATH_EXTRACTION_DIRECTION").unwrap(), "both");
        assert_eq!(map.get("KGPATH_EXTRACTION_LABELS").unwrap(), "[]");
    }

    #[test]
    fn test_kgpath_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KgpathConfig>();
    }
}
