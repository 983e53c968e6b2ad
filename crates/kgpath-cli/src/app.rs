//! KgpathCli application.
//!
//! Parameterized over a [`ConfigProvider`] so tests can run commands against
//! an in-memory store with fixed settings.

use crate::cli::{CliArgs, Command};
use crate::config::KgpathConfig;
use crate::{config_handlers, handlers};
use kgpath_core::traits::ConfigProvider;
use kgpath_core::{Error, Result};
use kgpath_graph::{Direction, ExportOptions, Extractor, GraphStore, Neo4jStore};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// KgpathCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct KgpathCli<C: ConfigProvider> {
    name: String,
    config: Arc<C>,
    version: String,
}

impl KgpathCli<KgpathConfig> {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = KgpathConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }
}

impl<C: ConfigProvider> KgpathCli<C> {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: C) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Get a reference to the config provider.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI, connecting to Neo4j only for commands that need a store.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        let store = match &args.command {
            Some(command) if command.needs_store() => Some(self.connect().await?),
            _ => None,
        };
        self.dispatch(args, store).await
    }

    /// Run the CLI against an already-open store.
    pub async fn run_with_store(&self, args: CliArgs, store: Arc<dyn GraphStore>) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        self.dispatch(args, Some(store)).await
    }

    async fn connect(&self) -> Result<Arc<dyn GraphStore>> {
        let settings = self.config.store_settings()?;
        let store = Neo4jStore::connect(&settings).await?;
        Ok(Arc::new(store))
    }

    async fn dispatch(&self, args: CliArgs, store: Option<Arc<dyn GraphStore>>) -> Result<()> {
        let Some(command) = args.command else {
            println!("{} {} - use --help for usage", self.name, self.version);
            return Ok(());
        };

        match command {
            Command::Version => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Command::Config(config_cmd) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            command => {
                let store = store.ok_or_else(|| Error::operation("no graph store available"))?;
                let output = self.execute(command, store).await?;
                if !output.is_empty() {
                    println!("{output}");
                }
                Ok(())
            }
        }
    }

    /// Execute a store command and return its output.
    pub async fn execute(&self, command: Command, store: Arc<dyn GraphStore>) -> Result<String> {
        let settings = self.config.store_settings()?;
        let extractor = Extractor::from_settings(Arc::clone(&store), &settings);
        log::debug!(
            "{}: executing against {} (graph '{}')",
            self.config.project_name(),
            store.name(),
            settings.graph_id()
        );

        match command {
            Command::Paths {
                entity,
                traversal,
                min_hops,
                max_depth,
                json,
            } => {
                let request = handlers::build_request(
                    &entity,
                    &traversal,
                    min_hops,
                    max_depth,
                    &self.config.extraction_settings(),
                );
                handlers::handle_paths(&extractor, &request, json).await
            }
            Command::Inspect {
                entity,
                traversal,
                json,
            } => {
                let request = handlers::build_request(
                    &entity,
                    &traversal,
                    None,
                    None,
                    &self.config.extraction_settings(),
                );
                handlers::handle_inspect(&extractor, &request, json).await
            }
            Command::Entities { label, limit, json } => {
                handlers::handle_entities(store.as_ref(), label.as_deref(), limit, json).await
            }
            Command::Entity { name } => handlers::handle_entity(store.as_ref(), &name).await,
            Command::Connections {
                key,
                direction,
                limit,
                json,
            } => {
                let direction = Direction::parse_lenient(&direction);
                handlers::handle_connections(store.as_ref(), &key, direction, limit, json).await
            }
            Command::Export {
                out,
                type_value,
                label,
                limit,
            } => {
                let mut options = ExportOptions::new(settings.graph_id());
                if let Some(value) = type_value {
                    options.type_values = vec![value];
                }
                options.label = label;
                options.limit = limit;
                handlers::handle_export(&extractor, &options, Path::new(&out)).await
            }
            Command::Health => handlers::handle_health(store.as_ref()).await,
            Command::Version | Command::Config(_) => {
                Err(Error::operation("command does not use the graph store"))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::EnvGuard;
    use clap::Parser;
    use kgpath_core::{ExtractionSettings, StoreSettings};
    use kgpath_graph::MemoryStore;

    #[derive(Clone)]
    struct TestConfig {
        extraction: ExtractionSettings,
    }

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test-app"
        }

        fn store_settings(&self) -> Result<StoreSettings> {
            Ok(StoreSettings {
                graph_id: Some("g-test".into()),
                ..Default::default()
            })
        }

        fn extraction_settings(&self) -> ExtractionSettings {
            self.extraction.clone()
        }
    }

    fn test_config() -> TestConfig {
        TestConfig {
            extraction: ExtractionSettings::default(),
        }
    }

    fn store() -> Arc<dyn GraphStore> {
        Arc::new(
            MemoryStore::new()
                .with_node("a", "A", &["Entity"])
                .with_node("b", "B", &["Entity"])
                .with_node("c", "C", &["Entity"])
                .with_edge("r1", "a", "rel1", "b")
                .with_edge("r2", "b", "rel2", "c"),
        )
    }

    async fn exec(cli: &KgpathCli<TestConfig>, argv: &[&str]) -> Result<String> {
        let args = CliArgs::parse_from(argv);
        cli.execute(args.command.unwrap(), store()).await
    }

    #[test]
    fn test_kgpath_cli_new() {
        let cli = KgpathCli::new("my-app", test_config());
        assert_eq!(cli.name, "my-app");
        assert_eq!(cli.config().project_name(), "test-app");
    }

    #[test]
    fn test_kgpath_cli_with_version() {
        let cli = KgpathCli::new("my-app", test_config()).with_version("1.2.3");
        assert_eq!(cli.version, "1.2.3");
    }

    #[tokio::test]
    async fn test_execute_paths_uses_config_defaults() {
        let cli = KgpathCli::new("app", test_config());
        let out = exec(&cli, &["test", "paths", "B"]).await.unwrap();
        assert_eq!(out, "A -> rel1 -> B -> rel2 -> C");
    }

    #[tokio::test]
    async fn test_execute_paths_config_direction() {
        let config = TestConfig {
            extraction: ExtractionSettings {
                direction: "incoming".into(),
                ..Default::default()
            },
        };
        let cli = KgpathCli::new("app", config);
        let out = exec(&cli, &["test", "paths", "B"]).await.unwrap();
        assert_eq!(out, "A -> rel1 -> B");

        let out = exec(&cli, &["test", "paths", "B", "-d", "out"]).await.unwrap();
        assert_eq!(out, "B -> rel2 -> C");
    }

    #[tokio::test]
    async fn test_execute_paths_min_hops() {
        let cli = KgpathCli::new("app", test_config());
        let out = exec(&cli, &["test", "paths", "B", "--min-hops", "3"])
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_execute_inspect_json() {
        let cli = KgpathCli::new("app", test_config());
        let out = exec(&cli, &["test", "inspect", "A", "--json"]).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["entity"], "A");
        assert_eq!(json["stats"]["node_count"], 3);
        assert_eq!(json["validation"]["valid"], true);
    }

    #[tokio::test]
    async fn test_execute_entity_not_found() {
        let cli = KgpathCli::new("app", test_config());
        let err = exec(&cli, &["test", "entity", "Z"]).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_execute_connections() {
        let cli = KgpathCli::new("app", test_config());
        let out = exec(&cli, &["test", "connections", "b", "-d", "out"])
            .await
            .unwrap();
        assert_eq!(out, "-[rel2]-> C (c)");
    }

    #[tokio::test]
    async fn test_execute_export_records_graph_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("samples.json");
        let store: Arc<dyn GraphStore> = Arc::new(
            MemoryStore::new()
                .with_node("q", "Why does it crack?", &["Question"])
                .with_node("a", "A", &["Entity"])
                .with_node("b", "B", &["Entity"])
                .with_edge("r1", "q", "caused_by", "a")
                .with_edge("r2", "a", "rel", "b"),
        );
        let cli = KgpathCli::new("app", test_config());
        let args = CliArgs::parse_from(["test", "export", "--out", out.to_str().unwrap()]);
        cli.execute(args.command.unwrap(), store).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json[0]["graph_id"], "g-test");
        assert_eq!(json[0]["question_entity_id"], "q");
    }

    #[tokio::test]
    async fn test_execute_rejects_store_free_command() {
        let cli = KgpathCli::new("app", test_config());
        assert!(exec(&cli, &["test", "version"]).await.is_err());
    }

    #[tokio::test]
    async fn test_run_with_store_health() {
        let cli = KgpathCli::new("app", test_config());
        let args = CliArgs::parse_from(["test", "health"]);
        assert!(cli.run_with_store(args, store()).await.is_ok());

        let down: Arc<dyn GraphStore> = Arc::new(MemoryStore::unreachable("refused"));
        let args = CliArgs::parse_from(["test", "health"]);
        let err = cli.run_with_store(args, down).await.unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let cli = KgpathCli::new("test-app", test_config()).with_version("0.1.0");
        let args = CliArgs::parse_from(["test", "version"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_no_command() {
        let cli = KgpathCli::new("test-app", test_config());
        let args = CliArgs::parse_from(["test"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_config_command_dispatch() {
        let cli = KgpathCli::new("test-app", test_config());
        let args = CliArgs::parse_from(["test", "config", "path"]);
        assert!(cli.run(args).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_without_credentials_is_config_error() {
        let _uri = EnvGuard::remove("NEO4J_URI");
        let _user = EnvGuard::remove("NEO4J_USER");
        let _password = EnvGuard::remove("NEO4J_PASSWORD");

        let cli = KgpathCli::new("test-app", KgpathConfig::default());
        let args = CliArgs::parse_from(["test", "paths", "A"]);
        let err = cli.run(args).await.unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_init_logging_does_not_panic() {
        let cli = KgpathCli::new("test", test_config());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }

    #[test]
    fn test_kgpath_cli_from_args_with_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                project_name = "from-file"
                [extraction]
                max_hops = 3
            "#,
        )
        .unwrap();

        let args = CliArgs::parse_from(["test", "--config", path.to_str().unwrap()]);
        let cli = KgpathCli::from_args("kgpath", &args).unwrap();
        assert_eq!(cli.config().project_name(), "from-file");
        assert_eq!(cli.config().extraction_settings().max_hops, 3);
    }
}
