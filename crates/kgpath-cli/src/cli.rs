//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Extract reasoning paths from a knowledge graph.
#[derive(Parser, Debug)]
#[command(name = "kgpath", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "KGPATH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Traversal options shared by `paths` and `inspect`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TraversalArgs {
    /// Hop bound (values below 1 are treated as 1).
    #[arg(long, allow_negative_numbers = true)]
    pub hops: Option<i64>,

    /// Direction: outgoing, incoming, or both.
    #[arg(short, long)]
    pub direction: Option<String>,

    /// Keep only nodes carrying one of these labels (repeatable).
    #[arg(short, long = "label")]
    pub labels: Vec<String>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the reasoning paths around an entity.
    Paths {
        /// Name of the start entity.
        entity: String,

        #[command(flatten)]
        traversal: TraversalArgs,

        /// Minimum hop count of printed paths.
        #[arg(long)]
        min_hops: Option<usize>,

        /// Enumeration depth bound (unbounded by default; cycles are always cut).
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print a JSON response instead of plain lines.
        #[arg(long)]
        json: bool,
    },

    /// Show statistics and validation findings for an entity's subgraph.
    Inspect {
        /// Name of the start entity.
        entity: String,

        #[command(flatten)]
        traversal: TraversalArgs,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// List entities.
    Entities {
        /// Restrict to one label.
        #[arg(short, long)]
        label: Option<String>,

        /// Maximum number of entities.
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one entity by name.
    Entity {
        /// Entity name.
        name: String,
    },

    /// List the edges touching an entity.
    Connections {
        /// Element id of the entity.
        key: String,

        /// Direction: outgoing, incoming, or both.
        #[arg(short, long, default_value = "both")]
        direction: String,

        /// Maximum number of connections.
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,

        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export two-hop path samples for question entities.
    Export {
        /// Output JSON file.
        #[arg(short, long)]
        out: String,

        /// Entity type value marking a question.
        #[arg(short = 't', long = "type")]
        type_value: Option<String>,

        /// Restrict the entity scan to one label.
        #[arg(short, long)]
        label: Option<String>,

        /// Maximum number of samples.
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Check connectivity to the graph store.
    Health,

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command talks to the graph store.
    pub fn needs_store(&self) -> bool {
        !matches!(self, Self::Version | Self::Config(_))
    }
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "store.uri").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "extraction.max_hops").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["kgpath"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["kgpath", "--verbose", "--config", "/etc/kg.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/etc/kg.toml"));
    }

    #[test]
    fn test_paths_defaults() {
        let args = CliArgs::parse_from(["kgpath", "paths", "墙体开裂"]);
        match args.command {
            Some(Command::Paths {
                entity,
                traversal,
                min_hops,
                max_depth,
                json,
            }) => {
                assert_eq!(entity, "墙体开裂");
                assert!(traversal.hops.is_none());
                assert!(traversal.direction.is_none());
                assert!(traversal.labels.is_empty());
                assert!(min_hops.is_none());
                assert!(max_depth.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Paths command"),
        }
    }

    #[test]
    fn test_paths_full() {
        let args = CliArgs::parse_from([
            "kgpath",
            "paths",
            "A",
            "--hops",
            "3",
            "--direction",
            "out",
            "--label",
            "Entity",
            "--label",
            "Concept",
            "--min-hops",
            "2",
            "--max-depth",
            "5",
            "--json",
        ]);
        match args.command {
            Some(Command::Paths {
                traversal,
                min_hops,
                max_depth,
                json,
                ..
            }) => {
                assert_eq!(traversal.hops, Some(3));
                assert_eq!(traversal.direction.as_deref(), Some("out"));
                assert_eq!(traversal.labels, vec!["Entity", "Concept"]);
                assert_eq!(min_hops, Some(2));
                assert_eq!(max_depth, Some(5));
                assert!(json);
            }
            _ => panic!("Expected Paths command"),
        }
    }

    #[test]
    fn test_paths_negative_hops_accepted() {
        let args = CliArgs::parse_from(["kgpath", "paths", "A", "--hops", "-1"]);
        match args.command {
            Some(Command::Paths { traversal, .. }) => assert_eq!(traversal.hops, Some(-1)),
            _ => panic!("Expected Paths command"),
        }
    }

    #[test]
    fn test_inspect_command() {
        let args = CliArgs::parse_from(["kgpath", "inspect", "A", "--hops", "1"]);
        assert!(matches!(args.command, Some(Command::Inspect { .. })));
    }

    #[test]
    fn test_entities_command() {
        let args = CliArgs::parse_from(["kgpath", "entities", "--label", "Question"]);
        match args.command {
            Some(Command::Entities { label, limit, .. }) => {
                assert_eq!(label.as_deref(), Some("Question"));
                assert_eq!(limit, 50);
            }
            _ => panic!("Expected Entities command"),
        }
    }

    #[test]
    fn test_connections_command() {
        let args = CliArgs::parse_from(["kgpath", "connections", "4:abc:1", "-d", "in"]);
        match args.command {
            Some(Command::Connections { key, direction, .. }) => {
                assert_eq!(key, "4:abc:1");
                assert_eq!(direction, "in");
            }
            _ => panic!("Expected Connections command"),
        }
    }

    #[test]
    fn test_export_command() {
        let args = CliArgs::parse_from([
            "kgpath", "export", "--out", "out.json", "--type", "Issue", "-n", "10",
        ]);
        match args.command {
            Some(Command::Export {
                out,
                type_value,
                label,
                limit,
            }) => {
                assert_eq!(out, "out.json");
                assert_eq!(type_value.as_deref(), Some("Issue"));
                assert!(label.is_none());
                assert_eq!(limit, Some(10));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_health_and_version() {
        let args = CliArgs::parse_from(["kgpath", "health"]);
        assert!(matches!(args.command, Some(Command::Health)));
        let args = CliArgs::parse_from(["kgpath", "version"]);
        assert!(matches!(args.command, Some(Command::Version)));
    }

    #[test]
    fn test_needs_store() {
        let store_free = ["version", "config"];
        for name in ["paths", "inspect", "entities", "entity", "connections", "export", "health"]
            .into_iter()
            .chain(store_free)
        {
            let argv: Vec<&str> = match name {
                "paths" | "inspect" | "entity" | "connections" => vec!["kgpath", name, "x"],
                "export" => vec!["kgpath", name, "--out", "o.json"],
                "config" => vec!["kgpath", name, "path"],
                _ => vec!["kgpath", name],
            };
            let command = CliArgs::parse_from(argv).command.unwrap();
            assert_eq!(command.needs_store(), !store_free.contains(&name), "{name}");
        }
    }

    #[test]
    fn test_config_set_command() {
        let args = CliArgs::parse_from(["kgpath", "config", "set", "store.uri", "bolt://db:7687"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Set { key, value },
            })) => {
                assert_eq!(key, "store.uri");
                assert_eq!(value, "bolt://db:7687");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_config_export_docker_env() {
        let args = CliArgs::parse_from(["kgpath", "config", "export", "--docker-env"]);
        match args.command {
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Export { docker_env },
            })) => assert!(docker_env),
            _ => panic!("Expected Config Export command"),
        }
    }
}
