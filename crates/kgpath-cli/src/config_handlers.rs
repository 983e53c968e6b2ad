//! Handlers for `kgpath config {path,get,set,init,export}`.

use crate::cli::ConfigAction;
use crate::config::KgpathConfig;
use kgpath_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Handle a config subcommand.
///
/// Takes the raw `--config` path rather than a loaded config: `path` and
/// `init` must work before any config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_file(config_path)?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `kgpath config init` to create it)");
            }
            Ok(())
        }
        ConfigAction::Get { key } => {
            let value = config_get(&KgpathConfig::load(config_path)?, &key)?;
            println!("{value}");
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let path = config_file(config_path)?;
            config_set(&path, &key, &value)?;
            println!("Set {key} = {value} in {}", path.display());
            Ok(())
        }
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => KgpathConfig::default_config_path()
                    .ok_or_else(|| Error::config("could not determine config directory"))?,
            };
            config_init(&path, force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export { docker_env } => {
            for line in export_lines(&KgpathConfig::load(config_path)?, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn config_file(config_path: Option<&str>) -> Result<PathBuf> {
    KgpathConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("could not determine config directory for this platform"))
}

/// Render the value at dotted `key`.
fn config_get(config: &KgpathConfig, key: &str) -> Result<String> {
    let root = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    lookup(&root, key)
        .map(display_value)
        .ok_or_else(|| Error::config(format!("key '{key}' not found in configuration")))
}

/// Write `raw` at dotted `key` in the file at `path`.
///
/// The edited document must still load as a [`KgpathConfig`]; otherwise the
/// file is left untouched.
fn config_set(path: &Path, key: &str, raw: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::config(format!(
            "config file does not exist at {}; run `kgpath config init` first",
            path.display()
        )));
    }
    let text = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut doc: toml::Value = toml::from_str(&text)
        .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;

    insert(&mut doc, key, parse_value(raw))?;
    doc.clone()
        .try_into::<KgpathConfig>()
        .map_err(|e| Error::config(format!("invalid value for '{key}': {e}")))?;

    let out = toml::to_string_pretty(&doc).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(path, out).map_err(|e| Error::io_with_path(e, path))
}

/// Write a default config file at `path`.
fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "config file already exists at {}; use --force to overwrite",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let text = KgpathConfig::default().to_toml_string()?;
    std::fs::write(path, text).map_err(|e| Error::io_with_path(e, path))
}

fn export_lines(config: &KgpathConfig, docker_env: bool) -> Result<Vec<String>> {
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect())
}

// ============================================================================
// TOML dotted-key helpers
// ============================================================================

fn lookup<'a>(root: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(root, |current, part| current.as_table()?.get(part))
}

fn insert(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    if leaf.is_empty() {
        return Err(Error::config("empty key"));
    }

    let mut table = root
        .as_table_mut()
        .ok_or_else(|| Error::config("config root is not a table"))?;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        table = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()))
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("'{part}' is not a section")))?;
    }
    table.insert(leaf.to_string(), value);
    Ok(())
}

/// Interpret a command-line value: bool, integer, float, list, else string.
fn parse_value(s: &str) -> toml::Value {
    match s {
        "true" => return toml::Value::Boolean(true),
        "false" => return toml::Value::Boolean(false),
        _ => {}
    }
    if let Ok(i) = s.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return toml::Value::Float(f);
    }
    if s.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(s) {
            return toml::Value::Array(items.into_iter().map(toml::Value::String).collect());
        }
    }
    toml::Value::String(s.to_string())
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(_) => serde_json::to_string(value).unwrap_or_else(|_| value.to_string()),
        toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn written_default() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        config_init(&path, false).unwrap();
        (dir, path)
    }

    #[test]
    fn test_config_get() {
        let config = KgpathConfig::default();
        assert_eq!(config_get(&config, "project_name").unwrap(), "kgpath");
        assert_eq!(config_get(&config, "extraction.max_hops").unwrap(), "2");
        assert_eq!(config_get(&config, "extraction.labels").unwrap(), "[]");
        assert!(config_get(&config, "store").unwrap().contains("fetch_limit"));
    }

    #[test]
    fn test_config_get_missing_key() {
        let err = config_get(&KgpathConfig::default(), "store.nope").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_config_set_nested() {
        let (_dir, path) = written_default();
        config_set(&path, "store.uri", "bolt://db:7687").unwrap();
        config_set(&path, "extraction.max_hops", "3").unwrap();
        config_set(&path, "extraction.labels", r#"["Entity","问题"]"#).unwrap();

        let config = KgpathConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.store.uri.as_deref(), Some("bolt://db:7687"));
        assert_eq!(config.extraction.max_hops, 3);
        assert_eq!(config.extraction.labels, vec!["Entity", "问题"]);
    }

    #[test]
    fn test_config_set_rejects_wrong_type() {
        let (_dir, path) = written_default();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = config_set(&path, "extraction.max_hops", "many").unwrap_err();
        assert!(err.is_config());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_config_set_missing_file() {
        let err = config_set(Path::new("/nonexistent/kgpath.toml"), "a", "b").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_config_init_no_overwrite_then_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        config_init(&path, false).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[store]"));

        let err = config_init(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(config_init(&path, true).is_ok());
    }

    #[test]
    fn test_export_lines() {
        let config = KgpathConfig::default();
        let plain = export_lines(&config, false).unwrap();
        assert!(plain.contains(&"KGPATH_EXTRACTION_MAX_HOPS=2".to_string()));
        let docker = export_lines(&config, true).unwrap();
        assert!(docker.iter().all(|l| l.starts_with("--env KGPATH_")));
    }

    #[test]
    fn test_insert_creates_sections() {
        let mut root = toml::Value::Table(toml::map::Map::new());
        insert(&mut root, "a.b.c", toml::Value::Integer(1)).unwrap();
        assert_eq!(lookup(&root, "a.b.c"), Some(&toml::Value::Integer(1)));

        let err = insert(&mut root, "a.b.c.d", toml::Value::Integer(2)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("-1"), toml::Value::Integer(-1));
        assert_eq!(parse_value("0.5"), toml::Value::Float(0.5));
        assert_eq!(
            parse_value(r#"["x"]"#),
            toml::Value::Array(vec![toml::Value::String("x".into())])
        );
        assert_eq!(parse_value("bolt://h"), toml::Value::String("bolt://h".into()));
    }

    #[test]
    fn test_handle_config_path() {
        assert!(handle_config_command(Some("/tmp/kg.toml"), ConfigAction::Path).is_ok());
    }
}
