use std::path::{Path, PathBuf};

use {
    serde_json::{Map, Value},
    tracing::{debug, warn},
};

use crate::{Error, Result, env_subst::substitute_env, schema::EngineConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "schemagen.toml",
    "schemagen.yaml",
    "schemagen.yml",
    "schemagen.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./schemagen.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/schemagen/schemagen.{toml,yaml,yml,json}` (user-global)
///
/// Returns `EngineConfig::default()` if no config file is found or the file
/// fails to load.
pub fn discover_and_load() -> EngineConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    EngineConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/schemagen/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "schemagen").map(|d| d.config_dir().to_path_buf())
}

/// Parse config text, picking the format from the file extension, then
/// expand `${VAR}` placeholders in its string values.
pub fn parse_config(raw: &str, path: &Path) -> Result<EngineConfig> {
    let mut tree = parse_tree(raw, path)?;
    for missing in substitute_env(&mut tree) {
        warn!(
            path = %missing.path,
            variable = %missing.variable,
            "environment variable not set, keeping placeholder"
        );
    }
    Ok(serde_json::from_value(tree)?)
}

/// Parse config text into a format-neutral tree. An empty YAML document is
/// an empty table.
pub(crate) fn parse_tree(raw: &str, path: &Path) -> Result<Value> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(serde_json::to_value(toml::from_str::<toml::Value>(raw)?)?),
        "yaml" | "yml" => match serde_yaml::from_str::<Value>(raw)? {
            Value::Null => Ok(Value::Object(Map::new())),
            tree => Ok(tree),
        },
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::unsupported_format(other)),
    }
}
