//! Configuration for h5pscan.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI via [`Overrides`])
//! 2. Environment variables (H5PSCAN_DATABASE, H5PSCAN_DUMP, H5PSCAN_OUTPUT_DIR)
//! 3. Config file (.h5pscan/config.yaml)
//! 4. Defaults (no source, ./results, max depth 128)
//!
//! Config file discovery:
//! - Searches current directory and parents for .h5pscan/config.yaml
//! - Falls back to ~/.h5pscan/config.yaml
//! - Paths in config file are relative to the directory holding .h5pscan/
//!
//! The highest layer that names a source decides it; within one layer a dump
//! pattern wins over a database path.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::SourceSpec;
use crate::core::{ExtractLimits, SchemaRegistry};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub extraction: ExtractLimits,
    /// Extra container types: machine name -> rule paths
    #[serde(default)]
    pub registry: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// SQLite database (relative to project root)
    pub database: Option<String>,
    /// Glob of JSONL dumps (relative to project root)
    pub dump: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Report directory (relative to project root)
    pub dir: Option<String>,
}

/// Resolved configuration with absolute paths where a config file was used
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// SQLite database path
    pub database: Option<PathBuf>,
    /// JSONL dump glob
    pub dump: Option<String>,
    /// Directory receiving report files
    pub output_dir: PathBuf,
    /// Traversal limits
    pub limits: ExtractLimits,
    /// Container rules added on top of the standard registry
    pub extra_rules: BTreeMap<String, Vec<String>>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            database: None,
            dump: None,
            output_dir: PathBuf::from("results"),
            limits: ExtractLimits::default(),
            extra_rules: BTreeMap::new(),
            config_file: None,
        }
    }
}

/// Values that replace configured ones (CLI flags, environment)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub dump: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub max_depth: Option<usize>,
}

impl Overrides {
    /// Read H5PSCAN_* environment variables
    pub fn from_env() -> Self {
        Self {
            database: std::env::var("H5PSCAN_DATABASE").ok().map(PathBuf::from),
            dump: std::env::var("H5PSCAN_DUMP").ok(),
            output_dir: std::env::var("H5PSCAN_OUTPUT_DIR").ok().map(PathBuf::from),
            max_depth: None,
        }
    }
}

impl ResolvedConfig {
    /// Apply a higher-priority layer
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if overrides.database.is_some() || overrides.dump.is_some() {
            self.database = overrides.database.clone();
            self.dump = overrides.dump.clone();
        }
        if let Some(ref dir) = overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(max_depth) = overrides.max_depth {
            self.limits.max_depth = max_depth;
        }
        self
    }

    /// Selected content source, if any
    pub fn source(&self) -> Option<SourceSpec> {
        if let Some(ref pattern) = self.dump {
            Some(SourceSpec::Dump(pattern.clone()))
        } else {
            self.database.clone().map(SourceSpec::Database)
        }
    }

    /// Selected content source, or an error explaining how to set one
    pub fn require_source(&self) -> Result<SourceSpec> {
        self.source().context(
            "No content source configured (use --database/--dump, H5PSCAN_DATABASE/H5PSCAN_DUMP or .h5pscan/config.yaml)",
        )
    }

    /// Standard registry plus configured container rules
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::standard();
        for (container, paths) in &self.extra_rules {
            registry
                .register(container, paths)
                .with_context(|| format!("Invalid registry entry for {}", container))?;
        }
        Ok(registry)
    }
}

/// Find config file by searching `start` and its parents, then the home directory
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".h5pscan").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".h5pscan").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Build configuration from a parsed config file
fn from_file(config: ConfigFile, config_path: &Path) -> ResolvedConfig {
    // Base directory is the parent of .h5pscan/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let defaults = ResolvedConfig::default();

    ResolvedConfig {
        database: config.source.database.as_deref().map(|p| resolve_path(base_dir, p)),
        // Globs are joined, never canonicalized
        dump: config.source.dump.as_deref().map(|pattern| {
            if Path::new(pattern).is_absolute() {
                pattern.to_string()
            } else {
                base_dir.join(pattern).display().to_string()
            }
        }),
        output_dir: config
            .output
            .dir
            .as_deref()
            .map(|d| resolve_path(base_dir, d))
            .unwrap_or(defaults.output_dir),
        limits: config.extraction,
        extra_rules: config.registry,
        config_file: Some(config_path.to_path_buf()),
    }
}

/// Load configuration from all sources except the command line
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let base = match find_config_file(&cwd) {
        Some(path) => from_file(load_config_file(&path)?, &path),
        None => ResolvedConfig::default(),
    };

    Ok(base.with_overrides(&Overrides::from_env()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let dir = temp.path().join(".h5pscan");
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        config_path
    }

    #[test]
    fn test_defaults() {
        let config = ResolvedConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.limits.max_depth, 128);
        assert!(config.source().is_none());
        assert!(config.require_source().is_err());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            &temp,
            r#"
version: "1"
source:
  database: ./site.sqlite
output:
  dir: ./reports
extraction:
  max_depth: 40
registry:
  H5P.Timeline:
    - timeline.date.*.asset
"#,
        );

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1");
        assert_eq!(parsed.source.database.as_deref(), Some("./site.sqlite"));
        assert_eq!(parsed.extraction.max_depth, 40);

        let config = from_file(parsed, &config_path);
        assert_eq!(config.database, Some(temp.path().join("./site.sqlite")));
        assert_eq!(config.output_dir, temp.path().join("./reports"));
        assert_eq!(config.limits.max_depth, 40);
        assert_eq!(config.config_file, Some(config_path));

        let registry = config.registry().unwrap();
        assert!(registry.rules_for("H5P.Timeline").is_some());
        assert!(registry.rules_for("H5P.Column").is_some());
    }

    #[test]
    fn test_minimal_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1\"\n");

        let config = from_file(load_config_file(&config_path).unwrap(), &config_path);
        assert!(config.source().is_none());
        assert_eq!(config.limits, ExtractLimits::default());
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp, "version: \"1\"\n");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn test_dump_wins_within_layer() {
        let config = ResolvedConfig {
            database: Some(PathBuf::from("site.sqlite")),
            dump: Some("dumps/*.jsonl".to_string()),
            ..Default::default()
        };
        assert_eq!(config.source(), Some(SourceSpec::Dump("dumps/*.jsonl".to_string())));
    }

    #[test]
    fn test_overrides_replace_source() {
        let config = ResolvedConfig {
            dump: Some("dumps/*.jsonl".to_string()),
            ..Default::default()
        };

        let overridden = config.with_overrides(&Overrides {
            database: Some(PathBuf::from("other.sqlite")),
            output_dir: Some(PathBuf::from("/tmp/out")),
            max_depth: Some(8),
            ..Default::default()
        });

        assert_eq!(
            overridden.source(),
            Some(SourceSpec::Database(PathBuf::from("other.sqlite")))
        );
        assert_eq!(overridden.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(overridden.limits.max_depth, 8);
    }

    #[test]
    fn test_invalid_registry_entry() {
        let config = ResolvedConfig {
            extra_rules: [("H5P.Broken".to_string(), vec!["a..b".to_string()])]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        assert!(config.registry().is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
