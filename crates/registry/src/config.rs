use crate::error::ConfigError;
use crate::limits::{concurrency_from_env, default_concurrency};
use agentscan_parser::ParserConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for agent and eval discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Agent source directory, relative to the project root
    pub agent_dir: PathBuf,

    /// Source file extensions to scan, in sibling-lookup priority order
    pub extensions: Vec<String>,

    /// Stem of per-directory eval files (`eval.ts`); such files are never scanned for agents
    pub eval_file_stem: String,

    /// Larger files are skipped
    pub max_file_bytes: u64,

    /// Honour `.gitignore` / `.ignore` files while walking
    pub respect_gitignore: bool,

    /// Files analyzed concurrently
    pub concurrency: usize,

    /// Best-effort parsing limits
    pub parser: ParserConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            agent_dir: PathBuf::from("src/agent"),
            extensions: ["ts", "tsx", "js", "jsx", "mjs"]
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            eval_file_stem: "eval".to_string(),
            max_file_bytes: 1_048_576, // 1 MB
            respect_gitignore: true,
            concurrency: default_concurrency(),
            parser: ParserConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Apply `AGENTSCAN_CONCURRENCY` when set
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.concurrency = concurrency_from_env(self.concurrency);
        self
    }

    /// Single-file-at-a-time discovery, handy for debugging
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            concurrency: 1,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_dir.is_absolute() {
            return Err(ConfigError::invalid(format!(
                "agent_dir must be relative to the project root, got {}",
                self.agent_dir.display()
            )));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::invalid("extensions must not be empty"));
        }
        if let Some(ext) = self
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::invalid(format!(
                "extensions are written without a leading dot, got {ext:?}"
            )));
        }
        if self.eval_file_stem.trim().is_empty() {
            return Err(ConfigError::invalid("eval_file_stem must not be empty"));
        }
        if self.max_file_bytes == 0 {
            return Err(ConfigError::invalid("max_file_bytes must be > 0"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency must be > 0"));
        }
        self.parser.validate().map_err(ConfigError::Invalid)
    }

    /// Whether `path` has one of the scanned extensions
    pub(crate) fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
    }

    /// Whether `path` follows the eval-sibling naming convention
    pub(crate) fn is_eval_file(&self, path: &Path) -> bool {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem == self.eval_file_stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent_dir, PathBuf::from("src/agent"));
        assert_eq!(config.eval_file_stem, "eval");
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
agent_dir = "agents"
extensions = ["ts"]

[parser]
max_error_ratio = 0.25
"#,
        )
        .unwrap();
        assert_eq!(config.agent_dir, PathBuf::from("agents"));
        assert_eq!(config.extensions, vec!["ts".to_string()]);
        assert_eq!(config.eval_file_stem, "eval");
        assert!((config.parser.max_error_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.parser.max_nesting_depth, 1024);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(DiscoveryConfig::from_toml_str("extensions = []").is_err());
        assert!(DiscoveryConfig::from_toml_str("extensions = [\".ts\"]").is_err());
        assert!(DiscoveryConfig::from_toml_str("concurrency = 0").is_err());
        assert!(DiscoveryConfig::from_toml_str("agent_dir = \"/abs\"").is_err());
        assert!(DiscoveryConfig::from_toml_str("[parser]\nmax_error_ratio = 2.0").is_err());
        assert!(DiscoveryConfig::from_toml_str("agent_dir = ").is_err());
    }

    #[test]
    fn file_classification() {
        let config = DiscoveryConfig::default();
        assert!(config.is_source_file(Path::new("src/agent/a/agent.ts")));
        assert!(config.is_source_file(Path::new("src/agent/a/agent.TSX")));
        assert!(!config.is_source_file(Path::new("src/agent/a/README.md")));
        assert!(config.is_eval_file(Path::new("src/agent/a/eval.ts")));
        assert!(!config.is_eval_file(Path::new("src/agent/a/evals.ts")));
    }
}
