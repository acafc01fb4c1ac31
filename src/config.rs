//! Scan configuration
//!
//! Reads configuration from:
//! - `.a11yrc.yaml` / `.a11yrc.yml` / `.a11yrc.json` (working directory)
//! - the same names in the user's home directory

use crate::evaluation::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluate elements in parallel
    pub parallel: bool,

    /// Number of worker threads (0 = auto-detect)
    pub jobs: usize,

    /// Keep NotApplicable results in the scan output
    pub report_not_applicable: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            jobs: 0,
            report_not_applicable: false,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    pub color: ColorMode,

    /// Also list passing results
    pub verbose: bool,

    /// Show the summary block
    pub statistics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: ColorMode::Auto,
            verbose: false,
            statistics: true,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Color mode options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Rule selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rules to run (empty = all)
    pub enabled: Vec<String>,

    /// Rules never to run
    pub disabled: Vec<String>,

    /// Select rules by id prefix (e.g., "button" selects button-*)
    pub extend: Vec<String>,

    /// Ignore rules by id prefix
    pub ignore: Vec<String>,

    /// Severity overrides (rule id -> severity)
    pub severity: HashMap<String, Severity>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,

    pub output: OutputConfig,

    pub rules: RulesConfig,
}

const CONFIG_NAMES: [&str; 3] = [".a11yrc.yaml", ".a11yrc.yml", ".a11yrc.json"];

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Self = match ext {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown config file format: {}",
                    ext
                )))
            }
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the working directory, then the home directory
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::find_in(Path::new(".")) {
            return Self::load(&path);
        }

        if let Some(home) = dirs::home_dir() {
            if let Some(path) = Self::find_in(&home) {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// First known config file name present in `dir`
    pub fn find_in(dir: &Path) -> Option<PathBuf> {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Merge CLI arguments into configuration
    pub fn merge_cli(
        &mut self,
        format: Option<OutputFormat>,
        verbose: Option<bool>,
        jobs: Option<usize>,
        disabled_rules: Option<Vec<String>>,
        enabled_rules: Option<Vec<String>>,
    ) {
        if let Some(f) = format {
            self.output.format = f;
        }
        if let Some(v) = verbose {
            self.output.verbose = v;
        }
        if let Some(j) = jobs {
            self.engine.jobs = j;
        }
        if let Some(disabled) = disabled_rules {
            self.rules.disabled.extend(disabled);
        }
        if let Some(enabled) = enabled_rules {
            self.rules.enabled = enabled;
        }
    }

    pub fn add_extend_prefixes(&mut self, prefixes: Vec<String>) {
        self.rules.extend.extend(prefixes);
    }

    pub fn add_ignore_prefixes(&mut self, prefixes: Vec<String>) {
        self.rules.ignore.extend(prefixes);
    }

    /// Check if a rule is enabled
    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        if self.rules.disabled.iter().any(|d| d == rule_id) {
            return false;
        }

        if has_prefix(rule_id, &self.rules.ignore) {
            return false;
        }

        if !self.rules.enabled.is_empty() {
            return self.rules.enabled.iter().any(|e| e == rule_id);
        }

        self.rules.extend.is_empty() || has_prefix(rule_id, &self.rules.extend)
    }

    /// Severity override for a rule
    pub fn severity_override(&self, rule_id: &str) -> Option<Severity> {
        self.rules.severity.get(rule_id).copied()
    }
}

/// Case-insensitive prefix match against any of `prefixes`
fn has_prefix(rule_id: &str, prefixes: &[String]) -> bool {
    let rule_upper = rule_id.to_uppercase();
    prefixes
        .iter()
        .any(|prefix| rule_upper.starts_with(&prefix.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert!(config.engine.parallel);
        assert_eq!(config.engine.jobs, 0);
        assert!(!config.engine.report_not_applicable);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.output.statistics);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_merge_cli() {
        let mut config = Config::new();
        config.merge_cli(
            Some(OutputFormat::Json),
            Some(true),
            Some(4),
            Some(vec!["button-structure".to_string()]),
            None,
        );

        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.verbose);
        assert_eq!(config.engine.jobs, 4);
        assert!(!config.is_rule_enabled("button-structure"));
    }

    #[test]
    fn test_rule_enabled_order() {
        let mut config = Config::new();
        assert!(config.is_rule_enabled("any-rule"));

        config.add_extend_prefixes(vec!["Button".to_string()]);
        assert!(config.is_rule_enabled("button-structure"));
        assert!(!config.is_rule_enabled("checkbox-structure"));

        config.rules.enabled = vec!["checkbox-structure".to_string()];
        assert!(config.is_rule_enabled("checkbox-structure"));
        assert!(!config.is_rule_enabled("button-structure"));

        config.add_ignore_prefixes(vec!["CHECKBOX".to_string()]);
        assert!(!config.is_rule_enabled("checkbox-structure"));
    }

    #[test]
    fn test_disabled_wins() {
        let mut config = Config::new();
        config.rules.enabled = vec!["hyperlink-invoke-pattern".to_string()];
        config.rules.disabled = vec!["hyperlink-invoke-pattern".to_string()];

        assert!(!config.is_rule_enabled("hyperlink-invoke-pattern"));
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "engine:\n  jobs: 2\noutput:\n  format: json\nrules:\n  disabled: [radio-button-grouped]\n  severity:\n    checkbox-structure: fail"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.engine.jobs, 2);
        assert!(config.engine.parallel);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.is_rule_enabled("radio-button-grouped"));
        assert_eq!(
            config.severity_override("checkbox-structure"),
            Some(Severity::Fail)
        );
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"engine": {{"parallel": false}}, "output": {{"color": "never"}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(!config.engine.parallel);
        assert_eq!(config.output.color, ColorMode::Never);
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_find_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::find_in(dir.path()).is_none());

        std::fs::write(dir.path().join(".a11yrc.json"), "{}").unwrap();
        assert_eq!(
            Config::find_in(dir.path()),
            Some(dir.path().join(".a11yrc.json"))
        );
    }
}
