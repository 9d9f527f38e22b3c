//! Configuration structures for the brg-ingest pipeline.
//!
//! This module provides configuration types for all components of the application:
//!
//! - [`PathsConfig`] - Inbox, archive and output directories
//! - [`WatcherConfig`] - Inbox watcher settings (mode, interval, settle delay)
//! - [`LimitsConfig`] - Per-file size ceiling
//! - [`NormalizationConfig`] - Brand case style and text replacements
//! - [`LoggingConfig`] - Log level and output format
//! - [`RegistryConfig`] - Location of the processed-file registry
//! - [`ParsingRules`] - Column synonyms, required fields, dimension patterns
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`], so a missing configuration
//! directory yields a working setup rooted at the current directory.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::CanonicalField;

/// Name of the application settings file inside a configuration directory.
pub const APP_CONFIG_FILE: &str = "app.json";
/// Name of the brand alias file inside a configuration directory.
pub const BRAND_ALIASES_FILE: &str = "brand_aliases.json";
/// Name of the parsing rules file inside a configuration directory.
pub const PARSING_RULES_FILE: &str = "parsing_rules.json";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Directory layout used by the pipeline.
///
/// # Examples
///
/// ```
/// use brg_core::PathsConfig;
///
/// let paths = PathsConfig::default();
/// assert_eq!(paths.catalog_csv(), "out/catalog_target.csv");
/// assert_eq!(paths.report_file(), "out/run_report.ndjson");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Drop directory scanned for new files.
    pub inbox: Utf8PathBuf,
    /// Archive for successfully ingested and duplicate files.
    pub processed: Utf8PathBuf,
    /// Archive for files that failed to ingest.
    pub error: Utf8PathBuf,
    /// Output directory for the catalog, registry and audit log.
    pub out: Utf8PathBuf,
    /// Directory for application log files.
    pub logs: Utf8PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            inbox: Utf8PathBuf::from("inbox"),
            processed: Utf8PathBuf::from("processed"),
            error: Utf8PathBuf::from("error"),
            out: Utf8PathBuf::from("out"),
            logs: Utf8PathBuf::from("logs"),
        }
    }
}

impl PathsConfig {
    /// Path of the canonical catalog CSV.
    #[must_use]
    pub fn catalog_csv(&self) -> Utf8PathBuf {
        self.out.join("catalog_target.csv")
    }

    /// Path of the catalog JSON mirror.
    #[must_use]
    pub fn catalog_json(&self) -> Utf8PathBuf {
        self.out.join("catalog_target.json")
    }

    /// Path of the NDJSON audit log.
    #[must_use]
    pub fn report_file(&self) -> Utf8PathBuf {
        self.out.join("run_report.ndjson")
    }

    /// Path of the application log file.
    #[must_use]
    pub fn log_file(&self) -> Utf8PathBuf {
        self.logs.join("app.log")
    }

    /// All directories the pipeline writes into.
    #[must_use]
    pub fn directories(&self) -> [&Utf8Path; 5] {
        [
            &self.inbox,
            &self.processed,
            &self.error,
            &self.out,
            &self.logs,
        ]
    }

    fn rebase(&mut self, root: &Utf8Path) {
        for dir in [
            &mut self.inbox,
            &mut self.processed,
            &mut self.error,
            &mut self.out,
            &mut self.logs,
        ] {
            *dir = rebased(root, dir);
        }
    }
}

/// How the inbox watcher detects new files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
    /// List the inbox at a fixed interval.
    #[default]
    Poll,
    /// Subscribe to OS file-system events, falling back to polling.
    Events,
}

/// Configuration for the inbox watcher.
///
/// # Examples
///
/// ```
/// use brg_core::{WatchMode, WatcherConfig};
///
/// let config = WatcherConfig::default();
/// assert_eq!(config.mode, WatchMode::Poll);
/// assert_eq!(config.poll_interval_secs, 5);
/// assert_eq!(config.settle_delay_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Detection strategy.
    pub mode: WatchMode,

    /// Seconds between full inbox listings in polling mode.
    pub poll_interval_secs: u64,

    /// Whether files already in the inbox are processed on startup.
    pub process_on_start: bool,

    /// Delay before a detected file is handed to the processor.
    ///
    /// Reduces the chance of reading a file that is still being written.
    pub settle_delay_ms: u64,

    /// File name suffixes treated as temporary and never processed.
    pub ignored_suffixes: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            mode: WatchMode::Poll,
            poll_interval_secs: 5,
            process_on_start: true,
            settle_delay_ms: 500,
            ignored_suffixes: vec![".tmp".to_owned()],
        }
    }
}

/// Per-file resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted input file, in mebibytes.
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
        }
    }
}

impl LimitsConfig {
    /// The size ceiling in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::LimitsConfig;
    ///
    /// let limits = LimitsConfig { max_file_size_mb: 2 };
    /// assert_eq!(limits.max_file_size_bytes(), 2 * 1024 * 1024);
    /// ```
    #[must_use]
    pub const fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

/// Case style applied to brand names after alias resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandFormat {
    /// `SKF`, `FAG`.
    #[default]
    Upper,
    /// `Skf`, `Fag`.
    Title,
}

/// Value normalization policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Case style for brands.
    pub brand_format: BrandFormat,

    /// Substring replacements applied to free text, in key order.
    pub dimension_replacements: BTreeMap<String, String>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            brand_format: BrandFormat::Upper,
            dimension_replacements: BTreeMap::from([
                ("×".to_owned(), "x".to_owned()),
                ("х".to_owned(), "x".to_owned()),
            ]),
        }
    }
}

/// Output format for log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Record format for console and file output.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Json,
        }
    }
}

/// Location of the processed-file registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry JSON file.
    pub file: Utf8PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            file: Utf8PathBuf::from("out/processed_registry.json"),
        }
    }
}

/// Row admission policy applied after column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredFields {
    /// A row survives if at least one of these fields is non-blank.
    pub any_of: Vec<CanonicalField>,
}

impl Default for RequiredFields {
    fn default() -> Self {
        Self {
            any_of: vec![CanonicalField::Article],
        }
    }
}

/// A regex used to pull dimensions out of free-text lines.
///
/// Each name in `groups` is a named capture group of `regex` whose match
/// becomes a column of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionPattern {
    /// Regular expression with named groups.
    pub regex: String,
    /// Capture group names to extract, in column order.
    pub groups: Vec<String>,
}

impl DimensionPattern {
    /// The built-in `d x D x H` pattern, e.g. `6205 25x52x15`.
    #[must_use]
    pub fn inner_outer_height() -> Self {
        const NUM: &str = r"\d+(?:[.,]\d+)?";
        const SEP: &str = r"\s*[xXхХ×*]\s*";
        Self {
            regex: format!("(?P<d>{NUM}){SEP}(?P<D>{NUM}){SEP}(?P<H>{NUM})"),
            groups: vec!["d".to_owned(), "D".to_owned(), "H".to_owned()],
        }
    }
}

/// Parsing rules: column synonyms, required fields and text patterns.
///
/// # Examples
///
/// ```
/// use brg_core::{CanonicalField, ParsingRules};
///
/// let rules = ParsingRules::default();
/// let article = &rules.column_mappings[&CanonicalField::Article];
/// assert!(article.iter().any(|s| s == "part"));
/// assert_eq!(rules.required_fields.any_of, vec![CanonicalField::Article]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingRules {
    /// Source header synonyms per canonical field.
    pub column_mappings: BTreeMap<CanonicalField, Vec<String>>,
    /// Row admission policy.
    pub required_fields: RequiredFields,
    /// Ordered patterns for free-text extraction; the first match wins.
    pub dimension_patterns: Vec<DimensionPattern>,
}

impl Default for ParsingRules {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| (*s).to_owned()).collect()
        }

        let column_mappings = BTreeMap::from([
            (
                CanonicalField::Name,
                names(&["Наименование", "Название", "Номенклатура", "name", "description"]),
            ),
            (
                CanonicalField::Article,
                names(&["Артикул", "Обозначение", "Код", "part", "designation", "article", "sku"]),
            ),
            (
                CanonicalField::Analog,
                names(&["Аналог", "Аналоги", "analog", "analogue", "cross"]),
            ),
            (
                CanonicalField::Brand,
                names(&["Бренд", "Производитель", "Марка", "brand", "manufacturer"]),
            ),
            (
                CanonicalField::OuterDiameter,
                names(&["D", "Наружный диаметр", "outer diameter", "OD"]),
            ),
            (
                CanonicalField::InnerDiameter,
                names(&["d", "Внутренний диаметр", "inner diameter", "ID"]),
            ),
            (
                CanonicalField::Height,
                names(&["H", "B", "Ширина", "Высота", "width", "height"]),
            ),
            (
                CanonicalField::Mass,
                names(&["m", "Масса", "Вес", "weight", "mass"]),
            ),
        ]);

        Self {
            column_mappings,
            required_fields: RequiredFields::default(),
            dimension_patterns: vec![DimensionPattern::inner_outer_height()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BrandAliasFile {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Root configuration for the brg-ingest pipeline.
///
/// # Examples
///
/// ```
/// use brg_core::Config;
///
/// // Create with defaults
/// let config = Config::default();
/// assert!(config.validate().is_ok());
///
/// // Serialize to JSON
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("poll_interval_secs"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory layout.
    pub paths: PathsConfig,

    /// Inbox watcher settings.
    pub watcher: WatcherConfig,

    /// Per-file limits.
    pub limits: LimitsConfig,

    /// Normalization policy.
    pub normalization: NormalizationConfig,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Registry location.
    pub registry: RegistryConfig,

    /// Parsing rules, usually loaded from `parsing_rules.json`.
    pub parsing: ParsingRules,

    /// Brand alias table, usually loaded from `brand_aliases.json`.
    pub brand_aliases: BTreeMap<String, String>,
}

impl Config {
    /// Loads configuration from a directory.
    ///
    /// Reads `app.json`, `brand_aliases.json` and `parsing_rules.json`. Each
    /// file is optional and falls back to defaults when missing; a file that
    /// exists but does not parse is an error. The result is validated.
    pub fn load_dir(dir: impl AsRef<Utf8Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        if !dir.as_std_path().exists() {
            tracing::debug!(dir = %dir, "configuration directory missing, using defaults");
            return Ok(Self::default());
        }
        if !dir.as_std_path().is_dir() {
            return Err(ConfigError::InvalidPath {
                path: dir.to_owned(),
                reason: "not a directory".to_owned(),
            });
        }

        let mut config: Self = read_json(&dir.join(APP_CONFIG_FILE))?.unwrap_or_default();

        if let Some(file) = read_json::<BrandAliasFile>(&dir.join(BRAND_ALIASES_FILE))? {
            config.brand_aliases = file.aliases;
        }
        if let Some(rules) = read_json::<ParsingRules>(&dir.join(PARSING_RULES_FILE))? {
            config.parsing = rules;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks option values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watcher.poll_interval_secs == 0 {
            return Err(ConfigError::invalid_option(
                "watcher.poll_interval_secs",
                "must be greater than zero",
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::invalid_option(
                "limits.max_file_size_mb",
                "must be greater than zero",
            ));
        }
        if self.parsing.required_fields.any_of.is_empty() {
            return Err(ConfigError::invalid_option(
                "required_fields.any_of",
                "must name at least one field",
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_option("logging.level", "must not be empty"));
        }
        Ok(())
    }

    /// Returns a copy with every relative path resolved against `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use brg_core::Config;
    ///
    /// let config = Config::default().rooted_at("/srv/brg");
    /// assert_eq!(config.paths.inbox, "/srv/brg/inbox");
    /// assert_eq!(config.registry.file, "/srv/brg/out/processed_registry.json");
    /// ```
    #[must_use]
    pub fn rooted_at(mut self, root: impl AsRef<Utf8Path>) -> Self {
        let root = root.as_ref();
        self.paths.rebase(root);
        self.registry.file = rebased(root, &self.registry.file);
        self
    }
}

fn rebased(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        root.join(path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<Option<T>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.paths.inbox, "inbox");
        assert_eq!(config.watcher.ignored_suffixes, vec![".tmp"]);
        assert!(config.watcher.process_on_start);
        assert_eq!(config.limits.max_file_size_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.normalization.brand_format, BrandFormat::Upper);
        assert_eq!(config.normalization.dimension_replacements["×"], "x");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.registry.file, "out/processed_registry.json");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"watcher": {"mode": "events", "poll_interval_secs": 2}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.watcher.mode, WatchMode::Events);
        assert_eq!(config.watcher.poll_interval_secs, 2);
        // Other fields should have defaults
        assert_eq!(config.watcher.settle_delay_ms, 500);
        assert_eq!(config.limits.max_file_size_mb, 50);
    }

    #[test]
    fn test_parsing_rules_keyed_by_header() {
        let json = r#"{
            "column_mappings": {"Артикул": ["part"], "D": ["outer diameter"]},
            "required_fields": {"any_of": ["Артикул", "Наименование"]}
        }"#;
        let rules: ParsingRules = serde_json::from_str(json).unwrap();
        assert_eq!(rules.column_mappings.len(), 2);
        assert_eq!(
            rules.column_mappings[&CanonicalField::OuterDiameter],
            vec!["outer diameter"]
        );
        assert_eq!(
            rules.required_fields.any_of,
            vec![CanonicalField::Article, CanonicalField::Name]
        );
        // Missing patterns fall back to the built-in one.
        assert_eq!(rules.dimension_patterns.len(), 1);
    }

    #[test]
    fn test_load_dir_missing_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_dir(utf8(&tmp).join("nope")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_dir_reads_all_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = utf8(&tmp);
        std::fs::write(
            dir.join(APP_CONFIG_FILE),
            r#"{"limits": {"max_file_size_mb": 1}, "normalization": {"brand_format": "title"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(BRAND_ALIASES_FILE),
            r#"{"aliases": {"skf": "SKF", "фаг": "FAG"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join(PARSING_RULES_FILE),
            r#"{"column_mappings": {"Бренд": ["brand"]}}"#,
        )
        .unwrap();

        let config = Config::load_dir(&dir).unwrap();
        assert_eq!(config.limits.max_file_size_mb, 1);
        assert_eq!(config.normalization.brand_format, BrandFormat::Title);
        assert_eq!(config.brand_aliases["фаг"], "FAG");
        assert_eq!(config.parsing.column_mappings.len(), 1);
    }

    #[test]
    fn test_load_dir_malformed_json() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = utf8(&tmp);
        std::fs::write(dir.join(PARSING_RULES_FILE), "{not json").unwrap();

        let err = Config::load_dir(&dir).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { ref path, .. } if path.ends_with(PARSING_RULES_FILE)));
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let mut config = Config::default();
        config.watcher.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.parsing.required_fields.any_of.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("any_of"));
    }

    #[test]
    fn test_rooted_at_keeps_absolute_paths() {
        let mut config = Config::default();
        config.paths.logs = Utf8PathBuf::from("/var/log/brg");
        let config = config.rooted_at("/data");
        assert_eq!(config.paths.logs, "/var/log/brg");
        assert_eq!(config.paths.catalog_csv(), "/data/out/catalog_target.csv");
    }

    #[test]
    fn test_default_pattern_groups() {
        let pattern = DimensionPattern::inner_outer_height();
        assert_eq!(pattern.groups, vec!["d", "D", "H"]);
        assert!(pattern.regex.contains("(?P<D>"));
    }
}
