use crate::core::ConfigProvider;
use crate::narration::{NarrationRules, PromptOptions, ScriptVariant, DEFAULT_MODEL};
use crate::playlist::{DEFAULT_MAX_MINUTES, DEFAULT_PLAYLIST_SIZE};
use crate::utils::error::{HakoakeError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub playlist: PlaylistConfig,
    #[serde(default)]
    pub narration: NarrationConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
    #[serde(default = "default_catalog_file")]
    pub file: String,
}

fn default_catalog_file() -> String {
    "catalog.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_seconds: 30,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub max_capacity: u32,
    pub skip_collected_today: bool,
    pub require_online_presence: bool,
    pub dump: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_capacity: 350,
            skip_collected_today: true,
            require_online_presence: false,
            dump: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub size: usize,
    pub max_spotlight_duration_minutes: u32,
    pub channel_url: String,
    pub title_prefix: String,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_PLAYLIST_SIZE,
            max_spotlight_duration_minutes: DEFAULT_MAX_MINUTES,
            channel_url: String::new(),
            title_prefix: "HAKKO-AKKEI".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    pub model: String,
    pub variant: ScriptVariant,
    /// 自訂模板，取代內建模板
    pub template_path: Option<String>,
    #[serde(flatten)]
    pub rules: NarrationRules,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            variant: ScriptVariant::default(),
            template_path: None,
            rules: NarrationRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| HakoakeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 ${VAR}，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            })
            .into_owned()
    }

    /// import 需要的 feed 端點
    pub fn require_feed_endpoint(&self) -> Result<&str> {
        if self.source.endpoint.trim().is_empty() {
            return Err(HakoakeError::MissingConfigError {
                field: "source.endpoint".to_string(),
            });
        }
        Ok(&self.source.endpoint)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    /// 讀取自訂模板（若有）並組出 prompt 選項
    pub fn prompt_options(&self, variant: Option<ScriptVariant>) -> Result<PromptOptions> {
        let template = match &self.narration.template_path {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };
        Ok(PromptOptions {
            model: self.narration.model.clone(),
            variant: variant.unwrap_or(self.narration.variant),
            template,
            rules: self.narration.rules.clone(),
        })
    }

    /// dry-run 時顯示的設定摘要
    pub fn summary(&self) -> String {
        [
            format!("Catalog: {}/{}", self.catalog.path, self.catalog.file),
            format!("Feed: {}", self.source.endpoint),
            format!("Timeout: {}s", self.source.timeout_seconds),
            format!("Headers: {}", self.source.headers.len()),
            format!("Max capacity: {}", self.collection.max_capacity),
            format!("Skip collected today: {}", self.collection.skip_collected_today),
            format!("Require online presence: {}", self.collection.require_online_presence),
            format!("Dump: {}", self.collection.dump),
        ]
        .join("\n")
    }
}

impl ConfigProvider for AppConfig {
    fn feed_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn feed_headers(&self) -> &HashMap<String, String> {
        &self.source.headers
    }

    fn catalog_path(&self) -> &str {
        &self.catalog.path
    }

    fn catalog_file(&self) -> &str {
        &self.catalog.file
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn max_capacity(&self) -> u32 {
        self.collection.max_capacity
    }

    fn skip_collected_today(&self) -> bool {
        self.collection.skip_collected_today
    }

    fn require_online_presence(&self) -> bool {
        self.collection.require_online_presence
    }

    fn dump_enabled(&self) -> bool {
        self.collection.dump
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("catalog.path", &self.catalog.path)?;
        validation::validate_non_empty_string("catalog.file", &self.catalog.file)?;

        if !self.source.endpoint.is_empty() {
            validation::validate_url("source.endpoint", &self.source.endpoint)?;
        }
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 600)?;
        validation::validate_positive_number(
            "collection.max_capacity",
            self.collection.max_capacity as usize,
            1,
        )?;

        validation::validate_positive_number("playlist.size", self.playlist.size, 1)?;
        validation::validate_positive_number(
            "playlist.max_spotlight_duration_minutes",
            self.playlist.max_spotlight_duration_minutes as usize,
            1,
        )?;
        if !self.playlist.channel_url.is_empty() {
            validation::validate_url("playlist.channel_url", &self.playlist.channel_url)?;
        }

        let rules = &self.narration.rules;
        validation::validate_non_empty_string("narration.model", &self.narration.model)?;
        validation::validate_range("narration.words_per_minute", rules.words_per_minute, 60, 400)?;
        validation::validate_positive_number("narration.repeated_ngram", rules.repeated_ngram, 2)?;
        if rules.performer_min_words > rules.performer_max_words {
            return Err(HakoakeError::InvalidConfigValueError {
                field: "narration.performer_min_words".to_string(),
                value: rules.performer_min_words.to_string(),
                reason: format!(
                    "must not exceed narration.performer_max_words ({})",
                    rules.performer_max_words
                ),
            });
        }
        if let Some(path) = &self.narration.template_path {
            validation::validate_path("narration.template_path", path)?;
        }

        Ok(())
    }
}
