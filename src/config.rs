use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::convert::{derive_dated_filename, derive_filename, ExportOptions};
use crate::error::{Error, Result};
use crate::extract::{ArticleMetadata, ExtractorSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub include_frontmatter: bool,

    #[serde(default = "default_true")]
    pub include_images: bool,

    #[serde(default = "default_publisher")]
    pub publisher: String,

    #[serde(default)]
    pub filename_style: FilenameStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameStyle {
    /// `<title>.md`
    #[default]
    Title,
    /// `<date> - <slug>.md`
    Dated,
}

impl FilenameStyle {
    pub fn derive(self, metadata: &ArticleMetadata) -> String {
        match self {
            FilenameStyle::Title => derive_filename(metadata),
            FilenameStyle::Dated => derive_dated_filename(metadata),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

/// Remote document store. An empty endpoint means uploads are disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| Error::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise starts from defaults. Environment
    /// overrides apply either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load_with_env(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Invalid(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.remote.endpoint.is_empty() {
            let url = url::Url::parse(&self.remote.endpoint)
                .map_err(|_| Error::InvalidUrl(self.remote.endpoint.clone()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::InvalidUrl(self.remote.endpoint.clone()));
            }
        }

        if self.http.timeout == 0 {
            return Err(Error::Config("HTTP timeout must be greater than 0".to_string()));
        }

        if self.export.publisher.trim().is_empty() {
            return Err(Error::Config("Publisher name cannot be empty".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("MEDIUM_EXPORT_ENDPOINT") {
            self.remote.endpoint = endpoint;
        }

        if let Ok(token) = std::env::var("MEDIUM_EXPORT_TOKEN") {
            self.remote.token = token;
        }

        if let Ok(folder) = std::env::var("MEDIUM_EXPORT_FOLDER") {
            self.remote.folder = folder;
        }

        if let Ok(level) = std::env::var("MEDIUM_EXPORT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Reads a setting by dotted key, e.g. `remote.endpoint`.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "export.include_frontmatter" => self.export.include_frontmatter.to_string(),
            "export.include_images" => self.export.include_images.to_string(),
            "export.publisher" => self.export.publisher.clone(),
            "export.filename_style" => match self.export.filename_style {
                FilenameStyle::Title => "title".to_string(),
                FilenameStyle::Dated => "dated".to_string(),
            },
            "output.directory" => self.output.directory.display().to_string(),
            "remote.endpoint" => self.remote.endpoint.clone(),
            "remote.token" => self.remote.token.clone(),
            "remote.folder" => self.remote.folder.clone(),
            "http.user_agent" => self.http.user_agent.clone(),
            "http.timeout" => self.http.timeout.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.json_format" => self.logging.json_format.to_string(),
            _ => return Err(Error::Invalid(format!("Unknown setting: {}", key))),
        };
        Ok(value)
    }

    /// Writes a setting by dotted key. The result is validated before it is
    /// kept, so a rejected value leaves the config unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "export.include_frontmatter" => updated.export.include_frontmatter = parse_bool(key, value)?,
            "export.include_images" => updated.export.include_images = parse_bool(key, value)?,
            "export.publisher" => updated.export.publisher = value.to_string(),
            "export.filename_style" => {
                updated.export.filename_style = match value {
                    "title" => FilenameStyle::Title,
                    "dated" => FilenameStyle::Dated,
                    other => {
                        return Err(Error::Invalid(format!(
                            "{} must be 'title' or 'dated', got '{}'",
                            key, other
                        )))
                    }
                }
            }
            "output.directory" => updated.output.directory = PathBuf::from(value),
            "remote.endpoint" => updated.remote.endpoint = value.trim_end_matches('/').to_string(),
            "remote.token" => updated.remote.token = value.to_string(),
            "remote.folder" => updated.remote.folder = value.to_string(),
            "http.user_agent" => updated.http.user_agent = value.to_string(),
            "http.timeout" => {
                updated.http.timeout = value.parse().map_err(|_| {
                    Error::Invalid(format!("{} must be a number of seconds, got '{}'", key, value))
                })?
            }
            "logging.level" => updated.logging.level = value.to_string(),
            "logging.json_format" => updated.logging.json_format = parse_bool(key, value)?,
            _ => return Err(Error::Invalid(format!("Unknown setting: {}", key))),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            include_frontmatter: self.export.include_frontmatter,
            include_images: self.export.include_images,
        }
    }

    pub fn extractor_settings(&self) -> ExtractorSettings {
        ExtractorSettings {
            publisher: self.export.publisher.clone(),
        }
    }

    pub fn remote_enabled(&self) -> bool {
        !self.remote.endpoint.is_empty()
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("medium-export"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(Error::Invalid(format!("{} must be true or false, got '{}'", key, value))),
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_frontmatter: true,
            include_images: true,
            publisher: default_publisher(),
            filename_style: FilenameStyle::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

fn default_true() -> bool { true }
fn default_publisher() -> String { "Medium".to_string() }
fn default_output_directory() -> PathBuf { PathBuf::from(".") }
fn default_user_agent() -> String {
    format!("medium-export/{}", env!("CARGO_PKG_VERSION"))
}
fn default_timeout() -> u64 { 30 }
fn default_log_level() -> String { "info".to_string() }
