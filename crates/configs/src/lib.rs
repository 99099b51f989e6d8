use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

pub const BACKENDS: [&str; 2] = ["file", "database"];
pub const STRATEGIES: [&str; 3] = ["replace", "merge", "keep"];
pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub restore: RestoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which core store backend to open, and where the file backend lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { backend: default_backend(), data_file: default_data_file(), collection: default_collection() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestoreConfig {
    #[serde(default = "default_strategy")]
    pub default_strategy: String,
}

impl Default for RestoreConfig {
    fn default() -> Self { Self { default_strategy: default_strategy() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: default_log_level(), format: default_log_format() } }
}

fn default_backend() -> String { "file".into() }
fn default_data_file() -> String { "data/core_store.json".into() }
fn default_collection() -> String { "core_store".into() }
fn default_max_connections() -> u32 { 5 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }
fn default_strategy() -> String { "replace".into() }
fn default_log_level() -> String { "info".into() }
fn default_log_format() -> String { "compact".into() }

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Load from `path`; a missing file yields defaults, a malformed one is an error.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    if !std::path::Path::new(path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(path).map_err(|e| anyhow!("failed to load config {path}: {e}"))
}

impl AppConfig {
    /// Load `path` (defaults when missing), apply environment overrides, then
    /// validate. A command-line `backend` takes precedence over both the file
    /// and `CORESTORE_BACKEND`.
    pub fn load_with_backend(path: &str, backend: Option<&str>) -> Result<Self> {
        let mut cfg = load_or_default(path)?;
        cfg.store.normalize_from_env();
        if let Some(b) = backend {
            cfg.store.backend = b.trim().to_ascii_lowercase();
        }
        cfg.validate_sections()?;
        Ok(cfg)
    }

    fn validate_sections(&mut self) -> Result<()> {
        self.store.validate()?;
        self.restore.validate()?;
        self.logging.normalize()?;
        // database settings only matter when the relational backend is selected
        if self.store.backend == "database" {
            if self.store.collection != "core_store" {
                return Err(anyhow!("store.collection must be \"core_store\" for the database backend"));
            }
            self.database.normalize_from_env();
            self.database.validate()?;
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(backend) = std::env::var("CORESTORE_BACKEND") {
            if !backend.trim().is_empty() { self.backend = backend; }
        }
        if let Ok(file) = std::env::var("CORESTORE_DATA_FILE") {
            if !file.trim().is_empty() { self.data_file = file; }
        }
        self.backend = self.backend.trim().to_ascii_lowercase();
    }

    pub fn validate(&self) -> Result<()> {
        if !BACKENDS.contains(&self.backend.as_str()) {
            return Err(anyhow!("store.backend must be one of {:?}, got {:?}", BACKENDS, self.backend));
        }
        if self.backend == "file" && self.data_file.trim().is_empty() {
            return Err(anyhow!("store.data_file is empty"));
        }
        if self.collection.trim().is_empty() {
            return Err(anyhow!("store.collection is empty"));
        }
        Ok(())
    }
}

impl RestoreConfig {
    pub fn validate(&self) -> Result<()> {
        if !STRATEGIES.contains(&self.default_strategy.as_str()) {
            return Err(anyhow!(
                "restore.default_strategy must be one of {:?}, got {:?}",
                STRATEGIES,
                self.default_strategy
            ));
        }
        Ok(())
    }
}

impl LoggingConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.level.trim().is_empty() {
            self.level = default_log_level();
        }
        self.format = self.format.trim().to_ascii_lowercase();
        if !LOG_FORMATS.contains(&self.format.as_str()) {
            return Err(anyhow!("logging.format must be one of {:?}, got {:?}", LOG_FORMATS, self.format));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // fall back to DATABASE_URL when the TOML leaves the url out
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}
