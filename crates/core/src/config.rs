use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
    pub orders: OrdersConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub classifier_model: String,
    pub simple_model: String,
    pub medium_model: String,
    pub complex_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RagConfig {
    pub top_k: usize,
    pub similarity_threshold: f32,
}

#[derive(Clone, Debug)]
pub struct OrdersConfig {
    /// Path to a JSON order fixture file; the embedded sample set is used
    /// when unset.
    pub data_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    /// Any OpenAI-compatible endpoint (local inference servers included);
    /// requires `base_url`.
    Compatible,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub orders_data_path: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://maildesk.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::OpenAi,
                api_key: None,
                base_url: None,
                classifier_model: "gpt-4o-mini".to_string(),
                simple_model: "gpt-4o-mini".to_string(),
                medium_model: "gpt-4o-mini".to_string(),
                complex_model: "gpt-4o".to_string(),
                embedding_model: "text-embedding-3-small".to_string(),
                embedding_dimensions: 1536,
                timeout_secs: 60,
            },
            rag: RagConfig { top_k: 3, similarity_threshold: 0.7 },
            orders: OrdersConfig { data_path: None },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "compatible" => Ok(Self::Compatible),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|compatible)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file (if any), then `MAILDESK_*` environment
    /// variables, then programmatic overrides; validated last.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("maildesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(SecretString::from(api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.classifier_model {
                self.llm.classifier_model = model;
            }
            if let Some(model) = llm.simple_model {
                self.llm.simple_model = model;
            }
            if let Some(model) = llm.medium_model {
                self.llm.medium_model = model;
            }
            if let Some(model) = llm.complex_model {
                self.llm.complex_model = model;
            }
            if let Some(model) = llm.embedding_model {
                self.llm.embedding_model = model;
            }
            if let Some(dimensions) = llm.embedding_dimensions {
                self.llm.embedding_dimensions = dimensions;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(rag) = patch.rag {
            if let Some(top_k) = rag.top_k {
                self.rag.top_k = top_k;
            }
            if let Some(threshold) = rag.similarity_threshold {
                self.rag.similarity_threshold = threshold;
            }
        }

        if let Some(orders) = patch.orders {
            if let Some(data_path) = orders.data_path {
                self.orders.data_path = Some(PathBuf::from(data_path));
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MAILDESK_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MAILDESK_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("MAILDESK_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MAILDESK_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("MAILDESK_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MAILDESK_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("MAILDESK_LLM_API_KEY") {
            self.llm.api_key = Some(SecretString::from(value));
        }
        if let Some(value) = read_env("MAILDESK_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("MAILDESK_LLM_CLASSIFIER_MODEL") {
            self.llm.classifier_model = value;
        }
        if let Some(value) = read_env("MAILDESK_LLM_SIMPLE_MODEL") {
            self.llm.simple_model = value;
        }
        if let Some(value) = read_env("MAILDESK_LLM_MEDIUM_MODEL") {
            self.llm.medium_model = value;
        }
        if let Some(value) = read_env("MAILDESK_LLM_COMPLEX_MODEL") {
            self.llm.complex_model = value;
        }
        if let Some(value) = read_env("MAILDESK_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = value;
        }
        if let Some(value) = read_env("MAILDESK_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("MAILDESK_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MAILDESK_RAG_TOP_K") {
            self.rag.top_k = parse_usize("MAILDESK_RAG_TOP_K", &value)?;
        }
        if let Some(value) = read_env("MAILDESK_RAG_SIMILARITY_THRESHOLD") {
            self.rag.similarity_threshold =
                parse_f32("MAILDESK_RAG_SIMILARITY_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("MAILDESK_ORDERS_DATA_PATH") {
            self.orders.data_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("MAILDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MAILDESK_SERVER_PORT") {
            self.server.port = parse_u16("MAILDESK_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("MAILDESK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("MAILDESK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("MAILDESK_LOGGING_LEVEL").or_else(|| read_env("MAILDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MAILDESK_LOGGING_FORMAT").or_else(|| read_env("MAILDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(SecretString::from(api_key));
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(data_path) = overrides.orders_data_path {
            self.orders.data_path = Some(data_path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_llm(&self.llm)?;
        validate_rag(&self.rag)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("maildesk.toml"), PathBuf::from("config/maildesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation("llm.timeout_secs must be in range 1..=300".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Compatible => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for the compatible provider".to_string(),
                ));
            }
        }
    }

    for (key, model) in [
        ("llm.classifier_model", &llm.classifier_model),
        ("llm.simple_model", &llm.simple_model),
        ("llm.medium_model", &llm.medium_model),
        ("llm.complex_model", &llm.complex_model),
        ("llm.embedding_model", &llm.embedding_model),
    ] {
        if model.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }

    if llm.embedding_dimensions == 0 {
        return Err(ConfigError::Validation(
            "llm.embedding_dimensions must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_rag(rag: &RagConfig) -> Result<(), ConfigError> {
    if rag.top_k == 0 {
        return Err(ConfigError::Validation("rag.top_k must be greater than zero".to_string()));
    }

    if !(0.0..=1.0).contains(&rag.similarity_threshold) {
        return Err(ConfigError::Validation(
            "rag.similarity_threshold must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    llm: Option<LlmPatch>,
    rag: Option<RagPatch>,
    orders: Option<OrdersPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    classifier_model: Option<String>,
    simple_model: Option<String>,
    medium_model: Option<String>,
    complex_model: Option<String>,
    embedding_model: Option<String>,
    embedding_dimensions: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RagPatch {
    top_k: Option<usize>,
    similarity_threshold: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct OrdersPatch {
    data_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
