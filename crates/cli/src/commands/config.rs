use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use maildesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", "MAILDESK_DATABASE_URL"),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", "MAILDESK_DATABASE_MAX_CONNECTIONS"),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", "MAILDESK_DATABASE_TIMEOUT_SECS"),
    ));

    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", config.llm.provider),
        source("llm.provider", "MAILDESK_LLM_PROVIDER"),
    ));
    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    lines.push(render_line(
        "llm.api_key",
        llm_api_key,
        source("llm.api_key", "MAILDESK_LLM_API_KEY"),
    ));
    lines.push(render_line(
        "llm.base_url",
        config.llm.base_url.as_deref().unwrap_or("<unset>"),
        source("llm.base_url", "MAILDESK_LLM_BASE_URL"),
    ));
    lines.push(render_line(
        "llm.classifier_model",
        &config.llm.classifier_model,
        source("llm.classifier_model", "MAILDESK_LLM_CLASSIFIER_MODEL"),
    ));
    lines.push(render_line(
        "llm.simple_model",
        &config.llm.simple_model,
        source("llm.simple_model", "MAILDESK_LLM_SIMPLE_MODEL"),
    ));
    lines.push(render_line(
        "llm.medium_model",
        &config.llm.medium_model,
        source("llm.medium_model", "MAILDESK_LLM_MEDIUM_MODEL"),
    ));
    lines.push(render_line(
        "llm.complex_model",
        &config.llm.complex_model,
        source("llm.complex_model", "MAILDESK_LLM_COMPLEX_MODEL"),
    ));
    lines.push(render_line(
        "llm.embedding_model",
        &config.llm.embedding_model,
        source("llm.embedding_model", "MAILDESK_LLM_EMBEDDING_MODEL"),
    ));

    lines.push(render_line(
        "rag.top_k",
        &config.rag.top_k.to_string(),
        source("rag.top_k", "MAILDESK_RAG_TOP_K"),
    ));
    lines.push(render_line(
        "rag.similarity_threshold",
        &config.rag.similarity_threshold.to_string(),
        source("rag.similarity_threshold", "MAILDESK_RAG_SIMILARITY_THRESHOLD"),
    ));

    let orders_path = config
        .orders
        .data_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<embedded sample>".to_string());
    lines.push(render_line(
        "orders.data_path",
        &orders_path,
        source("orders.data_path", "MAILDESK_ORDERS_DATA_PATH"),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", "MAILDESK_SERVER_BIND_ADDRESS"),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", "MAILDESK_SERVER_PORT"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "MAILDESK_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "MAILDESK_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("maildesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/maildesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
