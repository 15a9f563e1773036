use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use airdesk_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

struct ConfigSource {
    path: Option<PathBuf>,
    doc: Option<Value>,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let path = detect_config_path();
    let source = ConfigSource { doc: load_config_file_doc(path.as_deref()), path };

    let api_key = config.llm.api_key.as_ref().map_or_else(|| "<unset>".to_string(), redact_secret);
    let entries: [(&str, String, &[&str]); 13] = [
        ("database.url", config.database.url.clone(), &["AIRDESK_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["AIRDESK_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["AIRDESK_DATABASE_TIMEOUT_SECS"],
        ),
        ("llm.api_key", api_key, &["AIRDESK_LLM_API_KEY", "GEMINI_API_KEY"]),
        ("llm.base_url", config.llm.base_url.clone(), &["AIRDESK_LLM_BASE_URL"]),
        ("llm.model", config.llm.model.clone(), &["AIRDESK_LLM_MODEL"]),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), &["AIRDESK_LLM_TIMEOUT_SECS"]),
        (
            "routing.strategy",
            format!("{:?}", config.routing.strategy),
            &["AIRDESK_ROUTING_STRATEGY"],
        ),
        (
            "routing.max_handoffs",
            config.routing.max_handoffs.to_string(),
            &["AIRDESK_ROUTING_MAX_HANDOFFS"],
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["AIRDESK_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["AIRDESK_SERVER_PORT"]),
        (
            "logging.level",
            config.logging.level.clone(),
            &["AIRDESK_LOGGING_LEVEL", "AIRDESK_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["AIRDESK_LOGGING_FORMAT", "AIRDESK_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(|(key, value, env_keys)| {
        format!("- {key} = {value} (source: {})", source.describe(key, env_keys))
    }));
    lines.join("\n")
}

impl ConfigSource {
    fn describe(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if self.doc.as_ref().is_some_and(|doc| contains_path(doc, key_path)) {
            let file_path = self
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }

        "default".to_string()
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("airdesk.toml"), PathBuf::from("config/airdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
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

/// Keeps the first four characters so operators can tell keys apart.
fn redact_secret(secret: &SecretString) -> String {
    let value = secret.expose_secret().trim();
    if value.is_empty() {
        return "<empty>".to_string();
    }

    let prefix = value.chars().take(4).collect::<String>();
    format!("{prefix}***")
}
