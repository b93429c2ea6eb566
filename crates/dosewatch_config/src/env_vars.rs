//! Environment variable naming for DoseWatch configuration.
//!
//! Plain settings map to `DOSEWATCH__SECTION__KEY`, secrets to
//! `DOSEWATCH_SECRET_SECTION_KEY` with a fallback to the provider-style
//! `SECTION_KEY` name (e.g. `TWILIO_AUTH_TOKEN`).

use serde_json::Value;
use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "DOSEWATCH";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "DOSEWATCH_SECRET";

pub const CONFIG_SEPARATOR: &str = "__";
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value that asks the loader to pull the real value from the environment.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// `"server.host"` -> `"DOSEWATCH__SERVER__HOST"`
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// `"twilio.auth_token"` -> `"DOSEWATCH_SECRET_TWILIO_AUTH_TOKEN"`
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// `"twilio.auth_token"` -> `"TWILIO_AUTH_TOKEN"`
pub fn provider_secret_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

pub fn get_config_env_var(path: &str) -> Option<String> {
    env::var(config_path_to_env_var(path)).ok()
}

/// Looks up a secret under the prefixed name first, then the provider-style name.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    if let Ok(value) = env::var(secret_path_to_env_var(path)) {
        return Some(value);
    }
    env::var(provider_secret_env_var(path)).ok()
}

/// Paths containing "secret", "key", "password", "token" or "sid" are secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
        || path_lower.contains("sid")
}

pub fn get_env_var(path: &str) -> Option<String> {
    if is_secret_path(path) {
        get_secret_env_var(path)
    } else {
        get_config_env_var(path)
    }
}

/// Replaces every `"secret_from_env"` string in `value` with the matching
/// environment variable. Returns whether anything was replaced.
pub fn inject_env_vars(value: &mut Value) -> bool {
    fn walk(path: Vec<String>, obj: &mut Value) -> bool {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    replaced |= walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_env_var(&path_str) {
                    *s = env_val;
                    replaced = true;
                } else {
                    warn!("Environment variable for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value)
}
