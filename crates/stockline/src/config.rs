//! Console configuration sourced from environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use stockline_protocol::Role;
use stockline_router::{Area, AuthorizationRules};
use stockline_session::SessionConfig;

use crate::StocklineError;

pub const ENV_API_URL: &str = "STOCKLINE_API_URL";
pub const ENV_TOKEN_FILE: &str = "STOCKLINE_TOKEN_FILE";
pub const ENV_STORAGE_KEY: &str = "STOCKLINE_STORAGE_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "STOCKLINE_REQUEST_TIMEOUT_SECS";
pub const ENV_EXPIRY_LEEWAY_SECS: &str = "STOCKLINE_EXPIRY_LEEWAY_SECS";
pub const ENV_RULES_FILE: &str = "STOCKLINE_RULES_FILE";

/// Everything needed to wire a [`Console`](crate::Console) to a live backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the auth API, e.g. `https://api.example.com/v1`.
    pub api_base_url: String,
    /// Where the token survives restarts.
    pub token_file: PathBuf,
    /// Session behavior (storage key, expiry leeway).
    pub session: SessionConfig,
    /// Per-request timeout for the auth API.
    pub request_timeout: Duration,
    /// Optional JSON file holding a custom area → roles table.
    pub rules_file: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            token_file: PathBuf::from(".stockline/session.json"),
            session: SessionConfig::default(),
            request_timeout: Duration::from_secs(10),
            rules_file: None,
        }
    }
}

impl ConsoleConfig {
    /// Reads the process environment. Unset variables keep their defaults.
    ///
    /// # Errors
    /// [`StocklineError::Config`] if a numeric variable doesn't parse.
    pub fn from_env() -> Result<Self, StocklineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StocklineError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(path) = lookup(ENV_TOKEN_FILE) {
            config.token_file = PathBuf::from(path);
        }
        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            if key.trim().is_empty() {
                return Err(StocklineError::Config(format!("{ENV_STORAGE_KEY} is empty")));
            }
            config.session.storage_key = key;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = parse_secs(ENV_REQUEST_TIMEOUT_SECS, &secs)?;
            if secs == 0 {
                return Err(StocklineError::Config(format!(
                    "{ENV_REQUEST_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = lookup(ENV_EXPIRY_LEEWAY_SECS) {
            config.session.expiry_leeway_secs = parse_secs(ENV_EXPIRY_LEEWAY_SECS, &secs)?;
        }
        config.rules_file = lookup(ENV_RULES_FILE).map(PathBuf::from);

        Ok(config)
    }

    /// Loads the authorization table from [`rules_file`](Self::rules_file),
    /// or the built-in one if none is set.
    ///
    /// # Errors
    /// - [`StocklineError::Config`] if the file can't be read or isn't a
    ///   map of area to role list
    /// - [`StocklineError::Router`] if the table fails validation
    pub fn load_rules(&self) -> Result<AuthorizationRules, StocklineError> {
        let Some(path) = &self.rules_file else {
            return Ok(AuthorizationRules::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StocklineError::Config(format!("read {ENV_RULES_FILE} {}: {e}", path.display()))
        })?;
        let table: BTreeMap<Area, Vec<Role>> = serde_json::from_str(&contents).map_err(|e| {
            StocklineError::Config(format!("parse {ENV_RULES_FILE} {}: {e}", path.display()))
        })?;
        Ok(AuthorizationRules::new(table)?)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, StocklineError> {
    value
        .trim()
        .parse()
        .map_err(|_| StocklineError::Config(format!("{name}: expected whole seconds, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stockline_router::RouterError;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = ConsoleConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.session.storage_key, "stockline.auth_token");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.rules_file.is_none());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ConsoleConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "https://api.example.com"),
            (ENV_TOKEN_FILE, "/tmp/token.json"),
            (ENV_STORAGE_KEY, "console.token"),
            (ENV_REQUEST_TIMEOUT_SECS, " 3 "),
            (ENV_EXPIRY_LEEWAY_SECS, "30"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.token_file, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.session.storage_key, "console.token");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.session.expiry_leeway_secs, 30);
    }

    #[test]
    fn test_from_lookup_bad_timeout_is_config_error() {
        let result = ConsoleConfig::from_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "ten")]));
        match result {
            Err(StocklineError::Config(msg)) => assert!(msg.contains(ENV_REQUEST_TIMEOUT_SECS)),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_lookup_zero_timeout_is_config_error() {
        let result = ConsoleConfig::from_lookup(lookup_from(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]));
        assert!(matches!(result, Err(StocklineError::Config(_))));
    }

    #[test]
    fn test_from_lookup_blank_storage_key_is_config_error() {
        let result = ConsoleConfig::from_lookup(lookup_from(&[(ENV_STORAGE_KEY, "  ")]));
        assert!(matches!(result, Err(StocklineError::Config(_))));
    }

    #[test]
    fn test_load_rules_without_file_is_default() {
        let rules = ConsoleConfig::default().load_rules().unwrap();
        assert_eq!(rules, AuthorizationRules::default());
    }

    #[test]
    fn test_load_rules_from_file() {
        let path = std::env::temp_dir().join(format!("stockline-rules-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"admin":["ADMIN","MANAGEMENT"],"superstockist":["SUPERSTOCKIST","MANAGEMENT"],
                "distributor":["DISTRIBUTOR"],"salesman":["SALESMAN"]}"#,
        )
        .unwrap();
        let config = ConsoleConfig {
            rules_file: Some(path.clone()),
            ..ConsoleConfig::default()
        };

        let rules = config.load_rules().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(rules.permits(Area::Superstockist, Role::Management));
    }

    #[test]
    fn test_load_rules_incomplete_table_is_router_error() {
        let path =
            std::env::temp_dir().join(format!("stockline-bad-rules-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"admin":["ADMIN"]}"#).unwrap();
        let config = ConsoleConfig {
            rules_file: Some(path.clone()),
            ..ConsoleConfig::default()
        };

        let result = config.load_rules();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            result,
            Err(StocklineError::Router(RouterError::MissingArea(_)))
        ));
    }

    #[test]
    fn test_load_rules_unparseable_file_is_config_error() {
        let path =
            std::env::temp_dir().join(format!("stockline-junk-rules-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"admin": "everyone"}"#).unwrap();
        let config = ConsoleConfig {
            rules_file: Some(path.clone()),
            ..ConsoleConfig::default()
        };

        let result = config.load_rules();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(StocklineError::Config(_))));
    }

    #[test]
    fn test_load_rules_missing_file_is_config_error() {
        let config = ConsoleConfig {
            rules_file: Some(PathBuf::from("/definitely/not/here/rules.json")),
            ..ConsoleConfig::default()
        };
        assert!(matches!(config.load_rules(), Err(StocklineError::Config(_))));
    }
}
