//! Configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level Treecast configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets: Option<SecretsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Allowed CORS origins; `["*"]` permits any origin.
    #[serde(default = "default_origins")]
    pub allow_origins: Vec<String>,

    /// Serve static files as the router fallback.
    #[serde(default = "default_true")]
    pub mount_static: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: None,
            allow_origins: default_origins(),
            mount_static: default_true(),
            static_dir: None,
        }
    }
}

fn default_port() -> u16 {
    8990
}

fn default_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the durable store file (default: `.treecast_store.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// `KEY=VALUE` override file applied on top of the environment
    /// (default: `.env`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "plain" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Log level override (trace/debug/info/warn/error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Per-crate log level overrides (e.g. "treecast_server=debug").
    #[serde(default)]
    pub filters: Vec<String>,
}

fn default_log_format() -> String {
    "plain".into()
}

/// Substitute `${ENV_VAR}` patterns in a string with their environment
/// variable values.
fn substitute_env_vars(input: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_default()
    })
    .into_owned()
}

impl Config {
    /// Load config from a JSON5 file, substituting `${ENV_VAR}` references.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(crate::error::TreecastError::Io)?;
        let substituted = substitute_env_vars(&raw);

        let config: Config = json5::from_str(&substituted)
            .map_err(|e| crate::error::TreecastError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Default config file location: `./treecast.json5`.
    pub fn default_path() -> PathBuf {
        PathBuf::from("treecast.json5")
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().map(|s| s.port).unwrap_or(8990)
    }

    pub fn bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn allow_origins(&self) -> Vec<String> {
        self.server
            .as_ref()
            .map(|s| s.allow_origins.clone())
            .unwrap_or_else(default_origins)
    }

    pub fn mount_static(&self) -> bool {
        self.server.as_ref().map(|s| s.mount_static).unwrap_or(true)
    }

    pub fn static_dir(&self) -> Option<PathBuf> {
        self.server
            .as_ref()
            .and_then(|s| s.static_dir.as_ref())
            .map(PathBuf::from)
    }

    /// Durable store file path.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.path.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".treecast_store.json"))
    }

    /// Secrets override file path.
    pub fn env_file(&self) -> PathBuf {
        self.secrets
            .as_ref()
            .and_then(|s| s.env_file.as_ref())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".env"))
    }

    /// Get a config value by dotted path (e.g. "server.port").
    pub fn get_path(&self, path: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current.clone())
    }

    /// Validate config, returning (warnings, errors).
    pub fn validate(&self) -> (Vec<String>, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if let Some(server) = &self.server {
            if server.port == 0 {
                errors.push("Server port cannot be 0".to_string());
            }
            if let Some(dir) = &server.static_dir {
                if server.mount_static && !Path::new(dir).is_dir() {
                    warnings.push(format!("Static directory not found: {dir}"));
                }
            }
            if server.allow_origins.is_empty() {
                warnings.push("No CORS origins allowed; browsers will reject the socket".into());
            }
        }

        (warnings, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port(), 8990);
        assert_eq!(config.bind(), "127.0.0.1");
        assert_eq!(config.allow_origins(), vec!["*".to_string()]);
        assert!(config.mount_static());
        assert_eq!(config.store_path(), PathBuf::from(".treecast_store.json"));
        assert_eq!(config.env_file(), PathBuf::from(".env"));
    }

    #[test]
    fn test_load_json5() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treecast.json5");
        std::fs::write(
            &path,
            r#"{
                // comments are allowed
                server: { port: 9100, allow_origins: ["http://localhost:5173"] },
                store: { path: "/tmp/app-store.json" },
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port(), 9100);
        assert_eq!(
            config.allow_origins(),
            vec!["http://localhost:5173".to_string()]
        );
        assert_eq!(config.store_path(), PathBuf::from("/tmp/app-store.json"));
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = Config::load(Path::new("/nope/treecast.json5")).unwrap();
        assert_eq!(config.port(), 8990);
    }

    #[test]
    fn test_env_var_substitution() {
        // SAFETY: test-only, single-threaded test runner
        unsafe { std::env::set_var("TREECAST_TEST_BIND", "0.0.0.0") };
        let input = r#"{"server": {"bind": "${TREECAST_TEST_BIND}"}}"#;
        let result = substitute_env_vars(input);
        assert!(result.contains("0.0.0.0"));
        unsafe { std::env::remove_var("TREECAST_TEST_BIND") };
    }

    #[test]
    fn test_get_path() {
        let config = Config {
            server: Some(ServerConfig {
                port: 9200,
                bind: None,
                allow_origins: default_origins(),
                mount_static: true,
                static_dir: None,
            }),
            ..Default::default()
        };
        assert_eq!(
            config.get_path("server.port"),
            Some(serde_json::json!(9200))
        );
        assert_eq!(config.get_path("server.nope"), None);
    }

    #[test]
    fn test_validate_port_zero_errors() {
        let config = Config {
            server: Some(ServerConfig {
                port: 0,
                bind: None,
                allow_origins: default_origins(),
                mount_static: false,
                static_dir: None,
            }),
            ..Default::default()
        };
        let (_warnings, errors) = config.validate();
        assert!(errors.iter().any(|e| e.contains("port")));
    }

    #[test]
    fn test_validate_missing_static_dir_warns() {
        let config = Config {
            server: Some(ServerConfig {
                port: 8990,
                bind: None,
                allow_origins: default_origins(),
                mount_static: true,
                static_dir: Some("/nonexistent/static".into()),
            }),
            ..Default::default()
        };
        let (warnings, errors) = config.validate();
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.contains("Static directory")));
    }
}
