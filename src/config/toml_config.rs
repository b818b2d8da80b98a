use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/base.toml";
pub const DEFAULT_PROJECT_ID: &str = "caffy-beans-example";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
pub const EMULATOR_HOST_VAR: &str = "FIRESTORE_EMULATOR_HOST";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub application: ApplicationConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Firestore,
    Memory,
}

/// Firestore 認證方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Application Default Credentials，token 到期前自動更新
    Adc,
    /// 固定的 access_token
    Token,
    /// 不送出認證標頭（模擬器）
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    pub database: Option<String>,
    pub endpoint: Option<String>,
    pub auth: Option<AuthMode>,
    pub access_token: Option<String>,
    pub page_size: Option<usize>,
    pub request_timeout_seconds: Option<u64>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            project_id: default_project_id(),
            database: None,
            endpoint: None,
            auth: None,
            access_token: None,
            page_size: None,
            request_timeout_seconds: None,
        }
    }
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FIRESTORE_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            CatalogError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("application.address", &self.application.address)?;
        validation::validate_non_empty_string("database.project_id", &self.database.project_id)?;

        if let Some(database) = &self.database.database {
            validation::validate_non_empty_string("database.database", database)?;
        }

        if let Some(endpoint) = &self.database.endpoint {
            validation::validate_url("database.endpoint", endpoint)?;
        }

        if let Some(page_size) = self.database.page_size {
            validation::validate_positive_number("database.page_size", page_size, 1)?;
        }

        if let Some(token) = &self.database.access_token {
            // 未替換的 ${VAR} 代表環境變數缺失
            if token.starts_with("${") {
                return Err(CatalogError::InvalidConfigValueError {
                    field: "database.access_token".to_string(),
                    value: token.clone(),
                    reason: "Environment variable is not set".to_string(),
                });
            }
        }

        if self.database.auth == Some(AuthMode::Token) && self.database.access_token.is_none() {
            return Err(CatalogError::ConfigValidationError {
                field: "database.access_token".to_string(),
                message: "auth = \"token\" requires an access_token".to_string(),
            });
        }

        Ok(())
    }

    /// 取得監聽位址
    pub fn listen_address(&self) -> Result<SocketAddr> {
        validation::validate_socket_addr("application.address", &self.application.address)
    }
}

impl DatabaseConfig {
    pub fn database_id(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    /// 取得 Firestore REST 端點，未設定時依模擬器環境變數決定
    pub fn endpoint(&self) -> String {
        self.resolve_endpoint(std::env::var(EMULATOR_HOST_VAR).ok())
    }

    fn resolve_endpoint(&self, emulator_host: Option<String>) -> String {
        match (&self.endpoint, emulator_host) {
            (Some(endpoint), _) => endpoint.trim_end_matches('/').to_string(),
            (None, Some(host)) if !host.is_empty() => format!("http://{}/v1", host),
            _ => DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// 取得認證方式：明確設定優先，其次 access_token，再來是模擬器，否則 ADC
    pub fn auth_mode(&self) -> AuthMode {
        self.resolve_auth_mode(std::env::var(EMULATOR_HOST_VAR).ok())
    }

    fn resolve_auth_mode(&self, emulator_host: Option<String>) -> AuthMode {
        if let Some(mode) = self.auth {
            return mode;
        }
        if self.access_token.is_some() {
            return AuthMode::Token;
        }
        match (&self.endpoint, emulator_host) {
            (None, Some(host)) if !host.is_empty() => AuthMode::None,
            _ => AuthMode::Adc,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(100)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.unwrap_or(10))
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let toml_content = r#"
[application]
address = "0.0.0.0:8080"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.application.address, "0.0.0.0:8080");
        assert_eq!(config.database.backend, Backend::Firestore);
        assert_eq!(config.database.project_id, "caffy-beans-example");
        assert_eq!(config.database.database_id(), "(default)");
        assert_eq!(config.database.page_size(), 100);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[application]
address = "127.0.0.1:3000"

[database]
backend = "memory"
project_id = "beans-prod"
database = "catalog"
endpoint = "http://localhost:8081/v1/"
page_size = 25
request_timeout_seconds = 3

[logging]
level = "debug"
format = "json"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.database.backend, Backend::Memory);
        assert_eq!(config.database.project_id, "beans-prod");
        assert_eq!(config.database.database_id(), "catalog");
        assert_eq!(config.database.endpoint(), "http://localhost:8081/v1");
        assert_eq!(config.database.page_size(), 25);
        assert_eq!(config.database.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.listen_address().unwrap(),
            "127.0.0.1:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CAFFY_TEST_TOKEN", "secret-token");

        let toml_content = r#"
[application]
address = "0.0.0.0:8080"

[database]
access_token = "${CAFFY_TEST_TOKEN}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.database.access_token.as_deref(), Some("secret-token"));
        assert!(config.validate().is_ok());

        std::env::remove_var("CAFFY_TEST_TOKEN");
    }

    #[test]
    fn test_missing_env_var_fails_validation() {
        let toml_content = r#"
[application]
address = "0.0.0.0:8080"

[database]
access_token = "${CAFFY_TEST_TOKEN_THAT_IS_NEVER_SET}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad_address = ServiceConfig::from_toml_str(
            r#"
[application]
address = "not-an-address"
"#,
        )
        .unwrap();
        assert!(bad_address.validate().is_err());

        let bad_endpoint = ServiceConfig::from_toml_str(
            r#"
[application]
address = "0.0.0.0:8080"

[database]
endpoint = "ftp://firestore"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let bad_page_size = ServiceConfig::from_toml_str(
            r#"
[application]
address = "0.0.0.0:8080"

[database]
page_size = 0
"#,
        )
        .unwrap();
        assert!(bad_page_size.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = ServiceConfig::from_toml_str(
            r#"
[application]
address = "0.0.0.0:8080"

[database]
backend = "redis"
"#,
        );
        assert!(matches!(
            result,
            Err(CatalogError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_emulator_endpoint() {
        let config = DatabaseConfig::default();

        assert_eq!(config.resolve_endpoint(None), DEFAULT_ENDPOINT);
        assert_eq!(
            config.resolve_endpoint(Some("localhost:8081".to_string())),
            "http://localhost:8081/v1"
        );

        let explicit = DatabaseConfig {
            endpoint: Some("https://firestore.example.com/v1".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(
            explicit.resolve_endpoint(Some("localhost:8081".to_string())),
            "https://firestore.example.com/v1"
        );
    }

    #[test]
    fn test_auth_mode_resolution() {
        let config = DatabaseConfig::default();
        assert_eq!(config.resolve_auth_mode(None), AuthMode::Adc);
        assert_eq!(
            config.resolve_auth_mode(Some("localhost:8081".to_string())),
            AuthMode::None
        );

        let with_token = DatabaseConfig {
            access_token: Some("fixed".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(
            with_token.resolve_auth_mode(Some("localhost:8081".to_string())),
            AuthMode::Token
        );

        let explicit_endpoint = DatabaseConfig {
            endpoint: Some("https://firestore.example.com/v1".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(
            explicit_endpoint.resolve_auth_mode(Some("localhost:8081".to_string())),
            AuthMode::Adc
        );

        let forced = DatabaseConfig {
            auth: Some(AuthMode::Adc),
            access_token: Some("ignored".to_string()),
            ..DatabaseConfig::default()
        };
        assert_eq!(forced.resolve_auth_mode(None), AuthMode::Adc);
    }

    #[test]
    fn test_token_auth_requires_access_token() {
        let config = ServiceConfig::from_toml_str(
            r#"
[application]
address = "0.0.0.0:8080"

[database]
auth = "token"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(CatalogError::ConfigValidationError { .. })
        ));

        let config = ServiceConfig::from_toml_str(
            r#"
[application]
address = "0.0.0.0:8080"

[database]
auth = "adc"
"#,
        )
        .unwrap();
        assert_eq!(config.database.auth_mode(), AuthMode::Adc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[application]
address = "0.0.0.0:9090"

[database]
project_id = "file-test"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.database.project_id, "file-test");
    }

    #[test]
    fn test_missing_file() {
        let result = ServiceConfig::from_file("/nonexistent/caffy/base.toml");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
