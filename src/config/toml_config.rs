use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProxyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProxyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${UPSTREAM_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 驗證上游端點
        crate::utils::validation::validate_url("upstream.endpoint", &self.upstream.endpoint)?;

        // 驗證重試次數
        if let Some(attempts) = self.upstream.retry_attempts {
            crate::utils::validation::validate_positive_number(
                "upstream.retry_attempts",
                attempts as usize,
                1,
            )?;
        }

        // 驗證逾時範圍
        if let Some(timeout) = self.upstream.timeout_seconds {
            crate::utils::validation::validate_range(
                "upstream.timeout_seconds",
                timeout,
                1,
                300,
            )?;
        }

        if let Some(host) = &self.server.host {
            crate::utils::validation::validate_non_empty_string("server.host", host)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> &str {
        self.server.host.as_deref().unwrap_or("127.0.0.1")
    }

    fn port(&self) -> u16 {
        self.server.port.unwrap_or(8080)
    }

    fn upstream_url(&self) -> &str {
        &self.upstream.endpoint
    }

    fn max_retries(&self) -> u32 {
        self.upstream.retry_attempts.unwrap_or(5)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.upstream.retry_delay_seconds.unwrap_or(1))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_seconds.unwrap_or(10))
    }

    fn upstream_headers(&self) -> Option<&HashMap<String, String>> {
        self.upstream.headers.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
