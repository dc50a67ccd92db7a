//! 应用配置
//!
//! 后端地址与环境标志在构建时通过环境变量注入（Trunk 构建时读取）：
//! - `ASSETDESK_API_URL`: 认证服务地址
//! - `ASSETDESK_ASSET_API_URL`: 资产服务地址
//! - `ASSETDESK_WARRANTY_API_URL`: 保修/服务请求地址，缺省时沿用资产服务
//! - `ASSETDESK_ENV`: 值为 `production` 时关闭非生产功能

use assetdesk_shared::protocol::Backend;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_AUTH_API_URL: &str = "http://localhost:4000/api";
const DEFAULT_ASSET_API_URL: &str = "http://localhost:5000/api";

/// GET 请求的重试策略
///
/// 仅对传输失败与 502/503/504 生效，退避时间按 `base_delay * 2^n` 增长。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "millis")]
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// 第 `attempt` 次重试（从 0 开始）前的等待时间
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth_api_url: String,
    pub asset_api_url: String,
    pub warranty_api_url: String,
    pub production: bool,
    pub retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            auth_api_url: DEFAULT_AUTH_API_URL.to_string(),
            asset_api_url: DEFAULT_ASSET_API_URL.to_string(),
            warranty_api_url: DEFAULT_ASSET_API_URL.to_string(),
            production: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// 读取构建时注入的配置
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("ASSETDESK_API_URL"),
            option_env!("ASSETDESK_ASSET_API_URL"),
            option_env!("ASSETDESK_WARRANTY_API_URL"),
            option_env!("ASSETDESK_ENV"),
        )
    }

    pub fn from_values(
        auth: Option<&str>,
        asset: Option<&str>,
        warranty: Option<&str>,
        env: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let pick = |value: Option<&str>, fallback: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        let auth_api_url = pick(auth, &defaults.auth_api_url);
        let asset_api_url = pick(asset, &defaults.asset_api_url);
        let warranty_api_url = pick(warranty, &asset_api_url);

        Self {
            auth_api_url,
            asset_api_url,
            warranty_api_url,
            production: env.is_some_and(|e| e.eq_ignore_ascii_case("production")),
            retry: defaults.retry,
        }
        .normalized()
    }

    /// 去掉末尾的 `/`，路径统一以 `/` 开头拼接
    pub fn normalized(mut self) -> Self {
        for url in [
            &mut self.auth_api_url,
            &mut self.asset_api_url,
            &mut self.warranty_api_url,
        ] {
            let trimmed = url.trim_end_matches('/').len();
            url.truncate(trimmed);
        }
        self
    }

    pub fn base_url(&self, backend: Backend) -> &str {
        match backend {
            Backend::Auth => &self.auth_api_url,
            Backend::Asset => &self.asset_api_url,
            Backend::Warranty => &self.warranty_api_url,
        }
    }

    /// 非生产环境的调试功能开关
    pub fn debug_features(&self) -> bool {
        !self.production
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warranty_url_falls_back_to_asset_url() {
        let config = AppConfig::from_values(
            Some("https://auth.example.com/api/"),
            Some("https://assets.example.com/"),
            None,
            Some("production"),
        );
        assert_eq!(config.auth_api_url, "https://auth.example.com/api");
        assert_eq!(config.asset_api_url, "https://assets.example.com");
        assert_eq!(config.base_url(Backend::Warranty), "https://assets.example.com");
        assert!(config.production);
        assert!(!config.debug_features());
    }

    #[test]
    fn blank_values_use_defaults() {
        let config = AppConfig::from_values(Some("  "), None, None, Some("staging"));
        assert_eq!(config.auth_api_url, DEFAULT_AUTH_API_URL);
        assert!(!config.production);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: AppConfig = serde_json::from_str(
            r#"{"asset_api_url": "https://a.example.com", "retry": {"max_retries": 4, "base_delay": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.asset_api_url, "https://a.example.com");
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.retry.backoff(2), Duration::from_millis(200));
        assert_eq!(config.auth_api_url, DEFAULT_AUTH_API_URL);
    }
}
