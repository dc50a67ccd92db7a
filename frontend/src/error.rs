//! 客户端错误类型
//!
//! 所有领域服务与 HTTP 客户端共用 `ApiError`，视图层通过
//! `kind()` 决定展示方式（提示框 / 重定向），通过 `user_message()` 获取文案。

use thiserror::Error;

pub const MSG_NETWORK: &str = "Failed to reach the server. Please try again.";
pub const MSG_MISSING_TENANT: &str = "Consumer ID not found. Please log in again.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
pub const MSG_UNEXPECTED: &str = "The server returned an unexpected response.";

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 网络/传输失败，可重试
    Network,
    /// 后端返回非 2xx
    Http,
    /// 客户端表单校验失败，未发出请求
    Validation,
    /// 会话缺失或失效，交由守卫重定向
    Session,
    /// 响应体无法解析
    Decode,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("{}", MSG_MISSING_TENANT)]
    MissingTenant,

    #[error("{}", MSG_SESSION_EXPIRED)]
    SessionExpired,

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Network,
            ApiError::Http { status: 401, .. } => ErrorKind::Session,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::MissingTenant | ApiError::SessionExpired => ErrorKind::Session,
            ApiError::Decode(_) => ErrorKind::Decode,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 视为令牌失效；缺少租户标识不算，它只需要提示用户
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired | ApiError::Http { status: 401, .. }
        )
    }

    /// 对应 502/503/504 或网络失败
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Http { status: 502..=504, .. }
        )
    }

    /// 面向用户的文案
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => MSG_NETWORK.to_string(),
            ApiError::Http { message, .. } | ApiError::Validation(message) => message.clone(),
            ApiError::MissingTenant => MSG_MISSING_TENANT.to_string(),
            ApiError::SessionExpired => MSG_SESSION_EXPIRED.to_string(),
            ApiError::Decode(_) => MSG_UNEXPECTED.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(ApiError::Transport("timeout".into()).kind(), ErrorKind::Network);
        assert_eq!(ApiError::http(401, "Unauthorized").kind(), ErrorKind::Session);
        assert_eq!(ApiError::http(404, "Not Found").kind(), ErrorKind::Http);
        assert_eq!(ApiError::MissingTenant.kind(), ErrorKind::Session);
        assert!(!ApiError::MissingTenant.is_session_expired());
        assert!(ApiError::http(503, "busy").is_transient());
        assert!(!ApiError::http(500, "boom").is_transient());
    }

    #[test]
    fn http_error_displays_server_message() {
        let err = ApiError::http(404, "Not Found");
        assert_eq!(err.to_string(), "Not Found");
        assert_eq!(err.user_message(), "Not Found");
        assert_eq!(ApiError::Transport("x".into()).user_message(), MSG_NETWORK);
    }
}
