//! 认证服务
//!
//! 对认证后端的类型化封装。服务端错误原样向上传递（状态码 + 消息），
//! 本层不做重试。表单校验在发请求之前完成。

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult, MSG_NETWORK};
use crate::web::http::HttpTransport;
use assetdesk_shared::{
    ForgotPasswordRequest, LoginRequest, LogoutRequest, MessageResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, Session,
};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

pub const MSG_RESET_LINK_INVALID: &str =
    "The reset link is invalid or has expired. Please request a new one.";
pub const MSG_SERVER_ERROR: &str = "Something went wrong on our side. Please try again later.";

/// 重置密码的失败分类，调用方据此选择提示文案
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResetPasswordError {
    #[error("invalid or expired reset token")]
    InvalidToken,
    #[error("{0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Network(String),
}

impl ResetPasswordError {
    pub fn user_message(&self) -> String {
        match self {
            ResetPasswordError::InvalidToken => MSG_RESET_LINK_INVALID.to_string(),
            ResetPasswordError::Validation(msg) => msg.clone(),
            ResetPasswordError::Server(_) => MSG_SERVER_ERROR.to_string(),
            ResetPasswordError::Network(_) => MSG_NETWORK.to_string(),
        }
    }
}

impl From<ApiError> for ResetPasswordError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Http { status, message } => {
                let lower = message.to_lowercase();
                let token_problem = lower.contains("token")
                    && (lower.contains("invalid") || lower.contains("expired"));

                match status {
                    410 => ResetPasswordError::InvalidToken,
                    400 | 401 | 403 | 404 | 422 if token_problem => ResetPasswordError::InvalidToken,
                    401 | 404 => ResetPasswordError::InvalidToken,
                    400 | 422 => ResetPasswordError::Validation(message),
                    _ => ResetPasswordError::Server(message),
                }
            }
            ApiError::Validation(msg) => ResetPasswordError::Validation(msg),
            ApiError::Transport(msg) => ResetPasswordError::Network(msg),
            other => ResetPasswordError::Server(other.to_string()),
        }
    }
}

pub struct AuthService<T> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> AuthService<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<Session> {
        require("User ID", &credentials.user_id)?;
        require("Password", &credentials.password)?;
        self.client.send(credentials).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> ApiResult<RegisterResponse> {
        require("Name", &req.name)?;
        require("Company", &req.company)?;
        validate_email(&req.email)?;
        validate_password_pair(&req.password, &req.confirm_password)?;
        self.client.send(req).await
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<MessageResponse> {
        validate_email(email)?;
        self.client
            .send(&ForgotPasswordRequest {
                email: email.trim().to_string(),
            })
            .await
    }

    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<MessageResponse, ResetPasswordError> {
        if token.trim().is_empty() {
            return Err(ResetPasswordError::InvalidToken);
        }
        validate_password_pair(password, confirm_password)?;

        let req = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        Ok(self.client.send(&req).await?)
    }

    /// 服务端注销。调用方忽略失败。
    /// 本地会话已清除，访问令牌需由调用方传入
    pub async fn logout(&self, refresh_token: &str, access_token: Option<&str>) -> ApiResult<()> {
        let client = match access_token {
            Some(token) => self.client.with_token(token),
            None => self.client.clone(),
        };
        client
            .send(&LogoutRequest {
                refresh_token: refresh_token.to_string(),
            })
            .await
            .map(|_| ())
    }
}

// =========================================================
// 表单校验
// =========================================================

fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} is required", field)));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'));
    if !valid {
        return Err(ApiError::validation("Please enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password_pair(password: &str, confirm_password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirm_password {
        return Err(ApiError::validation("Passwords do not match"));
    }
    Ok(())
}
