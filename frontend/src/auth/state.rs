//! 认证状态机
//!
//! `Unknown`（启动中） → `Authenticated` / `Unauthenticated`。
//! 所有迁移都通过 `AuthState::apply(AuthAction)` 完成，组件只派发动作，不直接改字段。

use crate::error::MSG_SESSION_EXPIRED;
use assetdesk_shared::{Session, User};
use std::time::Duration;

pub const LOGOUT_RATE_LIMIT_NOTICE: &str = "Please wait a moment before logging out again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    /// 尚未确定是否存在会话
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// 认证状态
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub session: Option<Session>,
    /// 最近一次登录/会话错误
    pub error: Option<String>,
    /// 非错误类提示（如登出限流）
    pub notice: Option<String>,
    /// 登录请求进行中
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    /// 启动时找到有效的持久化会话
    Restored(Session),
    /// 启动时没有有效会话
    NoSession,
    LoginStarted,
    LoginSucceeded(Session),
    LoginFailed(String),
    LoggedOut,
    /// 登出被限流，未执行
    LogoutSuppressed { retry_in: Duration },
    /// 后端判定令牌失效
    SessionExpired,
    DismissNotice,
    ClearError,
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }

    pub fn loading(&self) -> bool {
        self.phase == AuthPhase::Unknown
    }

    pub fn apply(&mut self, action: AuthAction) {
        match action {
            AuthAction::Restored(session) | AuthAction::LoginSucceeded(session) => {
                self.phase = AuthPhase::Authenticated;
                self.session = Some(session);
                self.error = None;
                self.submitting = false;
            }
            AuthAction::NoSession => {
                self.phase = AuthPhase::Unauthenticated;
                self.session = None;
            }
            AuthAction::LoginStarted => {
                self.submitting = true;
                self.error = None;
            }
            AuthAction::LoginFailed(message) => {
                self.phase = AuthPhase::Unauthenticated;
                self.session = None;
                self.submitting = false;
                self.error = Some(message);
            }
            AuthAction::LoggedOut => {
                *self = AuthState {
                    phase: AuthPhase::Unauthenticated,
                    ..AuthState::default()
                };
            }
            AuthAction::LogoutSuppressed { .. } => {
                self.notice = Some(LOGOUT_RATE_LIMIT_NOTICE.to_string());
            }
            AuthAction::SessionExpired => {
                self.phase = AuthPhase::Unauthenticated;
                self.session = None;
                self.submitting = false;
                self.error = Some(MSG_SESSION_EXPIRED.to_string());
            }
            AuthAction::DismissNotice => self.notice = None,
            AuthAction::ClearError => self.error = None,
        }
    }

    /// 链式应用，便于测试与派生
    pub fn with(mut self, action: AuthAction) -> Self {
        self.apply(action);
        self
    }
}
