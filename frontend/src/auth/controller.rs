//! 认证控制器
//!
//! 组合令牌存储、认证服务与时钟，执行有副作用的操作，
//! 返回应派发到 `AuthState` 的动作。组件通过上下文持有它，
//! 不直接读写存储。

use crate::auth::service::AuthService;
use crate::auth::state::AuthAction;
use crate::web::http::HttpTransport;
use crate::web::storage::{KeyValueStorage, TokenStore};
use crate::web::timer::{Clock, Throttle};
use assetdesk_shared::{LoginRequest, RegisterRequest};
use std::time::Duration;

/// 两次登出之间的最小间隔
pub const LOGOUT_THROTTLE: Duration = Duration::from_millis(2000);

pub struct AuthController<S, T, C> {
    tokens: TokenStore<S>,
    service: AuthService<T>,
    clock: C,
    logout_gate: Throttle,
}

impl<S, T, C> AuthController<S, T, C>
where
    S: KeyValueStorage,
    T: HttpTransport,
    C: Clock,
{
    pub fn new(tokens: TokenStore<S>, service: AuthService<T>, clock: C) -> Self {
        Self {
            tokens,
            service,
            clock,
            logout_gate: Throttle::new(LOGOUT_THROTTLE),
        }
    }

    pub fn tokens(&self) -> &TokenStore<S> {
        &self.tokens
    }

    pub fn service(&self) -> &AuthService<T> {
        &self.service
    }

    pub fn has_token(&self) -> bool {
        self.tokens.has_token()
    }

    /// 启动检查：存在未过期的持久化会话则恢复，否则清理残留并进入未认证
    pub fn bootstrap(&self) -> AuthAction {
        match self.tokens.load_session() {
            Some(session) if !session.is_expired(self.clock.now()) => {
                tracing::info!(user = %session.user.id, "session restored");
                AuthAction::Restored(session)
            }
            Some(session) => {
                tracing::info!(user = %session.user.id, expired_at = %session.expires_at, "persisted session expired");
                self.tokens.clear(None);
                AuthAction::NoSession
            }
            None => {
                if self.tokens.has_token() {
                    tracing::warn!("incomplete persisted session, discarding");
                    self.tokens.clear(None);
                }
                AuthAction::NoSession
            }
        }
    }

    pub async fn login(&self, credentials: LoginRequest) -> AuthAction {
        match self.service.login(&credentials).await {
            Ok(session) => {
                self.tokens.save_session(&session);
                tracing::info!(user = %session.user.id, "logged in");
                AuthAction::LoginSucceeded(session)
            }
            Err(e) => {
                tracing::warn!(user = %credentials.user_id, error = %e, "login failed");
                AuthAction::LoginFailed(e.user_message())
            }
        }
    }

    /// 注册成功且后端返回令牌时直接建立会话
    pub async fn register(&self, req: RegisterRequest) -> AuthAction {
        match self.service.register(&req).await {
            Ok(resp) => match resp.data {
                Some(data) if resp.success => {
                    let session = data.into_session(self.clock.now());
                    self.tokens.save_session(&session);
                    tracing::info!(user = %session.user.id, "registered");
                    AuthAction::LoginSucceeded(session)
                }
                _ => {
                    let message = if resp.message.is_empty() {
                        "Registration failed".to_string()
                    } else {
                        resp.message
                    };
                    AuthAction::LoginFailed(message)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                AuthAction::LoginFailed(e.user_message())
            }
        }
    }

    /// 登出：先清除本地会话，再尽力通知服务端。
    ///
    /// 2 秒内的重复调用被抑制，返回 `LogoutSuppressed`。
    pub async fn logout(&self) -> AuthAction {
        if let Err(retry_in) = self.logout_gate.try_acquire(self.clock.now()) {
            tracing::debug!(?retry_in, "logout suppressed");
            return AuthAction::LogoutSuppressed { retry_in };
        }

        let refresh_token = self.tokens.refresh_token();
        let access_token = self.tokens.auth_token();
        self.tokens.clear(None);
        tracing::info!("logged out");

        if let Some(refresh_token) = refresh_token {
            let result = self
                .service
                .logout(&refresh_token, access_token.as_deref())
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "server-side logout failed");
            }
        }
        AuthAction::LoggedOut
    }

    /// 后端返回 401 时调用
    pub fn expire(&self) -> AuthAction {
        tracing::info!("session rejected by backend");
        self.tokens.clear(None);
        AuthAction::SessionExpired
    }

    pub fn remember_redirect(&self, path: &str) {
        self.tokens.remember_redirect(path);
    }

    pub fn take_redirect(&self) -> Option<String> {
        self.tokens.take_redirect()
    }
}

#[cfg(test)]
mod tests;
