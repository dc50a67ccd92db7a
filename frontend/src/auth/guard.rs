//! 路由守卫
//!
//! 每次路径或认证状态变化时给出渲染、等待或重定向的决定。
//! 仅影响体验，真正的授权在服务端完成。

use crate::auth::state::AuthState;
use crate::web::route::AppRoute;
use crate::web::timer::{Debouncer, Ticket};
use std::time::Duration;

/// 重定向去抖时长
pub const REDIRECT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// 会话仍在恢复中，显示加载状态
    Wait,
    Redirect(AppRoute),
}

pub fn evaluate(route: &AppRoute, has_token: bool, state: &AuthState) -> GuardDecision {
    if route.is_auth_page() {
        if state.is_authenticated() && route.should_redirect_when_authenticated() {
            return GuardDecision::Redirect(AppRoute::auth_success_redirect());
        }
        return GuardDecision::Render;
    }
    if !route.requires_auth() || state.is_authenticated() {
        return GuardDecision::Render;
    }
    if state.loading() && has_token {
        return GuardDecision::Wait;
    }
    GuardDecision::Redirect(AppRoute::auth_failure_redirect())
}

/// 待执行的重定向
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect {
    pub ticket: Ticket,
    pub target: AppRoute,
    /// 被拦截的原路径，登录后返回
    pub from: AppRoute,
}

/// 去抖后的守卫
///
/// `observe` 在每次变化时调用；需要重定向时返回一张票，
/// 定时器到期后用 `confirm` 以当时的状态重新判断，仍成立才真正跳转。
#[derive(Debug, Clone)]
pub struct GuardRunner {
    debouncer: Debouncer,
}

impl Default for GuardRunner {
    fn default() -> Self {
        Self::new(REDIRECT_DEBOUNCE)
    }
}

impl GuardRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// 任何变化都会作废尚未触发的重定向
    pub fn observe(
        &self,
        route: &AppRoute,
        has_token: bool,
        state: &AuthState,
    ) -> (GuardDecision, Option<PendingRedirect>) {
        let decision = evaluate(route, has_token, state);
        match &decision {
            GuardDecision::Redirect(target) => {
                let pending = PendingRedirect {
                    ticket: self.debouncer.schedule(),
                    target: target.clone(),
                    from: route.clone(),
                };
                (decision, Some(pending))
            }
            _ => {
                self.debouncer.cancel();
                (decision, None)
            }
        }
    }

    /// 到期确认：票据仍是最新且决定未变时返回目标路由
    pub fn confirm(
        &self,
        pending: &PendingRedirect,
        route: &AppRoute,
        has_token: bool,
        state: &AuthState,
    ) -> Option<AppRoute> {
        if !self.debouncer.should_fire(pending.ticket) || *route != pending.from {
            return None;
        }
        match evaluate(route, has_token, state) {
            GuardDecision::Redirect(target) if target == pending.target => Some(target),
            _ => None,
        }
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::state::AuthAction;
    use assetdesk_shared::Session;

    fn session() -> Session {
        serde_json::from_value(serde_json::json!({
            "user": {"id": "u1", "name": "Ada"},
            "token": "t",
            "expiresAt": "2030-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn loading() -> AuthState {
        AuthState::default()
    }

    fn signed_out() -> AuthState {
        AuthState::default().with(AuthAction::NoSession)
    }

    fn signed_in() -> AuthState {
        AuthState::default().with(AuthAction::Restored(session()))
    }

    #[test]
    fn never_redirects_while_restoring_with_token() {
        assert_eq!(evaluate(&AppRoute::Assets, true, &loading()), GuardDecision::Wait);
        assert_eq!(
            evaluate(&AppRoute::Assets, false, &loading()),
            GuardDecision::Redirect(AppRoute::Login)
        );
    }

    #[test]
    fn protected_routes_require_session() {
        assert_eq!(
            evaluate(&AppRoute::Grn, false, &signed_out()),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(evaluate(&AppRoute::Grn, true, &signed_in()), GuardDecision::Render);
        assert_eq!(evaluate(&AppRoute::NotFound, false, &signed_out()), GuardDecision::Render);
    }

    #[test]
    fn auth_pages_are_never_gated() {
        let reset = AppRoute::ResetPassword("abc".into());
        assert_eq!(evaluate(&reset, false, &loading()), GuardDecision::Render);
        assert_eq!(evaluate(&reset, true, &signed_in()), GuardDecision::Render);
        assert_eq!(
            evaluate(&AppRoute::Login, true, &signed_in()),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(evaluate(&AppRoute::Login, false, &signed_out()), GuardDecision::Render);
    }

    #[test]
    fn only_the_last_redirect_fires() {
        let runner = GuardRunner::default();
        let state = signed_out();

        let (_, first) = runner.observe(&AppRoute::Assets, false, &state);
        let (_, second) = runner.observe(&AppRoute::Suppliers, false, &state);
        let first = first.unwrap();
        let second = second.unwrap();

        assert_eq!(runner.confirm(&first, &AppRoute::Suppliers, false, &state), None);
        assert_eq!(
            runner.confirm(&second, &AppRoute::Suppliers, false, &state),
            Some(AppRoute::Login)
        );
        assert_eq!(second.from, AppRoute::Suppliers);
    }

    #[test]
    fn pending_redirect_dropped_when_session_arrives() {
        let runner = GuardRunner::default();
        let (decision, pending) = runner.observe(&AppRoute::Assets, false, &loading());
        assert_eq!(decision, GuardDecision::Redirect(AppRoute::Login));
        let pending = pending.unwrap();

        // 定时器到期前状态已恢复
        assert_eq!(runner.confirm(&pending, &AppRoute::Assets, true, &signed_in()), None);

        // Render 决定作废挂起的票
        let (_, again) = runner.observe(&AppRoute::Assets, false, &signed_out());
        let again = again.unwrap();
        let (decision, none) = runner.observe(&AppRoute::Assets, true, &signed_in());
        assert_eq!(decision, GuardDecision::Render);
        assert!(none.is_none());
        assert_eq!(runner.confirm(&again, &AppRoute::Assets, false, &signed_out()), None);
    }

    #[test]
    fn navigating_away_cancels_redirect() {
        let runner = GuardRunner::default();
        let (_, pending) = runner.observe(&AppRoute::Warranty, false, &signed_out());
        let pending = pending.unwrap();
        assert_eq!(
            runner.confirm(&pending, &AppRoute::Login, false, &signed_out()),
            None
        );
        assert_eq!(runner.delay(), REDIRECT_DEBOUNCE);
    }
}
