use super::*;
use crate::auth::state::{AuthPhase, AuthState, LOGOUT_RATE_LIMIT_NOTICE};
use crate::client::ApiClient;
use crate::client::tests::{BASE, MockTransport};
use crate::error::ApiError;
use crate::web::storage::MemoryStorage;
use crate::web::timer::tests::ManualClock;
use assetdesk_shared::protocol::HttpMethod;
use assetdesk_shared::{HEADER_AUTHORIZATION, KEY_AUTH_TOKEN, KEY_CONSUMER_ID, KEY_REFRESH_TOKEN};
use std::rc::Rc;

// =========================================================
// Fixtures
// =========================================================

struct Harness {
    transport: Rc<MockTransport>,
    storage: MemoryStorage,
    clock: ManualClock,
}

impl Harness {
    fn new() -> Self {
        Self {
            transport: MockTransport::new(),
            storage: MemoryStorage::new(),
            clock: ManualClock::new(),
        }
    }

    /// 同一份存储上新建控制器，相当于页面刷新
    fn controller(&self) -> AuthController<MemoryStorage, MockTransport, ManualClock> {
        let tokens = TokenStore::new(self.storage.clone());
        let client = ApiClient::new(BASE, Rc::clone(&self.transport)).with_bearer(tokens.clone());
        AuthController::new(tokens, AuthService::new(client), self.clock.clone())
    }

    fn tokens(&self) -> TokenStore<MemoryStorage> {
        TokenStore::new(self.storage.clone())
    }

    fn login_ok(&self, expires_at: &str) {
        self.transport.json(
            HttpMethod::Post,
            "/auth/login",
            200,
            serde_json::json!({
                "user": {"id": 42, "name": "Ada", "role": "admin"},
                "token": "access-1",
                "refreshToken": "refresh-1",
                "expiresAt": expires_at,
                "consumerId": "tenant-7"
            }),
        );
    }

    fn logout_calls(&self) -> usize {
        self.transport
            .paths()
            .iter()
            .filter(|p| p.ends_with("/auth/logout"))
            .count()
    }
}

fn creds() -> LoginRequest {
    LoginRequest {
        user_id: "ada".into(),
        password: "Secret123".into(),
    }
}

// =========================================================
// Tests
// =========================================================

#[tokio::test]
async fn login_persists_and_survives_reload() {
    let h = Harness::new();
    h.login_ok("2026-10-02T09:00:00Z");

    let ctl = h.controller();
    assert_eq!(ctl.bootstrap(), AuthAction::NoSession);

    let action = ctl.login(creds()).await;
    let state = AuthState::default().with(AuthAction::NoSession).with(action);
    assert!(state.is_authenticated());
    assert_eq!(h.tokens().auth_token().as_deref(), Some("access-1"));
    assert_eq!(h.tokens().consumer_id().as_deref(), Some("tenant-7"));

    // 刷新页面
    let reloaded = h.controller();
    let state = AuthState::default().with(reloaded.bootstrap());
    assert_eq!(state.phase, AuthPhase::Authenticated);
    assert_eq!(state.user().map(|u| u.id.as_str()), Some("42"));
    assert_eq!(h.transport.count(), 1);
}

#[tokio::test]
async fn login_accepts_unix_timestamp_expiry() {
    let h = Harness::new();
    h.transport.json(
        HttpMethod::Post,
        "/auth/login",
        200,
        serde_json::json!({
            "user": {"id": 42, "name": "Ada"},
            "token": "access-1",
            "expiresAt": 1790931600,
            "consumerId": 7
        }),
    );

    let ctl = h.controller();
    let state = AuthState::default().with(ctl.bootstrap()).with(ctl.login(creds()).await);
    assert!(state.is_authenticated());
    assert_eq!(h.tokens().consumer_id().as_deref(), Some("7"));

    // 2026-10-02T09:00:00Z，刷新后仍有效
    let reloaded = AuthState::default().with(h.controller().bootstrap());
    assert_eq!(reloaded.phase, AuthPhase::Authenticated);
}

#[tokio::test]
async fn expired_persisted_session_is_discarded() {
    let h = Harness::new();
    h.login_ok("2026-10-01T10:00:00Z");
    let ctl = h.controller();
    let _ = ctl.login(creds()).await;

    h.clock.advance(2 * 60 * 60 * 1000);
    assert_eq!(h.controller().bootstrap(), AuthAction::NoSession);
    assert!(!h.tokens().has_token());
}

#[tokio::test]
async fn partial_session_is_cleared_on_bootstrap() {
    let h = Harness::new();
    h.tokens().set(KEY_AUTH_TOKEN, "orphan");

    assert_eq!(h.controller().bootstrap(), AuthAction::NoSession);
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn failed_login_leaves_storage_untouched() {
    let h = Harness::new();
    h.transport.json(
        HttpMethod::Post,
        "/auth/login",
        401,
        serde_json::json!({"message": "Invalid credentials"}),
    );

    let action = h.controller().login(creds()).await;
    assert_eq!(action, AuthAction::LoginFailed("Invalid credentials".into()));
    assert!(h.storage.is_empty());
}

#[tokio::test]
async fn logout_clears_even_when_server_call_fails() {
    let h = Harness::new();
    h.login_ok("2026-10-02T09:00:00Z");
    let ctl = h.controller();
    let _ = ctl.login(creds()).await;

    h.transport.reply(
        HttpMethod::Post,
        "/auth/logout",
        Err(ApiError::Transport("offline".into())),
    );

    assert_eq!(ctl.logout().await, AuthAction::LoggedOut);
    for key in [KEY_AUTH_TOKEN, KEY_REFRESH_TOKEN, KEY_CONSUMER_ID] {
        assert_eq!(h.tokens().get(key), None, "{key} should be cleared");
    }

    let body: serde_json::Value = serde_json::from_str(
        h.transport.requests.borrow()[1].body.as_deref().unwrap(),
    )
    .unwrap();
    assert_eq!(body["refreshToken"], "refresh-1");
}

#[tokio::test]
async fn logout_call_carries_the_cleared_access_token() {
    let h = Harness::new();
    h.login_ok("2026-10-02T09:00:00Z");
    let ctl = h.controller();
    let _ = ctl.login(creds()).await;
    h.transport
        .json(HttpMethod::Post, "/auth/logout", 200, serde_json::json!({"success": true}));

    assert_eq!(ctl.logout().await, AuthAction::LoggedOut);
    assert!(!h.tokens().has_token());

    let requests = h.transport.requests.borrow();
    let logout = requests
        .iter()
        .find(|r| r.url.ends_with("/auth/logout"))
        .unwrap();
    assert_eq!(logout.header_value(HEADER_AUTHORIZATION), Some("Bearer access-1"));
}

#[tokio::test]
async fn rapid_logouts_hit_the_server_once() {
    let h = Harness::new();
    h.login_ok("2026-10-02T09:00:00Z");
    let ctl = h.controller();
    let _ = ctl.login(creds()).await;
    h.transport
        .json(HttpMethod::Post, "/auth/logout", 200, serde_json::json!({"success": true}));

    let mut state = AuthState::default().with(ctl.bootstrap());
    let first = ctl.logout().await;
    assert_eq!(first, AuthAction::LoggedOut);
    state.apply(first);

    h.clock.advance(300);
    let second = ctl.logout().await;
    assert_eq!(
        second,
        AuthAction::LogoutSuppressed {
            retry_in: Duration::from_millis(1700)
        }
    );
    state.apply(second);
    assert_eq!(state.notice.as_deref(), Some(LOGOUT_RATE_LIMIT_NOTICE));

    h.clock.advance(300);
    assert!(matches!(
        ctl.logout().await,
        AuthAction::LogoutSuppressed { .. }
    ));
    assert_eq!(h.logout_calls(), 1);

    // 窗口过后再次允许，但已无刷新令牌，不再访问服务端
    h.clock.advance(2000);
    assert_eq!(ctl.logout().await, AuthAction::LoggedOut);
    assert_eq!(h.logout_calls(), 1);
}

#[tokio::test]
async fn register_with_tokens_starts_a_day_long_session() {
    let h = Harness::new();
    h.transport.json(
        HttpMethod::Post,
        "/auth/register",
        201,
        serde_json::json!({
            "success": true,
            "message": "Welcome",
            "data": {"token": "t", "refreshToken": "r", "user": {"id": "u9", "name": "Bo"}}
        }),
    );

    let ctl = h.controller();
    let action = ctl
        .register(RegisterRequest {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            password: "Secret123".into(),
            confirm_password: "Secret123".into(),
            company: "Acme".into(),
        })
        .await;

    let session = match action {
        AuthAction::LoginSucceeded(session) => session,
        other => panic!("expected session, got {other:?}"),
    };
    assert_eq!(
        session.expires_at - h.clock.now(),
        assetdesk_shared::chrono::Duration::hours(24)
    );
    assert!(h.tokens().has_token());
}

#[tokio::test]
async fn register_without_tokens_reports_message() {
    let h = Harness::new();
    h.transport.json(
        HttpMethod::Post,
        "/auth/register",
        200,
        serde_json::json!({"success": false, "message": "Company already registered"}),
    );

    let action = h
        .controller()
        .register(RegisterRequest {
            name: "Bo".into(),
            email: "bo@example.com".into(),
            password: "Secret123".into(),
            confirm_password: "Secret123".into(),
            company: "Acme".into(),
        })
        .await;
    assert_eq!(action, AuthAction::LoginFailed("Company already registered".into()));
    assert!(!h.tokens().has_token());
}

#[test]
fn expire_clears_tokens_but_keeps_redirect() {
    let h = Harness::new();
    let ctl = h.controller();
    h.tokens().set(KEY_AUTH_TOKEN, "t");
    ctl.remember_redirect("/assets");

    assert_eq!(ctl.expire(), AuthAction::SessionExpired);
    assert!(!ctl.has_token());
    assert_eq!(ctl.take_redirect().as_deref(), Some("/assets"));
    assert_eq!(ctl.take_redirect(), None);
}
