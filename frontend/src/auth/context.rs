//! Leptos 认证上下文
//!
//! 在应用根部显式创建并 `provide_context`，组件通过 `use_auth` 取得。
//! 组件只派发动作，不直接读写存储。

use crate::auth::controller::AuthController;
use crate::auth::state::{AuthAction, AuthState};
use crate::web::http::FetchTransport;
use crate::web::storage::BrowserStorage;
use crate::web::timer::SystemClock;
use assetdesk_shared::{LoginRequest, RegisterRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

pub type BrowserAuth = AuthController<BrowserStorage, FetchTransport, SystemClock>;

/// 认证上下文
///
/// 状态放在信号中驱动界面；控制器不是 `Send`，存放在本地存储区。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    controller: StoredValue<Rc<BrowserAuth>, LocalStorage>,
}

impl AuthContext {
    pub fn new(controller: BrowserAuth) -> Self {
        Self {
            state: RwSignal::new(AuthState::default()),
            controller: StoredValue::new_local(Rc::new(controller)),
        }
    }

    pub fn controller(&self) -> Rc<BrowserAuth> {
        self.controller.get_value()
    }

    pub fn dispatch(&self, action: AuthAction) {
        self.state.update(|state| state.apply(action));
    }

    /// 启动时恢复持久化会话
    pub fn bootstrap(&self) {
        let action = self.controller().bootstrap();
        self.dispatch(action);
    }

    pub fn has_token(&self) -> bool {
        self.controller().has_token()
    }

    pub fn login(&self, credentials: LoginRequest) {
        let ctx = *self;
        ctx.dispatch(AuthAction::LoginStarted);
        spawn_local(async move {
            let action = ctx.controller().login(credentials).await;
            ctx.dispatch(action);
        });
    }

    pub fn register(&self, req: RegisterRequest) {
        let ctx = *self;
        ctx.dispatch(AuthAction::LoginStarted);
        spawn_local(async move {
            let action = ctx.controller().register(req).await;
            ctx.dispatch(action);
        });
    }

    pub fn logout(&self) {
        let ctx = *self;
        spawn_local(async move {
            let action = ctx.controller().logout().await;
            ctx.dispatch(action);
        });
    }

    /// 任何后端返回 401 时调用
    pub fn expire(&self) {
        let action = self.controller().expire();
        self.dispatch(action);
    }

    pub fn remember_redirect(&self, path: &str) {
        self.controller().remember_redirect(path);
    }

    pub fn take_redirect(&self) -> Option<String> {
        self.controller().take_redirect()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
