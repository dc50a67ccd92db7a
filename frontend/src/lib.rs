//! AssetDesk 前端
//!
//! 会话、路由守卫与 HTTP 层是纯逻辑，在本机即可测试：
//! - `web::route`: 路由定义（领域模型）
//! - `web::storage` / `web::http` / `web::timer`: 浏览器能力的抽象与实现
//! - `client`: 按后端划分的 API 客户端
//! - `auth`: 会话状态机、认证服务与守卫
//! - `services` / `list`: 领域数据服务与列表视图逻辑
//!
//! 浏览器中（wasm32）再由 `components` 与 `app` 接到 Leptos 上。

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod list;
pub mod logging;
pub mod services;

pub mod web {
    pub mod http;
    pub mod route;
    #[cfg(target_arch = "wasm32")]
    pub mod router;
    pub mod storage;
    pub mod timer;
}

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
mod components {
    pub mod auth_guard;
    pub mod data_table;
    mod feedback;
    pub mod login;
    pub mod password;
    pub mod resource_list;

    pub use feedback::{ErrorAlert, NoticeToast, Spinner};
}

#[cfg(target_arch = "wasm32")]
pub use app::App;
