//! 认证模块
//!
//! 会话状态机、认证服务与路由守卫都是纯逻辑，可脱离浏览器测试；
//! 浏览器中由 `AuthContext` 把它们接到 Leptos 信号上。

pub mod controller;
pub mod guard;
pub mod service;
pub mod state;

#[cfg(target_arch = "wasm32")]
mod context;

#[cfg(target_arch = "wasm32")]
pub use context::*;
