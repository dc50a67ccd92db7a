//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    ForgotPassword,
    /// 重置密码，携带邮件链接中的令牌
    ResetPassword(String),
    /// 控制面板 (需要认证)
    Dashboard,
    Assets,
    Departments,
    Suppliers,
    Inventory,
    Grn,
    PurchaseOrders,
    ServiceRequests,
    Warranty,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        if let Some(token) = path.strip_prefix("/reset-password/") {
            return Self::ResetPassword(token.to_string());
        }

        match path {
            "/" | "/login" => Self::Login,
            "/register" => Self::Register,
            "/forgot-password" => Self::ForgotPassword,
            "/reset-password" => Self::ResetPassword(String::new()),
            "/dashboard" => Self::Dashboard,
            "/assets" => Self::Assets,
            "/departments" => Self::Departments,
            "/suppliers" => Self::Suppliers,
            "/inventory" => Self::Inventory,
            "/grn" => Self::Grn,
            "/purchase-orders" => Self::PurchaseOrders,
            "/service-requests" => Self::ServiceRequests,
            "/warranty" => Self::Warranty,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        let path = match self {
            Self::Login => "/",
            Self::Register => "/register",
            Self::ForgotPassword => "/forgot-password",
            Self::ResetPassword(token) if token.is_empty() => "/reset-password",
            Self::ResetPassword(token) => return format!("/reset-password/{}", token),
            Self::Dashboard => "/dashboard",
            Self::Assets => "/assets",
            Self::Departments => "/departments",
            Self::Suppliers => "/suppliers",
            Self::Inventory => "/inventory",
            Self::Grn => "/grn",
            Self::PurchaseOrders => "/purchase-orders",
            Self::ServiceRequests => "/service-requests",
            Self::Warranty => "/warranty",
            Self::NotFound => "/404",
        };
        path.to_string()
    }

    /// 登录、注册、找回/重置密码页，永不拦截
    pub fn is_auth_page(&self) -> bool {
        matches!(
            self,
            Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword(_)
        )
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !self.is_auth_page() && !matches!(self, Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 侧边导航标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::ForgotPassword => "Forgot password",
            Self::ResetPassword(_) => "Reset password",
            Self::Dashboard => "Dashboard",
            Self::Assets => "Assets",
            Self::Departments => "Departments",
            Self::Suppliers => "Suppliers",
            Self::Inventory => "Inventory",
            Self::Grn => "Goods Received",
            Self::PurchaseOrders => "Purchase Orders",
            Self::ServiceRequests => "Service Requests",
            Self::Warranty => "Warranty",
            Self::NotFound => "Not found",
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
