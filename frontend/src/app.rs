//! 应用根组件：组装配置、客户端、认证上下文与路由

use crate::auth::controller::AuthController;
use crate::auth::service::AuthService;
use crate::auth::{AuthContext, use_auth};
use crate::client::ApiClients;
use crate::components::auth_guard::AuthGuard;
use crate::components::login::{LoginPage, RegisterPage};
use crate::components::password::{ForgotPasswordPage, ResetPasswordPage};
use crate::components::resource_list::ResourceList;
use crate::components::NoticeToast;
use crate::config::AppConfig;
use crate::list::{Column, or_dash};
use crate::services::{Collection, Services};
use crate::web::http::FetchTransport;
use crate::web::route::AppRoute;
use crate::web::router::{Link, Router, RouterOutlet};
use crate::web::storage::{BrowserStorage, TokenStore};
use crate::web::timer::SystemClock;
use assetdesk_shared::{
    Asset, Department, Grn, InventoryItem, PurchaseOrder, ServiceRequest, Supplier, Warranty,
};
use leptos::prelude::*;
use std::rc::Rc;

pub type AppServices = Services<BrowserStorage, FetchTransport>;

/// 领域服务上下文
#[derive(Clone, Copy)]
struct ServicesContext(StoredValue<Rc<AppServices>, LocalStorage>);

pub fn use_services() -> StoredValue<Rc<AppServices>, LocalStorage> {
    expect_context::<ServicesContext>().0
}

/// 受保护页面的导航
const NAV: [AppRoute; 9] = [
    AppRoute::Dashboard,
    AppRoute::Assets,
    AppRoute::Departments,
    AppRoute::Suppliers,
    AppRoute::Inventory,
    AppRoute::Grn,
    AppRoute::PurchaseOrders,
    AppRoute::ServiceRequests,
    AppRoute::Warranty,
];

/// 资源选择函数
mod select {
    use super::*;

    pub fn assets(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, Asset> {
        &s.assets.assets
    }

    pub fn departments(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, Department> {
        &s.assets.departments
    }

    pub fn suppliers(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, Supplier> {
        &s.assets.suppliers
    }

    pub fn inventory(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, InventoryItem> {
        &s.assets.inventory
    }

    pub fn grns(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, Grn> {
        &s.procurement.grns
    }

    pub fn purchase_orders(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, PurchaseOrder> {
        &s.procurement.purchase_orders
    }

    pub fn service_requests(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, ServiceRequest> {
        &s.warranty.service_requests
    }

    pub fn warranties(s: &AppServices) -> &Collection<BrowserStorage, FetchTransport, Warranty> {
        &s.warranty.warranties
    }
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::ResetPassword(token) => view! { <ResetPasswordPage token=token /> }.into_any(),
        AppRoute::Dashboard => view! { <Shell><DashboardPage /></Shell> }.into_any(),
        AppRoute::Assets => view! {
            <Shell>
                <ResourceList
                    title="Assets"
                    select=select::assets
                    columns=vec![
                        Column::new("Name", |a: &Asset| a.name.clone()),
                        Column::new("Code", |a: &Asset| or_dash(&a.asset_code)),
                        Column::new("Category", |a: &Asset| or_dash(&a.category)),
                        Column::new("Serial", |a: &Asset| or_dash(&a.serial_number)),
                        Column::new("Status", |a: &Asset| or_dash(&a.status)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::Departments => view! {
            <Shell>
                <ResourceList
                    title="Departments"
                    select=select::departments
                    columns=vec![
                        Column::new("Name", |d: &Department| d.name.clone()),
                        Column::new("Code", |d: &Department| or_dash(&d.code)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::Suppliers => view! {
            <Shell>
                <ResourceList
                    title="Suppliers"
                    select=select::suppliers
                    columns=vec![
                        Column::new("Name", |x: &Supplier| x.name.clone()),
                        Column::new("Contact", |x: &Supplier| or_dash(&x.contact_person)),
                        Column::new("Email", |x: &Supplier| or_dash(&x.email)),
                        Column::new("Phone", |x: &Supplier| or_dash(&x.phone)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::Inventory => view! {
            <Shell>
                <ResourceList
                    title="Inventory"
                    select=select::inventory
                    columns=vec![
                        Column::new("Item", |i: &InventoryItem| i.name.clone()),
                        Column::new("SKU", |i: &InventoryItem| or_dash(&i.sku)),
                        Column::new("Quantity", |i: &InventoryItem| i.quantity.to_string()),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::Grn => view! {
            <Shell>
                <ResourceList
                    title="Goods Received"
                    select=select::grns
                    columns=vec![
                        Column::new("GRN", |g: &Grn| g.grn_number.clone()),
                        Column::new("PO", |g: &Grn| or_dash(&g.po_id)),
                        Column::new("Received", |g: &Grn| or_dash(&g.received_date)),
                        Column::new("Status", |g: &Grn| or_dash(&g.status)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::PurchaseOrders => view! {
            <Shell>
                <ResourceList
                    title="Purchase Orders"
                    select=select::purchase_orders
                    columns=vec![
                        Column::new("PO", |p: &PurchaseOrder| p.po_number.clone()),
                        Column::new("Status", |p: &PurchaseOrder| or_dash(&p.status)),
                        Column::new("Total", |p: &PurchaseOrder| format!("{:.2}", p.total())),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::ServiceRequests => view! {
            <Shell>
                <ResourceList
                    title="Service Requests"
                    select=select::service_requests
                    columns=vec![
                        Column::new("Title", |r: &ServiceRequest| r.title.clone()),
                        Column::new("Priority", |r: &ServiceRequest| or_dash(&r.priority)),
                        Column::new("Status", |r: &ServiceRequest| or_dash(&r.status)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::Warranty => view! {
            <Shell>
                <ResourceList
                    title="Warranty"
                    select=select::warranties
                    columns=vec![
                        Column::new("Asset", |w: &Warranty| or_dash(&w.asset_id)),
                        Column::new("Provider", |w: &Warranty| or_dash(&w.provider)),
                        Column::new("Ends", |w: &Warranty| or_dash(&w.end_date)),
                    ]
                />
            </Shell>
        }
        .into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

/// 已登录页面的外框：侧边导航与用户菜单
#[component]
fn Shell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let user_name = move || {
        auth.state
            .get()
            .user()
            .map(|u| u.name.clone())
            .unwrap_or_default()
    };

    view! {
        <div class="drawer lg:drawer-open">
            <div class="drawer-content">
                <div class="navbar bg-base-100 shadow-sm">
                    <div class="flex-1 font-bold">"AssetDesk"</div>
                    <span class="mr-4">{user_name}</span>
                    <button class="btn btn-ghost btn-sm" on:click=move |_| auth.logout()>
                        "Log out"
                    </button>
                </div>
                {children()}
            </div>
            <aside class="drawer-side">
                <ul class="menu bg-base-200 w-56 min-h-full">
                    {NAV
                        .iter()
                        .map(|route| {
                            let title = route.title();
                            view! {
                                <li>
                                    <Link route=route.clone()>{title}</Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </aside>
        </div>
    }
}

#[component]
fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let greeting = move || {
        auth.state
            .get()
            .user()
            .map(|u| format!("Welcome back, {}", u.name))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <section class="p-6">
            <h1 class="text-2xl font-bold">{greeting}</h1>
            <div class="grid grid-cols-2 md:grid-cols-4 gap-4 mt-6">
                {NAV[1..]
                    .iter()
                    .map(|route| {
                        let title = route.title();
                        view! {
                            <Link route=route.clone() class="card bg-base-100 shadow p-4 hover:shadow-lg">
                                {title}
                            </Link>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_build_env();
    crate::logging::init(&config);
    tracing::info!(
        auth = %config.auth_api_url,
        asset = %config.asset_api_url,
        warranty = %config.warranty_api_url,
        production = config.production,
        "starting"
    );

    // 1. 组装客户端与服务
    let tokens = TokenStore::new(BrowserStorage);
    let clients = ApiClients::new(&config, Rc::new(FetchTransport), tokens.clone());
    let services = Services::new(&clients, tokens.clone());
    provide_context(ServicesContext(StoredValue::new_local(Rc::new(services))));

    // 2. 创建认证上下文并恢复会话
    let controller = AuthController::new(tokens, AuthService::new(clients.auth), SystemClock);
    let auth_ctx = AuthContext::new(controller);
    provide_context(auth_ctx);
    auth_ctx.bootstrap();

    view! {
        <Router>
            <NoticeToast />
            <AuthGuard>
                <RouterOutlet matcher=route_matcher />
            </AuthGuard>
        </Router>
    }
}
