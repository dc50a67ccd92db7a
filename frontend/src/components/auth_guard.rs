//! 受保护视图的包装组件
//!
//! 路由或认证状态每次变化都重新判断；重定向去抖 500ms，
//! 到期时以当时的状态再确认一次。

use crate::auth::guard::{GuardDecision, GuardRunner};
use crate::auth::use_auth;
use crate::components::Spinner;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crate::web::timer::{BrowserSleeper, Sleeper};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AuthGuard(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let runner = StoredValue::new(GuardRunner::default());
    let (decision, set_decision) = signal(GuardDecision::Wait);

    Effect::new(move |_| {
        let route = router.current_route().get();
        let state = auth.state.get();
        let (next, pending) = runner.with_value(|r| r.observe(&route, auth.has_token(), &state));

        if decision.get_untracked() != next {
            set_decision.set(next);
        }

        let Some(pending) = pending else {
            return;
        };
        spawn_local(async move {
            BrowserSleeper.sleep(runner.with_value(|r| r.delay())).await;

            let route = router.current_route().get_untracked();
            let state = auth.state.get_untracked();
            let confirmed =
                runner.with_value(|r| r.confirm(&pending, &route, auth.has_token(), &state));
            let Some(target) = confirmed else {
                return;
            };

            if target == AppRoute::auth_failure_redirect() {
                tracing::info!(from = %pending.from, "not signed in, redirecting to login");
                auth.remember_redirect(&pending.from.to_path());
                router.redirect(&target.to_path());
            } else {
                let back = auth.take_redirect().unwrap_or_else(|| target.to_path());
                router.redirect(&back);
            }
        });
    });

    move || match decision.get() {
        GuardDecision::Render => children().into_any(),
        GuardDecision::Wait | GuardDecision::Redirect(_) => view! { <Spinner /> }.into_any(),
    }
}
