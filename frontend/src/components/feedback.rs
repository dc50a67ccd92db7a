use crate::auth::state::AuthAction;
use crate::auth::use_auth;
use leptos::prelude::*;

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-[40vh]">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 行内错误提示
#[component]
pub fn ErrorAlert(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message.get().map(|msg| {
            view! {
                <div role="alert" class="alert alert-error text-sm py-2">
                    <span>{msg}</span>
                </div>
            }
        })
    }
}

/// 会话提示（如登出限流），点击关闭
#[component]
pub fn NoticeToast() -> impl IntoView {
    let auth = use_auth();
    let notice = move || auth.state.get().notice;

    move || {
        notice().map(|msg| {
            view! {
                <div class="toast toast-top toast-end">
                    <div class="alert alert-warning">
                        <span>{msg}</span>
                        <button
                            class="btn btn-ghost btn-xs"
                            on:click=move |_| auth.dispatch(AuthAction::DismissNotice)
                        >
                            "✕"
                        </button>
                    </div>
                </div>
            }
        })
    }
}
