//! 找回密码与重置密码页

use crate::auth::use_auth;
use crate::components::ErrorAlert;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let auth = use_auth();
    let email = RwSignal::new(String::new());
    let sending = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let sent = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        sending.set(true);
        error.set(None);
        let controller = auth.controller();
        let address = email.get_untracked();
        spawn_local(async move {
            match controller.service().forgot_password(&address).await {
                Ok(resp) => {
                    let message = if resp.message.is_empty() {
                        "If the address is registered, a reset link is on its way.".to_string()
                    } else {
                        resp.message
                    };
                    sent.set(Some(message));
                }
                Err(e) => error.set(Some(e.user_message())),
            }
            sending.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="text-2xl font-bold">"Forgot password"</h1>
                    <ErrorAlert message=error />
                    {move || sent.get().map(|msg| view! {
                        <div role="status" class="alert alert-success text-sm py-2"><span>{msg}</span></div>
                    })}
                    <input
                        type="email"
                        placeholder="you@company.com"
                        on:input=move |ev| email.set(event_target_value(&ev))
                        prop:value=email
                        class="input input-bordered"
                        required
                    />
                    <button class="btn btn-primary mt-4" disabled=move || sending.get()>
                        "Send reset link"
                    </button>
                    <Link route=AppRoute::Login class="link text-sm">"Back to sign in"</Link>
                </form>
            </div>
        </div>
    }
}

#[component]
pub fn ResetPasswordPage(token: String) -> impl IntoView {
    let auth = use_auth();
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let sending = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);
    let done = RwSignal::new(false);
    let token = StoredValue::new(token);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        sending.set(true);
        error.set(None);
        let controller = auth.controller();
        let token = token.get_value();
        let (pw, confirm) = (password.get_untracked(), confirm_password.get_untracked());
        spawn_local(async move {
            match controller.service().reset_password(&token, &pw, &confirm).await {
                Ok(_) => done.set(true),
                Err(e) => {
                    tracing::warn!(error = %e, "password reset failed");
                    error.set(Some(e.user_message()));
                }
            }
            sending.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <Show
                    when=move || !done.get()
                    fallback=|| view! {
                        <div class="card-body">
                            <p>"Your password has been reset."</p>
                            <Link route=AppRoute::Login class="btn btn-primary">"Sign in"</Link>
                        </div>
                    }
                >
                    <form class="card-body" on:submit=on_submit>
                        <h1 class="text-2xl font-bold">"Choose a new password"</h1>
                        <ErrorAlert message=error />
                        <input
                            type="password"
                            placeholder="New password"
                            on:input=move |ev| password.set(event_target_value(&ev))
                            prop:value=password
                            class="input input-bordered"
                            required
                        />
                        <input
                            type="password"
                            placeholder="Confirm password"
                            on:input=move |ev| confirm_password.set(event_target_value(&ev))
                            prop:value=confirm_password
                            class="input input-bordered"
                            required
                        />
                        <button class="btn btn-primary mt-4" disabled=move || sending.get()>
                            "Reset password"
                        </button>
                        <Link route=AppRoute::ForgotPassword class="link text-sm">
                            "Request a new link"
                        </Link>
                    </form>
                </Show>
            </div>
        </div>
    }
}
