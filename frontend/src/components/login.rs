use crate::auth::state::AuthAction;
use crate::auth::use_auth;
use crate::components::ErrorAlert;
use crate::web::route::AppRoute;
use crate::web::router::Link;
use assetdesk_shared::{LoginRequest, RegisterRequest};
use leptos::prelude::*;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();

    let (user_id, set_user_id) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let submitting = Signal::derive(move || auth.state.get().submitting);
    let error = Signal::derive(move || auth.state.get().error);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        auth.login(LoginRequest {
            user_id: user_id.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        });
    };

    // 离开页面时不保留旧的错误
    on_cleanup(move || auth.dispatch(AuthAction::ClearError));

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"AssetDesk"</h1>
                    <p class="text-base-content/70">"Sign in to manage your assets"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorAlert message=error />

                        <div class="form-control">
                            <label class="label" for="user-id">
                                <span class="label-text">"User ID"</span>
                            </label>
                            <input
                                id="user-id"
                                type="text"
                                autocomplete="username"
                                on:input=move |ev| set_user_id.set(event_target_value(&ev))
                                prop:value=user_id
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                            <label class="label">
                                <Link route=AppRoute::ForgotPassword class="label-text-alt link link-hover">
                                    "Forgot password?"
                                </Link>
                            </label>
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || submitting.get()>
                                {move || if submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center">
                            "No account? "
                            <Link route=AppRoute::Register class="link link-primary">"Create one"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let company = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let submitting = Signal::derive(move || auth.state.get().submitting);
    let error = Signal::derive(move || auth.state.get().error);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        auth.register(RegisterRequest {
            name: name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            confirm_password: confirm_password.get_untracked(),
            company: company.get_untracked(),
        });
    };

    on_cleanup(move || auth.dispatch(AuthAction::ClearError));

    let field = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
            </div>
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h1 class="text-2xl font-bold">"Create account"</h1>
                    <ErrorAlert message=error />
                    {field("name", "Name", "text", name)}
                    {field("email", "Email", "email", email)}
                    {field("company", "Company", "text", company)}
                    {field("password", "Password", "password", password)}
                    {field("confirm-password", "Confirm password", "password", confirm_password)}
                    <button class="btn btn-primary mt-4" disabled=move || submitting.get()>
                        "Register"
                    </button>
                    <p class="text-sm text-center">
                        <Link route=AppRoute::Login class="link">"Back to sign in"</Link>
                    </p>
                </form>
            </div>
        </div>
    }
}
