//! 租户范围的资源列表页
//!
//! 输入即时在已加载的行上过滤，300ms 去抖后再向服务端搜索，
//! 服务端结果到达后按原样显示；被更新请求取代的旧响应直接丢弃。

use crate::app::{AppServices, use_services};
use crate::auth::use_auth;
use crate::components::data_table::DataTable;
use crate::components::{ErrorAlert, Spinner};
use crate::error::ApiError;
use crate::list::{Column, SEARCH_DEBOUNCE, Searchable, ViewStatus, visible_records};
use crate::services::Collection;
use crate::web::http::FetchTransport;
use crate::web::storage::BrowserStorage;
use crate::web::timer::{BrowserSleeper, Debouncer, LatestOnly, Sleeper};
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 从服务集合中选出某个资源
pub type SelectCollection<E> =
    for<'a> fn(&'a AppServices) -> &'a Collection<BrowserStorage, FetchTransport, E>;

#[component]
pub fn ResourceList<E>(
    title: &'static str,
    select: SelectCollection<E>,
    columns: Vec<Column<E>>,
) -> impl IntoView
where
    E: Searchable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    let auth = use_auth();
    let services = use_services();

    let rows = RwSignal::new(Vec::<E>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<ApiError>);
    let query = RwSignal::new(String::new());
    // 当前 `rows` 请求时使用的查询
    let fetched_for = RwSignal::new(String::new());
    let selected = RwSignal::new(None::<E>);

    let latest = StoredValue::new(LatestOnly::new());
    let debouncer = StoredValue::new(Debouncer::new(SEARCH_DEBOUNCE));

    let fetch = move |search: String| {
        let ticket = latest.with_value(|l| l.begin());
        let collection = select(&services.get_value()).clone();
        loading.set(true);
        spawn_local(async move {
            let result = collection.search(&search).await;
            if !latest.with_value(|l| l.is_current(ticket)) {
                tracing::debug!(path = collection.path(), "dropping superseded response");
                return;
            }
            match result {
                Ok(data) => {
                    rows.set(data);
                    fetched_for.set(search);
                    error.set(None);
                }
                Err(e) => {
                    tracing::warn!(path = collection.path(), error = %e, "list request failed");
                    if e.is_session_expired() {
                        auth.expire();
                    }
                    error.set(Some(e));
                }
            }
            loading.set(false);
        });
    };

    fetch(String::new());

    let on_search = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        query.set(value.clone());
        let ticket = debouncer.with_value(|d| d.schedule());
        spawn_local(async move {
            BrowserSleeper.sleep(SEARCH_DEBOUNCE).await;
            if debouncer.with_value(|d| d.should_fire(ticket)) {
                fetch(value);
            }
        });
    };

    on_cleanup(move || {
        latest.with_value(|l| l.invalidate());
        debouncer.with_value(|d| d.cancel());
    });

    let visible = Signal::derive(move || {
        let q = query.get();
        let fetched = fetched_for.get();
        rows.with(|all| {
            visible_records(all, &fetched, &q)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    });
    let status = Memo::new(move |_| {
        ViewStatus::resolve(loading.get(), error.get().as_ref(), visible.with(Vec::len))
    });
    let error_message = Signal::derive(move || match status.get() {
        ViewStatus::Error(msg) => Some(msg),
        _ => None,
    });
    let detail_columns = columns.clone();
    let on_row_click = Callback::new(move |row: E| selected.set(Some(row)));

    view! {
        <section class="p-6 space-y-4">
            <div class="flex items-center justify-between gap-4">
                <h1 class="text-2xl font-bold">{title}</h1>
                <input
                    type="search"
                    placeholder="Search..."
                    class="input input-bordered w-full max-w-xs"
                    prop:value=query
                    on:input=on_search
                />
            </div>

            {move || match status.get() {
                ViewStatus::Loading => view! { <Spinner /> }.into_any(),
                ViewStatus::Error(_) => view! { <ErrorAlert message=error_message /> }.into_any(),
                ViewStatus::Empty => view! {
                    <p class="text-center text-base-content/60 py-10">"No records found."</p>
                }
                .into_any(),
                ViewStatus::Populated(_) => view! {
                    <DataTable rows=visible columns=columns.clone() on_row_click=on_row_click />
                }
                .into_any(),
            }}

            {move || selected.get().map(|row| {
                let fields = detail_columns
                    .iter()
                    .map(|c| view! {
                        <dt class="font-semibold">{c.header}</dt>
                        <dd>{c.render(&row)}</dd>
                    })
                    .collect_view();
                view! {
                    <div class="card bg-base-100 shadow">
                        <div class="card-body">
                            <dl class="grid grid-cols-2 gap-2">{fields}</dl>
                            <button class="btn btn-sm" on:click=move |_| selected.set(None)>"Close"</button>
                        </div>
                    </div>
                }
            })}
        </section>
    }
}
