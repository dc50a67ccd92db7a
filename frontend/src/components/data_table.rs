use crate::list::Column;
use leptos::prelude::*;

/// 数据表格
///
/// 列与行点击都是声明式的，不在渲染后再去操作 DOM。
#[component]
pub fn DataTable<R>(
    #[prop(into)] rows: Signal<Vec<R>>,
    columns: Vec<Column<R>>,
    #[prop(optional)] on_row_click: Option<Callback<R>>,
) -> impl IntoView
where
    R: Clone + Send + Sync + 'static,
{
    let headers = columns.iter().map(|c| view! { <th>{c.header}</th> }).collect_view();
    let clickable = on_row_click.is_some();

    view! {
        <div class="overflow-x-auto">
            <table class="table table-zebra">
                <thead>
                    <tr>{headers}</tr>
                </thead>
                <tbody>
                    {move || {
                        let columns = columns.clone();
                        rows.get()
                            .into_iter()
                            .map(|row| {
                                let cells = columns
                                    .iter()
                                    .map(|c| view! { <td>{c.render(&row)}</td> })
                                    .collect_view();
                                let on_click = move |_| {
                                    if let Some(cb) = on_row_click {
                                        cb.run(row.clone());
                                    }
                                };
                                view! {
                                    <tr class:hover=clickable class:cursor-pointer=clickable on:click=on_click>
                                        {cells}
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}
                </tbody>
            </table>
        </div>
    }
}
