//! 列表视图的纯逻辑：客户端搜索与显示状态

use crate::error::ApiError;
use assetdesk_shared::{
    Asset, Department, Grn, Installation, InventoryItem, Location, PurchaseOrder, ServiceRequest,
    Supplier, Warranty,
};
use std::time::Duration;

/// 输入搜索的去抖时长
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// 可在客户端按关键字过滤的记录
pub trait Searchable {
    /// 参与搜索的字段
    fn haystack(&self) -> Vec<&str>;

    /// 大小写不敏感的子串匹配；空查询匹配所有记录
    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self
                .haystack()
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
    }
}

pub fn filter_records<'a, R: Searchable>(rows: &'a [R], query: &str) -> Vec<&'a R> {
    rows.iter().filter(|row| row.matches(query)).collect()
}

/// 当前应显示的行
///
/// `fetched_for` 是这批行请求时使用的查询。服务端已按当前查询筛过的行原样显示，
/// 只有去抖期间（查询已变、结果未到）才在已加载的行上即时过滤。
pub fn visible_records<'a, R: Searchable>(
    rows: &'a [R],
    fetched_for: &str,
    query: &str,
) -> Vec<&'a R> {
    if fetched_for.trim() == query.trim() {
        rows.iter().collect()
    } else {
        filter_records(rows, query)
    }
}

fn fields<'a>(required: &[&'a str], optional: &[&'a Option<String>]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .chain(optional.iter().copied().filter_map(Option::as_deref))
        .collect()
}

impl Searchable for Department {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.name.as_str()], &[&self.code])
    }
}

impl Searchable for Asset {
    fn haystack(&self) -> Vec<&str> {
        fields(
            &[self.name.as_str()],
            &[&self.asset_code, &self.category, &self.serial_number, &self.status],
        )
    }
}

impl Searchable for Supplier {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.name.as_str()], &[&self.contact_person, &self.email, &self.phone])
    }
}

impl Searchable for Location {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.name.as_str()], &[&self.address])
    }
}

impl Searchable for Installation {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.asset_id.as_str()], &[&self.location_id])
    }
}

impl Searchable for InventoryItem {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.name.as_str()], &[&self.sku])
    }
}

impl Searchable for Grn {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.grn_number.as_str()], &[&self.po_id, &self.status])
    }
}

impl Searchable for PurchaseOrder {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.po_number.as_str()], &[&self.supplier_id, &self.status])
    }
}

impl Searchable for ServiceRequest {
    fn haystack(&self) -> Vec<&str> {
        fields(&[self.title.as_str()], &[&self.description, &self.priority, &self.status])
    }
}

impl Searchable for Warranty {
    fn haystack(&self) -> Vec<&str> {
        fields(&[], &[&self.provider, &self.asset_id, &self.status])
    }
}

// =========================================================
// 视图状态
// =========================================================

/// 列表页显示什么，优先级：加载中 → 错误 → 空 → 数据
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    Loading,
    Error(String),
    Empty,
    Populated(usize),
}

impl ViewStatus {
    pub fn resolve(loading: bool, error: Option<&ApiError>, rows: usize) -> Self {
        if loading {
            ViewStatus::Loading
        } else if let Some(e) = error {
            ViewStatus::Error(e.user_message())
        } else if rows == 0 {
            ViewStatus::Empty
        } else {
            ViewStatus::Populated(rows)
        }
    }
}

// =========================================================
// 表格列
// =========================================================

/// 表格列：表头与单元格渲染函数
pub struct Column<R> {
    pub header: &'static str,
    pub cell: fn(&R) -> String,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Column<R> {}

impl<R> Column<R> {
    pub const fn new(header: &'static str, cell: fn(&R) -> String) -> Self {
        Self { header, cell }
    }

    pub fn render(&self, row: &R) -> String {
        (self.cell)(row)
    }
}

/// 可选字段的单元格文本
pub fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}
