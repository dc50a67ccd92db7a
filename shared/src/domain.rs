//! 领域视图模型
//!
//! 各后端资源的 DTO。客户端不做引用完整性校验，每次导航重新获取。
//! 未知字段保存在 `extra` 中，视图不会丢失数据。
//! `id` 为空时不序列化，便于直接用同一结构体提交创建请求。

use crate::{option_string_or_number, string_or_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Extra = Map<String, Value>;

fn is_blank(s: &str) -> bool {
    s.is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub asset_id: String,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// GRN / PO 的明细行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Goods received note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grn {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(default)]
    pub grn_number: String,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub po_id: Option<String>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(default)]
    pub po_number: String,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PurchaseOrder {
    /// 明细合计；后端给出 `totalAmount` 时以后端为准
    pub fn total(&self) -> f64 {
        self.total_amount.unwrap_or_else(|| {
            self.items
                .iter()
                .map(|item| item.quantity * item.unit_price.unwrap_or(0.0))
                .sum()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "is_blank")]
    pub id: String,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_survive_in_extra() {
        let asset: Asset = serde_json::from_str(
            r#"{"id": 7, "name": "Laptop", "assetCode": "AS-7", "warrantyMonths": 24}"#,
        )
        .unwrap();
        assert_eq!(asset.id, "7");
        assert_eq!(asset.asset_code.as_deref(), Some("AS-7"));
        assert_eq!(asset.extra["warrantyMonths"], 24);

        let back = serde_json::to_value(&asset).unwrap();
        assert_eq!(back["warrantyMonths"], 24);
    }

    #[test]
    fn numeric_foreign_keys_decode_as_strings() {
        let asset: Asset = serde_json::from_str(
            r#"{"id": 3, "name": "Laptop", "departmentId": 12, "locationId": "L-1", "supplierId": null}"#,
        )
        .unwrap();
        assert_eq!(asset.department_id.as_deref(), Some("12"));
        assert_eq!(asset.location_id.as_deref(), Some("L-1"));
        assert_eq!(asset.supplier_id, None);

        let install: Installation =
            serde_json::from_str(r#"{"id": 1, "assetId": 3, "locationId": 8}"#).unwrap();
        assert_eq!(install.asset_id, "3");
        assert_eq!(install.location_id.as_deref(), Some("8"));

        let grn: Grn = serde_json::from_str(r#"{"id": "g1", "poId": 40, "supplierId": 5}"#).unwrap();
        assert_eq!(grn.po_id.as_deref(), Some("40"));
        assert_eq!(grn.supplier_id.as_deref(), Some("5"));
    }

    #[test]
    fn new_records_omit_blank_id() {
        let dept = Department {
            name: "Finance".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&dept).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn purchase_order_total_falls_back_to_line_items() {
        let po: PurchaseOrder = serde_json::from_str(
            r#"{"id": "po-1", "items": [
                {"itemName": "Mouse", "quantity": 2, "unitPrice": 10.5},
                {"itemName": "Cable", "quantity": 3}
            ]}"#,
        )
        .unwrap();
        assert_eq!(po.total(), 21.0);
    }
}
