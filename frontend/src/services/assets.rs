//! 资产后端：部门、资产、供应商、位置、安装记录、库存

use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::web::http::HttpTransport;
use crate::web::storage::{KeyValueStorage, TokenStore};
use assetdesk_shared::{Asset, Department, Installation, InventoryItem, Location, Supplier};

pub const PATH_DEPARTMENT: &str = "/department";
pub const PATH_ASSET: &str = "/asset";
pub const PATH_SUPPLIER: &str = "/supplier";
pub const PATH_LOCATION: &str = "/location";
pub const PATH_INSTALLATION: &str = "/installation";
pub const PATH_INVENTORY: &str = "/inventory";

pub struct AssetService<S, T> {
    pub departments: Collection<S, T, Department>,
    pub assets: Collection<S, T, Asset>,
    pub suppliers: Collection<S, T, Supplier>,
    pub locations: Collection<S, T, Location>,
    pub installations: Collection<S, T, Installation>,
    pub inventory: Collection<S, T, InventoryItem>,
}

impl<S, T> AssetService<S, T>
where
    S: KeyValueStorage + Clone,
    T: HttpTransport,
{
    pub fn new(client: ApiClient<T>, tokens: TokenStore<S>) -> Self {
        Self {
            departments: Collection::new(client.clone(), tokens.clone(), PATH_DEPARTMENT)
                .tenant_scoped(),
            assets: Collection::new(client.clone(), tokens.clone(), PATH_ASSET).tenant_scoped(),
            suppliers: Collection::new(client.clone(), tokens.clone(), PATH_SUPPLIER)
                .tenant_scoped(),
            locations: Collection::new(client.clone(), tokens.clone(), PATH_LOCATION)
                .tenant_scoped(),
            installations: Collection::new(client.clone(), tokens.clone(), PATH_INSTALLATION)
                .tenant_scoped(),
            inventory: Collection::new(client, tokens, PATH_INVENTORY).tenant_scoped(),
        }
    }

    pub async fn assets_in_department(&self, department_id: &str) -> ApiResult<Vec<Asset>> {
        self.assets
            .list_where(&[("departmentId", department_id)])
            .await
    }

    pub async fn installations_of(&self, asset_id: &str) -> ApiResult<Vec<Installation>> {
        self.installations.list_where(&[("assetId", asset_id)]).await
    }

    /// 数量不高于阈值的库存项，客户端过滤
    pub async fn low_stock(&self, threshold: i64) -> ApiResult<Vec<InventoryItem>> {
        let items = self.inventory.list().await?;
        Ok(items
            .into_iter()
            .filter(|item| item.quantity <= threshold)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{BASE, MockTransport};
    use crate::services::tests::tokens_with_tenant;
    use assetdesk_shared::protocol::HttpMethod;
    use std::rc::Rc;

    #[tokio::test]
    async fn department_filter_keeps_tenant_first() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/asset?consumerId=acme&departmentId=12",
            200,
            serde_json::json!([{"id": 3, "name": "Laptop", "departmentId": "12"}]),
        );

        let service = AssetService::new(
            ApiClient::new(BASE, Rc::clone(&transport)),
            tokens_with_tenant(Some("acme")),
        );
        let rows = service.assets_in_department("12").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department_id.as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn low_stock_filters_locally() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/inventory?consumerId=acme",
            200,
            serde_json::json!([
                {"id": 1, "name": "Toner", "quantity": 2},
                {"id": 2, "name": "Paper", "quantity": 40}
            ]),
        );

        let service = AssetService::new(
            ApiClient::new(BASE, Rc::clone(&transport)),
            tokens_with_tenant(Some("acme")),
        );
        let low = service.low_stock(5).await.unwrap();
        assert_eq!(low.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), ["Toner"]);
    }
}
