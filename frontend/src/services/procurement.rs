//! 采购：收货单（GRN）与采购订单（PO），同在资产后端

use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::web::http::HttpTransport;
use crate::web::storage::{KeyValueStorage, TokenStore};
use assetdesk_shared::{Grn, PurchaseOrder};

pub const PATH_GRN: &str = "/grn";
pub const PATH_PO: &str = "/po";

pub struct ProcurementService<S, T> {
    pub grns: Collection<S, T, Grn>,
    pub purchase_orders: Collection<S, T, PurchaseOrder>,
}

impl<S, T> ProcurementService<S, T>
where
    S: KeyValueStorage + Clone,
    T: HttpTransport,
{
    pub fn new(client: ApiClient<T>, tokens: TokenStore<S>) -> Self {
        Self {
            grns: Collection::new(client.clone(), tokens.clone(), PATH_GRN).tenant_scoped(),
            purchase_orders: Collection::new(client, tokens, PATH_PO).tenant_scoped(),
        }
    }

    /// 某张采购订单下的收货单
    pub async fn grns_for_order(&self, po_id: &str) -> ApiResult<Vec<Grn>> {
        self.grns.list_where(&[("poId", po_id)]).await
    }

    pub async fn orders_from_supplier(&self, supplier_id: &str) -> ApiResult<Vec<PurchaseOrder>> {
        self.purchase_orders
            .list_where(&[("supplierId", supplier_id)])
            .await
    }
}
