//! 保修后端：服务请求与保修记录

use super::Collection;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::web::http::HttpTransport;
use crate::web::storage::{KeyValueStorage, TokenStore};
use assetdesk_shared::chrono::NaiveDate;
use assetdesk_shared::{ServiceRequest, Warranty};

pub const PATH_SERVICE_REQUEST: &str = "/servicerequest";
pub const PATH_WARRANTY: &str = "/warranty";

pub struct WarrantyService<S, T> {
    pub service_requests: Collection<S, T, ServiceRequest>,
    pub warranties: Collection<S, T, Warranty>,
}

impl<S, T> WarrantyService<S, T>
where
    S: KeyValueStorage + Clone,
    T: HttpTransport,
{
    pub fn new(client: ApiClient<T>, tokens: TokenStore<S>) -> Self {
        Self {
            service_requests: Collection::new(client.clone(), tokens.clone(), PATH_SERVICE_REQUEST),
            warranties: Collection::new(client, tokens, PATH_WARRANTY),
        }
    }

    pub async fn requests_for_asset(&self, asset_id: &str) -> ApiResult<Vec<ServiceRequest>> {
        self.service_requests
            .list_where(&[("assetId", asset_id)])
            .await
    }

    /// 在 `today` 仍有效的保修；结束日期缺失或无法解析时保留
    pub async fn active_warranties(&self, today: NaiveDate) -> ApiResult<Vec<Warranty>> {
        let all = self.warranties.list().await?;
        Ok(all
            .into_iter()
            .filter(|w| is_active(w, today))
            .collect())
    }
}

fn is_active(warranty: &Warranty, today: NaiveDate) -> bool {
    let Some(end) = warranty.end_date.as_deref() else {
        return true;
    };
    // 兼容 "2027-01-31" 与 "2027-01-31T00:00:00Z"
    let date = end.get(..10).unwrap_or(end);
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(end) => end >= today,
        Err(_) => true,
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
    async fn expired_warranties_are_hidden() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/warranty",
            200,
            serde_json::json!([
                {"id": 1, "endDate": "2026-01-31"},
                {"id": 2, "endDate": "2027-01-31T00:00:00Z"},
                {"id": 3},
                {"id": 4, "endDate": "someday"}
            ]),
        );

        // 保修后端不按租户过滤
        let service = WarrantyService::new(
            ApiClient::new(BASE, Rc::clone(&transport)),
            tokens_with_tenant(None),
        );
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let ids: Vec<_> = service
            .active_warranties(today)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, ["2", "3", "4"]);
    }

    #[tokio::test]
    async fn service_request_detail() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/servicerequest/SR-1",
            200,
            serde_json::json!({"id": "SR-1", "title": "Broken screen", "priority": "high"}),
        );

        let service = WarrantyService::new(
            ApiClient::new(BASE, Rc::clone(&transport)),
            tokens_with_tenant(None),
        );
        let sr = service.service_requests.get("SR-1").await.unwrap();
        assert_eq!(sr.title, "Broken screen");
        assert_eq!(sr.priority.as_deref(), Some("high"));
    }
}
