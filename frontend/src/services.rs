//! 领域数据服务
//!
//! 每个后端资源族一个服务，全部是无状态的类型化调用。
//! 错误原样交给视图处理，本层不捕获。
//! 租户范围的列表调用需要 `consumer_id`，缺失时返回 `ApiError::MissingTenant`。

pub mod assets;
pub mod procurement;
pub mod warranty;

pub use assets::AssetService;
pub use procurement::ProcurementService;
pub use warranty::WarrantyService;

use crate::client::{ApiClient, ApiClients};
use crate::error::{ApiError, ApiResult};
use crate::web::http::HttpTransport;
use crate::web::storage::{KeyValueStorage, TokenStore};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

pub const QUERY_CONSUMER_ID: &str = "consumerId";
pub const QUERY_SEARCH: &str = "search";

/// 列表响应：裸数组或 `{ "data": [...] }` 包装
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListPayload<E> {
    Bare(Vec<E>),
    Wrapped { data: Vec<E> },
}

impl<E> ListPayload<E> {
    fn into_vec(self) -> Vec<E> {
        match self {
            ListPayload::Bare(rows) | ListPayload::Wrapped { data: rows } => rows,
        }
    }
}

/// 单条记录响应，同样兼容 `data` 包装
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemPayload<E> {
    Wrapped { data: E },
    Bare(E),
}

impl<E> ItemPayload<E> {
    fn into_inner(self) -> E {
        match self {
            ItemPayload::Wrapped { data } | ItemPayload::Bare(data) => data,
        }
    }
}

/// 读取租户标识
pub fn require_tenant<S: KeyValueStorage>(tokens: &TokenStore<S>) -> ApiResult<String> {
    tokens.consumer_id().ok_or_else(|| {
        tracing::warn!("tenant-scoped call without consumer id");
        ApiError::MissingTenant
    })
}

/// 单个路径段需要转义的字符（含 `/` 与 `%`）
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn item_path(path: &str, id: &str) -> String {
    format!("{}/{}", path, utf8_percent_encode(id, PATH_SEGMENT))
}

// =========================================================
// 通用资源集合
// =========================================================

/// 一个 REST 资源：`{path}` 与 `{path}/{id}`
pub struct Collection<S, T, E> {
    client: ApiClient<T>,
    tokens: TokenStore<S>,
    path: &'static str,
    tenant_scoped: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<S: Clone, T, E> Clone for Collection<S, T, E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            tokens: self.tokens.clone(),
            path: self.path,
            tenant_scoped: self.tenant_scoped,
            _entity: PhantomData,
        }
    }
}

impl<S, T, E> Collection<S, T, E>
where
    S: KeyValueStorage,
    T: HttpTransport,
    E: Serialize + DeserializeOwned,
{
    pub fn new(client: ApiClient<T>, tokens: TokenStore<S>, path: &'static str) -> Self {
        Self {
            client,
            tokens,
            path,
            tenant_scoped: false,
            _entity: PhantomData,
        }
    }

    /// 列表与搜索附带 `consumerId`
    pub fn tenant_scoped(mut self) -> Self {
        self.tenant_scoped = true;
        self
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub async fn list(&self) -> ApiResult<Vec<E>> {
        self.list_where(&[]).await
    }

    /// 服务端搜索；空查询等同于 `list`
    pub async fn search(&self, query: &str) -> ApiResult<Vec<E>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }
        self.list_where(&[(QUERY_SEARCH, query)]).await
    }

    /// 带额外查询参数的列表
    pub async fn list_where(&self, filters: &[(&str, &str)]) -> ApiResult<Vec<E>> {
        let tenant = if self.tenant_scoped {
            Some(require_tenant(&self.tokens)?)
        } else {
            None
        };

        let mut query: Vec<(&str, &str)> = Vec::with_capacity(filters.len() + 1);
        if let Some(tenant) = tenant.as_deref() {
            query.push((QUERY_CONSUMER_ID, tenant));
        }
        query.extend_from_slice(filters);

        let payload: ListPayload<E> = self.client.get_query(self.path, &query).await?;
        Ok(payload.into_vec())
    }

    pub async fn get(&self, id: &str) -> ApiResult<E> {
        let payload: ItemPayload<E> = self.client.get(&item_path(self.path, id)).await?;
        Ok(payload.into_inner())
    }

    pub async fn create(&self, record: &E) -> ApiResult<E> {
        let payload: ItemPayload<E> = self.client.post(self.path, record).await?;
        Ok(payload.into_inner())
    }

    pub async fn update(&self, id: &str, record: &E) -> ApiResult<E> {
        let payload: ItemPayload<E> = self.client.put(&item_path(self.path, id), record).await?;
        Ok(payload.into_inner())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let _: serde_json::Value = self.client.delete(&item_path(self.path, id)).await?;
        Ok(())
    }
}

// =========================================================
// 服务集合
// =========================================================

/// 视图使用的全部领域服务
pub struct Services<S, T> {
    pub assets: AssetService<S, T>,
    pub procurement: ProcurementService<S, T>,
    pub warranty: WarrantyService<S, T>,
}

impl<S, T> Services<S, T>
where
    S: KeyValueStorage + Clone,
    T: HttpTransport,
{
    pub fn new(clients: &ApiClients<T>, tokens: TokenStore<S>) -> Self {
        Self {
            assets: AssetService::new(clients.asset.clone(), tokens.clone()),
            procurement: ProcurementService::new(clients.asset.clone(), tokens.clone()),
            warranty: WarrantyService::new(clients.warranty.clone(), tokens),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::tests::{BASE, MockTransport};
    use crate::web::storage::MemoryStorage;
    use assetdesk_shared::Department;
    use assetdesk_shared::protocol::HttpMethod;
    use std::rc::Rc;

    pub fn tokens_with_tenant(tenant: Option<&str>) -> TokenStore<MemoryStorage> {
        let tokens = TokenStore::new(MemoryStorage::new());
        if let Some(tenant) = tenant {
            tokens.set_consumer_id(tenant);
        }
        tokens
    }

    fn departments(
        transport: &Rc<MockTransport>,
        tenant: Option<&str>,
    ) -> Collection<MemoryStorage, MockTransport, Department> {
        Collection::new(
            ApiClient::new(BASE, Rc::clone(transport)),
            tokens_with_tenant(tenant),
            "/department",
        )
        .tenant_scoped()
    }

    #[tokio::test]
    async fn missing_tenant_is_reported_without_a_request() {
        let transport = MockTransport::new();
        let err = departments(&transport, None).list().await.unwrap_err();

        assert_eq!(err, ApiError::MissingTenant);
        assert_eq!(err.user_message(), "Consumer ID not found. Please log in again.");
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn list_accepts_bare_and_wrapped_arrays() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/department?consumerId=c1",
            200,
            serde_json::json!([{"id": 1, "name": "IT"}]),
        );
        transport.json(
            HttpMethod::Get,
            "/department?consumerId=c1&search=fin",
            200,
            serde_json::json!({"data": [{"id": 2, "name": "Finance"}]}),
        );

        let depts = departments(&transport, Some("c1"));
        let all = depts.list().await.unwrap();
        assert_eq!(all[0].name, "IT");

        let found = depts.search(" fin ").await.unwrap();
        assert_eq!(found[0].id, "2");
    }

    #[tokio::test]
    async fn item_calls_use_id_segment() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Put,
            "/department/7",
            200,
            serde_json::json!({"data": {"id": 7, "name": "Ops"}}),
        );
        transport.reply(
            HttpMethod::Delete,
            "/department/7",
            Ok(crate::web::http::HttpResponse::new(204, "")),
        );

        let depts = departments(&transport, Some("c1"));
        let updated = depts
            .update(
                "7",
                &Department {
                    name: "Ops".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, "7");
        depts.delete("7").await.unwrap();

        let requests = transport.requests.borrow();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"name":"Ops"}"#));
        assert_eq!(requests[1].url, format!("{}/department/7", BASE));
    }

    #[test]
    fn item_ids_are_encoded_as_path_segments() {
        assert_eq!(item_path("/asset", "SR 1"), "/asset/SR%201");
        assert_eq!(item_path("/asset", "a/b?c#d"), "/asset/a%2Fb%3Fc%23d");
        assert_eq!(item_path("/asset", "PO-7+x"), "/asset/PO-7+x");
    }

    #[tokio::test]
    async fn http_errors_pass_through_untouched() {
        let transport = MockTransport::new();
        transport.json(
            HttpMethod::Get,
            "/department/9",
            404,
            serde_json::json!({"message": "Not Found"}),
        );

        let err = departments(&transport, Some("c1")).get("9").await.unwrap_err();
        assert_eq!(err, ApiError::http(404, "Not Found"));
    }
}
