//! 参数化的 API 客户端
//!
//! 每个后端一个实例（认证 / 资产 / 保修），基础地址、请求头、重试策略都是配置。
//! 非 2xx 响应统一转换为 `ApiError::Http`：优先取 JSON 体中的 `message`，
//! 解析失败时退回状态行（如 `404 Not Found`）。

use crate::config::{AppConfig, RetryPolicy};
use crate::error::{ApiError, ApiResult};
use crate::web::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::web::storage::{KeyValueStorage, TokenStore};
use crate::web::timer::Sleeper;
use assetdesk_shared::protocol::{ApiRequest, Backend, HttpMethod};
use assetdesk_shared::{HEADER_ACCEPT, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, MIME_JSON};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::rc::Rc;

type TokenSource = Rc<dyn Fn() -> Option<String>>;

pub struct ApiClient<T> {
    base_url: String,
    transport: Rc<T>,
    token: Option<TokenSource>,
    retry: RetryPolicy,
    sleeper: Rc<dyn Sleeper>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Rc::clone(&self.transport),
            token: self.token.clone(),
            retry: self.retry,
            sleeper: Rc::clone(&self.sleeper),
        }
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: Rc<T>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            token: None,
            retry: RetryPolicy::none(),
            sleeper: default_sleeper(),
        }
    }

    /// 从令牌存储读取 `Authorization: Bearer` 头（每次请求时读取）
    pub fn with_bearer<S>(mut self, tokens: TokenStore<S>) -> Self
    where
        S: KeyValueStorage + 'static,
    {
        self.token = Some(Rc::new(move || tokens.auth_token()));
        self
    }

    /// 固定使用给定令牌的副本（令牌已从存储中清除时使用）
    pub fn with_token(&self, token: &str) -> Self {
        let token = token.to_string();
        let mut client = self.clone();
        client.token = Some(Rc::new(move || Some(token.clone())));
        client
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Rc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(HttpMethod::Get, path, None).await
    }

    /// GET with an url-encoded query string.
    pub async fn get_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<R> {
        self.get(&with_query(path, query)).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        self.execute(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(body)?;
        self.execute(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(HttpMethod::Delete, path, None).await
    }

    /// 发送协议中定义的请求
    pub async fn send<Q: ApiRequest>(&self, req: &Q) -> ApiResult<Q::Response> {
        let body = if Q::METHOD.has_body() {
            Some(serde_json::to_string(req)?)
        } else {
            None
        };
        self.execute(Q::METHOD, Q::PATH, body).await
    }

    fn build(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut req = HttpRequest::new(self.url(path), method)
            .header(HEADER_CONTENT_TYPE, MIME_JSON)
            .header(HEADER_ACCEPT, MIME_JSON);

        if let Some(token) = self.token.as_ref().and_then(|source| source()) {
            req = req.header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }
        if let Some(body) = body {
            req = req.body(body);
        }
        req
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> ApiResult<R> {
        let req = self.build(method, path, body);
        // 只有 GET 可以安全重试
        let max_retries = if method == HttpMethod::Get {
            self.retry.max_retries
        } else {
            0
        };

        let mut attempt = 0;
        loop {
            tracing::debug!(method = method.as_str(), url = %req.url, attempt, "request");

            let result = match self.transport.send(req.clone()).await {
                Ok(resp) => decode(&resp),
                Err(e) => Err(e),
            };

            match result {
                Err(e) if e.is_transient() && attempt < max_retries => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(url = %req.url, error = %e, ?delay, "transient failure, retrying");
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!(url = %req.url, error = %e, "request failed");
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn default_sleeper() -> Rc<dyn Sleeper> {
    Rc::new(crate::web::timer::BrowserSleeper)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_sleeper() -> Rc<dyn Sleeper> {
    Rc::new(crate::web::timer::ImmediateSleeper)
}

/// 解析响应：2xx 反序列化响应体（空体按 `null` 处理），否则转换为错误
pub fn decode<R: DeserializeOwned>(resp: &HttpResponse) -> ApiResult<R> {
    if !resp.ok() {
        return Err(error_from_response(resp));
    }
    let body = resp.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(ApiError::from)
}

/// 从错误响应中提取消息
pub fn error_from_response(resp: &HttpResponse) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(&resp.body)
        .ok()
        .and_then(|json| extract_message(&json))
        .unwrap_or_else(|| resp.status_line());
    ApiError::http(resp.status, message)
}

fn extract_message(json: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    for key in ["message", "error"] {
        match json.get(key) {
            Some(Value::String(msg)) if !msg.trim().is_empty() => return Some(msg.clone()),
            // 校验类错误有时返回消息数组
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("; ");
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }
    None
}

fn with_query(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query)
        .finish();
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, sep, encoded)
}

// =========================================================
// 按后端划分的客户端集合
// =========================================================

pub struct ApiClients<T> {
    pub auth: ApiClient<T>,
    pub asset: ApiClient<T>,
    pub warranty: ApiClient<T>,
}

impl<T> Clone for ApiClients<T> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            asset: self.asset.clone(),
            warranty: self.warranty.clone(),
        }
    }
}

impl<T: HttpTransport> ApiClients<T> {
    /// 认证客户端不重试；资产与保修客户端按配置重试 GET
    pub fn new<S>(config: &AppConfig, transport: Rc<T>, tokens: TokenStore<S>) -> Self
    where
        S: KeyValueStorage + Clone + 'static,
    {
        let client = |backend: Backend, retry: RetryPolicy| {
            ApiClient::new(config.base_url(backend), Rc::clone(&transport))
                .with_bearer(tokens.clone())
                .with_retry(retry)
        };

        Self {
            auth: client(Backend::Auth, RetryPolicy::none()),
            asset: client(Backend::Asset, config.retry),
            warranty: client(Backend::Warranty, config.retry),
        }
    }

    pub fn with_sleeper(self, sleeper: Rc<dyn Sleeper>) -> Self {
        Self {
            auth: self.auth.with_sleeper(Rc::clone(&sleeper)),
            asset: self.asset.with_sleeper(Rc::clone(&sleeper)),
            warranty: self.warranty.with_sleeper(sleeper),
        }
    }

    pub fn for_backend(&self, backend: Backend) -> &ApiClient<T> {
        match backend {
            Backend::Auth => &self.auth,
            Backend::Asset => &self.asset,
            Backend::Warranty => &self.warranty,
        }
    }
}
