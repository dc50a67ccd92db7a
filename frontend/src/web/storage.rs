//! 本地存储与令牌存储
//!
//! `KeyValueStorage` 抽象底层键值存储：浏览器中为 `localStorage`，
//! 测试与非浏览器环境使用内存实现。
//! `TokenStore` 在其上提供会话读写，是"是否存在会话"的唯一来源。
//! 存储不可用（如浏览器禁用存储）时一律退化为"无会话"，从不向调用方报错。

use assetdesk_shared::chrono::{DateTime, Utc};
use assetdesk_shared::{
    KEY_AUTH_TOKEN, KEY_AUTH_USER, KEY_CONSUMER_ID, KEY_EXPIRES_AT, KEY_REDIRECTION_STATUS,
    KEY_REFRESH_TOKEN, SESSION_KEYS, Session, User,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

const RETURN_TO: &str = "returnTo";

/// 键值存储后端
pub trait KeyValueStorage {
    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    fn get(&self, key: &str) -> Option<String>;
    /// 设置存储值，失败返回 `false`
    fn set(&self, key: &str, value: &str) -> bool;
    /// 删除键值对，失败返回 `false`
    fn delete(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// 内存存储，克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    disabled: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟被禁用的存储：读取为空，写入失败
    pub fn disabled() -> Self {
        Self {
            entries: Rc::default(),
            disabled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if self.disabled {
            return false;
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        if self.disabled {
            return false;
        }
        self.entries.borrow_mut().remove(key);
        true
    }
}

/// 会话令牌存储
#[derive(Debug, Clone, Default)]
pub struct TokenStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> TokenStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|v| !v.is_empty())
    }

    pub fn set(&self, key: &str, value: &str) {
        if !self.storage.set(key, value) {
            tracing::warn!(key, "storage unavailable, value not persisted");
        }
    }

    /// 清除指定键；`None` 清除全部会话键（不含 `redirectionStatus`）
    pub fn clear(&self, keys: Option<&[&str]>) {
        for key in keys.unwrap_or(&SESSION_KEYS[..]) {
            self.storage.delete(key);
        }
    }

    pub fn auth_token(&self) -> Option<String> {
        self.get(KEY_AUTH_TOKEN)
    }

    pub fn has_token(&self) -> bool {
        self.auth_token().is_some()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(KEY_REFRESH_TOKEN)
    }

    pub fn consumer_id(&self) -> Option<String> {
        self.get(KEY_CONSUMER_ID)
    }

    pub fn set_consumer_id(&self, consumer_id: &str) {
        self.set(KEY_CONSUMER_ID, consumer_id);
    }

    /// 持久化会话
    pub fn save_session(&self, session: &Session) {
        self.set(KEY_AUTH_TOKEN, &session.token);
        self.set(KEY_REFRESH_TOKEN, &session.refresh_token);
        self.set(KEY_EXPIRES_AT, &session.expires_at.to_rfc3339());
        match serde_json::to_string(&session.user) {
            Ok(user) => self.set(KEY_AUTH_USER, &user),
            Err(e) => tracing::warn!(error = %e, "failed to encode user"),
        }
        if let Some(tenant) = session.tenant() {
            self.set_consumer_id(tenant);
        }
    }

    /// 读取持久化的会话，任何字段缺失或损坏都视为无会话。
    /// 不判断是否过期。
    pub fn load_session(&self) -> Option<Session> {
        let token = self.auth_token()?;
        let user: User = serde_json::from_str(&self.get(KEY_AUTH_USER)?).ok()?;
        let expires_at = DateTime::parse_from_rfc3339(&self.get(KEY_EXPIRES_AT)?)
            .ok()?
            .with_timezone(&Utc);

        Some(Session {
            user,
            token,
            refresh_token: self.refresh_token().unwrap_or_default(),
            expires_at,
            consumer_id: self.consumer_id(),
        })
    }

    // --- redirectionStatus ---

    pub fn redirection_status(&self) -> HashMap<String, String> {
        self.get(KEY_REDIRECTION_STATUS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write_redirection_status(&self, status: &HashMap<String, String>) {
        if let Ok(raw) = serde_json::to_string(status) {
            self.set(KEY_REDIRECTION_STATUS, &raw);
        }
    }

    /// 记住被拦截的页面，登录后返回
    pub fn remember_redirect(&self, path: &str) {
        let mut status = self.redirection_status();
        status.insert(RETURN_TO.to_string(), path.to_string());
        self.write_redirection_status(&status);
    }

    /// 取出并清除记住的页面
    pub fn take_redirect(&self) -> Option<String> {
        let mut status = self.redirection_status();
        let path = status.remove(RETURN_TO)?;
        self.write_redirection_status(&status);
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_shared::chrono::TimeZone;

    fn session() -> Session {
        Session {
            user: User {
                id: "u1".into(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: "admin".into(),
                status: "active".into(),
                preferences: serde_json::json!({"theme": "dark"}),
                consumer_id: None,
            },
            token: "tok".into(),
            refresh_token: "ref".into(),
            expires_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            consumer_id: Some("c-1".into()),
        }
    }

    #[test]
    fn session_survives_reload() {
        let storage = MemoryStorage::new();
        TokenStore::new(storage.clone()).save_session(&session());

        // 新实例模拟页面刷新
        let reloaded = TokenStore::new(storage);
        assert_eq!(reloaded.load_session(), Some(session()));
        assert_eq!(reloaded.consumer_id().as_deref(), Some("c-1"));
    }

    #[test]
    fn clear_without_keys_removes_session_but_keeps_redirect() {
        let storage = MemoryStorage::new();
        let store = TokenStore::new(storage.clone());
        store.save_session(&session());
        store.remember_redirect("/assets");

        store.clear(None);

        assert!(!store.has_token());
        assert_eq!(store.load_session(), None);
        assert_eq!(store.take_redirect().as_deref(), Some("/assets"));
        assert_eq!(store.take_redirect(), None);
    }

    #[test]
    fn clear_specific_keys() {
        let store = TokenStore::new(MemoryStorage::new());
        store.save_session(&session());
        store.clear(Some(&[KEY_CONSUMER_ID][..]));
        assert!(store.has_token());
        assert_eq!(store.consumer_id(), None);
    }

    #[test]
    fn corrupt_values_degrade_to_no_session() {
        let storage = MemoryStorage::new();
        let store = TokenStore::new(storage.clone());
        store.save_session(&session());
        storage.set(KEY_AUTH_USER, "{not json");
        assert_eq!(store.load_session(), None);
        // 令牌本身仍然可读
        assert!(store.has_token());

        storage.set(KEY_REDIRECTION_STATUS, "[]");
        assert!(store.redirection_status().is_empty());
    }

    #[test]
    fn disabled_storage_never_fails() {
        let store = TokenStore::new(MemoryStorage::disabled());
        store.save_session(&session());
        store.clear(None);
        store.remember_redirect("/grn");
        assert_eq!(store.load_session(), None);
        assert_eq!(store.take_redirect(), None);
        assert!(!store.has_token());
    }
}
