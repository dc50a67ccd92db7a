use serde::{Deserialize, Deserializer, Serialize, de};

pub use chrono;
use chrono::{DateTime, Duration, Utc};

pub mod domain;
pub mod protocol;

pub use domain::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const KEY_AUTH_TOKEN: &str = "auth_token";
pub const KEY_REFRESH_TOKEN: &str = "refresh_token";
pub const KEY_CONSUMER_ID: &str = "consumer_id";
pub const KEY_AUTH_USER: &str = "auth_user";
pub const KEY_EXPIRES_AT: &str = "auth_expires_at";
pub const KEY_REDIRECTION_STATUS: &str = "redirectionStatus";

/// 会话相关的全部存储键（登出时整体清除）
pub const SESSION_KEYS: [&str; 5] = [
    KEY_AUTH_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_CONSUMER_ID,
    KEY_AUTH_USER,
    KEY_EXPIRES_AT,
];

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ACCEPT: &str = "Accept";
pub const MIME_JSON: &str = "application/json";

/// 注册接口不返回过期时间时采用的默认会话时长
pub const DEFAULT_SESSION_HOURS: i64 = 24;

// =========================================================
// 身份模型 (Identity Models)
// =========================================================

/// 后端返回的用户信息（客户端只读缓存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub preferences: serde_json::Value,
    /// 租户标识，部分后端把它放在用户对象上
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

/// 已认证会话
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(deserialize_with = "timestamp_or_rfc3339")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "option_string_or_number", skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<String>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// 租户标识：优先顶层字段，其次用户对象
    pub fn tenant(&self) -> Option<&str> {
        self.consumer_id
            .as_deref()
            .or(self.user.consumer_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

// =========================================================
// 认证请求与响应 (Auth Payloads)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub company: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub user: User,
    #[serde(default, deserialize_with = "option_timestamp_or_rfc3339")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RegisterData {
    /// 转换为会话，缺少过期时间时从 `now` 起算默认时长
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let consumer_id = self.user.consumer_id.clone();
        Session {
            expires_at: self
                .expires_at
                .unwrap_or_else(|| now + Duration::hours(DEFAULT_SESSION_HOURS)),
            user: self.user,
            token: self.token,
            refresh_token: self.refresh_token,
            consumer_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<RegisterData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// 通用的 `{success, message}` 响应
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// =========================================================
// Serde 辅助
// =========================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// 后端有时把 id 写成数字，有时写成字符串
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// 可缺省的外键 id，规则同 [`string_or_number`]
pub fn option_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}

/// 超过该值的数字时间戳按毫秒解释
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
    Str(String),
}

impl RawTimestamp {
    fn into_datetime<E: de::Error>(self) -> Result<DateTime<Utc>, E> {
        let epoch = |n: i64| {
            let parsed = if n.abs() > MILLIS_THRESHOLD {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            };
            parsed.ok_or_else(|| E::custom(format!("timestamp out of range: {n}")))
        };

        match self {
            RawTimestamp::Int(n) => epoch(n),
            RawTimestamp::Float(n) => epoch(n as i64),
            RawTimestamp::Str(s) => match s.trim().parse::<i64>() {
                Ok(n) => epoch(n),
                Err(_) => DateTime::parse_from_rfc3339(s.trim())
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(E::custom),
            },
        }
    }
}

/// 过期时间：RFC 3339 字符串，或 Unix 时间戳（秒或毫秒）
pub fn timestamp_or_rfc3339<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    RawTimestamp::deserialize(deserializer)?.into_datetime()
}

pub fn option_timestamp_or_rfc3339<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawTimestamp>::deserialize(deserializer)?
        .map(RawTimestamp::into_datetime)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn login_payload_uses_camel_case() {
        let req = LoginRequest {
            user_id: "admin".into(),
            password: "secret".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userId"], "admin");
    }

    #[test]
    fn session_accepts_numeric_user_id_and_nested_tenant() {
        let json = r#"{
            "user": {"id": 42, "name": "Ada", "email": "ada@example.com", "consumerId": "c-9"},
            "token": "t", "refreshToken": "r", "expiresAt": "2030-01-01T00:00:00Z"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.id, "42");
        assert_eq!(session.tenant(), Some("c-9"));
        assert_eq!(session.user.preferences, serde_json::Value::Null);
    }

    #[test]
    fn expiry_accepts_unix_seconds_and_millis() {
        let expected = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for raw in ["1893456000", "1893456000000", "\"2030-01-01T00:00:00Z\""] {
            let json = format!(r#"{{"user": {{"id": 1}}, "token": "t", "expiresAt": {raw}}}"#);
            let session: Session = serde_json::from_str(&json).unwrap();
            assert_eq!(session.expires_at, expected, "input {raw}");
        }

        let data: RegisterData = serde_json::from_str(
            r#"{"token": "t", "user": {"id": "u1"}, "expiresAt": 1893456000}"#,
        )
        .unwrap();
        assert_eq!(data.expires_at, Some(expected));
    }

    #[test]
    fn numeric_consumer_id_is_accepted() {
        let session: Session = serde_json::from_str(
            r#"{"user": {"id": 1, "consumerId": 9}, "token": "t", "expiresAt": 1893456000, "consumerId": 7}"#,
        )
        .unwrap();
        assert_eq!(session.consumer_id.as_deref(), Some("7"));
        assert_eq!(session.user.consumer_id.as_deref(), Some("9"));
    }

    #[test]
    fn register_data_defaults_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let data: RegisterData = serde_json::from_str(
            r#"{"token": "t", "refreshToken": "r", "user": {"id": "u1"}}"#,
        )
        .unwrap();
        let session = data.into_session(now);
        assert_eq!(session.expires_at, now + Duration::hours(DEFAULT_SESSION_HOURS));
        assert!(!session.is_expired(now));
    }
}
