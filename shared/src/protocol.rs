use crate::{
    ForgotPasswordRequest, LoginRequest, LogoutRequest, MessageResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, Session,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// 是否允许携带请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// The backend service an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backend {
    Auth,
    Asset,
    Warranty,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path, relative to the backend base URL.
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The backend that serves this endpoint.
    const BACKEND: Backend;
}

// =========================================================
// Auth API
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = Session;
    const PATH: &'static str = "/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
    const BACKEND: Backend = Backend::Auth;
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const PATH: &'static str = "/auth/register";
    const METHOD: HttpMethod = HttpMethod::Post;
    const BACKEND: Backend = Backend::Auth;
}

impl ApiRequest for ForgotPasswordRequest {
    type Response = MessageResponse;
    const PATH: &'static str = "/auth/forgot-password";
    const METHOD: HttpMethod = HttpMethod::Post;
    const BACKEND: Backend = Backend::Auth;
}

impl ApiRequest for ResetPasswordRequest {
    type Response = MessageResponse;
    const PATH: &'static str = "/auth/reset-password";
    const METHOD: HttpMethod = HttpMethod::Post;
    const BACKEND: Backend = Backend::Auth;
}

/// Server-side session invalidation. Callers treat failure as non-fatal.
impl ApiRequest for LogoutRequest {
    type Response = Option<MessageResponse>;
    const PATH: &'static str = "/auth/logout";
    const METHOD: HttpMethod = HttpMethod::Post;
    const BACKEND: Backend = Backend::Auth;
}
