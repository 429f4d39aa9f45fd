use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::header::AUTHORIZATION;
use reqwest::{ Client as HttpClient, RequestBuilder, Response };
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use super::{ extract_error_detail, ApiError, AuthApi, ChatApi };
use crate::config::ClientConfig;
use crate::models::chat::{ Conversation, SendPromptRequest, SendPromptResponse };
use crate::models::user::{ AccessToken, LoginData, RegisterData };

/// reqwest backed client for the support-chat backend.
///
/// The bearer token belongs to the instance: `authorized` returns a scoped
/// copy that sends it, the original stays anonymous.
#[derive(Clone, Debug)]
pub struct HttpApiClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl HttpApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn with_http(http: HttpClient, mut base_url: Url) -> Self {
        // Url::join drops the last path segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url, token: None }
    }

    pub fn authorized(&self, token: impl Into<String>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, route: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }

    /// `/chats/{id}` with the id pushed as a single encoded path segment,
    /// so it can never address another route.
    fn conversation_url(&self, id: &str) -> Result<Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidId(id.to_string()))?
            .pop_if_empty()
            .extend(["chats", id]);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        req
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = extract_error_detail(&body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("Request failed").to_string()
        });
        warn!("API response error {}: {}", status, detail);
        Err(ApiError::Rejected { status: status.as_u16(), detail })
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let resp = Self::check(req.send().await?).await?;
        Self::decode(resp).await
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn authenticate(&self, credentials: &LoginData) -> Result<AccessToken, ApiError> {
        let req = self.request(reqwest::Method::POST, self.url("/auth/login")?).json(credentials);
        Self::send_json(req).await
    }

    async fn register(&self, profile: &RegisterData) -> Result<AccessToken, ApiError> {
        let req = self.request(reqwest::Method::POST, self.url("/auth/register")?).json(profile);
        Self::send_json(req).await
    }
}

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn answer_prompt(
        &self,
        request: &SendPromptRequest
    ) -> Result<SendPromptResponse, ApiError> {
        let req = self.request(reqwest::Method::POST, self.url("/chats/")?).json(request);
        Self::send_json(req).await
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let req = self.request(reqwest::Method::GET, self.url("/chats/history")?);
        Self::send_json(req).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation, ApiError> {
        let req = self.request(reqwest::Method::GET, self.conversation_url(id)?);
        Self::send_json(req).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ApiError> {
        let req = self.request(reqwest::Method::DELETE, self.conversation_url(id)?);
        Self::check(req.send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpApiClient {
        HttpApiClient::with_http(HttpClient::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn joins_routes_under_base_path() {
        let c = client("http://localhost:8000/api");
        assert_eq!(c.url("/chats/history").unwrap().as_str(), "http://localhost:8000/api/chats/history");
        assert_eq!(c.url("/chats/").unwrap().as_str(), "http://localhost:8000/api/chats/");
    }

    #[test]
    fn conversation_id_is_one_segment() {
        let c = client("http://localhost:8000/api");
        assert_eq!(c.conversation_url("c1").unwrap().as_str(), "http://localhost:8000/api/chats/c1");
        assert_eq!(
            c.conversation_url("../auth/login?x#y").unwrap().as_str(),
            "http://localhost:8000/api/chats/..%2Fauth%2Flogin%3Fx%23y"
        );
        assert!(matches!(c.conversation_url(".."), Err(ApiError::InvalidId(_))));
        assert!(matches!(c.conversation_url(""), Err(ApiError::InvalidId(_))));
    }

    #[test]
    fn authorized_copy_keeps_original_anonymous() {
        let anon = client("http://localhost:8000");
        let authed = anon.authorized("tok");
        assert_eq!(authed.token(), Some("tok"));
        assert_eq!(anon.token(), None);
    }
}
