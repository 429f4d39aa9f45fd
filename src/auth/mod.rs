pub mod token;

use log::{ info, warn };
use std::sync::Arc;
use thiserror::Error;
use crate::api::{ ApiError, AuthApi };
use crate::models::route::Route;
use crate::models::user::{ AccessToken, LoginData, RegisterData, User };
use crate::storage::{ StorageError, TokenStore };
use self::token::{ decode_claims, TokenError };

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid access token: {0}")]
    Token(#[from] TokenError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

/// A signed in user together with the bearer token that proves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthSession {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    state: AuthState,
}

impl AuthSession {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self { api, store, state: AuthState::default() }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.user.is_some()
    }

    pub async fn login(&mut self, credentials: &LoginData) -> Result<(Session, Route), AuthError> {
        credentials.validate().map_err(AuthError::Validation)?;

        self.state.loading = true;
        let api = self.api.clone();
        let result = match api.authenticate(credentials).await {
            Ok(token) => self.establish(token).await,
            Err(e) => Err(e.into()),
        };
        self.state.loading = false;

        match &result {
            Ok(session) => info!("Signed in as {}", session.user.email),
            Err(e) => warn!("Login failed for {}: {}", credentials.email, e),
        }
        result.map(|session| (session, Route::Home))
    }

    pub async fn register(&mut self, profile: &RegisterData) -> Result<(Session, Route), AuthError> {
        profile.validate().map_err(AuthError::Validation)?;
        let profile = profile.trimmed();

        self.state.loading = true;
        let api = self.api.clone();
        let result = match api.register(&profile).await {
            Ok(token) => self.establish(token).await,
            Err(e) => Err(e.into()),
        };
        self.state.loading = false;

        match &result {
            Ok(session) => info!("Registered and signed in as {}", session.user.email),
            Err(e) => warn!("Registration failed for {}: {}", profile.email, e),
        }
        result.map(|session| (session, Route::Home))
    }

    /// Forgets the user and the stored token. The user is cleared even when
    /// the store fails.
    pub async fn logout(&mut self) -> Result<Route, AuthError> {
        self.state.user = None;
        self.store.clear().await?;
        info!("Signed out");
        Ok(Route::Login)
    }

    /// Picks up a token stored by an earlier run. Missing, expired or
    /// undecodable tokens sign the user out.
    pub async fn restore(&mut self) -> Result<Option<Session>, AuthError> {
        let token = match self.store.load().await? {
            Some(token) => token,
            None => {
                self.logout().await?;
                return Ok(None);
            }
        };

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Stored token could not be decoded: {}", e);
                self.logout().await?;
                return Ok(None);
            }
        };

        if claims.is_expired_at(chrono::Utc::now()) {
            info!("Stored session has expired");
            self.logout().await?;
            return Ok(None);
        }

        let user = claims.user();
        self.state.user = Some(user.clone());
        Ok(Some(Session { user, token }))
    }

    async fn establish(&mut self, token: AccessToken) -> Result<Session, AuthError> {
        let user = decode_claims(&token.access_token)?.user();
        self.store.save(&token.access_token).await?;
        self.state.user = Some(user.clone());
        Ok(Session { user, token: token.access_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::token::encode_for_test;
    use crate::storage::MemoryTokenStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeAuth {
        token: Option<String>,
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn authenticate(&self, _credentials: &LoginData) -> Result<AccessToken, ApiError> {
            self.issue()
        }

        async fn register(&self, _profile: &RegisterData) -> Result<AccessToken, ApiError> {
            self.issue()
        }
    }

    impl FakeAuth {
        fn issue(&self) -> Result<AccessToken, ApiError> {
            match &self.token {
                Some(t) => Ok(AccessToken { access_token: t.clone(), token_type: "bearer".into() }),
                None => Err(ApiError::Rejected { status: 401, detail: "Invalid credentials".into() }),
            }
        }
    }

    fn valid_token() -> String {
        encode_for_test(
            json!({
                "_id": "u1",
                "name": "Ann",
                "email": "ann@example.com",
                "exp": chrono::Utc::now().timestamp() + 600
            })
        )
    }

    fn credentials() -> LoginData {
        LoginData { email: "ann@example.com".into(), password: "secret".into() }
    }

    #[tokio::test]
    async fn login_persists_token_and_sets_user() {
        let token = valid_token();
        let store = Arc::new(MemoryTokenStore::default());
        let mut auth = AuthSession::new(Arc::new(FakeAuth { token: Some(token.clone()) }), store.clone());

        let (session, route) = auth.login(&credentials()).await.unwrap();

        assert_eq!(route, Route::Home);
        assert_eq!(session.token, token);
        assert_eq!(auth.user().map(|u| u.id.as_str()), Some("u1"));
        assert!(!auth.state().loading);
        assert_eq!(store.load().await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn failed_login_leaves_user_signed_out() {
        let store = Arc::new(MemoryTokenStore::default());
        let mut auth = AuthSession::new(Arc::new(FakeAuth { token: None }), store.clone());

        let err = auth.login(&credentials()).await.unwrap_err();

        assert!(matches!(err, AuthError::Api(ApiError::Rejected { status: 401, .. })));
        assert!(!auth.is_signed_in());
        assert!(!auth.state().loading);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn register_validates_before_calling_backend() {
        let mut auth = AuthSession::new(
            Arc::new(FakeAuth { token: Some(valid_token()) }),
            Arc::new(MemoryTokenStore::default())
        );
        let profile = RegisterData { name: " ".into(), email: "a@b.c".into(), password: "pw".into() };

        let err = auth.register(&profile).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(!auth.is_signed_in());
    }

    #[tokio::test]
    async fn undecodable_token_is_not_persisted() {
        let store = Arc::new(MemoryTokenStore::default());
        let mut auth = AuthSession::new(
            Arc::new(FakeAuth { token: Some("opaque".into()) }),
            store.clone()
        );

        let err = auth.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, AuthError::Token(_)));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn restore_accepts_live_token() {
        let token = valid_token();
        let mut auth = AuthSession::new(
            Arc::new(FakeAuth { token: None }),
            Arc::new(MemoryTokenStore::with_token(token.clone()))
        );

        let session = auth.restore().await.unwrap().unwrap();
        assert_eq!(session.token, token);
        assert_eq!(session.user.email, "ann@example.com");
        assert!(auth.is_signed_in());
    }

    #[tokio::test]
    async fn restore_drops_expired_token() {
        let expired = encode_for_test(json!({ "_id": "u1", "name": "Ann", "email": "a@b.c", "exp": 10 }));
        let store = Arc::new(MemoryTokenStore::with_token(expired));
        let mut auth = AuthSession::new(Arc::new(FakeAuth { token: None }), store.clone());

        assert_eq!(auth.restore().await.unwrap(), None);
        assert!(!auth.is_signed_in());
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let store = Arc::new(MemoryTokenStore::default());
        let mut auth = AuthSession::new(Arc::new(FakeAuth { token: Some(valid_token()) }), store.clone());
        auth.login(&credentials()).await.unwrap();

        assert_eq!(auth.logout().await.unwrap(), Route::Login);
        assert!(!auth.is_signed_in());
        assert_eq!(store.load().await.unwrap(), None);
    }
}
