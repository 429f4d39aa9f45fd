#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{ json, Value };
use std::time::Duration;
use support_chat::api::HttpApiClient;
use url::Url;
use wiremock::MockServer;

pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

pub fn live_token(id: &str, email: &str) -> String {
    jwt(json!({
        "_id": id,
        "name": "Test User",
        "email": email,
        "exp": chrono::Utc::now().timestamp() + 3600
    }))
}

pub fn client_for(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(5)).unwrap()
}
