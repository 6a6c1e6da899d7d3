use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::GoogleConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub verified_email: bool,
    pub name: Option<String>,
}

#[async_trait]
pub trait GoogleOAuth: Send + Sync {
    /// Consent-screen URL carrying `state`.
    fn authorize_url(&self, state: &str) -> anyhow::Result<String>;
    /// Trade an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> anyhow::Result<String>;
    async fn fetch_profile(&self, access_token: &str) -> anyhow::Result<GoogleProfile>;
}

#[derive(Clone)]
pub struct GoogleClient {
    http: Client,
    cfg: GoogleConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleClient {
    pub fn new(cfg: GoogleConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("memoir-backend")
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { http, cfg })
    }
}

#[async_trait]
impl GoogleOAuth for GoogleClient {
    fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.cfg.client_id.as_str()),
                ("redirect_uri", self.cfg.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "online"),
                ("prompt", "select_account"),
                ("state", state),
            ],
        )?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<String> {
        let res = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.cfg.client_id.as_str()),
                ("client_secret", self.cfg.client_secret.as_str()),
                ("redirect_uri", self.cfg.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("google token request")?
            .error_for_status()
            .context("google token endpoint rejected code")?;
        let token: TokenResponse = res.json().await.context("decode google token response")?;
        Ok(token.access_token)
    }

    async fn fetch_profile(&self, access_token: &str) -> anyhow::Result<GoogleProfile> {
        let profile = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .context("google userinfo request")?
            .error_for_status()
            .context("google userinfo rejected token")?
            .json::<GoogleProfile>()
            .await
            .context("decode google profile")?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_client_and_state() {
        let client = GoogleClient::new(GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "shh".into(),
            redirect_uri: "http://localhost:8080/api/auth/google/callback".into(),
        })
        .unwrap();
        let url = Url::parse(&client.authorize_url("xyz").unwrap()).unwrap();
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["state"], "xyz");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:8080/api/auth/google/callback"
        );
        assert!(!params.contains_key("client_secret"));
    }

    #[test]
    fn profile_defaults_unverified() {
        let p: GoogleProfile = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(!p.verified_email);
        assert!(p.name.is_none());
    }
}
