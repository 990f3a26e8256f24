use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    Platform, TimeWindow,
    error::RedditError,
    models::{AccessToken, Comment, Listing, Post},
};

pub const AUTH_URL: &str = "https://www.reddit.com";
pub const API_URL: &str = "https://oauth.reddit.com";
pub const USER_AGENT: &str = "subreddit-monitor/0.1";

const TOKEN_PATH: &str = "/api/v1/access_token";
const GRANT_TYPE: &str = "client_credentials";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Expire tokens a little early so a request never races the deadline.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Short-lived tokens give up at most this share of their lifetime.
const MAX_MARGIN_DIVISOR: u32 = 4;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.app_id.trim().is_empty() && !self.app_secret.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: String,
    pub api_url: String,
    pub user_agent: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            api_url: API_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

struct Token {
    value: String,
    expires_at: Option<Instant>,
}

impl Token {
    fn from_response(token: AccessToken) -> Self {
        let expires_at = (token.expires_in > 0).then(|| {
            let lifetime = Duration::from_secs(token.expires_in);
            let margin = EXPIRY_MARGIN.min(lifetime / MAX_MARGIN_DIVISOR);
            Instant::now() + (lifetime - margin)
        });

        Self {
            value: token.access_token,
            expires_at,
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

pub fn build_http_client(user_agent: &str) -> Result<Client, RedditError> {
    Ok(Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(user_agent)
        .build()?)
}

/// Exchanges app credentials for a bearer token. Single attempt, no retry.
pub async fn get_access_token(
    http: &Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken, RedditError> {
    if !credentials.is_configured() {
        return Err(RedditError::MissingCredentials);
    }

    let url = format!("{}{TOKEN_PATH}", auth_url.trim_end_matches('/'));
    let response = http
        .post(&url)
        .query(&[("grant_type", GRANT_TYPE)])
        .basic_auth(&credentials.app_id, Some(&credentials.app_secret))
        .header(reqwest::header::ACCEPT, "*/*")
        .send()
        .await?;

    let token: AccessToken = check_status(response, &url)?.json().await?;

    if token.access_token.is_empty() {
        return Err(RedditError::MalformedToken);
    }

    Ok(token)
}

fn check_status(response: Response, url: &str) -> Result<Response, RedditError> {
    let status = response.status();

    if !status.is_success() {
        return Err(RedditError::Status {
            status,
            url: url.to_string(),
        });
    }

    Ok(response)
}

/// Authenticated application-only client.
pub struct RedditClient {
    http: Client,
    credentials: Credentials,
    endpoints: Endpoints,
    token: RwLock<Token>,
}

impl RedditClient {
    /// Validates credentials and performs the initial token exchange.
    pub async fn connect(
        credentials: Credentials,
        endpoints: Endpoints,
    ) -> Result<Self, RedditError> {
        let http = build_http_client(&endpoints.user_agent)?;
        let token = get_access_token(&http, &endpoints.auth_url, &credentials).await?;

        info!(
            "Authenticated with {} ({} token, scope {:?}, expires in {}s)",
            endpoints.auth_url, token.token_type, token.scope, token.expires_in
        );

        Ok(Self {
            http,
            credentials,
            endpoints,
            token: RwLock::new(Token::from_response(token)),
        })
    }

    async fn bearer(&self) -> Result<String, RedditError> {
        {
            let token = self.token.read().await;
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
        }

        let mut token = self.token.write().await;
        if token.is_expired() {
            info!("Access token expired, requesting a new one");
            let fresh =
                get_access_token(&self.http, &self.endpoints.auth_url, &self.credentials).await?;
            *token = Token::from_response(fresh);
        }

        Ok(token.value.clone())
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoints.api_url.trim_end_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        request: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, RedditError> {
        let bearer = self.bearer().await?;

        debug!("GET {url}");
        let response = request(self.http.get(&url))
            .bearer_auth(bearer)
            .query(&[("raw_json", "1")])
            .send()
            .await?;

        Ok(check_status(response, &url)?.json().await?)
    }
}

#[async_trait]
impl Platform for RedditClient {
    async fn top_posts(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: u32,
    ) -> Result<Vec<Post>, RedditError> {
        let url = self.api_url(&format!("/r/{subreddit}/top"));
        let limit = limit.to_string();
        let listing: Listing<Post> = self
            .get_json(url, move |request| {
                request.query(&[("t", window.as_str()), ("limit", limit.as_str())])
            })
            .await?;

        Ok(listing.into_items())
    }

    async fn new_posts(&self, subreddit: &str, limit: u32) -> Result<Vec<Post>, RedditError> {
        let url = self.api_url(&format!("/r/{subreddit}/new"));
        let listing: Listing<Post> = self
            .get_json(url, |request| request.query(&[("limit", limit)]))
            .await?;

        Ok(listing.into_items())
    }

    async fn new_comments(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<Comment>, RedditError> {
        let url = self.api_url(&format!("/r/{subreddit}/comments"));
        let listing: Listing<Comment> = self
            .get_json(url, |request| request.query(&[("limit", limit)]))
            .await?;

        Ok(listing.into_items())
    }

    async fn posts_by_id(&self, fullnames: &[String]) -> Result<Vec<Post>, RedditError> {
        if fullnames.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.api_url(&format!("/by_id/{}", fullnames.join(",")));
        let listing: Listing<Post> = self.get_json(url, |request| request).await?;

        Ok(listing.into_items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_in: u64) -> Token {
        Token::from_response(AccessToken {
            access_token: "token".to_string(),
            expires_in,
            ..Default::default()
        })
    }

    #[test]
    fn test_long_lived_token_expires_a_minute_early() {
        let before = Instant::now();
        let token = token(3_600);
        let expires_at = token.expires_at.unwrap();

        assert!(!token.is_expired());
        assert!(expires_at >= before + Duration::from_secs(3_540));
        assert!(expires_at <= Instant::now() + Duration::from_secs(3_540));
    }

    #[test]
    fn test_short_lived_token_is_usable() {
        let before = Instant::now();
        let token = token(60);
        let expires_at = token.expires_at.unwrap();

        assert!(!token.is_expired());
        assert!(expires_at >= before + Duration::from_secs(45));
    }

    #[test]
    fn test_token_without_lifetime_never_expires() {
        let token = token(0);

        assert_eq!(token.expires_at, None);
        assert!(!token.is_expired());
    }
}
