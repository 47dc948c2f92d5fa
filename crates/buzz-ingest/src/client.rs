//! HTTP client for the tweet search API.
//!
//! Requests are issued one at a time. Multi-page fetches sleep a fixed delay
//! between pages and stop at the first page that still fails after retries,
//! keeping whatever was collected so far.

use std::collections::HashSet;
use std::time::Duration;

use buzz_core::{AppConfig, Post};
use reqwest::{Client, StatusCode, Url};

use crate::error::IngestError;
use crate::retry::retry_with_backoff;
use crate::types::TweetPage;

const DEFAULT_BASE_URL: &str = "https://api.twitterapi.io/";
const SEARCH_PATH: &str = "twitter/tweet/advanced_search";
const USER_TWEETS_PATH: &str = "twitter/user/last_tweets";
const API_KEY_HEADER: &str = "X-API-Key";

/// Search query for Japanese posts on `keyword` with at least `min_faves` likes.
#[must_use]
pub fn build_search_query(keyword: &str, min_faves: u64) -> String {
    format!("{} lang:ja min_faves:{min_faves}", keyword.trim())
}

/// Posts collected by a multi-page fetch.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub posts: Vec<Post>,
    pub pages: usize,
    /// The error that ended pagination early, if any.
    pub error: Option<IngestError>,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

pub struct TwitterApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    inter_request_delay_ms: u64,
}

impl TwitterApiClient {
    /// Client for the production API with default retry and pacing.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, IngestError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`IngestError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("buzz/0.1 (post-analysis)")
            .build()?;

        // Exactly one trailing slash so relative joins append to the path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| IngestError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 2,
            backoff_base_ms: 2_000,
            inter_request_delay_ms: 3_000,
        })
    }

    /// Client configured from [`AppConfig`]: base URL, timeout, retries and
    /// pacing.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] when no API key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        let api_key = config.require_api_key()?;
        Ok(
            Self::with_base_url(api_key, config.api_request_timeout_secs, &config.api_base_url)?
                .with_retry_policy(
                    config.api_max_retries,
                    config.api_retry_backoff_base_secs.saturating_mul(1_000),
                )
                .with_inter_request_delay(config.api_inter_request_delay_ms),
        )
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn with_inter_request_delay(mut self, delay_ms: u64) -> Self {
        self.inter_request_delay_ms = delay_ms;
        self
    }

    /// Sleep for the configured inter-request delay.
    pub async fn pause(&self) {
        if self.inter_request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
        }
    }

    /// One page of latest search results for `query`.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Unauthorized`] on 401 (not retried).
    /// - [`IngestError::RateLimited`] or [`IngestError::UnexpectedStatus`]
    ///   after retries are exhausted.
    /// - [`IngestError::Http`] on network failure after retries.
    /// - [`IngestError::Deserialize`] if the body does not parse.
    pub async fn search_page(
        &self,
        query: &str,
        cursor: Option<&str>,
    ) -> Result<TweetPage, IngestError> {
        let mut params = vec![("query", query), ("queryType", "Latest")];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }
        let url = self.build_url(SEARCH_PATH, &params)?;
        self.get_page(url, &format!("search(query={query})")).await
    }

    /// One page of the latest posts by `user_name`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_page`].
    pub async fn user_tweets_page(
        &self,
        user_name: &str,
        cursor: Option<&str>,
    ) -> Result<TweetPage, IngestError> {
        let user_name = user_name.trim_start_matches('@');
        let mut params = vec![("userName", user_name)];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }
        let url = self.build_url(USER_TWEETS_PATH, &params)?;
        self.get_page(url, &format!("last_tweets(user={user_name})"))
            .await
    }

    /// Page through search results for `query`, up to `max_pages`.
    pub async fn fetch_all_search(&self, query: &str, max_pages: usize) -> FetchOutcome {
        let source = format!("api:search:{query}");
        self.fetch_all(&source, max_pages, |cursor| async move {
            self.search_page(query, cursor.as_deref()).await
        })
        .await
    }

    /// Page through `user_name`'s latest posts, up to `max_pages`.
    pub async fn fetch_all_user_tweets(&self, user_name: &str, max_pages: usize) -> FetchOutcome {
        let source = format!("api:user:{}", user_name.trim_start_matches('@'));
        self.fetch_all(&source, max_pages, |cursor| async move {
            self.user_tweets_page(user_name, cursor.as_deref()).await
        })
        .await
    }

    async fn fetch_all<F, Fut>(&self, source: &str, max_pages: usize, mut fetch_page: F) -> FetchOutcome
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: std::future::Future<Output = Result<TweetPage, IngestError>>,
    {
        let mut outcome = FetchOutcome::default();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_cursors: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;

        while outcome.pages < max_pages {
            if outcome.pages > 0 {
                self.pause().await;
            }

            let page = match fetch_page(cursor.clone()).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::error!(
                        source,
                        pages = outcome.pages,
                        collected = outcome.posts.len(),
                        error = %err,
                        "fetch failed; keeping partial results"
                    );
                    outcome.error = Some(err);
                    break;
                }
            };
            outcome.pages += 1;

            let next = page.next().map(str::to_owned);
            for tweet in page.into_tweets() {
                if !tweet.id.is_empty() && !seen_ids.insert(tweet.id.clone()) {
                    continue;
                }
                outcome.posts.push(tweet.into_post(source));
            }

            match next {
                Some(next) if seen_cursors.insert(next.clone()) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::info!(
            source,
            pages = outcome.pages,
            posts = outcome.posts.len(),
            "fetch finished"
        );
        outcome
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, IngestError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| IngestError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_page(&self, url: Url, context: &str) -> Result<TweetPage, IngestError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(API_KEY_HEADER, &self.api_key)
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(0);
                    return Err(IngestError::RateLimited { retry_after_secs });
                }
                if status == StatusCode::UNAUTHORIZED {
                    return Err(IngestError::Unauthorized {
                        url: redact(&url),
                    });
                }
                if !status.is_success() {
                    return Err(IngestError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: redact(&url),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<TweetPage>(&body).map_err(|e| IngestError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

/// URL without its query string, for logs and error messages.
fn redact(url: &Url) -> String {
    let mut bare = url.clone();
    bare.set_query(None);
    bare.to_string()
}
