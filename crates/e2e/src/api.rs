//! Client for the booking REST API
//!
//! [`BookingApi`] is the narrow surface the sampling engine consumes;
//! [`HttpBookingApi`] implements it over HTTP. The client is constructed
//! explicitly and shared through an `Arc`, one per suite run.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use cinebook_common::{BranchShowtimes, MovieRef, ShowtimeDetail};

use crate::config::ApiConfig;
use crate::error::{E2eError, E2eResult};

/// Remote data provider for the movie -> branch -> showtime hierarchy
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn fetch_movies(&self) -> E2eResult<Vec<MovieRef>>;

    async fn fetch_showtimes_for_movie(&self, movie_id: &str) -> E2eResult<Vec<BranchShowtimes>>;

    async fn fetch_showtime_detail(&self, showtime_id: &str) -> E2eResult<ShowtimeDetail>;
}

/// Booking API over HTTP
pub struct HttpBookingApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingApi {
    pub fn new(config: &ApiConfig) -> E2eResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let name = HeaderName::from_bytes(config.token_header.as_bytes()).map_err(|e| {
                E2eError::Config(format!("invalid token header '{}': {}", config.token_header, e))
            })?;
            let value = HeaderValue::from_str(token)
                .map_err(|e| E2eError::Config(format!("invalid API token: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if let Err(e) = Url::parse(&base_url) {
            return Err(E2eError::Config(format!("invalid API base URL '{}': {}", base_url, e)));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment
    fn endpoint(&self, segments: &[&str]) -> E2eResult<Url> {
        let invalid = || E2eError::Config(format!("invalid API base URL '{}'", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        kind: &str,
        id: &str,
    ) -> E2eResult<T> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| E2eError::Transport(format!("GET {} failed: {}", url, e)))?;

        match response.status() {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::NOT_FOUND => Err(E2eError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            }),
            status => Err(E2eError::Transport(format!("GET {} returned {}", url, status))),
        }
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn fetch_movies(&self) -> E2eResult<Vec<MovieRef>> {
        self.get_json(&["movies"], "movie list", "*").await
    }

    async fn fetch_showtimes_for_movie(&self, movie_id: &str) -> E2eResult<Vec<BranchShowtimes>> {
        self.get_json(&["movies", movie_id, "showtimes"], "movie", movie_id)
            .await
    }

    async fn fetch_showtime_detail(&self, showtime_id: &str) -> E2eResult<ShowtimeDetail> {
        self.get_json(&["showtimes", showtime_id], "showtime", showtime_id)
            .await
    }
}
