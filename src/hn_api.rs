use crate::error::StoryError;
use crate::story::Story;

pub(crate) const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0/";

/// The two Hacker News endpoints the service consumes.
#[async_trait::async_trait]
pub(crate) trait HnApi: Send + Sync {
    /// Ids from `beststories.json`, in upstream order. A `null` or empty body
    /// is an empty list.
    async fn fetch_best_story_ids(&self) -> Result<Vec<i64>, StoryError>;

    /// The story behind `item/{id}.json`. A `null` or empty body is an error.
    async fn fetch_story(&self, id: i64) -> Result<Story, StoryError>;
}

/// Hacker News client sharing one connection pool across all requests.
#[derive(Debug, Clone)]
pub(crate) struct HnClient {
    client: reqwest::Client,
    base_url: String,
    retry: crate::retry::RetryPolicy,
}

impl HnClient {
    pub(crate) fn new(
        base_url: &str,
        timeout: std::time::Duration,
        retry: crate::retry::RetryPolicy,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    /// GETs `path` below the base url, retrying transient failures. Returns the
    /// full url alongside the body for error reporting.
    async fn get_text(&self, path: &str) -> Result<(String, String), StoryError> {
        let url = format!("{}{}", self.base_url, path);

        let client = &self.client;
        let request_url = &url;
        let body = backoff::future::retry_notify(
            self.retry.backoff(),
            move || async move {
                let response = client.get(request_url).send().await.map_err(|source| {
                    into_backoff(StoryError::Network {
                        url: request_url.clone(),
                        source,
                    })
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(into_backoff(if crate::error::is_transient_status(status) {
                        StoryError::TransientStatus {
                            status,
                            url: request_url.clone(),
                        }
                    } else {
                        StoryError::PermanentStatus {
                            status,
                            url: request_url.clone(),
                        }
                    }));
                }

                response.text().await.map_err(|source| {
                    into_backoff(StoryError::Network {
                        url: request_url.clone(),
                        source,
                    })
                })
            },
            |err: StoryError, delay: std::time::Duration| {
                tracing::warn!(
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Transient upstream failure, retrying"
                );
            },
        )
        .await?;

        Ok((url, body))
    }
}

fn into_backoff(err: StoryError) -> backoff::Error<StoryError> {
    if err.is_transient() {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

#[async_trait::async_trait]
impl HnApi for HnClient {
    async fn fetch_best_story_ids(&self) -> Result<Vec<i64>, StoryError> {
        let (url, body) = self.get_text("beststories.json").await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let ids: Option<Vec<i64>> = crate::story::from_json_case_insensitive(&body)
            .map_err(|source| StoryError::Deserialization { url, source })?;

        Ok(ids.unwrap_or_default())
    }

    async fn fetch_story(&self, id: i64) -> Result<Story, StoryError> {
        let (url, body) = self.get_text(&format!("item/{id}.json")).await?;
        if body.trim().is_empty() {
            return Err(StoryError::MissingStory { id, url });
        }

        let story: Option<Story> = crate::story::from_json_case_insensitive(&body).map_err(
            |source| StoryError::Deserialization {
                url: url.clone(),
                source,
            },
        )?;

        story.ok_or(StoryError::MissingStory { id, url })
    }
}
