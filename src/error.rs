use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoryError {
    #[error("network error requesting {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upstream kept failing with {status} for {url}")]
    TransientStatus { status: StatusCode, url: String },

    #[error("upstream returned {status} for {url}")]
    PermanentStatus { status: StatusCode, url: String },

    #[error("malformed body from {url}")]
    Deserialization {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("null story retrieved for story {id} with url {url}")]
    MissingStory { id: i64, url: String },

    #[error("logic error, duplicate story ids in result: {0:?}")]
    DuplicateStoryIds(Vec<i64>),

    #[error("story fetch task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl StoryError {
    /// Errors the retry policy is allowed to try again.
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self,
            StoryError::Network { .. } | StoryError::TransientStatus { .. }
        )
    }

    /// True when the failure came from the upstream API rather than from us.
    pub(crate) fn is_upstream(&self) -> bool {
        !matches!(
            self,
            StoryError::DuplicateStoryIds(_) | StoryError::Task(_)
        )
    }
}

/// 5xx, request timeout and rate limiting are worth another try, anything else
/// is answered the same way no matter how often we ask.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}
