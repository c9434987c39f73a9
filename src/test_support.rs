//! Shared fakes for the unit tests.

use crate::error::StoryError;
use crate::story::Story;

/// Serves `router` on an ephemeral local port, returning the base url the
/// client should be pointed at.
pub(crate) async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}/v0/")
}

pub(crate) fn fast_retry() -> crate::retry::RetryPolicy {
    crate::retry::RetryPolicy {
        median_first_delay: std::time::Duration::ZERO,
        max_delay: std::time::Duration::ZERO,
        max_attempts: 5,
    }
}

pub(crate) fn story(id: i64, score: i64) -> Story {
    Story {
        id,
        score,
        title: Some(format!("Story {id}")),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    fetches: Vec<i64>,
    in_flight: usize,
    max_in_flight: usize,
    waves: usize,
}

/// In-memory [`crate::hn_api::HnApi`] that records every story fetch and how
/// many of them overlapped.
#[derive(Debug, Default)]
pub(crate) struct FakeHnApi {
    best_story_ids: Vec<i64>,
    stories: std::collections::HashMap<i64, Story>,
    failing: std::collections::HashSet<i64>,
    state: std::sync::Mutex<FakeState>,
}

impl FakeHnApi {
    pub(crate) fn new(best_story_ids: Vec<i64>, stories: Vec<Story>) -> Self {
        Self {
            best_story_ids,
            stories: stories.into_iter().map(|s| (s.id, s)).collect(),
            ..Default::default()
        }
    }

    /// Fetching `id` fails with a permanent 404.
    pub(crate) fn failing(mut self, id: i64) -> Self {
        self.failing.insert(id);
        self
    }

    pub(crate) fn fetches(&self) -> Vec<i64> {
        self.state.lock().unwrap().fetches.clone()
    }

    pub(crate) fn fetch_count(&self, id: i64) -> usize {
        self.fetches().iter().filter(|&&fetched| fetched == id).count()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    /// Number of times the fetches went from idle to busy.
    pub(crate) fn waves(&self) -> usize {
        self.state.lock().unwrap().waves
    }
}

#[async_trait::async_trait]
impl crate::hn_api::HnApi for FakeHnApi {
    async fn fetch_best_story_ids(&self) -> Result<Vec<i64>, StoryError> {
        Ok(self.best_story_ids.clone())
    }

    async fn fetch_story(&self, id: i64) -> Result<Story, StoryError> {
        {
            let mut state = self.state.lock().unwrap();
            state.fetches.push(id);
            if state.in_flight == 0 {
                state.waves += 1;
            }
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }

        // Lets the rest of the batch start before this fetch settles.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        self.state.lock().unwrap().in_flight -= 1;

        let url = format!("item/{id}.json");
        if self.failing.contains(&id) {
            return Err(StoryError::PermanentStatus {
                status: reqwest::StatusCode::NOT_FOUND,
                url,
            });
        }
        self.stories
            .get(&id)
            .cloned()
            .ok_or(StoryError::MissingStory { id, url })
    }
}
