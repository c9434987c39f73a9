use std::sync::Arc;

use crate::cache::StoryCache;
use crate::error::StoryError;
use crate::hn_api::HnApi;
use crate::story::Story;

/// Turns story ids into stories, `batch_size` concurrent fetches at a time.
#[derive(Clone)]
pub(crate) struct StoryResolver {
    api: Arc<dyn HnApi>,
    cache: Arc<StoryCache>,
    batch_size: std::num::NonZeroUsize,
}

impl StoryResolver {
    pub(crate) fn new(
        api: Arc<dyn HnApi>,
        cache: Arc<StoryCache>,
        batch_size: std::num::NonZeroUsize,
    ) -> Self {
        Self {
            api,
            cache,
            batch_size,
        }
    }

    /// Resolves `ids` into stories in the same order. Each batch is awaited in
    /// full before the next one starts and the first failure fails the whole
    /// call, aborting whatever is still in flight.
    pub(crate) async fn resolve(&self, ids: &[i64]) -> Result<Vec<Story>, StoryError> {
        let mut stories = Vec::with_capacity(ids.len());

        for batch in ids.chunks(self.batch_size.get()) {
            let mut join_set: tokio::task::JoinSet<(usize, Result<Story, StoryError>)> =
                tokio::task::JoinSet::new();

            for (position, &id) in batch.iter().enumerate() {
                let api = self.api.clone();
                let cache = self.cache.clone();
                join_set.spawn(async move { (position, get_story(api.as_ref(), &cache, id).await) });
            }

            // Slots keep input order no matter which fetch finishes first.
            let mut fetched: Vec<Option<Story>> = vec![None; batch.len()];
            while let Some(res) = join_set.join_next().await {
                let (position, story) = res?;
                fetched[position] = Some(story?);
            }

            stories.extend(fetched.into_iter().flatten());
            tracing::info!(num_stories = batch.len(), "Fetched batch of stories");
        }

        tracing::info!(
            num_stories = stories.len(),
            num_cached = self.cache.len(),
            "Fetched stories in total"
        );

        let duplicates = duplicate_ids(&stories);
        if !duplicates.is_empty() {
            tracing::error!(ids =? duplicates, "Duplicate story ids in resolved stories");
            return Err(StoryError::DuplicateStoryIds(duplicates));
        }

        Ok(stories)
    }
}

async fn get_story(api: &dyn HnApi, cache: &StoryCache, id: i64) -> Result<Story, StoryError> {
    if let Some(story) = cache.get(id) {
        return Ok(story);
    }

    let story = api.fetch_story(id).await?;
    cache.put(id, story.clone());
    Ok(story)
}

/// Ids appearing more than once, each reported once in first-seen order.
fn duplicate_ids(stories: &[Story]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(stories.len());
    let mut duplicates = Vec::new();
    for story in stories {
        if !seen.insert(story.id) && !duplicates.contains(&story.id) {
            duplicates.push(story.id);
        }
    }
    duplicates
}
