use std::sync::Arc;

use crate::error::StoryError;
use crate::hn_api::HnApi;
use crate::resolver::StoryResolver;
use crate::story::Story;

pub(crate) struct BestStories {
    api: Arc<dyn HnApi>,
    resolver: StoryResolver,
}

impl BestStories {
    pub(crate) fn new(api: Arc<dyn HnApi>, resolver: StoryResolver) -> Self {
        Self { api, resolver }
    }

    /// The `n` highest scored of the current best stories, highest first.
    ///
    /// Every candidate is resolved before ranking since the upstream order is
    /// not the score order.
    pub(crate) async fn get_best_stories(&self, n: usize) -> Result<Vec<Story>, StoryError> {
        let ids = self.api.fetch_best_story_ids().await?;
        tracing::info!(num_ids = ids.len(), "Got best story ids");

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut stories = self.resolver.resolve(&ids).await?;
        sort_stories(&mut stories);
        stories.truncate(n);

        Ok(stories)
    }
}

/// Highest score first. Stable, so equal scores keep their resolved order.
fn sort_stories(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.score.cmp(&a.score));
}
