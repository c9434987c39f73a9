use crate::story::Story;

/// Stories fetched so far, shared by every request for the lifetime of the
/// process. Grows without bound: the best stories list is a few hundred ids.
#[derive(Debug, Default)]
pub(crate) struct StoryCache {
    stories: dashmap::DashMap<i64, Story>,
}

impl StoryCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, id: i64) -> Option<Story> {
        self.stories.get(&id).map(|entry| entry.value().clone())
    }

    /// Inserts or replaces the story stored under `id`.
    pub(crate) fn put(&self, id: i64, story: Story) {
        self.stories.insert(id, story);
    }

    pub(crate) fn len(&self) -> usize {
        self.stories.len()
    }
}
