//! Dashboard aggregates over the story and category collections.

use serde::Serialize;

use crate::category::Category;
use crate::story::Story;

/// Summary numbers shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_stories: usize,
    pub total_categories: usize,
    pub total_views: u64,
    /// Most viewed story; the earliest in collection order wins a tie.
    pub popular_story: Option<Story>,
}

impl CatalogStats {
    #[must_use]
    pub fn compute(stories: &[Story], categories: &[Category]) -> Self {
        let popular_story = stories
            .iter()
            .fold(None::<&Story>, |best, s| match best {
                Some(b) if b.views >= s.views => Some(b),
                _ => Some(s),
            })
            .cloned();
        Self {
            total_stories: stories.len(),
            total_categories: categories.len(),
            total_views: stories.iter().map(|s| s.views).fold(0, u64::saturating_add),
            popular_story,
        }
    }
}

/// Number of stories filed under each category, in category order.
///
/// Stories pointing at an unknown category are not counted anywhere.
#[must_use]
pub fn story_counts_by_category(stories: &[Story], categories: &[Category]) -> Vec<(Category, usize)> {
    categories
        .iter()
        .map(|c| {
            let count = stories.iter().filter(|s| s.category_id == c.id).count();
            (c.clone(), count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn stats_over_seed_data() {
        let stories = seed::default_stories();
        let categories = seed::default_categories();
        let stats = CatalogStats::compute(&stories, &categories);

        assert_eq!(stats.total_stories, stories.len());
        assert_eq!(stats.total_categories, categories.len());
        assert_eq!(stats.total_views, stories.iter().map(|s| s.views).sum::<u64>());

        let max = stories.iter().map(|s| s.views).max().unwrap();
        assert_eq!(stats.popular_story.unwrap().views, max);
    }

    #[test]
    fn empty_catalog_has_no_popular_story() {
        let stats = CatalogStats::compute(&[], &[]);
        assert_eq!(stats.total_views, 0);
        assert!(stats.popular_story.is_none());
    }

    #[test]
    fn tie_goes_to_first_in_order() {
        let mut stories = seed::default_stories();
        for s in &mut stories {
            s.views = 10;
        }
        let stats = CatalogStats::compute(&stories, &[]);
        assert_eq!(stats.popular_story.unwrap().id, stories[0].id);
    }

    #[test]
    fn counts_follow_category_order() {
        let stories = seed::default_stories();
        let categories = seed::default_categories();
        let counts = story_counts_by_category(&stories, &categories);

        assert_eq!(counts.len(), categories.len());
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), stories.len());
        for ((c, _), expected) in counts.iter().zip(&categories) {
            assert_eq!(c.id, expected.id);
        }
    }
}
