use std::collections::HashSet;

use crate::data::VideoItem;
use crate::feed::ViewHistory;

pub const MAX_RECOMMENDATIONS: usize = 6;
pub const COLD_START_COUNT: usize = 3;
pub const TOP_TAG_COUNT: usize = 3;

/// Rank unseen videos by how many of the viewer's favourite tags they carry.
///
/// With no history the first few catalog items are returned as-is. Tag
/// counting only looks at history ids that still resolve in `catalog`; ties
/// between tags keep first-seen order and ties between videos keep catalog
/// order.
pub fn recommend(history: &ViewHistory, catalog: &[VideoItem]) -> Vec<VideoItem> {
    if history.is_empty() {
        return catalog.iter().take(COLD_START_COUNT).cloned().collect();
    }

    let top: HashSet<&str> = top_tags(history, catalog, TOP_TAG_COUNT)
        .into_iter()
        .collect();

    let mut scored: Vec<(usize, &VideoItem)> = catalog
        .iter()
        .filter(|item| !history.contains(item.id))
        .map(|item| {
            let overlap = item
                .tags
                .iter()
                .filter(|tag| top.contains(tag.as_str()))
                .count();
            (overlap, item)
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Most frequent tags across the viewed videos, highest count first.
pub fn top_tags<'a>(history: &ViewHistory, catalog: &'a [VideoItem], limit: usize) -> Vec<&'a str> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for id in history.ids() {
        let Some(item) = catalog.iter().find(|item| item.id == *id) else {
            continue;
        };
        for tag in &item.tags {
            match counts.iter_mut().find(|(seen, _)| *seen == tag.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.as_str(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(tag, _)| tag).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock_catalog;

    fn item(id: u64, tags: &[&str]) -> VideoItem {
        VideoItem {
            id,
            video_url: format!("https://videos.test/{id}.mp4"),
            author: format!("@author{id}"),
            description: format!("video {id}"),
            likes: 0,
            comments: 0,
            shares: 0,
            views: 0,
            live_viewers: 0,
            is_liked: false,
            is_saved: false,
            is_following: false,
            is_trending: false,
            is_live: false,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            comment_list: Vec::new(),
        }
    }

    fn ids(items: &[VideoItem]) -> Vec<u64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn cold_start_returns_first_three() {
        let catalog = mock_catalog();
        let picks = recommend(&ViewHistory::default(), &catalog);
        assert_eq!(ids(&picks), vec![1, 2, 3]);
    }

    #[test]
    fn ranks_by_overlap_with_viewed_tags() {
        let catalog = vec![
            item(1, &["funny", "animals", "cute", "comedy"]),
            item(2, &["travel"]),
            item(3, &["animals", "cute"]),
            item(4, &["funny", "travel"]),
            item(5, &["funny", "animals", "cute"]),
        ];
        let history = ViewHistory::from_ids([1]);
        assert_eq!(
            top_tags(&history, &catalog, TOP_TAG_COUNT),
            vec!["funny", "animals", "cute"]
        );
        let picks = recommend(&history, &catalog);
        assert_eq!(ids(&picks), vec![5, 3, 4, 2]);
    }

    #[test]
    fn never_recommends_viewed_videos() {
        let catalog = mock_catalog();
        let history = ViewHistory::from_ids([4, 7, 2]);
        let picks = recommend(&history, &catalog);
        assert!(picks.iter().all(|item| !history.contains(item.id)));
        assert!(picks.len() <= MAX_RECOMMENDATIONS);
    }

    #[test]
    fn truncates_to_six() {
        let mut catalog = vec![item(1, &["a"])];
        catalog.extend((2..=12).map(|id| item(id, &["a"])));
        let picks = recommend(&ViewHistory::from_ids([1]), &catalog);
        assert_eq!(ids(&picks), vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn tag_ties_keep_first_seen_order() {
        let catalog = vec![
            item(1, &["x", "y"]),
            item(2, &["z", "y", "w"]),
            item(3, &["w", "v"]),
        ];
        let history = ViewHistory::from_ids([1, 2, 3]);
        assert_eq!(top_tags(&history, &catalog, 3), vec!["y", "w", "x"]);
    }

    #[test]
    fn unresolved_history_ids_are_ignored() {
        let catalog = vec![item(1, &["a"]), item(2, &["b"]), item(3, &["a"])];
        let history = ViewHistory::from_ids([99, 1]);
        assert_eq!(ids(&recommend(&history, &catalog)), vec![3, 2]);
    }
}
